//! Postgres-backed ledger store.
//!
//! Every operation is one typed function over one parameterised statement;
//! values are always passed through `bind`, never spliced into SQL text.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | LedgerError | Scenario |
//! |------------|----------------------|-------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Duplicate company/industry code or association |
//! | Database (foreign key violation) | `23503` | `Conflict` | Deleting a company still referenced by invoices |
//! | Database (foreign key violation) | `23503` | `Validation` | Issuing an invoice for an unknown company |
//! | Database (check constraint violation) | `23514` | `Validation` | Non-positive amount |
//! | Database (other) | Any other | `Store` | Other database errors |
//! | PoolClosed / Io / Tls / other | N/A | `Store` | Connectivity loss, driver failures |
//!
//! ## Thread Safety
//!
//! `PostgresLedgerStore` is `Send + Sync`; the SQLx pool handles connection
//! management.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use biztime_companies::{
    Company, CompanyIndustry, CompanySummary, CompanyUpdate, Industry, IndustrySummary,
};
use biztime_core::{CompanyCode, EntityKind, IndustryCode, InvoiceId, LedgerError, LedgerResult};
use biztime_invoicing::{Invoice, InvoiceListing, InvoiceSummary, InvoiceUpdate, NewInvoice};

use super::r#trait::{CompanyIndustryRow, InvoiceCompanyRow, LedgerStore};

/// Schema applied by [`PostgresLedgerStore::migrate`]. Idempotent.
pub const SCHEMA: &str = include_str!("schema.sql");

mod statements {
    pub const LIST_COMPANIES: &str = "SELECT code, name FROM companies ORDER BY code";

    pub const GET_COMPANY: &str =
        "SELECT code, name, description FROM companies WHERE code = $1";

    pub const INSERT_COMPANY: &str = r#"
        INSERT INTO companies (code, name, description)
        VALUES ($1, $2, $3)
        RETURNING code, name, description
    "#;

    pub const UPDATE_COMPANY: &str = r#"
        UPDATE companies SET name = $1, description = $2
        WHERE code = $3
        RETURNING code, name, description
    "#;

    pub const DELETE_COMPANY: &str = "DELETE FROM companies WHERE code = $1";

    pub const COMPANY_INDUSTRY_ROWS: &str = r#"
        SELECT c.code, c.name, c.description, i.industry
        FROM companies AS c
        LEFT JOIN company_industries AS ci ON ci.company_code = c.code
        LEFT JOIN industries AS i ON i.code = ci.industry_code
        WHERE c.code = $1
    "#;

    pub const COMPANY_INVOICES: &str =
        "SELECT id, amt, paid FROM invoices WHERE comp_code = $1 ORDER BY id";

    pub const LIST_INVOICES: &str = "SELECT id, comp_code FROM invoices ORDER BY id";

    pub const GET_INVOICE: &str = r#"
        SELECT id, comp_code, amt, paid, add_date, paid_date
        FROM invoices WHERE id = $1
    "#;

    pub const GET_INVOICE_FOR_UPDATE: &str = r#"
        SELECT id, comp_code, amt, paid, add_date, paid_date
        FROM invoices WHERE id = $1
        FOR UPDATE
    "#;

    pub const INVOICE_WITH_COMPANY: &str = r#"
        SELECT i.id, i.amt, i.paid, i.add_date, i.paid_date,
               c.code AS comp_code, c.name, c.description
        FROM invoices AS i
        INNER JOIN companies AS c ON i.comp_code = c.code
        WHERE i.id = $1
    "#;

    pub const INSERT_INVOICE: &str = r#"
        INSERT INTO invoices (comp_code, amt, add_date)
        VALUES ($1, $2, $3)
        RETURNING id, comp_code, amt, paid, add_date, paid_date
    "#;

    pub const UPDATE_INVOICE: &str =
        "UPDATE invoices SET amt = $1, paid = $2, paid_date = $3 WHERE id = $4";

    pub const DELETE_INVOICE: &str = "DELETE FROM invoices WHERE id = $1";

    pub const LIST_INDUSTRIES: &str = r#"
        SELECT i.code, i.industry, ci.company_code
        FROM industries AS i
        LEFT JOIN company_industries AS ci ON ci.industry_code = i.code
        ORDER BY i.code, ci.company_code
    "#;

    pub const INSERT_INDUSTRY: &str = r#"
        INSERT INTO industries (code, industry)
        VALUES ($1, $2)
        RETURNING code, industry
    "#;

    pub const INDUSTRY_EXISTS: &str = "SELECT 1 FROM industries WHERE code = $1";

    pub const COMPANY_EXISTS: &str = "SELECT 1 FROM companies WHERE code = $1";

    pub const INSERT_COMPANY_INDUSTRY: &str = r#"
        INSERT INTO company_industries (company_code, industry_code)
        VALUES ($1, $2)
    "#;
}

/// Postgres-backed ledger store.
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    /// Create a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a new pool to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> LedgerResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the bundled schema.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> LedgerResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(skip(self), err)]
    async fn list_companies(&self) -> LedgerResult<Vec<CompanySummary>> {
        let rows = sqlx::query(statements::LIST_COMPANIES)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_companies", e))?;

        rows.iter()
            .map(|row| -> Result<CompanySummary, sqlx::Error> {
                Ok(CompanySummary {
                    code: CompanyCode::new(row.try_get::<String, _>("code")?),
                    name: row.try_get("name")?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(|e| map_sqlx_error("list_companies", e))
    }

    #[instrument(skip(self), fields(code = %code), err)]
    async fn get_company(&self, code: &CompanyCode) -> LedgerResult<Company> {
        let row = sqlx::query(statements::GET_COMPANY)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_company", e))?
            .ok_or_else(|| LedgerError::not_found(EntityKind::Company, code))?;

        company_from_row(&row).map_err(|e| map_sqlx_error("get_company", e))
    }

    #[instrument(skip(self, company), fields(code = %company.code), err)]
    async fn create_company(&self, company: Company) -> LedgerResult<Company> {
        let row = sqlx::query(statements::INSERT_COMPANY)
            .bind(company.code.as_str())
            .bind(&company.name)
            .bind(&company.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    LedgerError::already_exists(EntityKind::Company, &company.code)
                } else {
                    map_sqlx_error("create_company", e)
                }
            })?;

        company_from_row(&row).map_err(|e| map_sqlx_error("create_company", e))
    }

    #[instrument(skip(self, update), fields(code = %code), err)]
    async fn update_company(
        &self,
        code: &CompanyCode,
        update: CompanyUpdate,
    ) -> LedgerResult<Company> {
        let row = sqlx::query(statements::UPDATE_COMPANY)
            .bind(&update.name)
            .bind(&update.description)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_company", e))?
            .ok_or_else(|| LedgerError::not_found(EntityKind::Company, code))?;

        company_from_row(&row).map_err(|e| map_sqlx_error("update_company", e))
    }

    #[instrument(skip(self), fields(code = %code), err)]
    async fn delete_company(&self, code: &CompanyCode) -> LedgerResult<()> {
        let result = sqlx::query(statements::DELETE_COMPANY)
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    LedgerError::conflict(format!(
                        "company with code of {code} is still referenced by invoices"
                    ))
                } else {
                    map_sqlx_error("delete_company", e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::not_found(EntityKind::Company, code));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(code = %code), err)]
    async fn company_industry_rows(
        &self,
        code: &CompanyCode,
    ) -> LedgerResult<Vec<CompanyIndustryRow>> {
        let rows = sqlx::query(statements::COMPANY_INDUSTRY_ROWS)
            .bind(code.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("company_industry_rows", e))?;

        rows.iter()
            .map(|row| -> Result<CompanyIndustryRow, sqlx::Error> {
                Ok(CompanyIndustryRow {
                    code: CompanyCode::new(row.try_get::<String, _>("code")?),
                    name: row.try_get("name")?,
                    description: row.try_get("description")?,
                    industry: row.try_get("industry")?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(|e| map_sqlx_error("company_industry_rows", e))
    }

    #[instrument(skip(self), fields(code = %code), err)]
    async fn company_invoices(&self, code: &CompanyCode) -> LedgerResult<Vec<InvoiceSummary>> {
        let rows = sqlx::query(statements::COMPANY_INVOICES)
            .bind(code.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("company_invoices", e))?;

        rows.iter()
            .map(|row| -> Result<InvoiceSummary, sqlx::Error> {
                Ok(InvoiceSummary {
                    id: InvoiceId::new(row.try_get("id")?),
                    amt: row.try_get("amt")?,
                    paid: row.try_get("paid")?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(|e| map_sqlx_error("company_invoices", e))
    }

    #[instrument(skip(self), err)]
    async fn list_invoices(&self) -> LedgerResult<Vec<InvoiceListing>> {
        let rows = sqlx::query(statements::LIST_INVOICES)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_invoices", e))?;

        rows.iter()
            .map(|row| -> Result<InvoiceListing, sqlx::Error> {
                Ok(InvoiceListing {
                    id: InvoiceId::new(row.try_get("id")?),
                    comp_code: CompanyCode::new(row.try_get::<String, _>("comp_code")?),
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(|e| map_sqlx_error("list_invoices", e))
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn get_invoice(&self, id: InvoiceId) -> LedgerResult<Invoice> {
        let row = sqlx::query(statements::GET_INVOICE)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_invoice", e))?
            .ok_or_else(|| LedgerError::not_found(EntityKind::Invoice, id))?;

        invoice_from_row(&row).map_err(|e| map_sqlx_error("get_invoice", e))
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn invoice_with_company(
        &self,
        id: InvoiceId,
    ) -> LedgerResult<Option<InvoiceCompanyRow>> {
        let row = sqlx::query(statements::INVOICE_WITH_COMPANY)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("invoice_with_company", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let decoded = invoice_company_from_row(&row)
            .map_err(|e| map_sqlx_error("invoice_with_company", e))?;

        Ok(Some(decoded))
    }

    #[instrument(skip(self, new), fields(comp_code = %new.comp_code), err)]
    async fn create_invoice(&self, new: NewInvoice, add_date: NaiveDate) -> LedgerResult<Invoice> {
        let row = sqlx::query(statements::INSERT_INVOICE)
            .bind(new.comp_code.as_str())
            .bind(new.amt)
            .bind(add_date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    LedgerError::validation(format!(
                        "comp_code {} does not reference an existing company",
                        new.comp_code
                    ))
                } else {
                    map_sqlx_error("create_invoice", e)
                }
            })?;

        invoice_from_row(&row).map_err(|e| map_sqlx_error("create_invoice", e))
    }

    /// Read-then-write under `SELECT ... FOR UPDATE` so the paid date is always
    /// resolved against the row as it is when the write lands.
    #[instrument(skip(self, update), fields(id = %id, paid = update.paid), err)]
    async fn update_invoice(
        &self,
        id: InvoiceId,
        update: InvoiceUpdate,
        today: NaiveDate,
    ) -> LedgerResult<Invoice> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let current = sqlx::query(statements::GET_INVOICE_FOR_UPDATE)
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_invoice", e))?;

        let Some(current) = current else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(LedgerError::not_found(EntityKind::Invoice, id));
        };

        let mut invoice =
            invoice_from_row(&current).map_err(|e| map_sqlx_error("lock_invoice", e))?;
        invoice.apply_update(&update, today);

        sqlx::query(statements::UPDATE_INVOICE)
            .bind(invoice.amt)
            .bind(invoice.paid)
            .bind(invoice.paid_date)
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_invoice", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(invoice)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete_invoice(&self, id: InvoiceId) -> LedgerResult<()> {
        let result = sqlx::query(statements::DELETE_INVOICE)
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_invoice", e))?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::not_found(EntityKind::Invoice, id));
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list_industries(&self) -> LedgerResult<Vec<IndustrySummary>> {
        let rows = sqlx::query(statements::LIST_INDUSTRIES)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_industries", e))?;

        let links = rows
            .iter()
            .map(industry_link_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| map_sqlx_error("list_industries", e))?;

        Ok(group_industry_links(links))
    }

    #[instrument(skip(self, industry), fields(code = %industry.code), err)]
    async fn create_industry(&self, industry: Industry) -> LedgerResult<Industry> {
        let row = sqlx::query(statements::INSERT_INDUSTRY)
            .bind(industry.code.as_str())
            .bind(&industry.industry)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    LedgerError::already_exists(EntityKind::Industry, &industry.code)
                } else {
                    map_sqlx_error("create_industry", e)
                }
            })?;

        industry_from_row(&row).map_err(|e| map_sqlx_error("create_industry", e))
    }

    #[instrument(skip(self), fields(industry = %industry_code, company = %company_code), err)]
    async fn associate_industry(
        &self,
        industry_code: &IndustryCode,
        company_code: &CompanyCode,
    ) -> LedgerResult<CompanyIndustry> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let industry = sqlx::query(statements::INDUSTRY_EXISTS)
            .bind(industry_code.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("associate_industry", e))?;
        if industry.is_none() {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(LedgerError::not_found(EntityKind::Industry, industry_code));
        }

        let company = sqlx::query(statements::COMPANY_EXISTS)
            .bind(company_code.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("associate_industry", e))?;
        if company.is_none() {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(LedgerError::not_found(EntityKind::Company, company_code));
        }

        sqlx::query(statements::INSERT_COMPANY_INDUSTRY)
            .bind(company_code.as_str())
            .bind(industry_code.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    LedgerError::conflict(format!(
                        "company {company_code} is already filed under industry {industry_code}"
                    ))
                } else {
                    map_sqlx_error("associate_industry", e)
                }
            })?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(CompanyIndustry {
            company_code: company_code.clone(),
            industry_code: industry_code.clone(),
        })
    }
}

// Row decoding

fn company_from_row(row: &PgRow) -> Result<Company, sqlx::Error> {
    Ok(Company {
        code: CompanyCode::new(row.try_get::<String, _>("code")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
    })
}

fn industry_link_from_row(
    row: &PgRow,
) -> Result<(String, String, Option<String>), sqlx::Error> {
    Ok((
        row.try_get("code")?,
        row.try_get("industry")?,
        row.try_get("company_code")?,
    ))
}

/// Fold `industries LEFT JOIN company_industries` rows, sorted by industry
/// code, into one summary per industry. An industry with no companies arrives
/// as a single row with a null company code.
fn group_industry_links(
    links: impl IntoIterator<Item = (String, String, Option<String>)>,
) -> Vec<IndustrySummary> {
    let mut out: Vec<IndustrySummary> = Vec::new();
    for (code, industry, company_code) in links {
        if out.last().is_none_or(|last| last.code.as_str() != code) {
            out.push(IndustrySummary {
                code: IndustryCode::new(code),
                industry,
                companies: Vec::new(),
            });
        }
        if let (Some(company_code), Some(summary)) = (company_code, out.last_mut()) {
            summary.companies.push(CompanyCode::new(company_code));
        }
    }
    out
}

fn industry_from_row(row: &PgRow) -> Result<Industry, sqlx::Error> {
    Ok(Industry {
        code: IndustryCode::new(row.try_get::<String, _>("code")?),
        industry: row.try_get("industry")?,
    })
}

fn invoice_company_from_row(row: &PgRow) -> Result<InvoiceCompanyRow, sqlx::Error> {
    Ok(InvoiceCompanyRow {
        id: InvoiceId::new(row.try_get("id")?),
        amt: row.try_get("amt")?,
        paid: row.try_get("paid")?,
        add_date: row.try_get("add_date")?,
        paid_date: row.try_get("paid_date")?,
        comp_code: CompanyCode::new(row.try_get::<String, _>("comp_code")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
    })
}

fn invoice_from_row(row: &PgRow) -> Result<Invoice, sqlx::Error> {
    Ok(Invoice {
        id: InvoiceId::new(row.try_get("id")?),
        comp_code: CompanyCode::new(row.try_get::<String, _>("comp_code")?),
        amt: row.try_get("amt")?,
        paid: row.try_get("paid")?,
        add_date: row.try_get("add_date")?,
        paid_date: row.try_get("paid_date")?,
    })
}

// Error mapping

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> LedgerError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            match db_err.code().as_deref() {
                Some("23505") | Some("23503") => LedgerError::Conflict(msg),
                Some("23514") => LedgerError::Validation(msg),
                _ => LedgerError::Store(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            LedgerError::store(format!("connection pool closed in {}", operation))
        }
        _ => LedgerError::store(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn sqlstate_is(err: &sqlx::Error, code: &str) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(found) = db_err.code() {
            return found.as_ref() == code;
        }
    }
    false
}

/// Check if an error is a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    sqlstate_is(err, "23505")
}

/// Check if an error is a foreign key violation.
fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    sqlstate_is(err, "23503")
}
