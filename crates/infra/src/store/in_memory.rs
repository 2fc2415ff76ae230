use std::collections::BTreeMap;
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use biztime_companies::{
    Company, CompanyIndustry, CompanySummary, CompanyUpdate, Industry, IndustrySummary,
};
use biztime_core::{CompanyCode, Entity, EntityKind, IndustryCode, InvoiceId, LedgerError, LedgerResult};
use biztime_invoicing::{Invoice, InvoiceListing, InvoiceSummary, InvoiceUpdate, NewInvoice};

use super::r#trait::{CompanyIndustryRow, InvoiceCompanyRow, LedgerStore};

#[derive(Debug, Default)]
struct Tables {
    companies: BTreeMap<CompanyCode, Company>,
    industries: BTreeMap<IndustryCode, Industry>,
    /// Join relation, kept in insertion order.
    company_industries: Vec<CompanyIndustry>,
    invoices: BTreeMap<InvoiceId, Invoice>,
    last_invoice_id: i32,
}

impl Tables {
    fn company(&self, code: &CompanyCode) -> LedgerResult<&Company> {
        self.companies
            .get(code)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Company, code))
    }

    fn invoice(&self, id: InvoiceId) -> LedgerResult<&Invoice> {
        self.invoices
            .get(&id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Invoice, id))
    }
}

/// Insert keyed by the entity's own id, refusing to overwrite.
fn insert_unique<E>(table: &mut BTreeMap<E::Id, E>, entity: E) -> LedgerResult<E>
where
    E: Entity + Clone,
    E::Id: Ord + fmt::Display,
{
    if table.contains_key(entity.id()) {
        return Err(LedgerError::already_exists(E::KIND, entity.id()));
    }
    table.insert(entity.id().clone(), entity.clone());
    Ok(entity)
}

/// In-memory ledger store.
///
/// Intended for tests/dev. Each operation runs under a single lock, which makes
/// every operation (including the invoice read-then-write) atomic.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    tables: RwLock<Tables>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| LedgerError::store("in-memory ledger lock poisoned"))
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| LedgerError::store("in-memory ledger lock poisoned"))
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn list_companies(&self) -> LedgerResult<Vec<CompanySummary>> {
        let tables = self.read()?;
        Ok(tables.companies.values().map(CompanySummary::from).collect())
    }

    async fn get_company(&self, code: &CompanyCode) -> LedgerResult<Company> {
        self.read()?.company(code).cloned()
    }

    async fn create_company(&self, company: Company) -> LedgerResult<Company> {
        let mut tables = self.write()?;
        insert_unique(&mut tables.companies, company)
    }

    async fn update_company(
        &self,
        code: &CompanyCode,
        update: CompanyUpdate,
    ) -> LedgerResult<Company> {
        let mut tables = self.write()?;
        let company = tables
            .companies
            .get_mut(code)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Company, code))?;
        company.apply_update(update);
        Ok(company.clone())
    }

    async fn delete_company(&self, code: &CompanyCode) -> LedgerResult<()> {
        let mut tables = self.write()?;
        tables.company(code)?;

        if tables.invoices.values().any(|i| &i.comp_code == code) {
            return Err(LedgerError::conflict(format!(
                "company with code of {code} is still referenced by invoices"
            )));
        }

        tables.companies.remove(code);
        tables.company_industries.retain(|ci| &ci.company_code != code);
        Ok(())
    }

    async fn company_industry_rows(
        &self,
        code: &CompanyCode,
    ) -> LedgerResult<Vec<CompanyIndustryRow>> {
        let tables = self.read()?;
        let Some(company) = tables.companies.get(code) else {
            return Ok(vec![]);
        };

        let row = |industry: Option<String>| CompanyIndustryRow {
            code: company.code.clone(),
            name: company.name.clone(),
            description: company.description.clone(),
            industry,
        };

        let rows: Vec<CompanyIndustryRow> = tables
            .company_industries
            .iter()
            .filter(|ci| &ci.company_code == code)
            .map(|ci| row(tables.industries.get(&ci.industry_code).map(|i| i.industry.clone())))
            .collect();

        if rows.is_empty() {
            return Ok(vec![row(None)]);
        }
        Ok(rows)
    }

    async fn company_invoices(&self, code: &CompanyCode) -> LedgerResult<Vec<InvoiceSummary>> {
        let tables = self.read()?;
        Ok(tables
            .invoices
            .values()
            .filter(|i| &i.comp_code == code)
            .map(InvoiceSummary::from)
            .collect())
    }

    async fn list_invoices(&self) -> LedgerResult<Vec<InvoiceListing>> {
        let tables = self.read()?;
        Ok(tables
            .invoices
            .values()
            .map(|i| InvoiceListing {
                id: i.id,
                comp_code: i.comp_code.clone(),
            })
            .collect())
    }

    async fn get_invoice(&self, id: InvoiceId) -> LedgerResult<Invoice> {
        self.read()?.invoice(id).cloned()
    }

    async fn invoice_with_company(
        &self,
        id: InvoiceId,
    ) -> LedgerResult<Option<InvoiceCompanyRow>> {
        let tables = self.read()?;
        let Some(invoice) = tables.invoices.get(&id) else {
            return Ok(None);
        };
        let Some(company) = tables.companies.get(&invoice.comp_code) else {
            return Ok(None);
        };

        Ok(Some(InvoiceCompanyRow {
            id: invoice.id,
            amt: invoice.amt,
            paid: invoice.paid,
            add_date: invoice.add_date,
            paid_date: invoice.paid_date,
            comp_code: company.code.clone(),
            name: company.name.clone(),
            description: company.description.clone(),
        }))
    }

    async fn create_invoice(&self, new: NewInvoice, add_date: NaiveDate) -> LedgerResult<Invoice> {
        let mut tables = self.write()?;
        if !tables.companies.contains_key(&new.comp_code) {
            return Err(LedgerError::validation(format!(
                "comp_code {} does not reference an existing company",
                new.comp_code
            )));
        }

        tables.last_invoice_id += 1;
        let id = InvoiceId::new(tables.last_invoice_id);
        let invoice = Invoice::issue(id, new, add_date);
        tables.invoices.insert(id, invoice.clone());
        Ok(invoice)
    }

    async fn update_invoice(
        &self,
        id: InvoiceId,
        update: InvoiceUpdate,
        today: NaiveDate,
    ) -> LedgerResult<Invoice> {
        let mut tables = self.write()?;
        let invoice = tables
            .invoices
            .get_mut(&id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Invoice, id))?;
        invoice.apply_update(&update, today);
        Ok(invoice.clone())
    }

    async fn delete_invoice(&self, id: InvoiceId) -> LedgerResult<()> {
        let mut tables = self.write()?;
        tables
            .invoices
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::not_found(EntityKind::Invoice, id))
    }

    async fn list_industries(&self) -> LedgerResult<Vec<IndustrySummary>> {
        let tables = self.read()?;
        Ok(tables
            .industries
            .values()
            .map(|industry| {
                let mut companies: Vec<CompanyCode> = tables
                    .company_industries
                    .iter()
                    .filter(|ci| ci.industry_code == industry.code)
                    .map(|ci| ci.company_code.clone())
                    .collect();
                companies.sort();

                IndustrySummary {
                    code: industry.code.clone(),
                    industry: industry.industry.clone(),
                    companies,
                }
            })
            .collect())
    }

    async fn create_industry(&self, industry: Industry) -> LedgerResult<Industry> {
        let mut tables = self.write()?;
        insert_unique(&mut tables.industries, industry)
    }

    async fn associate_industry(
        &self,
        industry_code: &IndustryCode,
        company_code: &CompanyCode,
    ) -> LedgerResult<CompanyIndustry> {
        let mut tables = self.write()?;
        if !tables.industries.contains_key(industry_code) {
            return Err(LedgerError::not_found(EntityKind::Industry, industry_code));
        }
        tables.company(company_code)?;

        let link = CompanyIndustry {
            company_code: company_code.clone(),
            industry_code: industry_code.clone(),
        };
        if tables.company_industries.contains(&link) {
            return Err(LedgerError::conflict(format!(
                "company {company_code} is already filed under industry {industry_code}"
            )));
        }
        tables.company_industries.push(link.clone());
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biztime_companies::{NewCompany, NewIndustry};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    async fn seeded() -> InMemoryLedgerStore {
        let store = InMemoryLedgerStore::new();
        store
            .create_company(
                NewCompany::new("Apple Computer")
                    .with_code("apple")
                    .with_description("Maker of OSX.")
                    .into_company()
                    .unwrap(),
            )
            .await
            .unwrap();
        store
            .create_company(NewCompany::new("IBM").with_code("ibm").into_company().unwrap())
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn duplicate_company_code_conflicts() {
        let store = seeded().await;
        let dup = NewCompany::new("Another Apple").with_code("apple").into_company().unwrap();
        let err = store.create_company(dup).await.unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
    }

    #[tokio::test]
    async fn companies_list_in_code_order() {
        let store = seeded().await;
        let codes: Vec<_> = store
            .list_companies()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.code.into_inner())
            .collect();
        assert_eq!(codes, vec!["apple", "ibm"]);
    }

    #[tokio::test]
    async fn writes_to_missing_keys_fail_not_found() {
        let store = seeded().await;
        let missing = CompanyCode::new("zzz");

        let update = CompanyUpdate::new("Nope", None).unwrap();
        assert!(store.update_company(&missing, update).await.unwrap_err().is_not_found());
        assert!(store.delete_company(&missing).await.unwrap_err().is_not_found());

        let id = InvoiceId::new(99);
        let update = InvoiceUpdate::new(10.0, true).unwrap();
        assert!(store.update_invoice(id, update, today()).await.unwrap_err().is_not_found());
        assert!(store.delete_invoice(id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn invoice_ids_are_sequential_and_never_reused() {
        let store = seeded().await;
        let a = store
            .create_invoice(NewInvoice::new("apple", 100.0).unwrap(), today())
            .await
            .unwrap();
        store.delete_invoice(a.id).await.unwrap();
        let b = store
            .create_invoice(NewInvoice::new("apple", 200.0).unwrap(), today())
            .await
            .unwrap();

        assert_eq!(a.id, InvoiceId::new(1));
        assert_eq!(b.id, InvoiceId::new(2));
    }

    #[tokio::test]
    async fn invoice_for_unknown_company_is_rejected() {
        let store = seeded().await;
        let err = store
            .create_invoice(NewInvoice::new("nobody", 100.0).unwrap(), today())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[tokio::test]
    async fn company_with_invoices_cannot_be_deleted() {
        let store = seeded().await;
        let invoice = store
            .create_invoice(NewInvoice::new("ibm", 400.0).unwrap(), today())
            .await
            .unwrap();

        let ibm = CompanyCode::new("ibm");
        assert!(matches!(
            store.delete_company(&ibm).await,
            Err(LedgerError::Conflict(_))
        ));

        store.delete_invoice(invoice.id).await.unwrap();
        store.delete_company(&ibm).await.unwrap();
        assert!(store.get_company(&ibm).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn company_without_industries_yields_one_null_row() {
        let store = seeded().await;
        let rows = store
            .company_industry_rows(&CompanyCode::new("ibm"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].industry, None);

        let none = store
            .company_industry_rows(&CompanyCode::new("zzz"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn industry_rows_keep_association_order() {
        let store = seeded().await;
        for (code, label) in [("tech", "Technology"), ("acct", "Accounting")] {
            store
                .create_industry(NewIndustry::new(code, label).into_industry().unwrap())
                .await
                .unwrap();
        }
        let apple = CompanyCode::new("apple");
        store.associate_industry(&IndustryCode::new("tech"), &apple).await.unwrap();
        store.associate_industry(&IndustryCode::new("acct"), &apple).await.unwrap();

        let labels: Vec<_> = store
            .company_industry_rows(&apple)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.industry)
            .collect();
        assert_eq!(
            labels,
            vec![Some("Technology".to_string()), Some("Accounting".to_string())]
        );

        let dup = store.associate_industry(&IndustryCode::new("tech"), &apple).await;
        assert!(matches!(dup, Err(LedgerError::Conflict(_))));

        let missing = store
            .associate_industry(&IndustryCode::new("mining"), &apple)
            .await
            .unwrap_err();
        assert_eq!(
            missing,
            LedgerError::not_found(EntityKind::Industry, "mining")
        );
    }

    #[tokio::test]
    async fn industries_list_their_companies_in_code_order() {
        let store = seeded().await;
        store
            .create_industry(NewIndustry::new("tech", "Technology").into_industry().unwrap())
            .await
            .unwrap();
        store
            .associate_industry(&IndustryCode::new("tech"), &CompanyCode::new("ibm"))
            .await
            .unwrap();
        store
            .associate_industry(&IndustryCode::new("tech"), &CompanyCode::new("apple"))
            .await
            .unwrap();

        let industries = store.list_industries().await.unwrap();
        assert_eq!(industries.len(), 1);
        assert_eq!(
            industries[0].companies,
            vec![CompanyCode::new("apple"), CompanyCode::new("ibm")]
        );
    }
}
