//! Ledger facade (application-level orchestration).
//!
//! The HTTP layer talks to a `Ledger` and nothing else. Each operation is one
//! store call, optionally followed by view assembly:
//!
//! ```text
//! handler
//!   ↓
//! Ledger operation ── validates input, supplies today's date
//!   ↓
//! LedgerStore operation
//!   ↓
//! views::assemble_* (detail reads only)
//! ```
//!
//! The store is injected; there is no process-wide handle. The current date
//! comes from a [`Clock`] so payment-date behaviour can be pinned in tests.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use biztime_companies::{
    Company, CompanyIndustry, CompanySummary, CompanyUpdate, Industry, IndustrySummary,
    NewCompany, NewIndustry,
};
use biztime_core::{
    CompanyCode, EntityKind, IndustryCode, InvoiceId, LedgerError, LedgerResult,
};
use biztime_invoicing::{Invoice, InvoiceListing, InvoiceUpdate, NewInvoice};

use crate::store::LedgerStore;
use crate::views::{CompanyDetail, InvoiceDetail, assemble_company};

/// Source of "today" for invoice issue and payment dates.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

fn system_clock() -> Clock {
    Arc::new(|| Utc::now().date_naive())
}

pub struct Ledger<S> {
    store: S,
    clock: Clock,
}

impl<S: fmt::Debug> fmt::Debug for Ledger<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger").field("store", &self.store).finish_non_exhaustive()
    }
}

impl<S> Ledger<S>
where
    S: LedgerStore,
{
    pub fn new(store: S) -> Self {
        Self::with_clock(store, system_clock())
    }

    pub fn with_clock(store: S, clock: Clock) -> Self {
        Self { store, clock }
    }

    fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    // Companies

    pub async fn list_companies(&self) -> LedgerResult<Vec<CompanySummary>> {
        self.store.list_companies().await
    }

    pub async fn company(&self, code: &CompanyCode) -> LedgerResult<Company> {
        self.store.get_company(code).await
    }

    /// Company with industry labels and invoice summaries.
    pub async fn company_detail(&self, code: &CompanyCode) -> LedgerResult<CompanyDetail> {
        let rows = self.store.company_industry_rows(code).await?;
        if rows.is_empty() {
            return Err(LedgerError::not_found(EntityKind::Company, code));
        }
        let invoices = self.store.company_invoices(code).await?;

        assemble_company(rows, invoices)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Company, code))
    }

    pub async fn create_company(&self, new: NewCompany) -> LedgerResult<Company> {
        let company = new.into_company()?;
        let created = self.store.create_company(company).await?;
        info!(code = %created.code, "company created");
        Ok(created)
    }

    pub async fn update_company(
        &self,
        code: &CompanyCode,
        update: CompanyUpdate,
    ) -> LedgerResult<Company> {
        let updated = self.store.update_company(code, update).await?;
        info!(code = %updated.code, "company updated");
        Ok(updated)
    }

    pub async fn delete_company(&self, code: &CompanyCode) -> LedgerResult<()> {
        self.store.delete_company(code).await?;
        info!(code = %code, "company deleted");
        Ok(())
    }

    // Invoices

    pub async fn list_invoices(&self) -> LedgerResult<Vec<InvoiceListing>> {
        self.store.list_invoices().await
    }

    pub async fn invoice(&self, id: InvoiceId) -> LedgerResult<Invoice> {
        self.store.get_invoice(id).await
    }

    /// Invoice with its owning company nested.
    pub async fn invoice_detail(&self, id: InvoiceId) -> LedgerResult<InvoiceDetail> {
        self.store
            .invoice_with_company(id)
            .await?
            .map(InvoiceDetail::from)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Invoice, id))
    }

    pub async fn create_invoice(&self, new: NewInvoice) -> LedgerResult<Invoice> {
        let invoice = self.store.create_invoice(new, self.today()).await?;
        info!(id = %invoice.id, comp_code = %invoice.comp_code, amt = invoice.amt, "invoice issued");
        Ok(invoice)
    }

    /// Replace amount and paid flag. The paid date is resolved by the store
    /// against the row it locks.
    pub async fn update_invoice(
        &self,
        id: InvoiceId,
        update: InvoiceUpdate,
    ) -> LedgerResult<Invoice> {
        let invoice = self.store.update_invoice(id, update, self.today()).await?;
        info!(
            id = %invoice.id,
            paid = invoice.paid,
            paid_date = ?invoice.paid_date,
            "invoice updated"
        );
        Ok(invoice)
    }

    pub async fn delete_invoice(&self, id: InvoiceId) -> LedgerResult<()> {
        self.store.delete_invoice(id).await?;
        info!(id = %id, "invoice deleted");
        Ok(())
    }

    // Industries

    pub async fn list_industries(&self) -> LedgerResult<Vec<IndustrySummary>> {
        self.store.list_industries().await
    }

    pub async fn create_industry(&self, new: NewIndustry) -> LedgerResult<Industry> {
        let industry = new.into_industry()?;
        let created = self.store.create_industry(industry).await?;
        info!(code = %created.code, "industry created");
        Ok(created)
    }

    pub async fn associate_industry(
        &self,
        industry_code: &IndustryCode,
        company_code: &CompanyCode,
    ) -> LedgerResult<CompanyIndustry> {
        let association = self
            .store
            .associate_industry(industry_code, company_code)
            .await?;
        info!(industry = %industry_code, company = %company_code, "company filed under industry");
        Ok(association)
    }
}
