use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use biztime_companies::{
    Company, CompanyIndustry, CompanySummary, CompanyUpdate, Industry, IndustrySummary,
};
use biztime_core::{CompanyCode, IndustryCode, InvoiceId, LedgerResult};
use biztime_invoicing::{Invoice, InvoiceListing, InvoiceSummary, InvoiceUpdate, NewInvoice};

/// One row of `companies LEFT JOIN company_industries LEFT JOIN industries`.
///
/// A company without industries yields exactly one row with `industry: None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyIndustryRow {
    pub code: CompanyCode,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
}

/// One row of `invoices INNER JOIN companies`.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceCompanyRow {
    pub id: InvoiceId,
    pub amt: f64,
    pub paid: bool,
    pub add_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub comp_code: CompanyCode,
    pub name: String,
    pub description: Option<String>,
}

/// Durable CRUD over companies, industries and invoices.
///
/// ## Key discipline
///
/// Every write addressed by key checks existence first: updating or deleting
/// a missing row fails with `LedgerError::NotFound`, it never silently no-ops.
///
/// ## Referential rules
///
/// - creating a company or industry with an existing code fails `Conflict`
/// - deleting a company that invoices still reference fails `Conflict`
/// - issuing an invoice for an unknown company fails `Validation`
/// - associating a missing company or industry fails `NotFound`
///
/// ## Payment state
///
/// `update_invoice` reads the current paid date and writes the resolved one in
/// a single isolated step, so concurrent updates cannot resolve against a
/// stale paid date.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn list_companies(&self) -> LedgerResult<Vec<CompanySummary>>;

    async fn get_company(&self, code: &CompanyCode) -> LedgerResult<Company>;

    async fn create_company(&self, company: Company) -> LedgerResult<Company>;

    async fn update_company(
        &self,
        code: &CompanyCode,
        update: CompanyUpdate,
    ) -> LedgerResult<Company>;

    async fn delete_company(&self, code: &CompanyCode) -> LedgerResult<()>;

    /// Company joined with its industry labels, in store order.
    /// Empty when the company does not exist.
    async fn company_industry_rows(
        &self,
        code: &CompanyCode,
    ) -> LedgerResult<Vec<CompanyIndustryRow>>;

    async fn company_invoices(&self, code: &CompanyCode) -> LedgerResult<Vec<InvoiceSummary>>;

    async fn list_invoices(&self) -> LedgerResult<Vec<InvoiceListing>>;

    async fn get_invoice(&self, id: InvoiceId) -> LedgerResult<Invoice>;

    async fn invoice_with_company(&self, id: InvoiceId)
    -> LedgerResult<Option<InvoiceCompanyRow>>;

    async fn create_invoice(&self, new: NewInvoice, add_date: NaiveDate) -> LedgerResult<Invoice>;

    async fn update_invoice(
        &self,
        id: InvoiceId,
        update: InvoiceUpdate,
        today: NaiveDate,
    ) -> LedgerResult<Invoice>;

    async fn delete_invoice(&self, id: InvoiceId) -> LedgerResult<()>;

    async fn list_industries(&self) -> LedgerResult<Vec<IndustrySummary>>;

    async fn create_industry(&self, industry: Industry) -> LedgerResult<Industry>;

    async fn associate_industry(
        &self,
        industry_code: &IndustryCode,
        company_code: &CompanyCode,
    ) -> LedgerResult<CompanyIndustry>;
}

#[async_trait]
impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    async fn list_companies(&self) -> LedgerResult<Vec<CompanySummary>> {
        (**self).list_companies().await
    }

    async fn get_company(&self, code: &CompanyCode) -> LedgerResult<Company> {
        (**self).get_company(code).await
    }

    async fn create_company(&self, company: Company) -> LedgerResult<Company> {
        (**self).create_company(company).await
    }

    async fn update_company(
        &self,
        code: &CompanyCode,
        update: CompanyUpdate,
    ) -> LedgerResult<Company> {
        (**self).update_company(code, update).await
    }

    async fn delete_company(&self, code: &CompanyCode) -> LedgerResult<()> {
        (**self).delete_company(code).await
    }

    async fn company_industry_rows(
        &self,
        code: &CompanyCode,
    ) -> LedgerResult<Vec<CompanyIndustryRow>> {
        (**self).company_industry_rows(code).await
    }

    async fn company_invoices(&self, code: &CompanyCode) -> LedgerResult<Vec<InvoiceSummary>> {
        (**self).company_invoices(code).await
    }

    async fn list_invoices(&self) -> LedgerResult<Vec<InvoiceListing>> {
        (**self).list_invoices().await
    }

    async fn get_invoice(&self, id: InvoiceId) -> LedgerResult<Invoice> {
        (**self).get_invoice(id).await
    }

    async fn invoice_with_company(
        &self,
        id: InvoiceId,
    ) -> LedgerResult<Option<InvoiceCompanyRow>> {
        (**self).invoice_with_company(id).await
    }

    async fn create_invoice(&self, new: NewInvoice, add_date: NaiveDate) -> LedgerResult<Invoice> {
        (**self).create_invoice(new, add_date).await
    }

    async fn update_invoice(
        &self,
        id: InvoiceId,
        update: InvoiceUpdate,
        today: NaiveDate,
    ) -> LedgerResult<Invoice> {
        (**self).update_invoice(id, update, today).await
    }

    async fn delete_invoice(&self, id: InvoiceId) -> LedgerResult<()> {
        (**self).delete_invoice(id).await
    }

    async fn list_industries(&self) -> LedgerResult<Vec<IndustrySummary>> {
        (**self).list_industries().await
    }

    async fn create_industry(&self, industry: Industry) -> LedgerResult<Industry> {
        (**self).create_industry(industry).await
    }

    async fn associate_industry(
        &self,
        industry_code: &IndustryCode,
        company_code: &CompanyCode,
    ) -> LedgerResult<CompanyIndustry> {
        (**self).associate_industry(industry_code, company_code).await
    }
}
