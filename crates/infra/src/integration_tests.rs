//! End-to-end ledger flows over the in-memory store.
//!
//! Verifies:
//! - company codes are derived from names and collisions are rejected
//! - detail views nest invoices, industries and companies correctly
//! - the paid date follows the paid flag across a full lifecycle

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;

    use biztime_companies::{CompanyUpdate, NewCompany, NewIndustry};
    use biztime_core::{CompanyCode, IndustryCode, InvoiceId, LedgerError};
    use biztime_invoicing::{InvoiceUpdate, NewInvoice};

    use crate::ledger::{Clock, Ledger};
    use crate::store::InMemoryLedgerStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A clock the test can move forward.
    fn manual_clock(start: NaiveDate) -> (Clock, Arc<Mutex<NaiveDate>>) {
        let now = Arc::new(Mutex::new(start));
        let handle = now.clone();
        let clock: Clock = Arc::new(move || *handle.lock().unwrap());
        (clock, now)
    }

    fn ledger() -> Ledger<InMemoryLedgerStore> {
        Ledger::new(InMemoryLedgerStore::new())
    }

    async fn seed_apple(ledger: &Ledger<InMemoryLedgerStore>) -> CompanyCode {
        ledger
            .create_company(NewCompany::new("Apple Inc.").with_description("Maker of OSX."))
            .await
            .unwrap()
            .code
    }

    #[tokio::test]
    async fn company_code_is_derived_from_name() {
        let ledger = ledger();
        let code = seed_apple(&ledger).await;
        assert_eq!(code.as_str(), "apple-inc");

        let listed = ledger.list_companies().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Apple Inc.");
    }

    #[tokio::test]
    async fn duplicate_company_code_conflicts() {
        let ledger = ledger();
        seed_apple(&ledger).await;

        let err = ledger
            .create_company(NewCompany::new("Apple, Inc!"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn unknown_company_is_not_found() {
        let ledger = ledger();
        let err = ledger
            .company_detail(&CompanyCode::new("zzz"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "can't find company with code of zzz");
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_the_store() {
        let ledger = ledger();
        let err = ledger
            .create_company(NewCompany::new("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(ledger.list_companies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn company_detail_nests_industries_and_invoices() {
        let ledger = ledger();
        let code = seed_apple(&ledger).await;

        let detail = ledger.company_detail(&code).await.unwrap();
        assert!(detail.industries.is_empty());
        assert!(detail.invoices.is_empty());

        ledger
            .create_industry(NewIndustry::new("tech", "Technology"))
            .await
            .unwrap();
        ledger
            .associate_industry(&IndustryCode::new("tech"), &code)
            .await
            .unwrap();
        let invoice = ledger
            .create_invoice(NewInvoice::new(code.as_str(), 250.0).unwrap())
            .await
            .unwrap();

        let detail = ledger.company_detail(&code).await.unwrap();
        assert_eq!(detail.industries, vec!["Technology"]);
        assert_eq!(detail.invoices.len(), 1);
        assert_eq!(detail.invoices[0].id, invoice.id);
        assert_eq!(detail.invoices[0].amt, 250.0);
        assert!(!detail.invoices[0].paid);

        let industries = ledger.list_industries().await.unwrap();
        assert_eq!(industries[0].companies, vec![code]);
    }

    #[tokio::test]
    async fn invoice_detail_round_trips_the_company() {
        let ledger = ledger();
        let code = seed_apple(&ledger).await;
        let company = ledger.company(&code).await.unwrap();

        let invoice = ledger
            .create_invoice(NewInvoice::new(code.as_str(), 100.0).unwrap())
            .await
            .unwrap();

        let detail = ledger.invoice_detail(invoice.id).await.unwrap();
        assert_eq!(detail.id, invoice.id);
        assert_eq!(detail.company, company);
    }

    #[tokio::test]
    async fn deleted_invoice_is_gone() {
        let ledger = ledger();
        let code = seed_apple(&ledger).await;

        let missing = ledger.delete_invoice(InvoiceId::new(999)).await.unwrap_err();
        assert!(missing.is_not_found());

        let invoice = ledger
            .create_invoice(NewInvoice::new(code.as_str(), 100.0).unwrap())
            .await
            .unwrap();
        ledger.delete_invoice(invoice.id).await.unwrap();

        let err = ledger.invoice_detail(invoice.id).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            format!("can't find invoice with id of {}", invoice.id)
        );
    }

    #[tokio::test]
    async fn company_with_invoices_cannot_be_deleted() {
        let ledger = ledger();
        let code = seed_apple(&ledger).await;
        let invoice = ledger
            .create_invoice(NewInvoice::new(code.as_str(), 100.0).unwrap())
            .await
            .unwrap();

        let err = ledger.delete_company(&code).await.unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));

        ledger.delete_invoice(invoice.id).await.unwrap();
        ledger.delete_company(&code).await.unwrap();
        assert!(ledger.company(&code).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn invoice_for_unknown_company_is_invalid() {
        let ledger = ledger();
        let err = ledger
            .create_invoice(NewInvoice::new("nope", 10.0).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[tokio::test]
    async fn update_company_keeps_code() {
        let ledger = ledger();
        let code = seed_apple(&ledger).await;

        let updated = ledger
            .update_company(&code, CompanyUpdate::new("Apple", None).unwrap())
            .await
            .unwrap();
        assert_eq!(updated.code, code);
        assert_eq!(updated.name, "Apple");
        assert_eq!(updated.description, None);

        let err = ledger
            .update_company(
                &CompanyCode::new("zzz"),
                CompanyUpdate::new("Nobody", None).unwrap(),
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn paid_date_follows_the_paid_flag() {
        let (clock, now) = manual_clock(date(2024, 1, 10));
        let ledger = Ledger::with_clock(InMemoryLedgerStore::new(), clock);
        let code = seed_apple(&ledger).await;

        let invoice = ledger
            .create_invoice(NewInvoice::new(code.as_str(), 100.0).unwrap())
            .await
            .unwrap();
        assert_eq!(invoice.add_date, date(2024, 1, 10));
        assert_eq!(invoice.paid_date, None);

        *now.lock().unwrap() = date(2024, 2, 1);
        let paid = ledger
            .update_invoice(invoice.id, InvoiceUpdate::new(120.0, true).unwrap())
            .await
            .unwrap();
        assert!(paid.paid);
        assert_eq!(paid.paid_date, Some(date(2024, 2, 1)));
        assert_eq!(paid.amt, 120.0);

        // Re-paying later keeps the original payment date.
        *now.lock().unwrap() = date(2024, 3, 1);
        let repaid = ledger
            .update_invoice(invoice.id, InvoiceUpdate::new(120.0, true).unwrap())
            .await
            .unwrap();
        assert_eq!(repaid.paid_date, Some(date(2024, 2, 1)));

        let unpaid = ledger
            .update_invoice(invoice.id, InvoiceUpdate::new(120.0, false).unwrap())
            .await
            .unwrap();
        assert!(!unpaid.paid);
        assert_eq!(unpaid.paid_date, None);
        assert_eq!(unpaid.add_date, date(2024, 1, 10));

        let stored = ledger.invoice(invoice.id).await.unwrap();
        assert_eq!(stored, unpaid);
    }

    #[tokio::test]
    async fn updating_missing_invoice_is_not_found() {
        let ledger = ledger();
        let err = ledger
            .update_invoice(InvoiceId::new(42), InvoiceUpdate::new(1.0, true).unwrap())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn association_requires_both_sides_and_is_unique() {
        let ledger = ledger();
        let code = seed_apple(&ledger).await;
        let tech = IndustryCode::new("tech");

        let err = ledger.associate_industry(&tech, &code).await.unwrap_err();
        assert!(err.is_not_found());

        ledger
            .create_industry(NewIndustry::new("tech", "Technology"))
            .await
            .unwrap();
        let err = ledger
            .associate_industry(&tech, &CompanyCode::new("zzz"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let association = ledger.associate_industry(&tech, &code).await.unwrap();
        assert_eq!(association.company_code, code);

        let err = ledger.associate_industry(&tech, &code).await.unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
    }
}
