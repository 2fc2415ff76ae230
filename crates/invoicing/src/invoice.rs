use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use biztime_core::{CompanyCode, Entity, EntityKind, InvoiceId, LedgerError, LedgerResult};

use crate::payment::PaymentState;

/// An invoice as stored.
///
/// Invariant: `paid_date.is_some() == paid` once any update has completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub comp_code: CompanyCode,
    pub amt: f64,
    pub paid: bool,
    pub add_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
}

impl Entity for Invoice {
    type Id = InvoiceId;

    const KIND: EntityKind = EntityKind::Invoice;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Invoice {
    /// A freshly issued invoice: unpaid, dated `add_date`.
    pub fn issue(id: InvoiceId, new: NewInvoice, add_date: NaiveDate) -> Self {
        Self {
            id,
            comp_code: new.comp_code,
            amt: new.amt,
            paid: false,
            add_date,
            paid_date: None,
        }
    }

    pub fn payment_state(&self) -> PaymentState {
        PaymentState::from_paid_date(self.paid_date)
    }

    /// Apply a full update. The paid date is resolved from the state held
    /// before this call; `today` is only used on the unpaid -> paid edge.
    pub fn apply_update(&mut self, update: &InvoiceUpdate, today: NaiveDate) {
        let next = self.payment_state().transition(update.paid, today);
        self.paid_date = next.paid_date();
        self.paid = update.paid;
        self.amt = update.amt;
    }
}

/// Row of the invoice listing: `{id, comp_code}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceListing {
    pub id: InvoiceId,
    pub comp_code: CompanyCode,
}

/// Invoice row nested under a company: `{id, amt, paid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub id: InvoiceId,
    pub amt: f64,
    pub paid: bool,
}

impl From<&Invoice> for InvoiceSummary {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: invoice.id,
            amt: invoice.amt,
            paid: invoice.paid,
        }
    }
}

/// Validated input for issuing an invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub comp_code: CompanyCode,
    pub amt: f64,
}

impl NewInvoice {
    pub fn new(comp_code: &str, amt: f64) -> LedgerResult<Self> {
        Ok(Self {
            comp_code: CompanyCode::parse(comp_code)?,
            amt: checked_amount(amt)?,
        })
    }

    /// Build from possibly-missing request fields.
    pub fn from_parts(comp_code: Option<&str>, amt: Option<f64>) -> LedgerResult<Self> {
        let comp_code = comp_code.ok_or_else(|| LedgerError::validation("comp_code is required"))?;
        let amt = amt.ok_or_else(|| LedgerError::validation("amt is required"))?;
        Self::new(comp_code, amt)
    }
}

/// Full replacement of an invoice's mutable attributes.
///
/// `paid_date` is not settable; it is derived from `paid`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InvoiceUpdate {
    pub amt: f64,
    pub paid: bool,
}

impl InvoiceUpdate {
    pub fn new(amt: f64, paid: bool) -> LedgerResult<Self> {
        Ok(Self {
            amt: checked_amount(amt)?,
            paid,
        })
    }
}

fn checked_amount(amt: f64) -> LedgerResult<f64> {
    if !amt.is_finite() || amt <= 0.0 {
        return Err(LedgerError::validation(format!(
            "amt must be a positive number, got {amt}"
        )));
    }
    Ok(amt)
}
