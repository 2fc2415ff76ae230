//! Invoice payment lifecycle.
//!
//! An invoice is either `Unpaid` (no paid date) or `Paid` since a given date.
//! The paid date is never taken from the caller: it is derived here from the
//! state *before* the update and the requested `paid` flag.

use chrono::NaiveDate;

/// Payment state of an invoice.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PaymentState {
    Unpaid,
    Paid(NaiveDate),
}

impl PaymentState {
    pub fn from_paid_date(paid_date: Option<NaiveDate>) -> Self {
        match paid_date {
            Some(date) => PaymentState::Paid(date),
            None => PaymentState::Unpaid,
        }
    }

    pub fn paid_date(self) -> Option<NaiveDate> {
        match self {
            PaymentState::Paid(date) => Some(date),
            PaymentState::Unpaid => None,
        }
    }

    /// Next state after a client asks for `requested_paid`.
    ///
    /// - `Unpaid -> Paid` stamps `today`.
    /// - `Paid -> Unpaid` clears the date.
    /// - `Paid -> Paid` keeps the original date.
    /// - `Unpaid -> Unpaid` stays unpaid.
    pub fn transition(self, requested_paid: bool, today: NaiveDate) -> Self {
        match (self, requested_paid) {
            (PaymentState::Unpaid, true) => PaymentState::Paid(today),
            (_, false) => PaymentState::Unpaid,
            (paid @ PaymentState::Paid(_), true) => paid,
        }
    }
}

/// Compute the `paid_date` an invoice must carry after an update.
///
/// `current_paid_date` must be the value stored *before* the update is applied.
pub fn resolve_paid_date(
    current_paid_date: Option<NaiveDate>,
    requested_paid: bool,
    today: NaiveDate,
) -> Option<NaiveDate> {
    PaymentState::from_paid_date(current_paid_date)
        .transition(requested_paid, today)
        .paid_date()
}
