use crate::models::InvoiceStatus;

/// Events that can move an invoice between statuses. `issued`, `expired`
/// and `cancelled` exist in the status taxonomy but nothing produces them
/// yet; they get an event here when the business rules for them land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    Pay,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invoice is not payable in status {0}")]
    NotPayable(InvoiceStatus),
}

/// The single choke point for status changes. Every mutating call site goes
/// through here so the legal-transition set lives in one place.
pub fn transition(
    current: InvoiceStatus,
    event: TransitionEvent,
) -> Result<InvoiceStatus, TransitionError> {
    match event {
        TransitionEvent::Pay => {
            // Re-paying a settled invoice is a no-op, not an error: the
            // public payment UI retries, and a retry must never corrupt
            // state.
            if current == InvoiceStatus::Paid || current.is_payable() {
                Ok(InvoiceStatus::Paid)
            } else {
                Err(TransitionError::NotPayable(current))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_pays_into_paid() {
        assert_eq!(
            transition(InvoiceStatus::Draft, TransitionEvent::Pay),
            Ok(InvoiceStatus::Paid)
        );
    }

    #[test]
    fn paying_a_paid_invoice_is_idempotent() {
        assert_eq!(
            transition(InvoiceStatus::Paid, TransitionEvent::Pay),
            Ok(InvoiceStatus::Paid)
        );
    }

    #[test]
    fn every_other_status_rejects_payment() {
        for status in [
            InvoiceStatus::Issued,
            InvoiceStatus::Expired,
            InvoiceStatus::Cancelled,
        ] {
            assert_eq!(
                transition(status, TransitionEvent::Pay),
                Err(TransitionError::NotPayable(status))
            );
        }
    }
}
