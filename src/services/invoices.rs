use anyhow::anyhow;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use url::Url;

use crate::config::Config;
use crate::db::{is_unique_violation, Database};
use crate::error::Error;
use crate::models::{Invoice, InvoiceNotes, InvoiceStatus};
use crate::services::lifecycle::{transition, TransitionError, TransitionEvent};
use crate::services::receipt;
use crate::utils::{format_major, now_rfc3339, to_paise};

#[derive(Debug, Default, Deserialize)]
pub struct CreateInvoiceRequest {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    /// Amount in minor units, the wire format of the admin API.
    pub amount_in_paise: Option<i64>,
    /// Human-entered decimal amount in major units; converted by
    /// round-half-away-from-zero scaling when `amount_in_paise` is absent.
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub redirect_url: Option<String>,
    pub description: Option<String>,
}

pub fn lookup(db: &Arc<Mutex<Database>>, receipt_ref: &str) -> Result<Invoice, Error> {
    let db = db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
    db.find_by_receipt(receipt_ref)?.ok_or(Error::NotFound)
}

pub fn list_all(db: &Arc<Mutex<Database>>) -> Result<Vec<Invoice>, Error> {
    let db = db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
    Ok(db.list_invoices()?)
}

/// Mock settlement: marks the invoice paid without contacting any payment
/// provider. Re-entry on an already-paid invoice returns it unchanged.
pub fn pay(db: &Arc<Mutex<Database>>, receipt_ref: &str) -> Result<Invoice, Error> {
    let db = db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
    let invoice = db.find_by_receipt(receipt_ref)?.ok_or(Error::NotFound)?;

    if invoice.status == InvoiceStatus::Paid {
        return Ok(invoice);
    }

    let next = transition(invoice.status, TransitionEvent::Pay)
        .map_err(|TransitionError::NotPayable(status)| Error::NotPayable(status))?;

    // Conditional on the observed status: of two racing payers exactly one
    // performs the write; the loser re-reads and resolves below.
    if db.update_status(&invoice.receipt, invoice.status, next)? {
        tracing::info!(receipt = %invoice.receipt, "invoice settled (mock)");
    }

    let settled = db.find_by_receipt(receipt_ref)?.ok_or(Error::NotFound)?;
    match settled.status {
        InvoiceStatus::Paid => Ok(settled),
        other => Err(Error::NotPayable(other)),
    }
}

pub fn create(
    db: &Arc<Mutex<Database>>,
    config: &Config,
    req: CreateInvoiceRequest,
) -> Result<Invoice, Error> {
    let customer_name = req
        .customer_name
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    let amount_in_paise = match (req.amount_in_paise, req.amount) {
        (Some(paise), _) => Some(paise),
        (None, Some(major)) => Some(to_paise(major)),
        (None, None) => None,
    };

    let (customer_name, amount_in_paise) = match (customer_name, amount_in_paise) {
        ("", _) | (_, None) => {
            return Err(Error::Validation(
                "Customer name and amount are required".to_string(),
            ))
        }
        (name, Some(paise)) => (name.to_string(), paise),
    };
    if amount_in_paise < 0 {
        return Err(Error::Validation("Amount must not be negative".to_string()));
    }

    let redirect_url = match req.redirect_url.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            // Same bar as the original form: must parse as an absolute URL.
            Url::parse(raw).map_err(|_| Error::Validation("Invalid redirect URL".to_string()))?;
            Some(raw.to_string())
        }
    };

    let now = now_rfc3339();
    let year = receipt::current_year();
    let db = db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;

    for attempt in 0..receipt::MAX_ALLOCATION_ATTEMPTS {
        let sequence = db.count_invoices()? + 1 + attempt as i64;
        let invoice = Invoice {
            id: uuid::Uuid::new_v4().to_string(),
            receipt: receipt::candidate(&config.receipt_prefix, year, sequence),
            customer_name: customer_name.clone(),
            customer_email: req.customer_email.clone().filter(|s| !s.is_empty()),
            customer_phone: req.customer_phone.clone().filter(|s| !s.is_empty()),
            amount_in_paise,
            currency: req
                .currency
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| config.default_currency.clone()),
            provider: "mock".to_string(),
            provider_invoice_id: None,
            provider_short_url: None,
            status: InvoiceStatus::Draft,
            notes: Some(InvoiceNotes {
                redirect_url: redirect_url.clone(),
                description: req.description.clone().filter(|s| !s.is_empty()),
            }),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        match db.insert_invoice(&invoice) {
            Ok(()) => {
                tracing::info!(
                    receipt = %invoice.receipt,
                    amount = %format_major(invoice.amount_in_paise),
                    currency = %invoice.currency,
                    "invoice created"
                );
                return Ok(invoice);
            }
            Err(err) if is_unique_violation(&err) => {
                tracing::warn!(
                    receipt = %invoice.receipt,
                    attempt,
                    "receipt collision, reallocating"
                );
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(Error::Conflict(
        "Failed to allocate a receipt number".to_string(),
    ))
}

const SEED_NAMES: [&str; 5] = [
    "Acme Corp",
    "TechStart Inc",
    "Global Solutions Ltd",
    "InnovateLabs",
    "CloudVision Co",
];
const SEED_EMAILS: [&str; 5] = [
    "finance@acmecorp.com",
    "billing@techstart.io",
    "accounts@globalsolutions.com",
    "payments@innovatelabs.net",
    "billing@cloudvision.co",
];
const SEED_DESCRIPTIONS: [&str; 5] = [
    "Web Development Services - Q4 2024",
    "Mobile App Development - Phase 1",
    "API Integration Services",
    "Cloud Infrastructure Setup",
    "Payment Gateway Integration",
];

/// Inserts demo invoices through the regular create flow, settling every
/// third one so the admin list shows both draft and paid badges.
pub fn seed(db: &Arc<Mutex<Database>>, config: &Config, count: usize) -> Result<usize, Error> {
    for i in 0..count {
        let request = CreateInvoiceRequest {
            customer_name: Some(SEED_NAMES[i % SEED_NAMES.len()].to_string()),
            customer_email: Some(SEED_EMAILS[i % SEED_EMAILS.len()].to_string()),
            customer_phone: None,
            amount_in_paise: Some(10_000 + ((i as i64 * 7_919) % 490_000)),
            amount: None,
            currency: None,
            redirect_url: None,
            description: Some(SEED_DESCRIPTIONS[i % SEED_DESCRIPTIONS.len()].to_string()),
        };
        let invoice = create(db, config, request)?;
        if i % 3 == 2 {
            pay(db, &invoice.receipt)?;
        }
    }
    Ok(count)
}
