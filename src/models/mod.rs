use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    Paid,
    Expired,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Issued => "issued",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Expired => "expired",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "issued" => InvoiceStatus::Issued,
            "paid" => InvoiceStatus::Paid,
            "expired" => InvoiceStatus::Expired,
            "cancelled" => InvoiceStatus::Cancelled,
            _ => InvoiceStatus::Draft,
        }
    }

    /// An invoice accepts payment only while it is still a draft.
    pub fn is_payable(&self) -> bool {
        matches!(self, InvoiceStatus::Draft)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only keys of the notes payload that any flow reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceNotes {
    pub redirect_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub receipt: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub amount_in_paise: i64,
    pub currency: String,
    pub provider: String,
    pub provider_invoice_id: Option<String>,
    pub provider_short_url: Option<String>,
    pub status: InvoiceStatus,
    pub notes: Option<InvoiceNotes>,
    pub created_at: String,
    pub updated_at: String,
}
