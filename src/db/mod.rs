use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult, Row};
use std::path::PathBuf;

use crate::models::{Invoice, InvoiceStatus};
use crate::utils::now_rfc3339;

const INVOICE_COLUMNS: &str = "id, receipt, customer_name, customer_email, customer_phone,
        amount_in_paise, currency, provider, provider_invoice_id, provider_short_url,
        status, notes, created_at, updated_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(db_path: PathBuf) -> SqlResult<Self> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> SqlResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> SqlResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut db = Database { conn };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&mut self) -> SqlResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL
            );",
        )?;

        let migrations = vec![(
            "001_create_invoices.sql",
            include_str!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/migrations/001_create_invoices.sql"
            )),
        )];

        for (name, sql) in migrations {
            let applied: Option<String> = self
                .conn
                .query_row(
                    "SELECT name FROM schema_migrations WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;

            if applied.is_none() {
                let tx = self.conn.transaction()?;
                tx.execute_batch(sql)?;
                tx.execute(
                    "INSERT INTO schema_migrations (name, applied_at) VALUES (?1, datetime('now'))",
                    params![name],
                )?;
                tx.commit()?;
            }
        }

        Ok(())
    }

    /// Plain INSERT so the unique index on `receipt` rejects a second
    /// allocation of the same number.
    pub fn insert_invoice(&self, invoice: &Invoice) -> SqlResult<()> {
        let notes = invoice
            .notes
            .as_ref()
            .map(|n| serde_json::to_string(n).unwrap_or_default());
        self.conn.execute(
            "INSERT INTO invoices (
                id, receipt, customer_name, customer_email, customer_phone,
                amount_in_paise, currency, provider, provider_invoice_id, provider_short_url,
                status, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                invoice.id,
                invoice.receipt,
                invoice.customer_name,
                invoice.customer_email,
                invoice.customer_phone,
                invoice.amount_in_paise,
                invoice.currency,
                invoice.provider,
                invoice.provider_invoice_id,
                invoice.provider_short_url,
                invoice.status.as_str(),
                notes,
                invoice.created_at,
                invoice.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn find_by_receipt(&self, receipt: &str) -> SqlResult<Option<Invoice>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE receipt = ?1"
        ))?;
        stmt.query_row(params![receipt], map_invoice).optional()
    }

    pub fn list_invoices(&self) -> SqlResult<Vec<Invoice>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map([], map_invoice)?;
        rows.collect()
    }

    pub fn count_invoices(&self) -> SqlResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM invoices", [], |row| row.get(0))
    }

    /// Conditional single-statement transition. Returns false when no row
    /// matched `receipt` in the `from` status, so a racing caller can
    /// re-read and resolve idempotently.
    pub fn update_status(
        &self,
        receipt: &str,
        from: InvoiceStatus,
        to: InvoiceStatus,
    ) -> SqlResult<bool> {
        let changed = self.conn.execute(
            "UPDATE invoices SET status = ?3, updated_at = ?4
             WHERE receipt = ?1 AND status = ?2",
            params![receipt, from.as_str(), to.as_str(), now_rfc3339()],
        )?;
        Ok(changed > 0)
    }
}

fn map_invoice(row: &Row<'_>) -> SqlResult<Invoice> {
    let status: String = row.get(10)?;
    let notes: Option<String> = row.get(11)?;
    Ok(Invoice {
        id: row.get(0)?,
        receipt: row.get(1)?,
        customer_name: row.get(2)?,
        customer_email: row.get(3)?,
        customer_phone: row.get(4)?,
        amount_in_paise: row.get(5)?,
        currency: row.get(6)?,
        provider: row.get(7)?,
        provider_invoice_id: row.get(8)?,
        provider_short_url: row.get(9)?,
        status: InvoiceStatus::from_str(&status),
        notes: notes.and_then(|raw| serde_json::from_str(&raw).ok()),
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvoiceNotes;

    fn sample(receipt: &str, created_at: &str) -> Invoice {
        Invoice {
            id: uuid::Uuid::new_v4().to_string(),
            receipt: receipt.to_string(),
            customer_name: "Acme Corp".to_string(),
            customer_email: Some("finance@acmecorp.com".to_string()),
            customer_phone: None,
            amount_in_paise: 10000,
            currency: "INR".to_string(),
            provider: "mock".to_string(),
            provider_invoice_id: None,
            provider_short_url: None,
            status: InvoiceStatus::Draft,
            notes: Some(InvoiceNotes {
                redirect_url: None,
                description: Some("Web Development Services".to_string()),
            }),
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    #[test]
    fn inserts_and_reads_back_by_receipt() {
        let db = Database::open_in_memory().unwrap();
        db.insert_invoice(&sample("LW-2025-0001", "2025-01-01T00:00:00+00:00"))
            .unwrap();

        let found = db.find_by_receipt("LW-2025-0001").unwrap().unwrap();
        assert_eq!(found.customer_name, "Acme Corp");
        assert_eq!(found.amount_in_paise, 10000);
        assert_eq!(found.status, InvoiceStatus::Draft);
        assert_eq!(
            found.notes.unwrap().description.as_deref(),
            Some("Web Development Services")
        );
    }

    #[test]
    fn lookup_requires_exact_receipt_match() {
        let db = Database::open_in_memory().unwrap();
        db.insert_invoice(&sample("LW-2025-0001", "2025-01-01T00:00:00+00:00"))
            .unwrap();

        assert!(db.find_by_receipt("LW-2025-000").unwrap().is_none());
        assert!(db.find_by_receipt("LW-2025-00011").unwrap().is_none());
        assert!(db.find_by_receipt("lw-2025-0001").unwrap().is_none());
    }

    #[test]
    fn lists_most_recent_first() {
        let db = Database::open_in_memory().unwrap();
        db.insert_invoice(&sample("LW-2025-0001", "2025-01-01T00:00:00+00:00"))
            .unwrap();
        db.insert_invoice(&sample("LW-2025-0002", "2025-03-01T00:00:00+00:00"))
            .unwrap();
        db.insert_invoice(&sample("LW-2025-0003", "2025-02-01T00:00:00+00:00"))
            .unwrap();

        let receipts: Vec<String> = db
            .list_invoices()
            .unwrap()
            .into_iter()
            .map(|i| i.receipt)
            .collect();
        assert_eq!(receipts, ["LW-2025-0002", "LW-2025-0003", "LW-2025-0001"]);
    }

    #[test]
    fn duplicate_receipt_is_a_unique_violation() {
        let db = Database::open_in_memory().unwrap();
        db.insert_invoice(&sample("LW-2025-0001", "2025-01-01T00:00:00+00:00"))
            .unwrap();

        let err = db
            .insert_invoice(&sample("LW-2025-0001", "2025-01-02T00:00:00+00:00"))
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn update_status_is_conditional_on_the_from_state() {
        let db = Database::open_in_memory().unwrap();
        db.insert_invoice(&sample("LW-2025-0001", "2025-01-01T00:00:00+00:00"))
            .unwrap();

        assert!(db
            .update_status("LW-2025-0001", InvoiceStatus::Draft, InvoiceStatus::Paid)
            .unwrap());
        // Second attempt loses: the row is no longer a draft.
        assert!(!db
            .update_status("LW-2025-0001", InvoiceStatus::Draft, InvoiceStatus::Paid)
            .unwrap());

        let invoice = db.find_by_receipt("LW-2025-0001").unwrap().unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_ne!(invoice.updated_at, invoice.created_at);
    }
}
