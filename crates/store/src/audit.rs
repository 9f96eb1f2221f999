use boleto_core::BoletoStatus;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: String,
    pub event_type: String,
    pub boleto_id: Option<String>,
    pub status: Option<BoletoStatus>,
    /// SHA-256 of the collection payload written to the slot.
    pub collection_hash: String,
    pub error: Option<String>,
}

impl AuditEvent {
    pub fn new(event_type: &str, collection_hash: String) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            event_type: event_type.to_string(),
            boleto_id: None,
            status: None,
            collection_hash,
            error: None,
        }
    }

    pub fn with_boleto(mut self, boleto_id: &str, status: BoletoStatus) -> Self {
        self.boleto_id = Some(boleto_id.to_string());
        self.status = Some(status);
        self
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }
}

/// Appends one JSON line to the audit log at `path`.
pub fn write_audit_event(path: &Path, event: &AuditEvent) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let json = serde_json::to_string(event)?;
    writeln!(file, "{}", json)?;
    tracing::debug!(event_type=%event.event_type, boleto_id=?event.boleto_id, "audit event written");
    Ok(())
}
