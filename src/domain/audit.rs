//! Append-only audit log entries for administrative mutations.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditLogRecord {
    pub id: Uuid,
    pub actor: String,
    /// Dotted action name, e.g. `content.create`.
    pub action: String,
    pub topic: Option<String>,
    pub payload_text: Option<String>,
    pub created_at: OffsetDateTime,
}
