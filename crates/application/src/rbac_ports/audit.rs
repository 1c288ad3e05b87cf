use agrinova_core::UserId;
use agrinova_domain::AuditAction;

/// Audit event appended after each administrative mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Administrator performing the mutation.
    pub actor: UserId,
    /// Stable action identifier.
    pub action: AuditAction,
    /// Resource type touched by the mutation.
    pub resource_type: String,
    /// Resource identifier touched by the mutation.
    pub resource_id: String,
    /// Optional human-readable detail.
    pub detail: Option<String>,
}
