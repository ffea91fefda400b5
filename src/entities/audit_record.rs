use super::{DocumentId, Permissions, UserId};
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuditOutcome {
    Authorised,
    Unauthorised,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Authorised => write!(f, "Authorised"),
            AuditOutcome::Unauthorised => write!(f, "Unauthorised"),
        }
    }
}

/// What was decided. Persisted through its `Display` text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AuditAction {
    Access {
        permissions: Permissions,
        outcome: AuditOutcome,
    },
    Share {
        permissions: Permissions,
        grantee: UserId,
    },
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditAction::Access {
                permissions,
                outcome,
            } => write!(f, "Access - Perm:{} - {}", permissions, outcome),
            AuditAction::Share {
                permissions,
                grantee,
            } => write!(
                f,
                "Share - Perm:{} to {} - {}",
                permissions,
                grantee,
                AuditOutcome::Authorised
            ),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuditRecord {
    pub id: i64,
    pub user_id: UserId,
    pub document_id: DocumentId,
    pub action: String,
    pub created_at: DateTime<Utc>,
}
