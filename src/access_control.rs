//! Permission checks and the audit trail.
//!
//! Every decision taken here, granted or denied, is written to the audit log
//! before the caller sees the result. A decision whose audit record could not
//! be written is reported as an error, never as a grant.

use chrono::Utc;
use sqlx::PgPool;

use crate::commands::{audit_log_command, permissions_command};
use crate::entities::{AuditAction, AuditOutcome, Document, DocumentId, Permissions, UserId};
use crate::error::{Error, Result};
use crate::queries::permission_query;

#[derive(Debug, Clone)]
pub struct AccessControl {
    pool: PgPool,
}

impl AccessControl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Succeeds when `actor` owns `document` or holds every capability in
    /// `required`.
    pub async fn authorize(
        &self,
        actor: &UserId,
        document: &Document,
        required: Permissions,
    ) -> Result<()> {
        let outcome = if document.is_owned_by(actor) {
            AuditOutcome::Authorised
        } else {
            let held = permission_query::get_permissions(&self.pool, document.id, actor).await?;
            if held.contains(required) {
                AuditOutcome::Authorised
            } else {
                AuditOutcome::Unauthorised
            }
        };

        let action = AuditAction::Access {
            permissions: required,
            outcome,
        };
        audit_log_command::append(&self.pool, Utc::now(), actor, document.id, &action).await?;

        match outcome {
            AuditOutcome::Authorised => Ok(()),
            AuditOutcome::Unauthorised => {
                log::warn!(
                    "denied {} to {} on document {}",
                    required,
                    actor,
                    document.id
                );
                Err(Error::Denied {
                    actor: actor.clone(),
                    document: document.id,
                    required,
                })
            }
        }
    }

    /// Grants `permissions` on `document` to `grantee`. The actor must hold
    /// SHARE together with everything being granted. Returns the grantee's
    /// resulting permissions.
    pub async fn share(
        &self,
        actor: &UserId,
        document: &Document,
        grantee: &UserId,
        permissions: Permissions,
    ) -> Result<Permissions> {
        if permissions.is_empty() {
            return Err(Error::InvalidPermissions(
                "at least one permission must be granted".to_string(),
            ));
        }

        self.authorize(actor, document, permissions | Permissions::SHARE)
            .await?;

        if document.is_owned_by(grantee) {
            return Err(Error::InvalidTarget(format!(
                "{} owns document {}",
                grantee, document.id
            )));
        }

        let now = Utc::now();
        let mut trx = self.pool.begin().await?;
        let granted =
            permissions_command::grant(&mut *trx, now, document.id, grantee, permissions).await?;
        let action = AuditAction::Share {
            permissions,
            grantee: grantee.clone(),
        };
        audit_log_command::append(&mut *trx, now, actor, document.id, &action).await?;
        trx.commit().await?;

        log::info!(
            "{} shared document {} with {}: {}",
            actor,
            document.id,
            grantee,
            granted
        );
        Ok(granted)
    }

    /// Documents on which `actor` holds a grant. Listing one's own grants is
    /// not itself an access decision and is not audited.
    pub async fn shared_document_ids(&self, actor: &UserId) -> Result<Vec<DocumentId>> {
        permission_query::list_shared_document_ids(&self.pool, actor).await
    }
}
