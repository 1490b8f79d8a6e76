//! Audit-trail correlator
//!
//! Attributes a structural change to the member who performed it by reading
//! the single most recent matching audit-log entry. Recency filtering is
//! deliberately not done here — that is the dedup guard's job. When the
//! audit log is unreadable the correlator returns unknown and the engines
//! must not punish anyone: fail-open on attribution, fail-closed on
//! punishment.

use tracing::instrument;

use warden_core::traits::AuditAction;
use warden_core::value_objects::Snowflake;

use super::context::EngineContext;

/// Audit-trail correlator
pub struct AuditCorrelator<'a> {
    ctx: &'a EngineContext,
}

impl<'a> AuditCorrelator<'a> {
    /// Create a new AuditCorrelator
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Resolve the actor behind a structural change, or `None` when the
    /// audit log disagrees on the target or is inaccessible
    #[instrument(skip(self))]
    pub async fn attribute(
        &self,
        guild_id: Snowflake,
        action: AuditAction,
        target_id: Snowflake,
    ) -> Option<Snowflake> {
        match self
            .ctx
            .platform()
            .recent_audit_entries(guild_id, action, 1)
            .await
        {
            Ok(entries) => {
                let actor = entries
                    .first()
                    .filter(|entry| entry.target_id == Some(target_id))
                    .map(|entry| entry.actor_id);

                if actor.is_none() {
                    tracing::debug!(
                        guild_id = %guild_id,
                        action = %action,
                        target_id = %target_id,
                        "No matching audit entry, attribution unknown"
                    );
                }

                actor
            }
            Err(e) => {
                tracing::warn!(
                    guild_id = %guild_id,
                    action = %action,
                    error = %e,
                    "Audit log inaccessible, attribution unknown"
                );
                None
            }
        }
    }
}
