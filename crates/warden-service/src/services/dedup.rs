//! Self-action dedup guard
//!
//! The engine's own punishments (and manual moderator actions) still emit
//! the platform's generic "member banned/unbanned" notification that the
//! detectors listen to. A notification matching a recent ledger entry for
//! the same (target, action) pair is a duplicate and must be suppressed.
//! The case write and the notification race, so the lookup retries a few
//! times with a short delay before concluding "not a duplicate".

use std::time::Duration;

use tracing::instrument;

use warden_core::entities::CaseAction;
use warden_core::value_objects::Snowflake;

use super::context::EngineContext;

/// How far back a ledger entry still counts as the same occurrence
pub const DEDUP_WINDOW_SECS: i64 = 15;
/// Lookup attempts before concluding "not a duplicate"
const DEDUP_RETRIES: u32 = 3;
/// Delay between lookup attempts
const DEDUP_RETRY_DELAY: Duration = Duration::from_millis(400);

/// Self-action dedup guard
pub struct DedupGuard<'a> {
    ctx: &'a EngineContext,
}

impl<'a> DedupGuard<'a> {
    /// Create a new DedupGuard
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Whether a platform notification duplicates a recent ledger entry
    #[instrument(skip(self))]
    pub async fn is_duplicate_of_recent_case(
        &self,
        guild_id: Snowflake,
        target_id: Snowflake,
        action: CaseAction,
    ) -> bool {
        for attempt in 0..DEDUP_RETRIES {
            match self
                .ctx
                .case_repo()
                .find_latest(guild_id, target_id, action)
                .await
            {
                Ok(Some(case)) => {
                    let age = self.ctx.clock().now() - case.created_at;
                    if age.num_seconds() <= DEDUP_WINDOW_SECS && age.num_seconds() >= 0 {
                        tracing::debug!(
                            guild_id = %guild_id,
                            target_id = %target_id,
                            action = %action,
                            case_id = case.case_id,
                            "Notification duplicates recent case, suppressing"
                        );
                        return true;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        guild_id = %guild_id,
                        target_id = %target_id,
                        error = %e,
                        "Dedup lookup failed"
                    );
                }
            }

            if attempt + 1 < DEDUP_RETRIES {
                tokio::time::sleep(DEDUP_RETRY_DELAY).await;
            }
        }

        false
    }
}
