//! Case ledger service
//!
//! Append-only, per-guild sequentially-numbered record of every moderation
//! action. Cases are immutable except for the reason (editor and edit time
//! are retained); deletion exists only for the administrator-only command
//! path.

use tracing::{info, instrument};

use warden_core::entities::{ModerationCase, NewCase};
use warden_core::value_objects::Snowflake;
use warden_core::DomainError;

use super::context::EngineContext;
use super::error::{ServiceError, ServiceResult};

/// Maximum reason length accepted from the command surface
const MAX_REASON_LEN: usize = 512;

/// Case ledger service
pub struct CaseService<'a> {
    ctx: &'a EngineContext,
}

impl<'a> CaseService<'a> {
    /// Create a new CaseService
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Append a case; the ledger assigns the next per-guild id
    #[instrument(skip(self, new_case))]
    pub async fn create(&self, new_case: NewCase) -> ServiceResult<ModerationCase> {
        if let Some(reason) = &new_case.reason {
            if reason.len() > MAX_REASON_LEN {
                return Err(ServiceError::validation(format!(
                    "Reason exceeds {MAX_REASON_LEN} characters"
                )));
            }
        }

        let case = self.ctx.case_repo().create(&new_case).await?;

        info!(
            guild_id = %case.guild_id,
            case_id = case.case_id,
            target_id = %case.target_id,
            action = %case.action,
            moderator = %case.moderator_label(),
            "Case created"
        );

        Ok(case)
    }

    /// Get a case by guild and id
    #[instrument(skip(self))]
    pub async fn get(&self, guild_id: Snowflake, case_id: i64) -> ServiceResult<ModerationCase> {
        self.ctx
            .case_repo()
            .find(guild_id, case_id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::CaseNotFound {
                guild_id,
                case_id,
            }))
    }

    /// Replace a case's reason, retaining who edited and when. The prior
    /// text is not kept.
    #[instrument(skip(self, new_reason))]
    pub async fn edit_reason(
        &self,
        guild_id: Snowflake,
        case_id: i64,
        new_reason: &str,
        editor_id: Snowflake,
    ) -> ServiceResult<ModerationCase> {
        if new_reason.is_empty() || new_reason.len() > MAX_REASON_LEN {
            return Err(ServiceError::validation(format!(
                "Reason must be 1-{MAX_REASON_LEN} characters"
            )));
        }

        let edited_at = self.ctx.clock().now();
        self.ctx
            .case_repo()
            .update_reason(guild_id, case_id, new_reason, editor_id, edited_at)
            .await?;

        info!(
            guild_id = %guild_id,
            case_id,
            editor_id = %editor_id,
            "Case reason edited"
        );

        self.get(guild_id, case_id).await
    }

    /// Delete a case. The command surface gates this behind administrator
    /// permission; ids of deleted cases are never reused.
    #[instrument(skip(self))]
    pub async fn delete(&self, guild_id: Snowflake, case_id: i64) -> ServiceResult<()> {
        self.ctx.case_repo().delete(guild_id, case_id).await?;

        info!(guild_id = %guild_id, case_id, "Case deleted");

        Ok(())
    }

    /// List cases against one target, newest first
    #[instrument(skip(self))]
    pub async fn list_by_target(
        &self,
        guild_id: Snowflake,
        target_id: Snowflake,
        limit: i64,
    ) -> ServiceResult<Vec<ModerationCase>> {
        let cases = self
            .ctx
            .case_repo()
            .find_by_target(guild_id, target_id, limit.clamp(1, 100))
            .await?;
        Ok(cases)
    }
}
