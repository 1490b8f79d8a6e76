//! Service-level tests: settings resolver tiers, quarantine store, case
//! ledger, and the configuration surface.

use chrono::Duration;

use integration_tests::{FakeJoinTracker, Harness, ManualClock, PlatformAction};
use std::sync::Arc;
use warden_core::entities::{
    ActionPolicy, AntinukeSettings, CaseAction, MonitoredAction, NewCase, QuarantineSource,
};
use warden_core::events::ProtectionEvent;
use warden_core::traits::{JoinTracker, ProtectionFamily};
use warden_core::value_objects::{Clock, Snowflake};
use warden_service::{AntiraidEngine, CaseService, QuarantineService, SettingsService};

const GUILD: Snowflake = Snowflake::new(42);
const OWNER: Snowflake = Snowflake::new(100);

fn enabled_antinuke(guild_id: Snowflake) -> AntinukeSettings {
    let mut settings = AntinukeSettings::default_disabled(guild_id);
    settings.enabled = true;
    settings
}

// ============================================================================
// Settings resolver
// ============================================================================

#[tokio::test]
async fn resolver_reads_through_tiers_and_writes_back() {
    let harness = Harness::new();
    harness.antinuke_repo.insert(enabled_antinuke(GUILD));

    let resolved = harness.ctx.antinuke_resolver().get(GUILD).await;
    assert!(resolved.enabled);
    // The durable-store hit was written back to the shared tier
    assert!(harness.cache.contains(ProtectionFamily::Antinuke, GUILD));

    // Mutate the store behind the resolver's back: the local tier answers
    let mut changed = enabled_antinuke(GUILD);
    changed.enabled = false;
    harness.antinuke_repo.insert(changed);

    let cached = harness.ctx.antinuke_resolver().get(GUILD).await;
    assert!(cached.enabled, "local tier served the stale value");

    // Invalidation clears the top two tiers; the store is authoritative again
    harness.ctx.antinuke_resolver().invalidate(GUILD).await;
    assert!(!harness.cache.contains(ProtectionFamily::Antinuke, GUILD));
    let fresh = harness.ctx.antinuke_resolver().get(GUILD).await;
    assert!(!fresh.enabled);
}

#[tokio::test]
async fn resolver_materializes_default_without_persisting() {
    let harness = Harness::new();
    let unknown = Snowflake::new(777);

    let settings = harness.ctx.antinuke_resolver().get(unknown).await;
    assert!(!settings.enabled);
    assert_eq!(settings.guild_id, unknown);

    // Cached upward, never written to the durable store
    assert!(harness.cache.contains(ProtectionFamily::Antinuke, unknown));
    assert!(harness.antinuke_repo.is_empty());
}

// ============================================================================
// Configuration surface
// ============================================================================

#[tokio::test]
async fn settings_writes_invalidate_and_announce() {
    let harness = Harness::new();
    harness.platform.set_owner(GUILD, OWNER);
    let service = SettingsService::new(&harness.ctx);

    // Warm the local tier with the default
    let _ = harness.ctx.antinuke_resolver().get(GUILD).await;

    service.set_antinuke_enabled(GUILD, true).await.unwrap();
    service
        .set_action_policy(
            GUILD,
            MonitoredAction::BanMembers,
            ActionPolicy {
                enabled: true,
                limit: 3,
            },
        )
        .await
        .unwrap();

    // The resolver sees the write immediately
    let resolved = service.get_antinuke(GUILD).await;
    assert!(resolved.enabled);
    assert_eq!(resolved.policy(MonitoredAction::BanMembers).limit, 3);

    // Every write published a sync notification
    let published = harness.sync.published();
    assert_eq!(published.len(), 2);
    assert!(published
        .iter()
        .all(|(guild, family)| *guild == GUILD && *family == ProtectionFamily::Antinuke));
}

#[tokio::test]
async fn trusted_operator_management_is_owner_only() {
    let harness = Harness::new();
    harness.platform.set_owner(GUILD, OWNER);
    let service = SettingsService::new(&harness.ctx);

    let stranger = Snowflake::new(206);
    let operator = Snowflake::new(207);

    let denied = service
        .add_trusted_operator(GUILD, stranger, operator)
        .await;
    assert!(denied.is_err());

    service
        .add_trusted_operator(GUILD, OWNER, operator)
        .await
        .unwrap();
    assert!(service.is_trusted(GUILD, operator).await.unwrap());
    assert!(service.is_trusted(GUILD, OWNER).await.unwrap());
    assert!(!service.is_trusted(GUILD, stranger).await.unwrap());
}

#[tokio::test]
async fn provisioned_quarantine_role_is_stored() {
    let harness = Harness::new();
    harness.platform.set_owner(GUILD, OWNER);
    let service = SettingsService::new(&harness.ctx);

    let role_id = service.provision_quarantine_role(GUILD).await.unwrap();

    let settings = service.get_antinuke(GUILD).await;
    assert_eq!(settings.quarantine_role_id, Some(role_id));
    assert!(harness
        .platform
        .actions()
        .contains(&PlatformAction::RoleCreated(GUILD, role_id)));
}

#[tokio::test]
async fn owner_is_implicitly_whitelisted() {
    let harness = Harness::new();
    harness.platform.set_owner(GUILD, OWNER);
    let service = SettingsService::new(&harness.ctx);

    assert!(service.is_whitelisted(GUILD, OWNER).await.unwrap());
    // Storing the owner is rejected as redundant
    assert!(service.add_whitelist(GUILD, OWNER, OWNER).await.is_err());

    let member = Snowflake::new(208);
    assert!(!service.is_whitelisted(GUILD, member).await.unwrap());
    service.add_whitelist(GUILD, OWNER, member).await.unwrap();
    assert!(service.is_whitelisted(GUILD, member).await.unwrap());
    service.remove_whitelist(GUILD, member).await.unwrap();
    assert!(!service.is_whitelisted(GUILD, member).await.unwrap());
}

// ============================================================================
// Quarantine store
// ============================================================================

#[tokio::test]
async fn isolate_then_release_restores_surviving_roles() {
    let harness = Harness::new();
    harness.platform.set_owner(GUILD, OWNER);

    let member = Snowflake::new(209);
    let (r1, r2, r3) = (Snowflake::new(801), Snowflake::new(802), Snowflake::new(803));
    let quarantine_role = Snowflake::new(850);

    let mut settings = enabled_antinuke(GUILD);
    settings.quarantine_role_id = Some(quarantine_role);
    harness.antinuke_repo.insert(settings);

    harness.platform.set_roles(GUILD, member, vec![r1, r2, r3]);
    harness
        .platform
        .set_manageable_roles(GUILD, vec![r1, r2, r3, quarantine_role]);

    let service = QuarantineService::new(&harness.ctx);
    let record = service
        .isolate(GUILD, member, Some(OWNER), Some("test".into()), QuarantineSource::Manual)
        .await
        .unwrap();

    assert_eq!(record.role_ids, vec![r1, r2, r3]);
    assert_eq!(harness.platform.roles_of(GUILD, member), vec![quarantine_role]);

    // A second isolate is rejected while the record is active
    assert!(service
        .isolate(GUILD, member, None, None, QuarantineSource::Manual)
        .await
        .is_err());

    // r3 is deleted while the member is quarantined
    harness
        .platform
        .set_manageable_roles(GUILD, vec![r1, r2, quarantine_role]);

    service.release(GUILD, member).await.unwrap();
    assert_eq!(
        harness.platform.roles_of(GUILD, member),
        vec![r1, r2],
        "exactly the surviving snapshot is restored"
    );
    assert_eq!(harness.quarantine.len(), 0);
}

#[tokio::test]
async fn quarantined_member_is_reisolated_on_rejoin_without_a_new_case() {
    let harness = Harness::new();
    harness.platform.set_owner(GUILD, OWNER);

    let member = Snowflake::new(210);
    let quarantine_role = Snowflake::new(850);

    let mut settings = enabled_antinuke(GUILD);
    settings.quarantine_role_id = Some(quarantine_role);
    harness.antinuke_repo.insert(settings);

    harness
        .platform
        .set_roles(GUILD, member, vec![Snowflake::new(801)]);
    harness
        .platform
        .set_manageable_roles(GUILD, vec![Snowflake::new(801), quarantine_role]);

    QuarantineService::new(&harness.ctx)
        .isolate(GUILD, member, None, None, QuarantineSource::Antinuke)
        .await
        .unwrap();
    let cases_before = harness.cases.all_for_guild(GUILD).len();

    // The member leaves and rejoins with fresh (empty) roles
    harness.platform.set_roles(GUILD, member, vec![]);
    AntiraidEngine::new(&harness.ctx)
        .handle(&ProtectionEvent::MemberJoined {
            guild_id: GUILD,
            user_id: member,
            is_bot: false,
            has_avatar: true,
        })
        .await;

    assert_eq!(
        harness.platform.roles_of(GUILD, member),
        vec![quarantine_role],
        "quarantine role reapplied on rejoin"
    );
    assert_eq!(
        harness.cases.all_for_guild(GUILD).len(),
        cases_before,
        "no new case for the reapplication"
    );
    assert!(harness
        .platform
        .actions()
        .contains(&PlatformAction::DirectMessage(member)));
    assert_eq!(harness.quarantine.len(), 1, "the original record survives");
}

// ============================================================================
// Case ledger
// ============================================================================

#[tokio::test]
async fn case_ids_are_gapless_per_guild() {
    let harness = Harness::new();
    let service = CaseService::new(&harness.ctx);
    let other_guild = Snowflake::new(43);

    for expected in 1..=3i64 {
        let case = service
            .create(NewCase::automated(
                GUILD,
                Snowflake::new(300 + expected),
                CaseAction::Warn,
                "test",
            ))
            .await
            .unwrap();
        assert_eq!(case.case_id, expected);
    }

    // Another guild's sequence is independent
    let first_elsewhere = service
        .create(NewCase::automated(
            other_guild,
            Snowflake::new(300),
            CaseAction::Note,
            "test",
        ))
        .await
        .unwrap();
    assert_eq!(first_elsewhere.case_id, 1);

    // Deleting a case never frees its id
    service.delete(GUILD, 2).await.unwrap();
    let next = service
        .create(NewCase::automated(
            GUILD,
            Snowflake::new(310),
            CaseAction::Warn,
            "test",
        ))
        .await
        .unwrap();
    assert_eq!(next.case_id, 4);
}

#[tokio::test]
async fn editing_a_reason_retains_editor_and_time() {
    let harness = Harness::new();
    let service = CaseService::new(&harness.ctx);
    let editor = Snowflake::new(211);

    let case = service
        .create(NewCase::automated(
            GUILD,
            Snowflake::new(300),
            CaseAction::Quarantine,
            "original",
        ))
        .await
        .unwrap();

    harness.clock.advance(Duration::minutes(5));
    let edited = service
        .edit_reason(GUILD, case.case_id, "clarified", editor)
        .await
        .unwrap();

    assert_eq!(edited.reason.as_deref(), Some("clarified"));
    assert_eq!(edited.edited_by, Some(editor));
    assert_eq!(edited.edited_at, Some(harness.clock.now()));
    assert_eq!(edited.created_at, case.created_at);
}

// ============================================================================
// Join tracker window semantics
// ============================================================================

#[tokio::test]
async fn recent_joins_is_a_true_sliding_window() {
    let clock = Arc::new(ManualClock::new());
    let tracker = FakeJoinTracker::new(Arc::clone(&clock));

    let (a, b, c) = (Snowflake::new(1), Snowflake::new(2), Snowflake::new(3));

    tracker.record_join(GUILD, a).await.unwrap();
    clock.advance(Duration::seconds(6));
    tracker.record_join(GUILD, b).await.unwrap();
    clock.advance(Duration::seconds(6));
    tracker.record_join(GUILD, c).await.unwrap();

    // 12s after a's join: only b and c fall inside a 10s window
    let recent = tracker.recent_joins(GUILD, 10).await.unwrap();
    assert_eq!(recent, vec![b, c]);

    // 2s later b slides out too
    clock.advance(Duration::seconds(5));
    let recent = tracker.recent_joins(GUILD, 10).await.unwrap();
    assert_eq!(recent, vec![c]);

    // Raid mode expires independently of the join window
    tracker.set_raid_mode(GUILD, 60).await.unwrap();
    assert!(tracker.is_raid_mode(GUILD).await.unwrap());
    clock.advance(Duration::seconds(61));
    assert!(!tracker.is_raid_mode(GUILD).await.unwrap());
}
