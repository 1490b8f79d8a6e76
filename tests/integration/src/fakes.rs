//! In-memory fakes for the protection core's ports
//!
//! Every fake is deliberately simple: a mutex-wrapped map plus whatever
//! bookkeeping the tests assert on. Time flows only when a test advances
//! the [`ManualClock`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use warden_core::entities::{
    AntinukeSettings, AntiraidSettings, CaseAction, ModerationCase, MonitoredAction, NewCase,
    QuarantineRecord, WhitelistEntry,
};
use warden_core::traits::{
    ActionCounter, AuditAction, AuditEntry, CaseRepository, JoinTracker, LogNotification,
    PlatformClient, PlatformError, PlatformResult, ProtectionFamily, QuarantineRepository,
    RepoResult, SettingsCacheTier, SettingsFamily, SettingsRepository, SettingsSyncPublisher,
    WhitelistRepository,
};
use warden_core::value_objects::{Clock, Snowflake};
use warden_core::DomainError;
use warden_service::EngineContext;

// ============================================================================
// Clock
// ============================================================================

/// Manually-advanced clock
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Start at a fixed instant (2025-06-01T00:00:00Z)
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, duration: Duration) {
        *self.now.lock().unwrap() += duration;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// A snowflake whose embedded timestamp is `age` before the clock's now
pub fn snowflake_with_age(clock: &ManualClock, age: Duration) -> Snowflake {
    let created_ms = (clock.now() - age).timestamp_millis();
    Snowflake::new((created_ms - Snowflake::EPOCH) << 22)
}

// ============================================================================
// Settings repositories
// ============================================================================

/// In-memory settings repository for either family
pub struct MemSettingsRepository<T: SettingsFamily> {
    store: Mutex<HashMap<Snowflake, T>>,
}

impl<T: SettingsFamily> MemSettingsRepository<T> {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }

    /// Seed the store directly, bypassing the resolver
    pub fn insert(&self, settings: T) {
        self.store
            .lock()
            .unwrap()
            .insert(settings.guild_id(), settings);
    }

    pub fn len(&self) -> usize {
        self.store.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().unwrap().is_empty()
    }
}

impl<T: SettingsFamily> Default for MemSettingsRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: SettingsFamily> SettingsRepository<T> for MemSettingsRepository<T> {
    async fn find(&self, guild_id: Snowflake) -> RepoResult<Option<T>> {
        Ok(self.store.lock().unwrap().get(&guild_id).cloned())
    }

    async fn upsert(&self, settings: &T) -> RepoResult<()> {
        self.store
            .lock()
            .unwrap()
            .insert(settings.guild_id(), settings.clone());
        Ok(())
    }

    async fn find_enabled(&self) -> RepoResult<Vec<T>> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.enabled())
            .cloned()
            .collect())
    }
}

// ============================================================================
// Whitelist / quarantine / cases
// ============================================================================

/// In-memory whitelist repository
#[derive(Default)]
pub struct MemWhitelistRepository {
    entries: Mutex<HashMap<(Snowflake, Snowflake), WhitelistEntry>>,
}

impl MemWhitelistRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WhitelistRepository for MemWhitelistRepository {
    async fn contains(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .contains_key(&(guild_id, user_id)))
    }

    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<WhitelistEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.guild_id == guild_id)
            .cloned()
            .collect())
    }

    async fn create(&self, entry: &WhitelistEntry) -> RepoResult<()> {
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(&(entry.guild_id, entry.user_id)) {
            return Err(DomainError::AlreadyWhitelisted);
        }
        entries.insert((entry.guild_id, entry.user_id), entry.clone());
        Ok(())
    }

    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        self.entries
            .lock()
            .unwrap()
            .remove(&(guild_id, user_id))
            .map(|_| ())
            .ok_or(DomainError::WhitelistEntryNotFound)
    }
}

/// In-memory quarantine repository
#[derive(Default)]
pub struct MemQuarantineRepository {
    records: Mutex<HashMap<(Snowflake, Snowflake), QuarantineRecord>>,
}

impl MemQuarantineRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl QuarantineRepository for MemQuarantineRepository {
    async fn find(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<QuarantineRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(guild_id, user_id))
            .cloned())
    }

    async fn create(&self, record: &QuarantineRecord) -> RepoResult<()> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&(record.guild_id, record.user_id)) {
            return Err(DomainError::AlreadyQuarantined);
        }
        records.insert((record.guild_id, record.user_id), record.clone());
        Ok(())
    }

    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        self.records
            .lock()
            .unwrap()
            .remove(&(guild_id, user_id))
            .map(|_| ())
            .ok_or(DomainError::QuarantineNotFound)
    }
}

/// In-memory case ledger with an atomic per-guild sequence
pub struct MemCaseRepository {
    cases: Mutex<HashMap<Snowflake, Vec<ModerationCase>>>,
    sequences: Mutex<HashMap<Snowflake, i64>>,
    clock: Arc<ManualClock>,
}

impl MemCaseRepository {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            cases: Mutex::new(HashMap::new()),
            sequences: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// All cases for a guild, creation order
    pub fn all_for_guild(&self, guild_id: Snowflake) -> Vec<ModerationCase> {
        self.cases
            .lock()
            .unwrap()
            .get(&guild_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Cases against one target, creation order
    pub fn cases_for_target(&self, guild_id: Snowflake, target_id: Snowflake) -> Vec<ModerationCase> {
        self.all_for_guild(guild_id)
            .into_iter()
            .filter(|c| c.target_id == target_id)
            .collect()
    }
}

#[async_trait]
impl CaseRepository for MemCaseRepository {
    async fn create(&self, new_case: &NewCase) -> RepoResult<ModerationCase> {
        let case_id = {
            let mut sequences = self.sequences.lock().unwrap();
            let seq = sequences.entry(new_case.guild_id).or_insert(0);
            *seq += 1;
            *seq
        };

        let now = self.clock.now();
        let case = ModerationCase {
            guild_id: new_case.guild_id,
            case_id,
            target_id: new_case.target_id,
            moderator_id: new_case.moderator_id,
            action: new_case.action,
            reason: new_case.reason.clone(),
            edited_by: None,
            edited_at: None,
            duration_seconds: new_case.duration_seconds,
            expires_at: new_case
                .duration_seconds
                .map(|secs| now + Duration::seconds(secs)),
            created_at: now,
        };

        self.cases
            .lock()
            .unwrap()
            .entry(new_case.guild_id)
            .or_default()
            .push(case.clone());

        Ok(case)
    }

    async fn find(&self, guild_id: Snowflake, case_id: i64) -> RepoResult<Option<ModerationCase>> {
        Ok(self
            .all_for_guild(guild_id)
            .into_iter()
            .find(|c| c.case_id == case_id))
    }

    async fn find_latest(
        &self,
        guild_id: Snowflake,
        target_id: Snowflake,
        action: CaseAction,
    ) -> RepoResult<Option<ModerationCase>> {
        Ok(self
            .all_for_guild(guild_id)
            .into_iter()
            .filter(|c| c.target_id == target_id && c.action == action)
            .max_by_key(|c| c.case_id))
    }

    async fn find_by_target(
        &self,
        guild_id: Snowflake,
        target_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<ModerationCase>> {
        let mut cases: Vec<_> = self
            .all_for_guild(guild_id)
            .into_iter()
            .filter(|c| c.target_id == target_id)
            .collect();
        cases.sort_by_key(|c| std::cmp::Reverse(c.case_id));
        cases.truncate(limit as usize);
        Ok(cases)
    }

    async fn update_reason(
        &self,
        guild_id: Snowflake,
        case_id: i64,
        reason: &str,
        edited_by: Snowflake,
        edited_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut cases = self.cases.lock().unwrap();
        let case = cases
            .get_mut(&guild_id)
            .and_then(|list| list.iter_mut().find(|c| c.case_id == case_id))
            .ok_or(DomainError::CaseNotFound { guild_id, case_id })?;

        case.reason = Some(reason.to_string());
        case.edited_by = Some(edited_by);
        case.edited_at = Some(edited_at);
        Ok(())
    }

    async fn delete(&self, guild_id: Snowflake, case_id: i64) -> RepoResult<()> {
        let mut cases = self.cases.lock().unwrap();
        let list = cases
            .get_mut(&guild_id)
            .ok_or(DomainError::CaseNotFound { guild_id, case_id })?;
        let before = list.len();
        list.retain(|c| c.case_id != case_id);
        if list.len() == before {
            return Err(DomainError::CaseNotFound { guild_id, case_id });
        }
        Ok(())
    }
}

// ============================================================================
// Signal stores
// ============================================================================

/// Fixed-window counter driven by the manual clock (mirrors the Redis
/// first-touch-expiry semantics)
pub struct WindowedFakeCounter {
    counts: Mutex<HashMap<String, (u64, DateTime<Utc>)>>,
    clock: Arc<ManualClock>,
    window_seconds: i64,
}

impl WindowedFakeCounter {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            clock,
            window_seconds: 30,
        }
    }
}

#[async_trait]
impl ActionCounter for WindowedFakeCounter {
    async fn increment(
        &self,
        guild_id: Snowflake,
        actor_id: Snowflake,
        action: MonitoredAction,
    ) -> u64 {
        let key = format!("{guild_id}:{actor_id}:{}", action.as_str());
        let now = self.clock.now();
        let mut counts = self.counts.lock().unwrap();
        let entry = counts.entry(key).or_insert((0, now));

        if (now - entry.1).num_seconds() >= self.window_seconds {
            *entry = (0, now);
        }
        entry.0 += 1;
        entry.0
    }
}

/// Sliding-window join tracker driven by the manual clock
pub struct FakeJoinTracker {
    joins: Mutex<HashMap<Snowflake, Vec<(Snowflake, DateTime<Utc>)>>>,
    raid_until: Mutex<HashMap<Snowflake, DateTime<Utc>>>,
    clock: Arc<ManualClock>,
}

impl FakeJoinTracker {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            joins: Mutex::new(HashMap::new()),
            raid_until: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl JoinTracker for FakeJoinTracker {
    async fn record_join(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        let now = self.clock.now();
        let mut joins = self.joins.lock().unwrap();
        let list = joins.entry(guild_id).or_default();
        list.retain(|(_, at)| (now - *at).num_seconds() < 60);
        list.push((user_id, now));
        Ok(())
    }

    async fn recent_joins(
        &self,
        guild_id: Snowflake,
        window_seconds: u32,
    ) -> RepoResult<Vec<Snowflake>> {
        let now = self.clock.now();
        Ok(self
            .joins
            .lock()
            .unwrap()
            .get(&guild_id)
            .map(|list| {
                list.iter()
                    .filter(|(_, at)| (now - *at).num_seconds() < i64::from(window_seconds))
                    .map(|(user, _)| *user)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn clear(&self, guild_id: Snowflake) -> RepoResult<()> {
        self.joins.lock().unwrap().remove(&guild_id);
        Ok(())
    }

    async fn is_raid_mode(&self, guild_id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .raid_until
            .lock()
            .unwrap()
            .get(&guild_id)
            .is_some_and(|until| *until > self.clock.now()))
    }

    async fn set_raid_mode(&self, guild_id: Snowflake, duration_seconds: u32) -> RepoResult<()> {
        let until = self.clock.now() + Duration::seconds(i64::from(duration_seconds));
        self.raid_until.lock().unwrap().insert(guild_id, until);
        Ok(())
    }
}

/// In-memory shared settings tier
#[derive(Default)]
pub struct MemSettingsCache {
    values: Mutex<HashMap<(ProtectionFamily, Snowflake), serde_json::Value>>,
}

impl MemSettingsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, family: ProtectionFamily, guild_id: Snowflake) -> bool {
        self.values
            .lock()
            .unwrap()
            .contains_key(&(family, guild_id))
    }
}

#[async_trait]
impl SettingsCacheTier for MemSettingsCache {
    async fn read(
        &self,
        family: ProtectionFamily,
        guild_id: Snowflake,
    ) -> RepoResult<Option<serde_json::Value>> {
        Ok(self
            .values
            .lock()
            .unwrap()
            .get(&(family, guild_id))
            .cloned())
    }

    async fn write(
        &self,
        family: ProtectionFamily,
        guild_id: Snowflake,
        value: &serde_json::Value,
    ) -> RepoResult<()> {
        self.values
            .lock()
            .unwrap()
            .insert((family, guild_id), value.clone());
        Ok(())
    }

    async fn remove(&self, family: ProtectionFamily, guild_id: Snowflake) -> RepoResult<()> {
        self.values.lock().unwrap().remove(&(family, guild_id));
        Ok(())
    }
}

/// Sync publisher that records published (guild, family) pairs
#[derive(Default)]
pub struct RecordingSyncPublisher {
    published: Mutex<Vec<(Snowflake, ProtectionFamily)>>,
}

impl RecordingSyncPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<(Snowflake, ProtectionFamily)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl SettingsSyncPublisher for RecordingSyncPublisher {
    async fn publish(&self, guild_id: Snowflake, family: ProtectionFamily) -> RepoResult<()> {
        self.published.lock().unwrap().push((guild_id, family));
        Ok(())
    }
}

// ============================================================================
// Platform client
// ============================================================================

/// Everything the fake platform was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformAction {
    Banned(Snowflake, Snowflake),
    Kicked(Snowflake, Snowflake),
    RolesSet(Snowflake, Snowflake, Vec<Snowflake>),
    ChannelDeleted(Snowflake, Snowflake),
    RoleDeleted(Snowflake, Snowflake),
    WebhookDeleted(Snowflake, Snowflake),
    DirectMessage(Snowflake),
    LogSent(Snowflake, Option<i64>),
    AlertSent(Snowflake, String),
    RoleCreated(Snowflake, Snowflake),
}

/// Scripted platform client
pub struct FakePlatform {
    bot_id: Snowflake,
    owners: Mutex<HashMap<Snowflake, Snowflake>>,
    member_roles: Mutex<HashMap<(Snowflake, Snowflake), Vec<Snowflake>>>,
    manageable_roles: Mutex<HashMap<Snowflake, Vec<Snowflake>>>,
    audit: Mutex<HashMap<(Snowflake, AuditAction), Vec<AuditEntry>>>,
    actions: Mutex<Vec<PlatformAction>>,
    reject_mutations: AtomicBool,
    next_role_id: Mutex<i64>,
}

impl FakePlatform {
    pub fn new(bot_id: Snowflake) -> Self {
        Self {
            bot_id,
            owners: Mutex::new(HashMap::new()),
            member_roles: Mutex::new(HashMap::new()),
            manageable_roles: Mutex::new(HashMap::new()),
            audit: Mutex::new(HashMap::new()),
            actions: Mutex::new(Vec::new()),
            reject_mutations: AtomicBool::new(false),
            next_role_id: Mutex::new(900_000),
        }
    }

    pub fn set_owner(&self, guild_id: Snowflake, owner_id: Snowflake) {
        self.owners.lock().unwrap().insert(guild_id, owner_id);
    }

    pub fn set_roles(&self, guild_id: Snowflake, user_id: Snowflake, roles: Vec<Snowflake>) {
        self.member_roles
            .lock()
            .unwrap()
            .insert((guild_id, user_id), roles);
    }

    pub fn roles_of(&self, guild_id: Snowflake, user_id: Snowflake) -> Vec<Snowflake> {
        self.member_roles
            .lock()
            .unwrap()
            .get(&(guild_id, user_id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_manageable_roles(&self, guild_id: Snowflake, roles: Vec<Snowflake>) {
        self.manageable_roles
            .lock()
            .unwrap()
            .insert(guild_id, roles);
    }

    /// Queue the most-recent audit entry for an action kind
    pub fn push_audit(
        &self,
        guild_id: Snowflake,
        action: AuditAction,
        actor_id: Snowflake,
        target_id: Snowflake,
        at: DateTime<Utc>,
    ) {
        self.audit
            .lock()
            .unwrap()
            .entry((guild_id, action))
            .or_default()
            .insert(
                0,
                AuditEntry {
                    actor_id,
                    target_id: Some(target_id),
                    action,
                    created_at: at,
                },
            );
    }

    /// When set, every mutating call is refused with a hierarchy rejection
    pub fn reject_mutations(&self, reject: bool) {
        self.reject_mutations.store(reject, Ordering::SeqCst);
    }

    pub fn actions(&self) -> Vec<PlatformAction> {
        self.actions.lock().unwrap().clone()
    }

    pub fn bans_of(&self, user_id: Snowflake) -> usize {
        self.actions()
            .iter()
            .filter(|a| matches!(a, PlatformAction::Banned(_, u) if *u == user_id))
            .count()
    }

    pub fn kicks_of(&self, user_id: Snowflake) -> usize {
        self.actions()
            .iter()
            .filter(|a| matches!(a, PlatformAction::Kicked(_, u) if *u == user_id))
            .count()
    }

    pub fn logs_sent(&self) -> usize {
        self.actions()
            .iter()
            .filter(|a| matches!(a, PlatformAction::LogSent(..)))
            .count()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.actions()
            .iter()
            .filter_map(|a| match a {
                PlatformAction::AlertSent(_, content) => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, action: PlatformAction) {
        self.actions.lock().unwrap().push(action);
    }

    fn check_mutation(&self) -> PlatformResult<()> {
        if self.reject_mutations.load(Ordering::SeqCst) {
            Err(PlatformError::Rejected("role hierarchy".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PlatformClient for FakePlatform {
    fn bot_user_id(&self) -> Snowflake {
        self.bot_id
    }

    async fn guild_owner(&self, guild_id: Snowflake) -> PlatformResult<Snowflake> {
        self.owners
            .lock()
            .unwrap()
            .get(&guild_id)
            .copied()
            .ok_or_else(|| PlatformError::NotFound(format!("guild {guild_id}")))
    }

    async fn member_role_ids(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> PlatformResult<Vec<Snowflake>> {
        Ok(self.roles_of(guild_id, user_id))
    }

    async fn set_member_roles(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_ids: &[Snowflake],
    ) -> PlatformResult<()> {
        self.check_mutation()?;
        self.member_roles
            .lock()
            .unwrap()
            .insert((guild_id, user_id), role_ids.to_vec());
        self.record(PlatformAction::RolesSet(
            guild_id,
            user_id,
            role_ids.to_vec(),
        ));
        Ok(())
    }

    async fn manageable_role_ids(&self, guild_id: Snowflake) -> PlatformResult<Vec<Snowflake>> {
        Ok(self
            .manageable_roles
            .lock()
            .unwrap()
            .get(&guild_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn ban_member(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        _reason: &str,
    ) -> PlatformResult<()> {
        self.check_mutation()?;
        self.record(PlatformAction::Banned(guild_id, user_id));
        Ok(())
    }

    async fn kick_member(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        _reason: &str,
    ) -> PlatformResult<()> {
        self.check_mutation()?;
        self.record(PlatformAction::Kicked(guild_id, user_id));
        Ok(())
    }

    async fn delete_channel(
        &self,
        guild_id: Snowflake,
        channel_id: Snowflake,
    ) -> PlatformResult<()> {
        self.check_mutation()?;
        self.record(PlatformAction::ChannelDeleted(guild_id, channel_id));
        Ok(())
    }

    async fn delete_role(&self, guild_id: Snowflake, role_id: Snowflake) -> PlatformResult<()> {
        self.check_mutation()?;
        self.record(PlatformAction::RoleDeleted(guild_id, role_id));
        Ok(())
    }

    async fn delete_webhook(
        &self,
        guild_id: Snowflake,
        webhook_id: Snowflake,
    ) -> PlatformResult<()> {
        self.check_mutation()?;
        self.record(PlatformAction::WebhookDeleted(guild_id, webhook_id));
        Ok(())
    }

    async fn recent_audit_entries(
        &self,
        guild_id: Snowflake,
        action: AuditAction,
        limit: u8,
    ) -> PlatformResult<Vec<AuditEntry>> {
        Ok(self
            .audit
            .lock()
            .unwrap()
            .get(&(guild_id, action))
            .map(|entries| entries.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn direct_message(&self, user_id: Snowflake, _content: &str) -> PlatformResult<()> {
        self.record(PlatformAction::DirectMessage(user_id));
        Ok(())
    }

    async fn send_log(
        &self,
        guild_id: Snowflake,
        _channel_id: Snowflake,
        notification: &LogNotification,
        _alert_role_id: Option<Snowflake>,
    ) -> PlatformResult<()> {
        self.record(PlatformAction::LogSent(guild_id, notification.case_id));
        Ok(())
    }

    async fn send_alert(
        &self,
        guild_id: Snowflake,
        _channel_id: Snowflake,
        content: &str,
        _alert_role_id: Option<Snowflake>,
    ) -> PlatformResult<()> {
        self.record(PlatformAction::AlertSent(guild_id, content.to_string()));
        Ok(())
    }

    async fn create_role(&self, guild_id: Snowflake, _name: &str) -> PlatformResult<Snowflake> {
        self.check_mutation()?;
        let role_id = {
            let mut next = self.next_role_id.lock().unwrap();
            *next += 1;
            Snowflake::new(*next)
        };
        self.manageable_roles
            .lock()
            .unwrap()
            .entry(guild_id)
            .or_default()
            .push(role_id);
        self.record(PlatformAction::RoleCreated(guild_id, role_id));
        Ok(role_id)
    }

    async fn deny_role_in_all_channels(
        &self,
        _guild_id: Snowflake,
        _role_id: Snowflake,
    ) -> PlatformResult<()> {
        self.check_mutation()?;
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

/// A fully wired engine context over in-memory fakes
pub struct Harness {
    pub ctx: EngineContext,
    pub clock: Arc<ManualClock>,
    pub platform: Arc<FakePlatform>,
    pub antinuke_repo: Arc<MemSettingsRepository<AntinukeSettings>>,
    pub antiraid_repo: Arc<MemSettingsRepository<AntiraidSettings>>,
    pub whitelist: Arc<MemWhitelistRepository>,
    pub quarantine: Arc<MemQuarantineRepository>,
    pub cases: Arc<MemCaseRepository>,
    pub cache: Arc<MemSettingsCache>,
    pub sync: Arc<RecordingSyncPublisher>,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new());
        let platform = Arc::new(FakePlatform::new(Snowflake::new(999)));
        let antinuke_repo = Arc::new(MemSettingsRepository::<AntinukeSettings>::new());
        let antiraid_repo = Arc::new(MemSettingsRepository::<AntiraidSettings>::new());
        let whitelist = Arc::new(MemWhitelistRepository::new());
        let quarantine = Arc::new(MemQuarantineRepository::new());
        let cases = Arc::new(MemCaseRepository::new(Arc::clone(&clock)));
        let cache = Arc::new(MemSettingsCache::new());
        let sync = Arc::new(RecordingSyncPublisher::new());

        let ctx = EngineContext::new(
            antinuke_repo.clone(),
            antiraid_repo.clone(),
            cache.clone(),
            whitelist.clone(),
            quarantine.clone(),
            cases.clone(),
            Arc::new(WindowedFakeCounter::new(Arc::clone(&clock))),
            Arc::new(FakeJoinTracker::new(Arc::clone(&clock))),
            platform.clone(),
            sync.clone(),
            clock.clone(),
        );

        Self {
            ctx,
            clock,
            platform,
            antinuke_repo,
            antiraid_repo,
            whitelist,
            quarantine,
            cases,
            cache,
            sync,
        }
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
