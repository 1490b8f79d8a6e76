//! # warden-service
//!
//! Application layer of the protection core: the tiered settings resolver,
//! the audit correlator and self-action dedup guard, the quarantine
//! service, the punishment executor, the case ledger, the mod-log
//! notifier, the configuration surface, and the antinuke/antiraid engines
//! orchestrating them.
//!
//! ## Wiring
//!
//! ```ignore
//! use std::sync::Arc;
//! use warden_service::{AntinukeEngine, AntiraidEngine, EngineContext};
//!
//! let ctx = EngineContext::new(/* ports */);
//!
//! // Platform event loop
//! AntinukeEngine::new(&ctx).handle(&event).await;
//! AntiraidEngine::new(&ctx).handle(&event).await;
//! ```

pub mod services;

pub use services::{
    spawn_sync_invalidation, AntinukeEngine, AntiraidEngine, AuditCorrelator, CaseService,
    DedupGuard, EngineContext, ModLogNotifier, PunishmentExecutor, QuarantineService,
    ServiceError, ServiceResult, SettingsResolver, SettingsService, DEDUP_WINDOW_SECS,
};
