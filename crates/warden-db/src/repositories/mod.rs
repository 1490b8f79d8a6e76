//! PostgreSQL repository implementations

mod case;
pub mod error;
mod quarantine;
mod settings;
mod whitelist;

pub use case::PgCaseRepository;
pub use quarantine::PgQuarantineRepository;
pub use settings::{PgAntinukeSettingsRepository, PgAntiraidSettingsRepository};
pub use whitelist::PgWhitelistRepository;
