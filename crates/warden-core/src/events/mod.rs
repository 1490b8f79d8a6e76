//! Platform events consumed by the protection engines

mod protection_event;

pub use protection_event::ProtectionEvent;
