//! Emit interface implementation storing events into SQLite.
mod events;
mod factory;

pub use self::events::SQLiteEvents;
pub use self::factory::SQLiteFactory;
