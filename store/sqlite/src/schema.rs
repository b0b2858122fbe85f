//! Embedded schema migrations for the SQLite grant store.
refinery::embed_migrations!("migrations");
