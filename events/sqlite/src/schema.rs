//! Embedded schema migrations for the SQLite events backend.
refinery::embed_migrations!("migrations");
