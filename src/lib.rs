//! Turns free-text body measurements and text-typed check-in fields into
//! numeric evolution reports for coaching feedback.

pub mod config;
pub mod evolution;
pub mod ingest;
pub mod measurements;
pub mod output;
pub mod server;
pub mod types;
