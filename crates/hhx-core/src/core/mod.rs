//! # Core Module
//!
//! Stateless building blocks of the analysis: the data model of a truth-level
//! event and the I/O used to get events in and ntuple rows out.
//!
//! - **Event Representation** ([`models`]) - Species codes, particles, particle arenas and the per-event store
//! - **File I/O** ([`io`]) - Truth-record text format and ntuple sinks

pub mod io;
pub mod models;
