//! # Workflows Module
//!
//! Top-level entry points. A workflow takes an algorithm that has already
//! declared its job outputs, runs it over a batch of events, and returns a
//! summary of the outcomes.
//!
//! - **Ntuple Workflow** ([`ntuple`]) - Initialize, per-event execute, finalize and flush, with a cut-flow summary

pub mod ntuple;
