//! # hhxtruth
//!
//! Truth-level analysis of generator records for the di-Higgs plus missing
//! energy signature: two lightest neutralinos, each decaying to a Higgs boson
//! and a gravitino, with both Higgs bosons decaying to b-quark pairs. Every
//! event that matches this decay topology produces one flat ntuple row.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless data models (species codes, the
//!   particle arena, the per-event store) and I/O (the truth-record text
//!   format and ntuple sinks).
//!
//! - **[`engine`]: The Analysis Logic.** The decay-tree walker, the topology
//!   selector, the fixed output schema, configuration, and the `NtupleMaker`
//!   algorithm with its setup/initialize/execute/finalize lifecycle.
//!
//! - **[`workflows`]: The Public API.** Drives an algorithm over a sequence of
//!   events and reports a cut-flow of what happened to each one.

pub mod core;
pub mod engine;
pub mod workflows;
