//! Input and output of event data.
//!
//! Reading generator truth records from a line-oriented text format, and
//! writing flat per-event rows through the [`ntuple::NtupleSink`] interface.

pub mod ntuple;
pub mod traits;
pub mod truth;
