use crate::core::io::ntuple::NtupleSink;
use crate::core::models::event::EventStore;
use crate::engine::algorithm::EventAlgorithm;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::selector::Outcome;
use std::fmt;
use tracing::{info, instrument, warn};

/// Cut-flow of one run: how many events ended in each outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub events_read: usize,
    pub emitted: usize,
    pub no_collection: usize,
    pub wrong_parent_count: usize,
    pub missing_decay_product: usize,
    pub wrong_boson_decay: usize,
    /// Events aborted because a required store entry could not be retrieved.
    pub retrieval_failures: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: Outcome) {
        *self.slot(outcome) += 1;
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Emitted => self.emitted,
            Outcome::SkippedNoCollection => self.no_collection,
            Outcome::SkippedWrongParentCount => self.wrong_parent_count,
            Outcome::SkippedMissingDecayProduct => self.missing_decay_product,
            Outcome::SkippedWrongBosonDecay => self.wrong_boson_decay,
        }
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Events that produced no row, for any reason.
    pub fn skipped(&self) -> usize {
        self.no_collection
            + self.wrong_parent_count
            + self.missing_decay_product
            + self.wrong_boson_decay
            + self.retrieval_failures
    }

    fn slot(&mut self, outcome: Outcome) -> &mut usize {
        match outcome {
            Outcome::Emitted => &mut self.emitted,
            Outcome::SkippedNoCollection => &mut self.no_collection,
            Outcome::SkippedWrongParentCount => &mut self.wrong_parent_count,
            Outcome::SkippedMissingDecayProduct => &mut self.missing_decay_product,
            Outcome::SkippedWrongBosonDecay => &mut self.wrong_boson_decay,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<24}{:>10}", "events read", self.events_read)?;
        for outcome in Outcome::ALL {
            writeln!(f, "{:<24}{:>10}", outcome.label(), self.count(outcome))?;
        }
        write!(f, "{:<24}{:>10}", "retrieval failures", self.retrieval_failures)
    }
}

/// Runs `algorithm` over `events`, writing matched rows to `sink`.
///
/// Events are pulled one at a time, so a streaming reader never holds more
/// than the current event. The algorithm must already have gone through job
/// setup. A failure during initialization aborts before any event is read.
/// Per-event retrieval failures are counted and skipped; a read error or any
/// other engine error aborts the run.
#[instrument(skip_all, name = "ntuple_workflow", fields(algorithm = algorithm.name()))]
pub fn run<A, I, E>(
    algorithm: &mut A,
    events: I,
    sink: &mut dyn NtupleSink,
    reporter: &ProgressReporter,
) -> Result<RunSummary, EngineError>
where
    A: EventAlgorithm + ?Sized,
    I: IntoIterator<Item = Result<EventStore, E>>,
    E: Into<EngineError>,
{
    reporter.report(Progress::PhaseStart { name: "Initialize" });
    algorithm.initialize(sink)?;
    reporter.report(Progress::PhaseFinish);

    let events = events.into_iter();
    let total_events = match events.size_hint() {
        (lower, Some(upper)) if lower == upper => Some(lower as u64),
        _ => None,
    };
    info!(events = ?total_events, "Starting event loop.");
    reporter.report(Progress::EventLoopStart { total_events });

    let mut summary = RunSummary::default();
    for (index, event) in events.enumerate() {
        let event = match event {
            Ok(event) => event,
            Err(err) => return Err(err.into()),
        };
        summary.events_read += 1;
        match algorithm.execute(&event, sink) {
            Ok(outcome) => {
                summary.record(outcome);
                reporter.report(Progress::EventProcessed {
                    outcome: Some(outcome),
                });
            }
            Err(err) if err.is_event_scoped() => {
                warn!(event_index = index, error = %err, "Skipping event.");
                summary.retrieval_failures += 1;
                reporter.report(Progress::EventProcessed { outcome: None });
            }
            Err(err) => return Err(err),
        }
    }
    reporter.report(Progress::EventLoopFinish);

    reporter.report(Progress::PhaseStart { name: "Finalize" });
    algorithm.finalize()?;
    sink.flush()
        .map_err(|source| EngineError::Sink { source })?;
    reporter.report(Progress::PhaseFinish);

    info!(
        read = summary.events_read,
        emitted = summary.emitted(),
        skipped = summary.skipped(),
        "Event loop finished."
    );
    Ok(summary)
}
