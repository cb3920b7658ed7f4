use super::config::AnalysisConfig;
use super::error::EngineError;
use super::schema;
use super::selector::{Outcome, TopologySelector};
use crate::core::io::ntuple::NtupleSink;
use crate::core::models::event::EventStore;
use tracing::{debug, info};

/// Output stream declared by an algorithm during job setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputStream {
    pub name: String,
}

/// Collects what the algorithms of a job ask the host to provide.
#[derive(Debug, Default)]
pub struct Job {
    outputs: Vec<OutputStream>,
}

impl Job {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an output stream. Returns `false` if the name was already declared.
    pub fn add_output(&mut self, stream: OutputStream) -> bool {
        if self.outputs.iter().any(|s| s.name == stream.name) {
            return false;
        }
        self.outputs.push(stream);
        true
    }

    pub fn outputs(&self) -> &[OutputStream] {
        &self.outputs
    }
}

/// Per-event analysis hooked into the host's run.
///
/// The host calls `setup_job` once, `initialize` once before the first event,
/// `execute` for every event, and `finalize` once at the end.
pub trait EventAlgorithm {
    fn name(&self) -> &str;

    fn setup_job(&mut self, job: &mut Job) -> Result<(), EngineError>;

    fn initialize(&mut self, sink: &mut dyn NtupleSink) -> Result<(), EngineError>;

    fn execute(
        &mut self,
        event: &EventStore,
        sink: &mut dyn NtupleSink,
    ) -> Result<Outcome, EngineError>;

    fn finalize(&mut self) -> Result<(), EngineError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    JobConfigured,
    Initialized,
    Finalized,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Created => "created",
            Phase::JobConfigured => "job-configured",
            Phase::Initialized => "initialized",
            Phase::Finalized => "finalized",
        }
    }
}

/// Writes one ntuple row for every event that matches the decay topology.
#[derive(Debug)]
pub struct NtupleMaker {
    config: AnalysisConfig,
    selector: TopologySelector,
    phase: Phase,
}

impl NtupleMaker {
    pub fn new(config: AnalysisConfig) -> Self {
        let selector = TopologySelector::new(config.topology);
        Self {
            config,
            selector,
            phase: Phase::Created,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn require(&self, expected: Phase) -> Result<(), EngineError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(EngineError::Lifecycle {
                expected: expected.name(),
                found: self.phase.name(),
            })
        }
    }
}

impl EventAlgorithm for NtupleMaker {
    fn name(&self) -> &str {
        "NtupleMaker"
    }

    fn setup_job(&mut self, job: &mut Job) -> Result<(), EngineError> {
        self.require(Phase::Created)?;
        self.config.topology.validate()?;
        let stream = OutputStream {
            name: self.config.ntuple.output_file_name.clone(),
        };
        if !job.add_output(stream) {
            debug!(
                stream = %self.config.ntuple.output_file_name,
                "Output stream already declared by another algorithm."
            );
        }
        self.phase = Phase::JobConfigured;
        Ok(())
    }

    fn initialize(&mut self, sink: &mut dyn NtupleSink) -> Result<(), EngineError> {
        self.require(Phase::JobConfigured)?;
        let branches = schema::branch_names();
        sink.setup_branches(&branches)
            .map_err(|source| EngineError::SchemaSetup { source })?;
        info!(
            tree = %self.config.ntuple.output_tree_name,
            branches = branches.len(),
            "Ntuple booked."
        );
        self.phase = Phase::Initialized;
        Ok(())
    }

    fn execute(
        &mut self,
        event: &EventStore,
        sink: &mut dyn NtupleSink,
    ) -> Result<Outcome, EngineError> {
        self.require(Phase::Initialized)?;
        let ntuple = &self.config.ntuple;

        let info = *event
            .event_info(&ntuple.event_info_key)
            .ok_or_else(|| EngineError::MissingInput {
                key: ntuple.event_info_key.clone(),
            })?;
        if ntuple.debug {
            info!(
                run = info.run_number,
                event = info.event_number,
                "Calling execute."
            );
        }

        let collection = event.collection(&ntuple.truth_collection);
        match self.selector.process_event(collection) {
            Ok(topology) => {
                let record = schema::build_record(&info, &topology);
                sink.fill(&record)
                    .map_err(|source| EngineError::Sink { source })?;
                Ok(Outcome::Emitted)
            }
            Err(reason) => {
                debug!(event = info.event_number, %reason, "Event skipped.");
                Ok(reason.outcome())
            }
        }
    }

    fn finalize(&mut self) -> Result<(), EngineError> {
        self.require(Phase::Initialized)?;
        self.phase = Phase::Finalized;
        Ok(())
    }
}
