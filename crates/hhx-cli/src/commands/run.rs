use crate::cli::RunArgs;
use crate::config::PartialAnalysisConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use hhxtruth::{
    core::io::{ntuple::CsvNtupleWriter, traits::EventFile, truth::TruthFile},
    engine::{
        algorithm::{EventAlgorithm, Job, NtupleMaker},
        error::EngineError,
        progress::ProgressReporter,
    },
    workflows,
};
use tracing::{info, warn};

pub fn run(args: RunArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialAnalysisConfig::from_file(path)?,
        None => PartialAnalysisConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let app_config = partial_config.merge_with_cli(&args)?;

    let input_path = &app_config.input_path;
    let parse_error = |source: anyhow::Error| CliError::FileParsing {
        path: input_path.clone(),
        source,
    };
    info!("Streaming truth records from {:?}", input_path);
    let events = TruthFile::open(input_path).map_err(|e| parse_error(e.into()))?;

    let mut maker = NtupleMaker::new(app_config.analysis.clone());
    let mut job = Job::new();
    maker.setup_job(&mut job)?;
    for stream in job.outputs() {
        std::fs::create_dir_all(app_config.output_dir.join(&stream.name))?;
    }

    let ntuple_path = app_config.ntuple_path();
    let mut sink = CsvNtupleWriter::create(&ntuple_path).map_err(|source| CliError::Output {
        path: ntuple_path.clone(),
        source,
    })?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Processing events from {} with {}...",
        input_path.display(),
        maker.name()
    );
    let summary = workflows::ntuple::run(&mut maker, events, &mut sink, &reporter).map_err(
        |err| match err {
            EngineError::Input { source } => parse_error(source.into()),
            other => other.into(),
        },
    )?;
    if summary.events_read == 0 {
        warn!("Input contained no events; the ntuple only holds its header.");
    }

    println!("{}", summary);
    println!(
        "✓ {} row(s) written to {}",
        summary.emitted(),
        ntuple_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;

    const EVENTS: &str = "\
BEGIN
INFO EventInfo 410000 11 999999
COLLECTION TruthParticles
PART 1 1000022 22 500000 0.5 1.0 300000 800000
PART 2 -1000022 22 300000 -0.7 -2.0 300000 600000
PART 3 25 22 200000 0.3 0.9 125000 400000
PART 4 1000039 1 100000 1.1 1.2 0 150000
PART 5 25 22 150000 -0.4 -1.9 125000 350000
PART 6 -1000039 1 90000 -1.2 2.9 0 120000
PART 7 5 23 80000 0.2 0.8 4800 90000
PART 8 -5 23 40000 0.4 1.3 4800 45000
PART 9 5 23 30000 -0.1 -2.5 4800 31000
PART 10 -5 23 70000 -0.6 -1.0 4800 88000
DECAY 1 3 4
DECAY 2 5 6
DECAY 3 8 7
DECAY 5 9 10
END
BEGIN
INFO EventInfo 410000 12 999999
END
";

    fn run_args(argv: &[&str]) -> RunArgs {
        match Cli::parse_from(argv).command {
            Commands::Run(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn writes_matched_events_to_the_tree_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("events.truth");
        fs::write(&input, EVENTS).unwrap();
        let output = dir.path().join("out");

        let args = run_args(&[
            "hhx",
            "run",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--tree-name",
            "Signal",
        ]);
        run(args).unwrap();

        let csv = fs::read_to_string(output.join("TruthNtuple").join("Signal.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("runNumber,eventNumber,channelNumber,nNeutralinos,"));
        assert!(lines[1].starts_with("410000,11,999999,2,500,0.5,1,300,800,"));
    }

    #[test]
    fn missing_input_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("absent.truth");

        let args = run_args(&[
            "hhx",
            "run",
            "-i",
            input.to_str().unwrap(),
            "-o",
            dir.path().to_str().unwrap(),
        ]);
        let err = run(args).unwrap_err();
        assert!(matches!(err, CliError::FileParsing { ref path, .. } if path == &input));
    }

    #[test]
    fn malformed_input_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.truth");
        fs::write(&input, "BEGIN\nPART 1 25\n").unwrap();

        let args = run_args(&[
            "hhx",
            "run",
            "-i",
            input.to_str().unwrap(),
            "-o",
            dir.path().to_str().unwrap(),
        ]);
        let err = run(args).unwrap_err();
        assert!(matches!(err, CliError::FileParsing { ref path, .. } if path == &input));
    }
}
