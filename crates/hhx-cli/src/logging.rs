use crate::cli::Cli;
use crate::error::Result;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Subscriber;
use tracing_subscriber::{
    Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
    registry::LookupSpan,
};

/// Console threshold and optional log file, resolved from the global flags.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl LogSettings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self::new(cli.verbose, cli.quiet, cli.log_file.clone())
    }

    /// `quiet` keeps errors visible. Each `-v` lowers the threshold one level from WARN.
    pub fn new(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Self {
        let level = match (quiet, verbosity) {
            (true, _) => LevelFilter::ERROR,
            (false, 0) => LevelFilter::WARN,
            (false, 1) => LevelFilter::INFO,
            (false, 2) => LevelFilter::DEBUG,
            (false, _) => LevelFilter::TRACE,
        };
        Self { level, log_file }
    }
}

/// Plain-text layer behind `--log-file`.
///
/// Missing parent directories are created. Span closures are recorded so the
/// file shows how long the event loop ran.
fn file_layer<S>(path: &Path) -> Result<impl Layer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let file = File::create(path)?;
    Ok(fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE))
}

pub fn setup_logging(settings: LogSettings) -> Result<()> {
    let file = match settings.log_file.as_deref() {
        Some(path) => Some(file_layer(path)?),
        None => None,
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(settings.level)
        .with(stderr_layer)
        .with(file)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use clap::Parser;
    use serial_test::serial;
    use tracing::{debug, info_span};

    #[test]
    fn flags_map_to_console_levels() {
        let level = |v, q| LogSettings::new(v, q, None).level;
        assert_eq!(level(0, false), LevelFilter::WARN);
        assert_eq!(level(1, false), LevelFilter::INFO);
        assert_eq!(level(2, false), LevelFilter::DEBUG);
        assert_eq!(level(7, false), LevelFilter::TRACE);
        assert_eq!(level(0, true), LevelFilter::ERROR);
    }

    #[test]
    fn settings_follow_the_global_flags() {
        let cli = Cli::parse_from(["hhx", "-vv", "--log-file", "logs/run.log", "schema"]);
        assert_eq!(
            LogSettings::from_cli(&cli),
            LogSettings {
                level: LevelFilter::DEBUG,
                log_file: Some(PathBuf::from("logs/run.log")),
            }
        );
    }

    #[test]
    fn log_file_records_the_workflow_span() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("logs").join("run.log");
        let subscriber = tracing_subscriber::registry().with(file_layer(&log_path).unwrap());

        tracing::subscriber::with_default(subscriber, || {
            let span = info_span!("ntuple_workflow", algorithm = "NtupleMaker");
            let _entered = span.enter();
            debug!(event = 7, "Event skipped.");
        });

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("Event skipped."));
        assert!(content.contains("event=7"));
        assert!(content.contains("ntuple_workflow"));
        assert!(content.contains("NtupleMaker"));
        assert!(content.contains("time.busy"));
        assert!(!content.contains('\u{1b}'));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_is_an_io_error() {
        let invalid_path = PathBuf::from("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let result = setup_logging(LogSettings::new(0, false, Some(invalid_path)));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
