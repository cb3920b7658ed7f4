use hhxtruth::engine::config::AnalysisConfig;
use std::path::PathBuf;

/// Fully resolved settings of one `run` invocation.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    /// `<output dir>/<stream name>/<tree name>.csv`
    pub fn ntuple_path(&self) -> PathBuf {
        let ntuple = &self.analysis.ntuple;
        self.output_dir
            .join(&ntuple.output_file_name)
            .join(format!("{}.csv", ntuple.output_tree_name))
    }
}
