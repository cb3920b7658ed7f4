pub mod defaults;
pub mod models;

use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use hhxtruth::core::models::species::PdgId;
use hhxtruth::engine::config as core_config;
use models::AppConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    #[serde(rename = "file-name")]
    file_name: Option<String>,
    #[serde(rename = "tree-name")]
    tree_name: Option<String>,
    debug: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialInputConfig {
    #[serde(rename = "event-info-key")]
    event_info_key: Option<String>,
    #[serde(rename = "truth-collection")]
    truth_collection: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialTopologyConfig {
    parent: Option<i32>,
    boson: Option<i32>,
    companion: Option<i32>,
    quark: Option<i32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAnalysisConfig {
    output: Option<PartialOutputConfig>,
    input: Option<PartialInputConfig>,
    topology: Option<PartialTopologyConfig>,
}

impl PartialAnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Resolves the final settings: CLI arguments win over `--set` values,
    /// which win over the file, which wins over the built-in defaults.
    pub fn merge_with_cli(mut self, args: &RunArgs) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;
        let defaults = DefaultsConfig::default();

        let output = self.output.take().unwrap_or_default();
        let input = self.input.take().unwrap_or_default();
        let topology = self.topology.take().unwrap_or_default();

        let pick = |value: Option<i32>, default: PdgId| value.map(PdgId::new).unwrap_or(default);

        let analysis = core_config::AnalysisConfigBuilder::new()
            .parent(pick(topology.parent, defaults.parent))
            .boson(pick(topology.boson, defaults.boson))
            .companion(pick(topology.companion, defaults.companion))
            .quark(pick(topology.quark, defaults.quark))
            .output_file_name(
                args.file_name
                    .clone()
                    .or(output.file_name)
                    .unwrap_or(defaults.output_file_name),
            )
            .output_tree_name(
                args.tree_name
                    .clone()
                    .or(output.tree_name)
                    .unwrap_or(defaults.output_tree_name),
            )
            .event_info_key(input.event_info_key.unwrap_or(defaults.event_info_key))
            .truth_collection(input.truth_collection.unwrap_or(defaults.truth_collection))
            .debug(args.debug || output.debug.unwrap_or(defaults.debug))
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        Ok(AppConfig {
            input_path: args.input.clone(),
            output_dir: args.output.clone(),
            analysis,
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            let code = || -> Result<Option<i32>> {
                value_str.parse::<PdgId>().map(|id| Some(id.code())).map_err(|_| {
                    CliError::Config(format!(
                        "Invalid particle code for {}: {}",
                        key, value_str
                    ))
                })
            };

            match key {
                "output.file-name" => {
                    self.output.get_or_insert_with(Default::default).file_name =
                        Some(value_str.to_string());
                }
                "output.tree-name" => {
                    self.output.get_or_insert_with(Default::default).tree_name =
                        Some(value_str.to_string());
                }
                "output.debug" => {
                    self.output.get_or_insert_with(Default::default).debug =
                        Some(value_str.parse().map_err(|_| {
                            CliError::Config(format!(
                                "Invalid boolean value for {}: {}",
                                key, value_str
                            ))
                        })?);
                }
                "input.event-info-key" => {
                    self.input.get_or_insert_with(Default::default).event_info_key =
                        Some(value_str.to_string());
                }
                "input.truth-collection" => {
                    self.input.get_or_insert_with(Default::default).truth_collection =
                        Some(value_str.to_string());
                }
                "topology.parent" => {
                    self.topology.get_or_insert_with(Default::default).parent = code()?;
                }
                "topology.boson" => {
                    self.topology.get_or_insert_with(Default::default).boson = code()?;
                }
                "topology.companion" => {
                    self.topology.get_or_insert_with(Default::default).companion = code()?;
                }
                "topology.quark" => {
                    self.topology.get_or_insert_with(Default::default).quark = code()?;
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
