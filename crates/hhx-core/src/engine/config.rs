use crate::core::models::species::PdgId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Species codes assigned to each structural role of the decay topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyConfig {
    pub parent: PdgId,
    pub boson: PdgId,
    pub companion: PdgId,
    pub quark: PdgId,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            parent: PdgId::NEUTRALINO_1,
            boson: PdgId::HIGGS,
            companion: PdgId::GRAVITINO,
            quark: PdgId::BOTTOM,
        }
    }
}

impl TopologyConfig {
    fn roles(&self) -> [(&'static str, PdgId); 4] {
        [
            ("parent", self.parent),
            ("boson", self.boson),
            ("companion", self.companion),
            ("quark", self.quark),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let roles = self.roles();
        for (i, (name, code)) in roles.iter().enumerate() {
            if code.abs() == 0 {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: "particle code must be non-zero".to_string(),
                });
            }
            if let Some((other, _)) = roles[..i]
                .iter()
                .find(|(_, earlier)| earlier.matches_species(*code))
            {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("species {} is already used for the {} role", code, other),
                });
            }
        }
        Ok(())
    }
}

/// Naming of inputs and outputs of the ntuple-making algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NtupleConfig {
    /// Name of the declared output stream.
    pub output_file_name: String,
    /// Name of the table written into the output stream.
    pub output_tree_name: String,
    /// Store key of the event-identity record.
    pub event_info_key: String,
    /// Store key of the truth-particle collection.
    pub truth_collection: String,
    /// Log every processed event at info level.
    pub debug: bool,
}

impl Default for NtupleConfig {
    fn default() -> Self {
        Self {
            output_file_name: "TruthNtuple".to_string(),
            output_tree_name: "TruthTree".to_string(),
            event_info_key: "EventInfo".to_string(),
            truth_collection: "TruthParticles".to_string(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalysisConfig {
    pub topology: TopologyConfig,
    pub ntuple: NtupleConfig,
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    parent: Option<PdgId>,
    boson: Option<PdgId>,
    companion: Option<PdgId>,
    quark: Option<PdgId>,
    output_file_name: Option<String>,
    output_tree_name: Option<String>,
    event_info_key: Option<String>,
    truth_collection: Option<String>,
    debug: Option<bool>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topology(mut self, topology: TopologyConfig) -> Self {
        self.parent = Some(topology.parent);
        self.boson = Some(topology.boson);
        self.companion = Some(topology.companion);
        self.quark = Some(topology.quark);
        self
    }
    pub fn parent(mut self, code: PdgId) -> Self {
        self.parent = Some(code);
        self
    }
    pub fn boson(mut self, code: PdgId) -> Self {
        self.boson = Some(code);
        self
    }
    pub fn companion(mut self, code: PdgId) -> Self {
        self.companion = Some(code);
        self
    }
    pub fn quark(mut self, code: PdgId) -> Self {
        self.quark = Some(code);
        self
    }
    pub fn output_file_name(mut self, name: impl Into<String>) -> Self {
        self.output_file_name = Some(name.into());
        self
    }
    pub fn output_tree_name(mut self, name: impl Into<String>) -> Self {
        self.output_tree_name = Some(name.into());
        self
    }
    pub fn event_info_key(mut self, key: impl Into<String>) -> Self {
        self.event_info_key = Some(key.into());
        self
    }
    pub fn truth_collection(mut self, key: impl Into<String>) -> Self {
        self.truth_collection = Some(key.into());
        self
    }
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let topology = TopologyConfig {
            parent: self.parent.ok_or(ConfigError::MissingParameter("parent"))?,
            boson: self.boson.ok_or(ConfigError::MissingParameter("boson"))?,
            companion: self
                .companion
                .ok_or(ConfigError::MissingParameter("companion"))?,
            quark: self.quark.ok_or(ConfigError::MissingParameter("quark"))?,
        };
        topology.validate()?;

        let ntuple = NtupleConfig {
            output_file_name: non_empty(self.output_file_name, "output_file_name")?,
            output_tree_name: non_empty(self.output_tree_name, "output_tree_name")?,
            event_info_key: non_empty(self.event_info_key, "event_info_key")?,
            truth_collection: non_empty(self.truth_collection, "truth_collection")?,
            debug: self.debug.unwrap_or(false),
        };
        Ok(AnalysisConfig { topology, ntuple })
    }
}

fn non_empty(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    let value = value.ok_or(ConfigError::MissingParameter(name))?;
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidParameter {
            name,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::new()
            .topology(TopologyConfig::default())
            .output_file_name("TruthNtuple")
            .output_tree_name("TruthTree")
            .event_info_key("EventInfo")
            .truth_collection("TruthParticles")
    }

    #[test]
    fn builds_with_all_parameters() {
        let config = complete_builder().build().unwrap();
        assert_eq!(config.topology, TopologyConfig::default());
        assert_eq!(config.ntuple.output_tree_name, "TruthTree");
        assert!(!config.ntuple.debug);
    }

    #[test]
    fn missing_parameter_is_reported_by_name() {
        let result = AnalysisConfigBuilder::new()
            .topology(TopologyConfig::default())
            .output_file_name("TruthNtuple")
            .event_info_key("EventInfo")
            .truth_collection("TruthParticles")
            .build();
        assert_eq!(
            result,
            Err(ConfigError::MissingParameter("output_tree_name"))
        );

        let result = AnalysisConfigBuilder::new().build();
        assert_eq!(result, Err(ConfigError::MissingParameter("parent")));
    }

    #[test]
    fn blank_names_are_invalid() {
        let result = complete_builder().truth_collection("  ").build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "truth_collection",
                ..
            })
        ));
    }

    #[test]
    fn role_codes_must_be_distinct_species() {
        let result = complete_builder().quark(PdgId(-25)).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name: "quark", .. })
        ));

        let result = complete_builder().boson(PdgId(0)).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name: "boson", .. })
        ));
    }

    #[test]
    fn defaults_name_the_standard_inputs() {
        let config = AnalysisConfig::default();
        assert_eq!(config.ntuple.output_file_name, "TruthNtuple");
        assert_eq!(config.ntuple.event_info_key, "EventInfo");
        assert_eq!(config.ntuple.truth_collection, "TruthParticles");
        assert_eq!(config.topology.quark, PdgId::BOTTOM);
        assert!(config.topology.validate().is_ok());
    }

    #[test]
    fn individual_role_setters_override_topology() {
        let config = complete_builder().boson(PdgId(23)).build().unwrap();
        assert_eq!(config.topology.boson, PdgId(23));
        assert_eq!(config.topology.parent, PdgId::NEUTRALINO_1);
    }
}
