use hhxtruth::core::models::species::PdgId;

pub struct DefaultsConfig {
    pub output_file_name: String,
    pub output_tree_name: String,
    pub event_info_key: String,
    pub truth_collection: String,
    pub debug: bool,
    pub parent: PdgId,
    pub boson: PdgId,
    pub companion: PdgId,
    pub quark: PdgId,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_file_name: "TruthNtuple".to_string(),
            output_tree_name: "TruthTree".to_string(),
            event_info_key: "EventInfo".to_string(),
            truth_collection: "TruthParticles".to_string(),
            debug: false,
            parent: PdgId::NEUTRALINO_1,
            boson: PdgId::HIGGS,
            companion: PdgId::GRAVITINO,
            quark: PdgId::BOTTOM,
        }
    }
}
