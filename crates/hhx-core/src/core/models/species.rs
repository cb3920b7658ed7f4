use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static SPECIES_NAMES: Map<u32, &'static str> = phf_map! {
    1u32 => "d", 2u32 => "u", 3u32 => "s", 4u32 => "c", 5u32 => "b", 6u32 => "t",
    11u32 => "e", 12u32 => "nu_e", 13u32 => "mu", 14u32 => "nu_mu", 15u32 => "tau", 16u32 => "nu_tau",
    21u32 => "g", 22u32 => "gamma", 23u32 => "Z", 24u32 => "W", 25u32 => "h",
    1000022u32 => "chi1_0", 1000023u32 => "chi2_0", 1000039u32 => "G~",
};

/// A signed Monte Carlo particle code.
///
/// The sign distinguishes particle from antiparticle and the magnitude
/// identifies the species. Role matching throughout the analysis is done on
/// the magnitude only, through [`PdgId::matches_species`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PdgId(pub i32);

impl PdgId {
    /// Lightest neutralino, the topology-defining parent.
    pub const NEUTRALINO_1: PdgId = PdgId(1000022);
    /// Standard Model Higgs boson.
    pub const HIGGS: PdgId = PdgId(25);
    /// Gravitino, the invisible companion of the boson.
    pub const GRAVITINO: PdgId = PdgId(1000039);
    /// Bottom quark.
    pub const BOTTOM: PdgId = PdgId(5);

    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    pub const fn code(self) -> i32 {
        self.0
    }

    /// Magnitude of the code, i.e. the species irrespective of charge conjugation.
    pub const fn abs(self) -> u32 {
        self.0.unsigned_abs()
    }

    pub const fn is_antiparticle(self) -> bool {
        self.0 < 0
    }

    /// Returns `true` when `self` and `target` name the same species, ignoring sign.
    pub const fn matches_species(self, target: PdgId) -> bool {
        self.abs() == target.abs()
    }

    pub fn species_name(self) -> Option<&'static str> {
        SPECIES_NAMES.get(&self.abs()).copied()
    }
}

impl fmt::Display for PdgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.species_name() {
            Some(name) if self.is_antiparticle() => write!(f, "anti-{} ({})", name, self.0),
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid particle code '{0}'")]
pub struct ParsePdgIdError(pub String);

impl FromStr for PdgId {
    type Err = ParsePdgIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i32>()
            .map(PdgId)
            .map_err(|_| ParsePdgIdError(s.to_string()))
    }
}
