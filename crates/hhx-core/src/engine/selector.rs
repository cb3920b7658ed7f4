use super::config::TopologyConfig;
use super::walker::resolve_final_state;
use crate::core::models::ids::ParticleId;
use crate::core::models::particle::{FourMomentum, Particle};
use crate::core::models::species::PdgId;
use crate::core::models::table::ParticleTable;
use std::cmp::Ordering;
use std::fmt;

/// Result of processing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Emitted,
    SkippedNoCollection,
    SkippedWrongParentCount,
    SkippedMissingDecayProduct,
    SkippedWrongBosonDecay,
}

impl Outcome {
    pub const ALL: [Outcome; 5] = [
        Outcome::Emitted,
        Outcome::SkippedNoCollection,
        Outcome::SkippedWrongParentCount,
        Outcome::SkippedMissingDecayProduct,
        Outcome::SkippedWrongBosonDecay,
    ];

    pub fn is_emitted(self) -> bool {
        self == Outcome::Emitted
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Emitted => "emitted",
            Outcome::SkippedNoCollection => "no truth collection",
            Outcome::SkippedWrongParentCount => "wrong parent count",
            Outcome::SkippedMissingDecayProduct => "missing decay product",
            Outcome::SkippedWrongBosonDecay => "wrong boson decay",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why an event did not match the topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoCollection,
    WrongParentCount {
        found: usize,
    },
    MissingDecayProduct {
        parent_barcode: i64,
        role: &'static str,
        species: PdgId,
    },
    WrongBosonDecay {
        boson_barcode: i64,
        children: usize,
        quarks: usize,
    },
}

impl SkipReason {
    pub fn outcome(&self) -> Outcome {
        match self {
            SkipReason::NoCollection => Outcome::SkippedNoCollection,
            SkipReason::WrongParentCount { .. } => Outcome::SkippedWrongParentCount,
            SkipReason::MissingDecayProduct { .. } => Outcome::SkippedMissingDecayProduct,
            SkipReason::WrongBosonDecay { .. } => Outcome::SkippedWrongBosonDecay,
        }
    }
}

impl From<&SkipReason> for Outcome {
    fn from(reason: &SkipReason) -> Self {
        reason.outcome()
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoCollection => write!(f, "truth particle collection is absent"),
            SkipReason::WrongParentCount { found } => {
                write!(f, "expected 2 distinct parents, found {}", found)
            }
            SkipReason::MissingDecayProduct {
                parent_barcode,
                role,
                species,
            } => write!(
                f,
                "parent {} has no {} child of species {}",
                parent_barcode, role, species
            ),
            SkipReason::WrongBosonDecay {
                boson_barcode,
                children,
                quarks,
            } => write!(
                f,
                "boson {} decays to {} children ({} quarks), expected exactly 2 quarks",
                boson_barcode, children, quarks
            ),
        }
    }
}

/// Snapshot of a particle that was assigned a role in the topology.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchedParticle {
    pub id: ParticleId,
    pub barcode: i64,
    pub pdg_id: PdgId,
    pub momentum: FourMomentum,
}

impl MatchedParticle {
    fn new(id: ParticleId, particle: &Particle) -> Self {
        Self {
            id,
            barcode: particle.barcode,
            pdg_id: particle.pdg_id,
            momentum: particle.momentum,
        }
    }
}

/// One parent together with the decay products attached to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayBranch {
    /// The collection entry that matched the parent species. Its children are
    /// the ones searched for the boson and the companion.
    pub parent_entry: ParticleId,
    /// Final state of the parent, which provides its kinematics.
    pub parent: MatchedParticle,
    /// Final state of the boson.
    pub boson: MatchedParticle,
    /// Final state of the companion.
    pub companion: MatchedParticle,
    /// Direct children of the final boson, highest pT first.
    pub quarks: [MatchedParticle; 2],
}

/// A fully matched event. Branches are ordered by descending parent pT.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopologyMatch {
    pub branches: [DecayBranch; 2],
}

impl TopologyMatch {
    pub fn parent_count(&self) -> usize {
        self.branches.len()
    }
}

struct ParentCandidate {
    entry: ParticleId,
    entry_barcode: i64,
    resolved: MatchedParticle,
}

struct DecayProducts {
    boson: MatchedParticle,
    companion: MatchedParticle,
}

/// Matches the two-parent decay topology in a truth-particle collection.
///
/// The selector is stateless; calling it repeatedly on the same collection
/// gives identical results.
#[derive(Debug, Clone, Default)]
pub struct TopologySelector {
    config: TopologyConfig,
}

impl TopologySelector {
    pub fn new(config: TopologyConfig) -> Self {
        Self { config }
    }

    pub fn process_event(
        &self,
        collection: Option<&ParticleTable>,
    ) -> Result<TopologyMatch, SkipReason> {
        match collection {
            Some(table) => self.select(table),
            None => Err(SkipReason::NoCollection),
        }
    }

    pub fn select(&self, table: &ParticleTable) -> Result<TopologyMatch, SkipReason> {
        let mut parents = self.parent_candidates(table);
        if parents.len() != 2 {
            return Err(SkipReason::WrongParentCount {
                found: parents.len(),
            });
        }
        parents.sort_by(|a, b| by_pt_descending(&a.resolved, &b.resolved));

        // Every parent must have both products before any boson decay is inspected.
        let mut products = Vec::with_capacity(parents.len());
        for candidate in &parents {
            products.push(self.decay_products(table, candidate)?);
        }

        let mut quark_pairs = Vec::with_capacity(products.len());
        for product in &products {
            quark_pairs.push(self.quark_pair(table, &product.boson)?);
        }

        let branch = |i: usize| DecayBranch {
            parent_entry: parents[i].entry,
            parent: parents[i].resolved,
            boson: products[i].boson,
            companion: products[i].companion,
            quarks: quark_pairs[i],
        };
        Ok(TopologyMatch {
            branches: [branch(0), branch(1)],
        })
    }

    fn parent_candidates(&self, table: &ParticleTable) -> Vec<ParentCandidate> {
        let mut candidates: Vec<ParentCandidate> = Vec::new();
        for (entry, particle) in table.particles_of_species(self.config.parent) {
            let resolved = resolve(table, entry, particle);
            if candidates.iter().any(|c| c.resolved.id == resolved.id) {
                continue;
            }
            candidates.push(ParentCandidate {
                entry,
                entry_barcode: particle.barcode,
                resolved,
            });
        }
        candidates
    }

    fn decay_products(
        &self,
        table: &ParticleTable,
        candidate: &ParentCandidate,
    ) -> Result<DecayProducts, SkipReason> {
        let find = |role: &'static str, species: PdgId| {
            table
                .children_of(candidate.entry)
                .find(|(_, child)| child.pdg_id.matches_species(species))
                .map(|(id, child)| resolve(table, id, child))
                .ok_or(SkipReason::MissingDecayProduct {
                    parent_barcode: candidate.entry_barcode,
                    role,
                    species,
                })
        };
        Ok(DecayProducts {
            boson: find("boson", self.config.boson)?,
            companion: find("companion", self.config.companion)?,
        })
    }

    fn quark_pair(
        &self,
        table: &ParticleTable,
        boson: &MatchedParticle,
    ) -> Result<[MatchedParticle; 2], SkipReason> {
        let children: Vec<(ParticleId, &Particle)> = table.children_of(boson.id).collect();
        let quarks = children
            .iter()
            .filter(|(_, child)| child.pdg_id.matches_species(self.config.quark))
            .count();

        match children.as_slice() {
            [(first_id, first), (second_id, second)] if quarks == 2 => {
                let mut pair = [
                    MatchedParticle::new(*first_id, first),
                    MatchedParticle::new(*second_id, second),
                ];
                pair.sort_by(by_pt_descending);
                Ok(pair)
            }
            _ => Err(SkipReason::WrongBosonDecay {
                boson_barcode: boson.barcode,
                children: children.len(),
                quarks,
            }),
        }
    }
}

fn resolve(table: &ParticleTable, id: ParticleId, particle: &Particle) -> MatchedParticle {
    let final_id = resolve_final_state(table, id);
    match table.particle(final_id) {
        Some(final_particle) => MatchedParticle::new(final_id, final_particle),
        None => MatchedParticle::new(id, particle),
    }
}

// Equal (or unordered) pT compares as Equal so the stable sort keeps input order.
fn by_pt_descending(a: &MatchedParticle, b: &MatchedParticle) -> Ordering {
    b.momentum
        .pt
        .partial_cmp(&a.momentum.pt)
        .unwrap_or(Ordering::Equal)
}
