use super::ids::ParticleId;
use super::particle::Particle;
use super::species::PdgId;
use slotmap::{SecondaryMap, SlotMap};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableBuildError {
    #[error("Duplicate particle barcode {0} in collection")]
    DuplicateBarcode(i64),
    #[error("Decay of barcode {parent} references unknown barcode {child}")]
    UnknownBarcode { parent: i64, child: i64 },
    #[error("Particle handle does not belong to this collection")]
    UnknownParticle,
    #[error("Particle with barcode {0} cannot decay into itself")]
    SelfDecay(i64),
    #[error("Decay records lead particle with barcode {0} back to itself")]
    DecayCycle(i64),
}

/// Read-only arena holding one truth-particle collection.
///
/// Particles are addressed through [`ParticleId`] handles, so the decay graph
/// (where a child may be shared by several parents) carries no ownership.
/// Iteration follows the order in which particles were added, which is the
/// native order of the collection.
#[derive(Debug, Clone, Default)]
pub struct ParticleTable {
    particles: SlotMap<ParticleId, Particle>,
    order: Vec<ParticleId>,
    barcode_map: HashMap<i64, ParticleId>,
}

impl ParticleTable {
    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates the collection in its native order.
    pub fn iter(&self) -> impl Iterator<Item = (ParticleId, &Particle)> {
        self.order
            .iter()
            .filter_map(move |&id| self.particles.get(id).map(|p| (id, p)))
    }

    pub fn find_by_barcode(&self, barcode: i64) -> Option<ParticleId> {
        self.barcode_map.get(&barcode).copied()
    }

    /// Iterates the children of `id` in decay-record order.
    ///
    /// Yields nothing if `id` is not part of this table.
    pub fn children_of(&self, id: ParticleId) -> impl Iterator<Item = (ParticleId, &Particle)> {
        self.particles
            .get(id)
            .map(|p| p.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |&child| self.particles.get(child).map(|p| (child, p)))
    }

    /// Iterates the particles of a given species (sign ignored) in collection order.
    pub fn particles_of_species(
        &self,
        species: PdgId,
    ) -> impl Iterator<Item = (ParticleId, &Particle)> {
        self.iter()
            .filter(move |(_, p)| p.pdg_id.matches_species(species))
    }
}

/// Incremental constructor for a [`ParticleTable`].
///
/// Decays can be recorded either by handle, immediately, or by barcode, in
/// which case they are resolved in [`ParticleTableBuilder::build`] so that a
/// decay record may precede the particles it references.
#[derive(Debug, Default)]
pub struct ParticleTableBuilder {
    table: ParticleTable,
    pending_decays: Vec<(i64, Vec<i64>)>,
}

impl ParticleTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_particle(&mut self, particle: Particle) -> Result<ParticleId, TableBuildError> {
        let barcode = particle.barcode;
        if self.table.barcode_map.contains_key(&barcode) {
            return Err(TableBuildError::DuplicateBarcode(barcode));
        }
        let id = self.table.particles.insert(particle);
        self.table.order.push(id);
        self.table.barcode_map.insert(barcode, id);
        Ok(id)
    }

    pub fn add_child(&mut self, parent: ParticleId, child: ParticleId) -> Result<(), TableBuildError> {
        if !self.table.particles.contains_key(child) {
            return Err(TableBuildError::UnknownParticle);
        }
        let parent_particle = self
            .table
            .particles
            .get_mut(parent)
            .ok_or(TableBuildError::UnknownParticle)?;
        if parent == child {
            return Err(TableBuildError::SelfDecay(parent_particle.barcode));
        }
        parent_particle.children.push(child);
        Ok(())
    }

    pub fn add_decay_by_barcode(&mut self, parent: i64, children: Vec<i64>) -> &mut Self {
        self.pending_decays.push((parent, children));
        self
    }

    pub fn build(mut self) -> Result<ParticleTable, TableBuildError> {
        let pending = std::mem::take(&mut self.pending_decays);
        for (parent_barcode, child_barcodes) in pending {
            let parent = self.resolve(parent_barcode, parent_barcode)?;
            for child_barcode in child_barcodes {
                let child = self.resolve(parent_barcode, child_barcode)?;
                self.add_child(parent, child)?;
            }
        }
        check_acyclic(&self.table)?;
        Ok(self.table)
    }

    fn resolve(&self, parent: i64, barcode: i64) -> Result<ParticleId, TableBuildError> {
        self.table
            .find_by_barcode(barcode)
            .ok_or(TableBuildError::UnknownBarcode {
                parent,
                child: barcode,
            })
    }
}

#[derive(Clone, Copy)]
enum Visit {
    Open,
    Done,
}

// Iterative depth-first search; a child that is still open closes a cycle.
fn check_acyclic(table: &ParticleTable) -> Result<(), TableBuildError> {
    let mut visits: SecondaryMap<ParticleId, Visit> = SecondaryMap::new();
    let mut stack: Vec<(ParticleId, usize)> = Vec::new();

    for &root in &table.order {
        if visits.contains_key(root) {
            continue;
        }
        visits.insert(root, Visit::Open);
        stack.push((root, 0));

        while let Some(top) = stack.last_mut() {
            let (id, next) = *top;
            let child = table
                .particles
                .get(id)
                .and_then(|p| p.children.get(next))
                .copied();
            match child {
                Some(child) => {
                    top.1 += 1;
                    match visits.get(child) {
                        Some(Visit::Open) => {
                            let barcode = table.particles.get(child).map_or(0, |p| p.barcode);
                            return Err(TableBuildError::DecayCycle(barcode));
                        }
                        Some(Visit::Done) => {}
                        None => {
                            visits.insert(child, Visit::Open);
                            stack.push((child, 0));
                        }
                    }
                }
                None => {
                    visits.insert(id, Visit::Done);
                    stack.pop();
                }
            }
        }
    }
    Ok(())
}
