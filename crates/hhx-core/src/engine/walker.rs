use crate::core::models::ids::ParticleId;
use crate::core::models::table::ParticleTable;
use tracing::trace;

/// Follows a particle down its chain of same-species copies.
///
/// At each step the first child (in decay-record order) whose species equals
/// the current particle's species, sign ignored, becomes the new current
/// particle. The walk stops at a particle without such a child and returns it.
/// A particle that is not a member of `table` is returned unchanged.
/// Tables from [`ParticleTableBuilder`](crate::core::models::table::ParticleTableBuilder)
/// are acyclic, so the walk always terminates.
pub fn resolve_final_state(table: &ParticleTable, start: ParticleId) -> ParticleId {
    let mut current = start;
    loop {
        let Some(particle) = table.particle(current) else {
            return current;
        };
        let species = particle.pdg_id;
        let next = table
            .children_of(current)
            .find(|(_, child)| child.pdg_id.matches_species(species))
            .map(|(id, _)| id);

        match next {
            Some(child) => {
                trace!(
                    barcode = particle.barcode,
                    species = %species,
                    "Following same-species copy."
                );
                current = child;
            }
            None => return current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::particle::{FourMomentum, Particle};
    use crate::core::models::species::PdgId;
    use crate::core::models::table::ParticleTableBuilder;

    fn part(barcode: i64, pdg: i32, pt: f64) -> Particle {
        Particle::new(barcode, PdgId(pdg), 2, FourMomentum::new(pt, 0.0, 0.0, 0.0, pt))
    }

    fn table(particles: &[(i64, i32, f64)], decays: &[(i64, &[i64])]) -> ParticleTable {
        let mut builder = ParticleTableBuilder::new();
        for &(barcode, pdg, pt) in particles {
            builder.add_particle(part(barcode, pdg, pt)).unwrap();
        }
        for (parent, children) in decays {
            builder.add_decay_by_barcode(*parent, children.to_vec());
        }
        builder.build().unwrap()
    }

    fn barcode_of(table: &ParticleTable, id: ParticleId) -> i64 {
        table.particle(id).unwrap().barcode
    }

    #[test]
    fn particle_without_same_species_child_is_its_own_final_state() {
        let t = table(&[(1, 25, 10.0), (2, 5, 4.0), (3, -5, 3.0)], &[(1, &[2, 3])]);
        let start = t.find_by_barcode(1).unwrap();
        assert_eq!(resolve_final_state(&t, start), start);

        let leaf = t.find_by_barcode(2).unwrap();
        assert_eq!(resolve_final_state(&t, leaf), leaf);
    }

    #[test]
    fn walks_through_a_chain_of_copies() {
        let t = table(
            &[(1, 25, 10.0), (2, 25, 11.0), (3, 22, 1.0), (4, 25, 12.0), (5, 5, 6.0)],
            &[(1, &[2, 3]), (2, &[4]), (4, &[5])],
        );
        let start = t.find_by_barcode(1).unwrap();
        assert_eq!(barcode_of(&t, resolve_final_state(&t, start)), 4);
    }

    #[test]
    fn first_same_species_child_wins() {
        let t = table(
            &[(1, 25, 10.0), (2, 22, 1.0), (3, 25, 5.0), (4, 25, 50.0)],
            &[(1, &[2, 3, 4])],
        );
        let start = t.find_by_barcode(1).unwrap();
        assert_eq!(barcode_of(&t, resolve_final_state(&t, start)), 3);
    }

    #[test]
    fn species_match_ignores_charge_sign() {
        let t = table(&[(1, 5, 10.0), (2, -5, 9.0)], &[(1, &[2])]);
        let start = t.find_by_barcode(1).unwrap();
        assert_eq!(barcode_of(&t, resolve_final_state(&t, start)), 2);
    }
}
