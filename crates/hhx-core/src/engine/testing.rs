//! Event fixtures shared by the engine and workflow tests.

use crate::core::models::event::{EventInfo, EventStore};
use crate::core::models::particle::{FourMomentum, Particle};
use crate::core::models::species::PdgId;
use crate::core::models::table::{ParticleTable, ParticleTableBuilder};

const MATCHED_DECAYS: [(i64, &[i64]); 4] = [(1, &[3, 4]), (2, &[5, 6]), (3, &[7, 8]), (5, &[9, 10])];

/// Two neutralinos (500 and 300 GeV pT), each decaying to a Higgs and a
/// gravitino, with both Higgs bosons decaying to a b pair. Values in MeV.
pub(crate) fn matched_table() -> ParticleTable {
    table(&[], &MATCHED_DECAYS)
}

/// Same event, but the second Higgs decays to three b quarks.
pub(crate) fn three_body_table() -> ParticleTable {
    table(
        &[(11, 5, 10_000.0)],
        &[(1, &[3, 4]), (2, &[5, 6]), (3, &[7, 8]), (5, &[9, 10, 11])],
    )
}

/// Matched event plus a third, undecayed neutralino.
pub(crate) fn three_parent_table() -> ParticleTable {
    table(&[(12, 1000022, 50_000.0)], &MATCHED_DECAYS)
}

/// The second neutralino decays to its gravitino only.
pub(crate) fn missing_boson_table() -> ParticleTable {
    table(&[], &[(1, &[3, 4]), (2, &[6]), (3, &[7, 8]), (5, &[9, 10])])
}

fn table(extra: &[(i64, i32, f64)], decays: &[(i64, &[i64])]) -> ParticleTable {
    let rows = [
        (1, 1000022, 500_000.0),
        (2, -1000022, 300_000.0),
        (3, 25, 200_000.0),
        (4, 1000039, 100_000.0),
        (5, 25, 150_000.0),
        (6, 1000039, 90_000.0),
        (7, 5, 80_000.0),
        (8, -5, 40_000.0),
        (9, 5, 70_000.0),
        (10, -5, 30_000.0),
    ];
    let mut builder = ParticleTableBuilder::new();
    for &(barcode, pdg, pt) in rows.iter().chain(extra) {
        let momentum = FourMomentum::new(pt, 0.25, -1.5, 1_000.0, 2.0 * pt);
        builder
            .add_particle(Particle::new(barcode, PdgId(pdg), 2, momentum))
            .unwrap();
    }
    for (parent, children) in decays {
        builder.add_decay_by_barcode(*parent, children.to_vec());
    }
    builder.build().unwrap()
}

pub(crate) fn event(event_number: u64, table: Option<ParticleTable>) -> EventStore {
    let mut store = EventStore::with_info("EventInfo", EventInfo::new(410000, event_number, 999_999));
    if let Some(table) = table {
        store.insert_collection("TruthParticles", table);
    }
    store
}
