//! Fixed layout of the output ntuple.
//!
//! One row holds the event identity, the parent count and five kinematic
//! quantities for each of the ten matched objects. Momentum, mass and energy
//! are converted from MeV to GeV; angles are copied unchanged.

use super::selector::{MatchedParticle, TopologyMatch};
use crate::core::io::ntuple::{FieldValue, NtupleRecord};
use crate::core::models::event::EventInfo;

pub const MEV_PER_GEV: f64 = 1000.0;

pub const EVENT_BRANCHES: [&str; 4] = ["runNumber", "eventNumber", "channelNumber", "nNeutralinos"];

/// Object prefixes in row order: parents, bosons, companions, then the quark
/// pair of each boson.
pub const OBJECT_PREFIXES: [&str; 10] = [
    "N1", "N2", "H1", "H2", "G1", "G2", "b11", "b12", "b21", "b22",
];

pub const KINEMATIC_SUFFIXES: [&str; 5] = ["Pt", "Eta", "Phi", "M", "E"];

pub const BRANCH_COUNT: usize =
    EVENT_BRANCHES.len() + OBJECT_PREFIXES.len() * KINEMATIC_SUFFIXES.len();

pub fn branch_names() -> Vec<String> {
    let mut names = Vec::with_capacity(BRANCH_COUNT);
    names.extend(EVENT_BRANCHES.iter().map(|name| name.to_string()));
    for prefix in OBJECT_PREFIXES {
        for suffix in KINEMATIC_SUFFIXES {
            names.push(format!("{}_{}", prefix, suffix));
        }
    }
    names
}

/// Builds the complete row for a matched event.
pub fn build_record(info: &EventInfo, topology: &TopologyMatch) -> NtupleRecord {
    let mut record = NtupleRecord::with_capacity(BRANCH_COUNT);
    record.set("runNumber", FieldValue::Int(i64::from(info.run_number)));
    record.set("eventNumber", FieldValue::UInt(info.event_number));
    record.set("channelNumber", FieldValue::Int(i64::from(info.channel_number)));
    record.set(
        "nNeutralinos",
        FieldValue::Int(topology.parent_count() as i64),
    );

    let [first, second] = &topology.branches;
    let objects: [&MatchedParticle; 10] = [
        &first.parent,
        &second.parent,
        &first.boson,
        &second.boson,
        &first.companion,
        &second.companion,
        &first.quarks[0],
        &first.quarks[1],
        &second.quarks[0],
        &second.quarks[1],
    ];

    for (prefix, object) in OBJECT_PREFIXES.iter().zip(objects) {
        let p4 = object.momentum.scaled(MEV_PER_GEV);
        let values = [p4.pt, p4.eta, p4.phi, p4.m, p4.e];
        for (suffix, value) in KINEMATIC_SUFFIXES.iter().zip(values) {
            record.set(format!("{}_{}", prefix, suffix), FieldValue::Float(value));
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::particle::{FourMomentum, Particle};
    use crate::core::models::species::PdgId;
    use crate::core::models::table::{ParticleTable, ParticleTableBuilder};
    use crate::engine::selector::TopologySelector;

    fn matched_table() -> ParticleTable {
        let rows: [(i64, i32, f64, f64, f64, f64, f64); 10] = [
            (1, 1000022, 500_000.0, 0.5, 1.0, 300_000.0, 800_000.0),
            (2, 1000022, 300_000.0, -0.7, -2.0, 300_000.0, 600_000.0),
            (3, 25, 200_000.0, 0.3, 0.9, 125_000.0, 400_000.0),
            (4, 1000039, 100_000.0, 1.1, 1.2, 0.0, 150_000.0),
            (5, 25, 150_000.0, -0.4, -1.9, 125_000.0, 350_000.0),
            (6, 1000039, 90_000.0, -1.2, 2.9, 0.0, 120_000.0),
            (7, 5, 80_000.0, 0.2, 0.8, 4_800.0, 90_000.0),
            (8, -5, 40_000.0, 0.4, 1.3, 4_800.0, 45_000.0),
            (9, 5, 30_000.0, -0.1, -2.5, 4_800.0, 31_000.0),
            (10, -5, 70_000.0, -0.6, -1.0, 4_800.0, 88_000.0),
        ];
        let mut builder = ParticleTableBuilder::new();
        for (barcode, pdg, pt, eta, phi, m, e) in rows {
            builder
                .add_particle(Particle::new(
                    barcode,
                    PdgId(pdg),
                    2,
                    FourMomentum::new(pt, eta, phi, m, e),
                ))
                .unwrap();
        }
        builder
            .add_decay_by_barcode(1, vec![3, 4])
            .add_decay_by_barcode(2, vec![5, 6])
            .add_decay_by_barcode(3, vec![8, 7])
            .add_decay_by_barcode(5, vec![9, 10]);
        builder.build().unwrap()
    }

    fn record() -> (ParticleTable, NtupleRecord) {
        let table = matched_table();
        let topology = TopologySelector::default().select(&table).unwrap();
        let info = EventInfo::new(284500, 1_234_567, 999_999);
        let record = build_record(&info, &topology);
        (table, record)
    }

    fn float(record: &NtupleRecord, name: &str) -> f64 {
        match record.get(name) {
            Some(FieldValue::Float(v)) => v,
            other => panic!("branch {} is not a float: {:?}", name, other),
        }
    }

    #[test]
    fn schema_has_fifty_four_unique_branches() {
        let names = branch_names();
        assert_eq!(names.len(), 54);
        assert_eq!(names.len(), BRANCH_COUNT);
        assert_eq!(&names[..4], &EVENT_BRANCHES.map(String::from));
        assert_eq!(names[4], "N1_Pt");
        assert_eq!(names[53], "b22_E");
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), 54);
    }

    #[test]
    fn record_follows_the_schema_order() {
        let (_, record) = record();
        assert!(record.names().eq(branch_names().iter().map(String::as_str)));
    }

    #[test]
    fn event_identity_and_parent_count_are_integers() {
        let (_, record) = record();
        assert_eq!(record.get("runNumber"), Some(FieldValue::Int(284500)));
        assert_eq!(record.get("eventNumber"), Some(FieldValue::UInt(1_234_567)));
        assert_eq!(record.get("channelNumber"), Some(FieldValue::Int(999_999)));
        assert_eq!(record.get("nNeutralinos"), Some(FieldValue::Int(2)));
    }

    #[test]
    fn leading_objects_come_first() {
        let (_, record) = record();
        assert_eq!(float(&record, "N1_Pt"), 500.0);
        assert_eq!(float(&record, "N2_Pt"), 300.0);
        assert_eq!(float(&record, "H1_Pt"), 200.0);
        assert_eq!(float(&record, "G2_Pt"), 90.0);
        assert_eq!(float(&record, "b11_Pt"), 80.0);
        assert_eq!(float(&record, "b12_Pt"), 40.0);
        assert_eq!(float(&record, "b21_Pt"), 70.0);
        assert_eq!(float(&record, "b22_Pt"), 30.0);
        assert!(float(&record, "b11_Pt") > float(&record, "b12_Pt"));
    }

    #[test]
    fn energies_are_converted_and_angles_pass_through() {
        let (table, record) = record();
        let inputs = [
            ("N1", 1),
            ("N2", 2),
            ("H1", 3),
            ("H2", 5),
            ("G1", 4),
            ("G2", 6),
            ("b11", 7),
            ("b12", 8),
            ("b21", 10),
            ("b22", 9),
        ];
        for (prefix, barcode) in inputs {
            let id = table.find_by_barcode(barcode).unwrap();
            let p4 = table.particle(id).unwrap().momentum;
            assert_eq!(float(&record, &format!("{prefix}_Pt")), p4.pt / 1000.0);
            assert_eq!(float(&record, &format!("{prefix}_M")), p4.m / 1000.0);
            assert_eq!(float(&record, &format!("{prefix}_E")), p4.e / 1000.0);
            assert_eq!(float(&record, &format!("{prefix}_Eta")), p4.eta);
            assert_eq!(float(&record, &format!("{prefix}_Phi")), p4.phi);
        }
    }

    #[test]
    fn repeated_builds_are_bit_identical() {
        let table = matched_table();
        let selector = TopologySelector::default();
        let info = EventInfo::new(1, 2, 3);
        let first = build_record(&info, &selector.select(&table).unwrap());
        let second = build_record(&info, &selector.select(&table).unwrap());
        let bits = |r: &NtupleRecord| r.values().map(|v| v.as_f64().to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
    }
}
