//! # Core Models Module
//!
//! Data structures describing the generator record of a single event.
//!
//! ## Key Components
//!
//! - [`species`] - Signed particle codes with sign-insensitive species matching
//! - [`particle`] - A truth particle and its four-momentum
//! - [`table`] - Arena of particles for one collection, with the decay graph as handles
//! - [`event`] - Event identity and the per-event key-by-name object store
//! - [`ids`] - Handle types into the particle arena
//!
//! ## Usage
//!
//! ```ignore
//! use hhxtruth::core::models::{particle::*, species::PdgId, table::ParticleTableBuilder};
//!
//! let mut builder = ParticleTableBuilder::new();
//! let h = builder.add_particle(Particle::new(1, PdgId::HIGGS, 22, FourMomentum::default()))?;
//! let b = builder.add_particle(Particle::new(2, PdgId::BOTTOM, 23, FourMomentum::default()))?;
//! builder.add_child(h, b)?;
//! let table = builder.build()?;
//! ```

pub mod event;
pub mod ids;
pub mod particle;
pub mod species;
pub mod table;
