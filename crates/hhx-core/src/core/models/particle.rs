use super::ids::ParticleId;
use super::species::PdgId;

/// Kinematics of a particle in (pt, eta, phi, m, E) coordinates.
///
/// Momentum, mass and energy are in the storage units of the input record
/// (MeV); `eta` and `phi` are dimensionless.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FourMomentum {
    /// Transverse momentum.
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuthal angle in radians.
    pub phi: f64,
    /// Invariant mass.
    pub m: f64,
    /// Energy.
    pub e: f64,
}

impl FourMomentum {
    pub fn new(pt: f64, eta: f64, phi: f64, m: f64, e: f64) -> Self {
        Self { pt, eta, phi, m, e }
    }

    /// Returns a copy with `pt`, `m` and `e` divided by `divisor`.
    ///
    /// The angular coordinates are passed through untouched.
    pub fn scaled(&self, divisor: f64) -> Self {
        Self {
            pt: self.pt / divisor,
            eta: self.eta,
            phi: self.phi,
            m: self.m / divisor,
            e: self.e / divisor,
        }
    }
}

/// A generator-level particle as stored in a truth collection.
///
/// Children are stable handles into the owning
/// [`ParticleTable`](super::table::ParticleTable), in decay-record order.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Unique label of the particle within its collection.
    pub barcode: i64,
    /// Signed species code.
    pub pdg_id: PdgId,
    /// Generator status code.
    pub status: i32,
    /// Kinematics in storage units.
    pub momentum: FourMomentum,
    pub(crate) children: Vec<ParticleId>,
}

impl Particle {
    pub fn new(barcode: i64, pdg_id: PdgId, status: i32, momentum: FourMomentum) -> Self {
        Self {
            barcode,
            pdg_id,
            status,
            momentum,
            children: Vec::new(),
        }
    }

    /// Decay products of this particle, in record order.
    pub fn children(&self) -> &[ParticleId] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_divides_only_dimensionful_components() {
        let p4 = FourMomentum::new(500_000.0, -1.25, 2.5, 150_000.0, 900_000.0);
        let gev = p4.scaled(1000.0);

        assert_eq!(gev.pt, 500.0);
        assert_eq!(gev.m, 150.0);
        assert_eq!(gev.e, 900.0);
        assert_eq!(gev.eta, -1.25);
        assert_eq!(gev.phi, 2.5);
    }

    #[test]
    fn new_particle_has_no_children() {
        let particle = Particle::new(7, PdgId::HIGGS, 22, FourMomentum::default());
        assert!(particle.children().is_empty());
        assert_eq!(particle.momentum, FourMomentum::default());
    }
}
