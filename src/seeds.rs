//! Seeds of the multi-start inverse kinematics.
//!
//! Numeric inverse kinematics only finds the solution basin its seed lies in. The pose solver
//! therefore tries a short list of seeds in a fixed priority order and stops at the first one
//! that produces a valid solution: the home configuration, then the base joint turned
//! 120° to either side, then the seed supplied by the caller (if any).

use crate::kinematic_traits::Joints;

/// Base joint offset of the two turned seeds.
pub const TURNED_SEED_OFFSET: f64 = 2.0 * std::f64::consts::PI / 3.0;

/// Ordered, finite sequence of seeds. Seeds are built only when requested, and a clone of the
/// sequence taken before iteration restarts it from the first seed.
#[derive(Debug, Clone)]
pub struct SeedSequence {
    dof: usize,
    canonical: bool,
    custom: Option<Joints>,
    position: usize,
}

impl SeedSequence {
    /// Home, base turned by -120°, base turned by +120°, then the custom seed if given.
    pub fn canonical(dof: usize, custom: Option<&[f64]>) -> Self {
        SeedSequence { dof, canonical: true, custom: custom.map(|c| c.to_vec()), position: 0 }
    }

    /// Just the given seed. Used for continuing from the previous solution, where jumping to
    /// a different solution branch is not wanted.
    pub fn continuing(seed: &[f64]) -> Self {
        SeedSequence { dof: seed.len(), canonical: false, custom: Some(seed.to_vec()), position: 0 }
    }

    fn canonical_count(&self) -> usize {
        if self.canonical { 3 } else { 0 }
    }

    fn turned(&self, offset: f64) -> Joints {
        let mut seed = vec![0.0; self.dof];
        if let Some(base) = seed.first_mut() {
            *base = offset;
        }
        seed
    }

    fn seed_at(&self, index: usize) -> Option<Joints> {
        match (self.canonical, index) {
            (true, 0) => Some(vec![0.0; self.dof]),
            (true, 1) => Some(self.turned(-TURNED_SEED_OFFSET)),
            (true, 2) => Some(self.turned(TURNED_SEED_OFFSET)),
            _ if index == self.canonical_count() => self.custom.clone(),
            _ => None,
        }
    }
}

impl Iterator for SeedSequence {
    type Item = Joints;

    fn next(&mut self) -> Option<Joints> {
        let seed = self.seed_at(self.position)?;
        self.position += 1;
        Some(seed)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let total = self.canonical_count() + usize::from(self.custom.is_some());
        let left = total.saturating_sub(self.position);
        (left, Some(left))
    }
}

impl ExactSizeIterator for SeedSequence {}
