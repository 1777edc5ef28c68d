// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Geometry
// ─────────────────────────────────────────────────────────────────────

use rand::Rng;
use rand_distr::{Distribution, UnitSphere};
use serde::{Deserialize, Serialize};

use sgen_types::{BoundaryCondition, DomainParameters};

pub type Point3 = [f64; 3];

#[inline]
pub fn plus(a: Point3, b: Point3) -> Point3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn minus(a: Point3, b: Point3) -> Point3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: Point3, s: f64) -> Point3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: Point3, b: Point3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn norm(a: Point3) -> f64 {
    dot(a, a).sqrt()
}

#[inline]
pub fn euclidean_distance(a: Point3, b: Point3) -> f64 {
    norm(minus(a, b))
}

/// Cosine of the angle between `a` and `b`, clamped to [-1, 1].
///
/// NaN when either vector has zero length.
pub fn cos_director(a: Point3, b: Point3) -> f64 {
    (dot(a, b) / (norm(a) * norm(b))).clamp(-1.0, 1.0)
}

/// Cosine between two spokes leaving the same node, or `None` when
/// either spoke has zero length (coincident endpoints). Such pairs
/// carry no angle and are left out of every cosine histogram.
pub fn spoke_cosine(a: Point3, b: Point3) -> Option<f64> {
    if norm(a) == 0.0 || norm(b) == 0.0 {
        return None;
    }
    Some(cos_director(a, b))
}

/// Vector of length `modulus` pointing in a uniformly random direction.
pub fn random_orientation<R: Rng + ?Sized>(modulus: f64, rng: &mut R) -> Point3 {
    let dir: [f64; 3] = UnitSphere.sample(rng);
    scale(dir, modulus)
}

/// Axis-aligned simulation box with one corner at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub size: Point3,
    pub boundary: BoundaryCondition,
}

impl Default for Domain {
    fn default() -> Self {
        Self::from_parameters(&DomainParameters::default())
    }
}

impl Domain {
    pub fn new(size: Point3, boundary: BoundaryCondition) -> Self {
        Self { size, boundary }
    }

    pub fn from_parameters(params: &DomainParameters) -> Self {
        Self::new(params.domain, params.boundary_condition)
    }

    pub fn is_periodic(&self) -> bool {
        self.boundary == BoundaryCondition::Periodic
    }

    /// Bring `p` back into the box: folded under periodic conditions,
    /// reflected off the walls otherwise.
    pub fn wrap(&self, p: Point3) -> Point3 {
        let mut out = p;
        for (d, v) in out.iter_mut().enumerate() {
            let size = self.size[d];
            *v = match self.boundary {
                BoundaryCondition::Periodic => v.rem_euclid(size),
                BoundaryCondition::None => {
                    let folded = v.rem_euclid(2.0 * size);
                    if folded > size {
                        2.0 * size - folded
                    } else {
                        folded
                    }
                }
            };
        }
        out
    }

    /// Image of `p` closest to `reference`.
    pub fn closest_image(&self, reference: Point3, p: Point3) -> Point3 {
        if !self.is_periodic() {
            return p;
        }
        plus(reference, self.displacement(reference, p))
    }

    /// Vector from `from` to the closest image of `to`.
    ///
    /// Antisymmetric to the last bit, so `distance(a, b) == distance(b, a)`
    /// exactly.
    pub fn displacement(&self, from: Point3, to: Point3) -> Point3 {
        let mut delta = minus(to, from);
        if self.is_periodic() {
            for (d, v) in delta.iter_mut().enumerate() {
                *v -= self.size[d] * (*v / self.size[d]).round();
            }
        }
        delta
    }

    pub fn distance(&self, a: Point3, b: Point3) -> f64 {
        norm(self.displacement(a, b))
    }

    pub fn diagonal(&self) -> f64 {
        norm(self.size)
    }

    /// Largest distance two points in the box can have.
    pub fn max_distance(&self) -> f64 {
        if self.is_periodic() {
            self.diagonal() / 2.0
        } else {
            self.diagonal()
        }
    }

    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Point3 {
        [
            rng.random::<f64>() * self.size[0],
            rng.random::<f64>() * self.size[1],
            rng.random::<f64>() * self.size[2],
        ]
    }
}
