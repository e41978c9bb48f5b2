// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::Vec3;
use crate::types::transform::Transform;

/// Axis-aligned bounding box in world coordinates.
///
/// Invariants:
/// - `min` components are less than or equal to `max` components.
/// - Values are `f32` meters in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Constructs an AABB from its minimum and maximum corners.
    ///
    /// # Panics
    /// Panics if any component of `min` is greater than its counterpart in `max`.
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        let a = min.to_array();
        let b = max.to_array();
        assert!(
            a[0] <= b[0] && a[1] <= b[1] && a[2] <= b[2],
            "invalid AABB: min > max"
        );
        Self { min, max }
    }

    /// Returns the minimum corner.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Returns the maximum corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Builds an AABB centered at `center` with non-negative `half_extents`.
    #[must_use]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let he = half_extents.abs();
        Self {
            min: center.sub(&he),
            max: center.add(&he),
        }
    }

    /// Per-axis side lengths.
    #[must_use]
    pub fn extents(&self) -> Vec3 {
        self.max.sub(&self.min)
    }

    /// Box volume.
    #[must_use]
    pub fn volume(&self) -> f32 {
        let [x, y, z] = self.extents().to_array();
        x * y * z
    }

    /// Returns `true` if this AABB overlaps another (inclusive on faces).
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let a_min = self.min.to_array();
        let a_max = self.max.to_array();
        let b_min = other.min.to_array();
        let b_max = other.max.to_array();
        (0..3).all(|i| a_max[i] >= b_min[i] && a_min[i] <= b_max[i])
    }

    /// Overlap box of two AABBs, or `None` when they are disjoint.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self {
            min: self.min.max(&other.min),
            max: self.max.min(&other.max),
        })
    }

    /// Returns the union of two AABBs.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(&other.min),
            max: self.max.max(&other.max),
        }
    }

    /// Inflates the box by a uniform margin `m` in all directions.
    #[must_use]
    pub fn inflate(&self, m: f32) -> Self {
        let delta = Vec3::splat(m);
        Self {
            min: self.min.sub(&delta),
            max: self.max.add(&delta),
        }
    }

    /// Computes the AABB that bounds this box after the rigid transform `xf`.
    ///
    /// Rotates the half-extents through the absolute rotation basis rather than
    /// visiting all eight corners.
    #[must_use]
    pub fn transformed(&self, xf: &Transform) -> Self {
        let center = self.min.add(&self.max).scale(0.5);
        let half = self.extents().scale(0.5);
        let [ax, ay, az] = xf.rotation().axes();
        let world_half = ax
            .abs()
            .scale(half.x())
            .add(&ay.abs().scale(half.y()))
            .add(&az.abs().scale(half.z()));
        Self::from_center_half_extents(xf.transform_point(&center), world_half)
    }
}

/// Volume of the overlap between two boxes.
///
/// Per-axis overlap extents are clamped at zero before multiplying, so
/// disjoint boxes yield exactly `0.0`; the absolute value guards against a
/// `-0.0` product from degenerate extents.
#[must_use]
pub fn intersection_volume(a: &Aabb, b: &Aabb) -> f32 {
    let lo = a.min.max(&b.min).to_array();
    let hi = a.max.min(&b.max).to_array();
    let mut volume = 1.0_f32;
    for i in 0..3 {
        volume *= (hi[i] - lo[i]).max(0.0);
    }
    volume.abs()
}
