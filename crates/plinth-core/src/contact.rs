// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-tick contact data reported by the physics world.
use plinth_geom::Vec3;

use crate::body::BodyHandle;

/// Which member of a manifold's body pair a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySide {
    /// The manifold's first body.
    A,
    /// The manifold's second body.
    B,
}

/// One contact point of a manifold.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactPoint {
    /// Signed separation; negative values are penetration depth.
    pub distance: f32,
    /// Impulse the solver applied at this point during the tick.
    pub applied_impulse: f32,
    /// World-space contact normal on body B (points from B towards A).
    pub normal_on_b: Vec3,
    /// Compound child index on body A (0 for simple shapes).
    #[cfg_attr(feature = "serde", serde(default))]
    pub child_index_a: usize,
    /// Compound child index on body B (0 for simple shapes).
    #[cfg_attr(feature = "serde", serde(default))]
    pub child_index_b: usize,
}

impl ContactPoint {
    /// Contact between simple shapes (child indices 0).
    #[must_use]
    pub fn new(distance: f32, applied_impulse: f32, normal_on_b: Vec3) -> Self {
        Self {
            distance,
            applied_impulse,
            normal_on_b,
            child_index_a: 0,
            child_index_b: 0,
        }
    }

    /// Sets the compound child indices touched on each side.
    #[must_use]
    pub fn with_child_indices(mut self, a: usize, b: usize) -> Self {
        self.child_index_a = a;
        self.child_index_b = b;
        self
    }

    /// Returns `true` when the surfaces overlap.
    #[must_use]
    pub fn is_penetrating(&self) -> bool {
        self.distance < 0.0
    }

    /// Penetration depth (non-negative).
    #[must_use]
    pub fn penetration(&self) -> f32 {
        if self.is_penetrating() {
            -self.distance
        } else {
            0.0
        }
    }

    /// Compound child index recorded for `side`.
    #[must_use]
    pub fn child_index(&self, side: BodySide) -> usize {
        match side {
            BodySide::A => self.child_index_a,
            BodySide::B => self.child_index_b,
        }
    }
}

/// All contact points between one pair of bodies during one tick.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactManifold {
    /// First body.
    pub body_a: BodyHandle,
    /// Second body.
    pub body_b: BodyHandle,
    /// Contact points.
    #[cfg_attr(feature = "serde", serde(default))]
    pub points: Vec<ContactPoint>,
}

impl ContactManifold {
    /// Empty manifold for a body pair.
    #[must_use]
    pub fn new(body_a: BodyHandle, body_b: BodyHandle) -> Self {
        Self {
            body_a,
            body_b,
            points: Vec::new(),
        }
    }

    /// Appends a contact point.
    #[must_use]
    pub fn with_point(mut self, point: ContactPoint) -> Self {
        self.points.push(point);
        self
    }

    /// Returns `true` when `handle` is either member of the pair.
    #[must_use]
    pub fn involves(&self, handle: BodyHandle) -> bool {
        self.body_a == handle || self.body_b == handle
    }

    /// Side `handle` occupies, if any (A wins for self-pairs).
    #[must_use]
    pub fn side_of(&self, handle: BodyHandle) -> Option<BodySide> {
        if self.body_a == handle {
            Some(BodySide::A)
        } else if self.body_b == handle {
            Some(BodySide::B)
        } else {
            None
        }
    }

    /// Body on `side`.
    #[must_use]
    pub fn body(&self, side: BodySide) -> BodyHandle {
        match side {
            BodySide::A => self.body_a,
            BodySide::B => self.body_b,
        }
    }
}
