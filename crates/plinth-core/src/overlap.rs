// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Overlap acceptance test for a single candidate pose.
use tracing::debug;

use crate::body::BodyHandle;
use crate::contact::{BodySide, ContactManifold, ContactPoint};
use crate::geometry::{contact_aabb, intersection_volume};
use crate::ident::{identity_of, ObjectId};
use crate::world::PhysicsWorld;

/// Accumulates how far one candidate body intrudes into the rest of the scene.
///
/// Contacts against the candidate itself, the background, or unrecognized
/// bodies are ignored. A sensor is single use: make a fresh one per candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapSensor {
    candidate: BodyHandle,
    object_id: ObjectId,
    total_penetration_depth: f32,
    total_intersecting_volume: f32,
    candidate_box_volume: f32,
}

impl OverlapSensor {
    /// Sensor for `candidate`, which carries `object_id`.
    #[must_use]
    pub fn new(candidate: BodyHandle, object_id: impl Into<ObjectId>) -> Self {
        Self {
            candidate,
            object_id: object_id.into(),
            total_penetration_depth: 0.0,
            total_intersecting_volume: 0.0,
            candidate_box_volume: 0.0,
        }
    }

    /// Summed penetration depth over counted contacts.
    #[must_use]
    pub fn total_penetration_depth(&self) -> f32 {
        self.total_penetration_depth
    }

    /// Summed contact-local intersection volume over counted contacts.
    #[must_use]
    pub fn total_intersecting_volume(&self) -> f32 {
        self.total_intersecting_volume
    }

    /// Box volume of the candidate sub-shape in the most recent contact.
    #[must_use]
    pub fn candidate_box_volume(&self) -> f32 {
        self.candidate_box_volume
    }

    /// Feeds one contact between `body_a` and `body_b`.
    ///
    /// Contacts that do not involve the candidate are ignored.
    pub fn add_contact<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &W,
        body_a: BodyHandle,
        body_b: BodyHandle,
        point: &ContactPoint,
    ) {
        let (candidate_side, other) = if body_a == self.candidate {
            (BodySide::A, body_b)
        } else if body_b == self.candidate {
            (BodySide::B, body_a)
        } else {
            debug!(a = %body_a, b = %body_b, "contact does not involve the candidate");
            return;
        };
        let (Some(a), Some(b)) = (world.body(body_a), world.body(body_b)) else {
            debug!(a = %body_a, b = %body_b, "contact names an unknown body");
            return;
        };
        let (box_a, _) = contact_aabb(a, point, BodySide::A);
        let (box_b, _) = contact_aabb(b, point, BodySide::B);
        self.candidate_box_volume = match candidate_side {
            BodySide::A => box_a.volume(),
            BodySide::B => box_b.volume(),
        };

        let other_body = if other == body_a { a } else { b };
        let other_id = identity_of(other_body);
        if other == self.candidate
            || other_id == ObjectId::UNRECOGNIZED
            || other_id == ObjectId::BACKGROUND
            || other_id == self.object_id.as_str()
        {
            return;
        }

        self.total_penetration_depth += point.penetration();
        self.total_intersecting_volume += intersection_volume(&box_a, &box_b);
    }

    /// Feeds every point of `manifold`.
    pub fn add_manifold<W: PhysicsWorld + ?Sized>(&mut self, world: &W, manifold: &ContactManifold) {
        for point in &manifold.points {
            self.add_contact(world, manifold.body_a, manifold.body_b, point);
        }
    }

    /// Runs the world's contact test for the candidate and feeds the result.
    pub fn measure<W: PhysicsWorld + ?Sized>(&mut self, world: &W) {
        for manifold in world.contact_test(self.candidate) {
            self.add_manifold(world, &manifold);
        }
    }

    /// `true` iff both totals are strictly below their thresholds.
    #[must_use]
    pub fn within_threshold(&self, max_depth: f32, max_volume: f32) -> bool {
        self.total_penetration_depth < max_depth && self.total_intersecting_volume < max_volume
    }
}
