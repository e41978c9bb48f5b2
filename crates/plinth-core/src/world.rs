// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The physics-world seam: everything the analysis needs from a simulator.
use plinth_geom::Vec3;

use crate::body::{BodyHandle, RigidBody};
use crate::contact::ContactManifold;

/// Physics simulation collaborator.
///
/// The world owns the body table. Bodies can be detached from the active set
/// and reattached later without losing any of their state; detached bodies
/// are invisible to graph construction.
pub trait PhysicsWorld {
    /// Handles of the active bodies, in ascending order.
    fn body_handles(&self) -> Vec<BodyHandle>;

    /// Body behind `handle`, active or detached.
    fn body(&self, handle: BodyHandle) -> Option<&RigidBody>;

    /// Mutable body behind `handle`, active or detached.
    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody>;

    /// Returns `true` when `handle` names an active body.
    fn is_active(&self, handle: BodyHandle) -> bool;

    /// Moves a body into or out of the active set.
    ///
    /// Returns `false` if the world has no such body.
    fn set_active(&mut self, handle: BodyHandle, active: bool) -> bool;

    /// Contact manifolds produced by the most recent tick.
    fn manifolds(&self) -> &[ContactManifold];

    /// Gravity vector in m/s².
    fn gravity(&self) -> Vec3;

    /// Replaces the gravity vector.
    fn set_gravity(&mut self, gravity: Vec3);

    /// Advances the simulation by one tick of `time_step` seconds.
    fn step(&mut self, time_step: f32);

    /// Contacts between `handle` and every other active body.
    ///
    /// The default filters the last tick's manifolds; simulators with an
    /// on-demand narrow phase should override it so a freshly posed body is
    /// tested against the scene without stepping.
    fn contact_test(&self, handle: BodyHandle) -> Vec<ContactManifold> {
        self.manifolds()
            .iter()
            .filter(|m| m.involves(handle))
            .filter(|m| self.is_active(m.body_a) && self.is_active(m.body_b))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct BodySlot {
    body: RigidBody,
    active: bool,
}

/// A recorded tick: a body table plus the manifolds it produced.
///
/// Stepping only advances the tick counter; poses, velocities, and contacts
/// stay as recorded. Useful for offline analysis and as a test double.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotWorld {
    slots: Vec<BodySlot>,
    manifolds: Vec<ContactManifold>,
    gravity: Vec3,
    tick: u64,
}

impl SnapshotWorld {
    /// Empty world with the given gravity vector.
    #[must_use]
    pub fn new(gravity: Vec3) -> Self {
        Self {
            slots: Vec::new(),
            manifolds: Vec::new(),
            gravity,
            tick: 0,
        }
    }

    /// Adds an active body and returns its handle.
    pub fn insert(&mut self, body: RigidBody) -> BodyHandle {
        self.slots.push(BodySlot { body, active: true });
        BodyHandle(self.slots.len() - 1)
    }

    /// Replaces the recorded manifolds.
    pub fn set_manifolds(&mut self, manifolds: Vec<ContactManifold>) {
        self.manifolds = manifolds;
    }

    /// Appends one recorded manifold.
    pub fn push_manifold(&mut self, manifold: ContactManifold) {
        self.manifolds.push(manifold);
    }

    /// Number of bodies, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when the table holds no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Ticks stepped so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }
}

impl Default for SnapshotWorld {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, -9.81))
    }
}

impl PhysicsWorld for SnapshotWorld {
    fn body_handles(&self) -> Vec<BodyHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, _)| BodyHandle(i))
            .collect()
    }

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.slots.get(handle.0).map(|s| &s.body)
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.slots.get_mut(handle.0).map(|s| &mut s.body)
    }

    fn is_active(&self, handle: BodyHandle) -> bool {
        self.slots.get(handle.0).is_some_and(|s| s.active)
    }

    fn set_active(&mut self, handle: BodyHandle, active: bool) -> bool {
        match self.slots.get_mut(handle.0) {
            Some(slot) => {
                slot.active = active;
                true
            }
            None => false,
        }
    }

    fn manifolds(&self) -> &[ContactManifold] {
        &self.manifolds
    }

    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    fn step(&mut self, _time_step: f32) {
        self.tick += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactPoint;
    use plinth_geom::{Shape, Transform};

    fn ball(id: &str) -> RigidBody {
        RigidBody::new(Shape::Sphere { radius: 0.1 }, Transform::identity(), 1.0).with_identity(id)
    }

    #[test]
    fn detached_bodies_leave_handles_but_keep_state() {
        let mut world = SnapshotWorld::default();
        let a = world.insert(ball("a"));
        let b = world.insert(ball("b"));
        assert!(world.set_active(a, false));
        assert_eq!(world.body_handles(), vec![b]);
        assert!(world.body(a).is_some());
        assert!(!world.set_active(BodyHandle(9), true));
    }

    #[test]
    fn contact_test_skips_detached_partners() {
        let mut world = SnapshotWorld::default();
        let a = world.insert(ball("a"));
        let b = world.insert(ball("b"));
        let c = world.insert(ball("c"));
        let p = ContactPoint::new(-0.01, 0.0, Vec3::UNIT_Z);
        world.push_manifold(ContactManifold::new(a, b).with_point(p));
        world.push_manifold(ContactManifold::new(c, a).with_point(p));
        world.set_active(c, false);
        let hits = world.contact_test(a);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].body_b, b);
    }
}
