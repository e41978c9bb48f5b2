// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Contact-local bounds: the box of the exact sub-shape a contact touched.
use plinth_geom::Aabb;
use tracing::debug;

use crate::body::RigidBody;
use crate::contact::{BodySide, ContactPoint};

pub use plinth_geom::intersection_volume;

/// World AABB of the sub-shape of `body` touched by `point`, plus its index.
///
/// `side` says which member of the manifold `body` is, which selects the
/// child index recorded on the point. Simple shapes yield their whole box and
/// index `0`. A compound child index that does not exist falls back to the
/// whole compound box while keeping the reported index.
#[must_use]
pub fn contact_aabb(body: &RigidBody, point: &ContactPoint, side: BodySide) -> (Aabb, usize) {
    let child_index = point.child_index(side);
    body.shape
        .contact_aabb(&body.pose, child_index)
        .unwrap_or_else(|| {
            debug!(child_index, "contact names a missing compound child; using whole shape");
            (body.shape.aabb(&body.pose), child_index)
        })
}
