// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Core geometry types used by the analysis (transform, AABB, shape).
//!
//! Determinism notes:
//! - Overlap tests are inclusive on faces; touching boxes overlap with zero
//!   volume.
//! - Transform composition matches the physics world: a compound child's world
//!   pose is `body_pose * child_local`.

#[doc = "Axis-aligned bounding boxes (world space) and intersection volume."]
pub mod aabb;
#[doc = "Collision shapes, including compound shapes with indexed children."]
pub mod shape;
#[doc = "Rigid transforms (rotation + translation)."]
pub mod transform;
