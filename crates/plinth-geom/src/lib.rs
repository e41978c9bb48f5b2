// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Geometry primitives for Plinth.

This crate provides:
- Float32 vector and quaternion math (`Vec3`, `Quat`).
- Rigid transforms (`Transform`) composed the way a physics world composes a
  body pose with a compound child's local offset.
- Axis-aligned bounding boxes (`Aabb`) and their intersection volume.
- Collision shapes (`Shape`), including compound shapes with indexed children.

Design notes:
- Deterministic: no ambient RNG, no fused multiply-add.
- Float32 throughout; world units are meters.
- Intersection volumes never go negative: inverted overlap extents clamp to 0.
"]

/// Vector and quaternion math.
pub mod math;
/// Foundational geometric types.
pub mod types;

pub use math::{Quat, Vec3, EPSILON};
pub use types::aabb::{intersection_volume, Aabb};
pub use types::shape::{CompoundChild, Shape};
pub use types::transform::Transform;
