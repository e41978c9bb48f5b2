// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::Vec3;
use crate::types::aabb::Aabb;
use crate::types::transform::Transform;

/// Collision shape attached to a body.
///
/// Compound shapes hold indexed children; contact points record which child
/// they touched, so per-child bounds can be recovered after the fact.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum Shape {
    /// Box with the given half-extents.
    Cuboid {
        /// Half-extents along local X/Y/Z.
        half_extents: Vec3,
    },
    /// Sphere centered on the body origin.
    Sphere {
        /// Radius in meters.
        radius: f32,
    },
    /// Capsule aligned with local +Y.
    Capsule {
        /// Radius in meters.
        radius: f32,
        /// Half-length of the cylindrical segment.
        half_height: f32,
    },
    /// Rigidly attached children, each with its own local transform.
    Compound {
        /// Child shapes; a child's position in this list is its index.
        children: Vec<CompoundChild>,
    },
}

/// One child of a compound shape.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompoundChild {
    /// Child pose relative to the owning body.
    #[cfg_attr(feature = "serde", serde(default))]
    pub local: Transform,
    /// Child geometry.
    pub shape: Shape,
}

impl Shape {
    /// Returns `true` for compound shapes.
    #[must_use]
    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Compound { .. })
    }

    /// Child at `index` when this is a compound shape.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&CompoundChild> {
        match self {
            Self::Compound { children } => children.get(index),
            _ => None,
        }
    }

    /// World-space AABB of the shape placed at `pose`.
    ///
    /// An empty compound collapses to a point box at the body origin.
    #[must_use]
    pub fn aabb(&self, pose: &Transform) -> Aabb {
        match self {
            Self::Cuboid { half_extents } => {
                Aabb::from_center_half_extents(Vec3::ZERO, *half_extents).transformed(pose)
            }
            Self::Sphere { radius } => {
                Aabb::from_center_half_extents(pose.translation(), Vec3::splat(*radius))
            }
            Self::Capsule {
                radius,
                half_height,
            } => {
                let axis = pose.transform_direction(&Vec3::UNIT_Y).scale(*half_height);
                let he = axis.abs().add(&Vec3::splat(*radius));
                Aabb::from_center_half_extents(pose.translation(), he)
            }
            Self::Compound { children } => children
                .iter()
                .map(|c| c.shape.aabb(&pose.compose(&c.local)))
                .reduce(|acc, bb| acc.union(&bb))
                .unwrap_or_else(|| {
                    Aabb::from_center_half_extents(pose.translation(), Vec3::ZERO)
                }),
        }
    }

    /// Bounds of the sub-shape touched by a contact, plus its index.
    ///
    /// For compound shapes `child_index` selects the child; its box is taken at
    /// `pose * child.local`. Other shapes return their whole box and index `0`.
    /// Returns `None` when a compound has no child at `child_index`.
    #[must_use]
    pub fn contact_aabb(&self, pose: &Transform, child_index: usize) -> Option<(Aabb, usize)> {
        if !self.is_compound() {
            return Some((self.aabb(pose), 0));
        }
        let child = self.child(child_index)?;
        Some((child.shape.aabb(&pose.compose(&child.local)), child_index))
    }
}
