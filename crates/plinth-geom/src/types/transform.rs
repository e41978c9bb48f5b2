// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::{Quat, Vec3};

/// Rigid transform (rotation then translation) used for body poses and
/// compound-child offsets.
///
/// Conventions:
/// - `translation` in meters (world space).
/// - `rotation` as a unit quaternion (normalised when applied).
/// - No scale: bodies are rigid.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    translation: Vec3,
    #[cfg_attr(feature = "serde", serde(default))]
    rotation: Quat,
}

impl Transform {
    /// Identity transform.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::identity(),
        }
    }

    /// Creates a transform from components.
    #[must_use]
    pub const fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Pure translation.
    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity())
    }

    /// Translation component.
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Rotation component.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Maps a local point into the parent frame.
    #[must_use]
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        self.rotation.rotate(point).add(&self.translation)
    }

    /// Maps a local direction into the parent frame (translation ignored).
    #[must_use]
    pub fn transform_direction(&self, direction: &Vec3) -> Vec3 {
        self.rotation.rotate(direction)
    }

    /// Composes `self * local`: the result applies `local` first, then `self`.
    #[must_use]
    pub fn compose(&self, local: &Self) -> Self {
        Self {
            translation: self.transform_point(&local.translation),
            rotation: self.rotation.multiply(&local.rotation).normalize(),
        }
    }

    /// Inverse rigid transform.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let inv_rot = self.rotation.normalize().conjugate();
        Self {
            translation: inv_rot.rotate(&self.translation).neg(),
            rotation: inv_rot,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl core::ops::Mul for Transform {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(&rhs)
    }
}
