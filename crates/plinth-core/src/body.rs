// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Body table records as exposed by the physics world.
use core::fmt;

use plinth_geom::{Shape, Transform, Vec3};

use crate::ident::ObjectId;

/// Index of a body in the physics world's body table.
///
/// Analysis records hold handles, never references, so a body removed after a
/// graph was built leaves at worst a dangling index that lookups reject.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct BodyHandle(pub usize);

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Collision-object classification. Only [`BodyKind::Rigid`] bodies take part
/// in support analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum BodyKind {
    /// Rigid body (static when its inverse mass is zero).
    #[default]
    Rigid,
    /// Non-colliding trigger volume.
    Ghost,
    /// Deformable body.
    Soft,
}

/// Mass and rotational inertia, stored inverted for mass the way solvers use it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MassProps {
    /// Inverse mass in 1/kg; zero means static (infinite mass).
    pub inv_mass: f32,
    /// Diagonal of the local inertia tensor.
    #[cfg_attr(feature = "serde", serde(default))]
    pub local_inertia: Vec3,
}

impl MassProps {
    /// Mass in kg, or `0.0` for static bodies.
    #[must_use]
    pub fn mass(&self) -> f32 {
        if self.inv_mass > 0.0 {
            1.0 / self.inv_mass
        } else {
            0.0
        }
    }

    /// Returns `true` when the body cannot be moved by contacts.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.inv_mass <= 0.0
    }
}

/// One entry of the physics world's body table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RigidBody {
    /// Externally attached identity; see [`crate::identity_of`].
    #[cfg_attr(feature = "serde", serde(default, rename = "id"))]
    pub identity: Option<ObjectId>,
    /// Collider classification.
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: BodyKind,
    /// Collision geometry, possibly compound.
    pub shape: Shape,
    /// World transform.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pose: Transform,
    /// Mass properties.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mass: MassProps,
    /// Linear velocity in m/s.
    #[cfg_attr(feature = "serde", serde(default))]
    pub linear_velocity: Vec3,
    /// Angular velocity in rad/s.
    #[cfg_attr(feature = "serde", serde(default))]
    pub angular_velocity: Vec3,
    /// When set, the world must not apply external (perception-driven) forces.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ignore_external_forces: bool,
}

impl RigidBody {
    /// Unlabelled rigid body at rest.
    #[must_use]
    pub fn new(shape: Shape, pose: Transform, inv_mass: f32) -> Self {
        Self {
            identity: None,
            kind: BodyKind::Rigid,
            shape,
            pose,
            mass: MassProps {
                inv_mass,
                local_inertia: Vec3::ZERO,
            },
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            ignore_external_forces: false,
        }
    }

    /// Attaches an identity.
    #[must_use]
    pub fn with_identity(mut self, id: impl Into<ObjectId>) -> Self {
        self.identity = Some(id.into());
        self
    }

    /// Overrides the collider kind.
    #[must_use]
    pub fn with_kind(mut self, kind: BodyKind) -> Self {
        self.kind = kind;
        self
    }

    /// Overrides the local inertia.
    #[must_use]
    pub fn with_inertia(mut self, local_inertia: Vec3) -> Self {
        self.mass.local_inertia = local_inertia;
        self
    }

    /// Shorthand for [`MassProps::is_static`].
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.mass.is_static()
    }

    /// Zeroes both velocities.
    pub fn stop_motion(&mut self) {
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }
}
