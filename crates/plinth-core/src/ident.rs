// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Object identity: stable string ids attached to simulated bodies.
use core::borrow::Borrow;
use core::fmt;

use crate::body::RigidBody;

/// Stable, externally assigned object identifier.
///
/// Two ids are reserved: [`ObjectId::BACKGROUND`] names the static ground
/// body, and [`ObjectId::UNRECOGNIZED`] is what [`identity_of`] reports for a
/// body nobody labelled.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ObjectId(String);

impl ObjectId {
    /// Reserved id of the static ground body.
    pub const BACKGROUND: &'static str = "background";
    /// Sentinel id for bodies without an attached identity.
    pub const UNRECOGNIZED: &'static str = "unrecognized_object";

    /// Wraps a string id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The `background` id.
    #[must_use]
    pub fn background() -> Self {
        Self::new(Self::BACKGROUND)
    }

    /// The `unrecognized_object` sentinel.
    #[must_use]
    pub fn unrecognized() -> Self {
        Self::new(Self::UNRECOGNIZED)
    }

    /// Borrowed string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the reserved ground id.
    #[must_use]
    pub fn is_background(&self) -> bool {
        self.0 == Self::BACKGROUND
    }

    /// Returns `true` for the unrecognized sentinel.
    #[must_use]
    pub fn is_unrecognized(&self) -> bool {
        self.0 == Self::UNRECOGNIZED
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ObjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identity attached to `body`, or `"unrecognized_object"` when none is.
///
/// The resolver never invents `"background"`; whoever builds the scene labels
/// the ground body.
#[must_use]
pub fn identity_of(body: &RigidBody) -> &str {
    body.identity
        .as_ref()
        .map_or(ObjectId::UNRECOGNIZED, ObjectId::as_str)
}
