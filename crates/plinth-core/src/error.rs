// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use thiserror::Error;

use crate::body::BodyHandle;
use crate::ident::ObjectId;

/// Errors surfaced by graph queries and hypothesis bookkeeping.
///
/// Anomalies inside a single build (reverse edges, failed edge insertion,
/// non-rigid contact participants) are logged and skipped instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SupportError {
    /// No vertex, body, or recorded pose exists for this object id.
    #[error("unknown object id: {0}")]
    UnknownObject(ObjectId),
    /// The physics world has no body behind this handle.
    #[error("unknown body handle: {0}")]
    UnknownBody(BodyHandle),
    /// Support contributions divide by the step; it must be finite and positive.
    #[error("invalid time step {0}: must be finite and > 0")]
    InvalidTimeStep(f32),
    /// A thread panicked while holding the scene lock.
    #[error("scene lock poisoned")]
    LockPoisoned,
}
