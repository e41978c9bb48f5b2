// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Plinth core: which objects hold up which.

Given one simulation tick of contact manifolds, [`SupportGraphBuilder`] derives
a directed support graph (supporter → supported) annotated with penetration,
intersecting volume, and normalized force evidence, then flags every vertex
reachable from the `background` vertex as ground-supported.

[`HypothesisManager`] drives pose hypotheses on top of that: it installs a
candidate pose, lets the physics world settle, rebuilds the graph, and keeps
the best pose found per object. [`OverlapSensor`] is the cheap alternative
acceptance test that only measures how far a candidate intrudes into the rest
of the scene.

Dynamics are not computed here. A [`PhysicsWorld`] implementation supplies
bodies, contacts, and stepping; [`SnapshotWorld`] replays a recorded tick.
"]

pub mod body;
pub mod config;
pub mod contact;
mod error;
pub mod geometry;
pub mod hypothesis;
pub mod ident;
pub mod overlap;
pub mod support;
pub mod world;

pub use body::{BodyHandle, BodyKind, MassProps, RigidBody};
pub use config::AnalysisConfig;
pub use contact::{BodySide, ContactManifold, ContactPoint};
pub use error::SupportError;
pub use hypothesis::{HypothesisManager, OverlapReport, PoseSource, TrialReport};
pub use ident::{identity_of, ObjectId};
pub use overlap::OverlapSensor;
pub use support::builder::SupportGraphBuilder;
pub use support::graph::{
    EdgeId, EdgeInsertError, SupportEdge, SupportGraph, SupportVertex, VertexId, VertexIndex,
};
pub use support::propagate::propagate_ground_support;
pub use world::{PhysicsWorld, SnapshotWorld};

pub use plinth_geom as geom;
