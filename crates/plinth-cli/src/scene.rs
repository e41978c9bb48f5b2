// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scene snapshot files and graph reports.
use std::path::Path;

use anyhow::{bail, Context, Result};
use plinth_core::geom::Vec3;
use plinth_core::{
    ContactManifold, ObjectId, RigidBody, SnapshotWorld, SupportGraph, SupportVertex,
};
use serde::{Deserialize, Serialize};

/// One recorded tick: body table plus the manifolds it produced.
///
/// Manifolds name bodies by their index in `bodies`.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneFile {
    /// Gravity vector; defaults to `-9.81` along Z.
    #[serde(default)]
    pub gravity: Option<Vec3>,
    /// Step the contacts were recorded with; overrides the configured default.
    #[serde(default)]
    pub time_step: Option<f32>,
    /// Body table.
    pub bodies: Vec<RigidBody>,
    /// Contact manifolds of the tick.
    #[serde(default)]
    pub manifolds: Vec<ContactManifold>,
}

impl SceneFile {
    /// Reads and validates a scene from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        let scene: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing scene {}", path.display()))?;
        scene.validate()?;
        Ok(scene)
    }

    fn validate(&self) -> Result<()> {
        let n = self.bodies.len();
        for (i, m) in self.manifolds.iter().enumerate() {
            for h in [m.body_a, m.body_b] {
                if h.0 >= n {
                    bail!("manifold {i} references {h} but the scene has {n} bodies");
                }
            }
        }
        Ok(())
    }

    /// Replays the scene as a [`SnapshotWorld`].
    pub fn into_world(self) -> SnapshotWorld {
        let mut world = self.gravity.map_or_else(SnapshotWorld::default, SnapshotWorld::new);
        for body in self.bodies {
            world.insert(body);
        }
        world.set_manifolds(self.manifolds);
        world
    }
}

/// Edge as printed in reports.
#[derive(Debug, Serialize)]
pub struct EdgeReport<'a> {
    /// Supporting object.
    pub supporter: &'a ObjectId,
    /// Supported object.
    pub supported: &'a ObjectId,
    /// Credited `(supporter shape, supported shape)` pairs.
    pub shape_pairs: Vec<(usize, usize)>,
}

/// Serializable view of a [`SupportGraph`].
#[derive(Debug, Serialize)]
pub struct GraphReport<'a> {
    /// Vertices in body order.
    pub vertices: Vec<&'a SupportVertex>,
    /// Edges in insertion order.
    pub edges: Vec<EdgeReport<'a>>,
}

impl<'a> GraphReport<'a> {
    /// Borrows the report data out of `graph`.
    pub fn new(graph: &'a SupportGraph) -> Self {
        let vertices = graph.vertices().map(|(_, v)| v).collect();
        let edges = graph
            .edges()
            .filter_map(|(_, e)| {
                Some(EdgeReport {
                    supporter: &graph.vertex(e.from)?.object_id,
                    supported: &graph.vertex(e.to)?.object_id,
                    shape_pairs: e.counted_shape_pairs.iter().copied().collect(),
                })
            })
            .collect();
        Self { vertices, edges }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_manifold_bodies() {
        let scene: SceneFile = serde_json::from_str(
            r#"{
                "bodies": [{ "id": "a", "shape": { "type": "sphere", "radius": 1.0 },
                             "mass": { "inv_mass": 1.0 } }],
                "manifolds": [{ "body_a": 0, "body_b": 3 }]
            }"#,
        )
        .expect("valid json");
        let err = scene.validate().expect_err("body 3 is missing");
        assert!(err.to_string().contains("body#3"));
    }

    #[test]
    fn gravity_defaults_to_negative_z() {
        let scene: SceneFile = serde_json::from_str(r#"{ "bodies": [] }"#).expect("valid json");
        let world = scene.into_world();
        assert!(world.is_empty());
        assert_eq!(
            plinth_core::PhysicsWorld::gravity(&world),
            Vec3::new(0.0, 0.0, -9.81)
        );
    }
}
