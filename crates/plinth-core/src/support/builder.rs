// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Support graph construction from one tick of contact manifolds.
use std::collections::BTreeMap;

use plinth_geom::Vec3;
use rustc_hash::FxHashMap;
use tracing::{debug, error, instrument, warn};

use super::graph::{EdgeId, SupportGraph, SupportVertex, VertexId};
use super::propagate::propagate_ground_support;
use crate::body::{BodyHandle, BodyKind};
use crate::config::AnalysisConfig;
use crate::contact::{BodySide, ContactManifold};
use crate::error::SupportError;
use crate::geometry::{contact_aabb, intersection_volume};
use crate::ident::{identity_of, ObjectId};
use crate::world::PhysicsWorld;

/// Sums gathered over the points of one manifold.
#[derive(Debug, Default)]
struct ManifoldTotals {
    impact: f32,
    penetration: f32,
    normal_sum: f32,
    /// Intersection volume per touched `(shape on A, shape on B)` pair.
    shape_volumes: BTreeMap<(usize, usize), f32>,
}

/// Builds [`SupportGraph`]s from the current state of a [`PhysicsWorld`].
///
/// Every call starts from fresh vertices; nothing carries over between builds.
#[derive(Debug, Clone)]
pub struct SupportGraphBuilder<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> SupportGraphBuilder<'a> {
    /// Builder reading gravity magnitude, scaling and the debug switch from `config`.
    #[must_use]
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Builds the graph for the world's last tick using the world's gravity.
    pub fn build<W: PhysicsWorld + ?Sized>(
        &self,
        world: &W,
        time_step: f32,
    ) -> Result<SupportGraph, SupportError> {
        self.build_with_gravity(world, world.gravity(), time_step)
    }

    /// Builds the graph for the world's last tick against an explicit gravity vector.
    ///
    /// `time_step` must be finite and positive; it normalizes support
    /// contributions.
    #[instrument(skip(self, world), fields(manifolds = world.manifolds().len()))]
    pub fn build_with_gravity<W: PhysicsWorld + ?Sized>(
        &self,
        world: &W,
        gravity: Vec3,
        time_step: f32,
    ) -> Result<SupportGraph, SupportError> {
        if !time_step.is_finite() || time_step <= 0.0 {
            return Err(SupportError::InvalidTimeStep(time_step));
        }
        let mut graph = SupportGraph::new();
        let by_body = self.add_vertices(world, &mut graph);

        let denominator = time_step * self.config.gravity_magnitude * self.config.scaling;
        for manifold in world.manifolds() {
            self.apply_manifold(world, &mut graph, &by_body, manifold, gravity, denominator);
        }

        if let Some(ground) = graph.lookup(ObjectId::BACKGROUND) {
            if let Some(v) = graph.vertex_mut(ground) {
                v.ground_supported = true;
                debug!(
                    support_contribution = v.support_contribution,
                    "background support contribution"
                );
            }
            propagate_ground_support(&mut graph, ground);
        } else {
            debug!("no background vertex; nothing is ground supported");
        }
        Ok(graph)
    }

    fn add_vertices<W: PhysicsWorld + ?Sized>(
        &self,
        world: &W,
        graph: &mut SupportGraph,
    ) -> FxHashMap<BodyHandle, VertexId> {
        let mut by_body = FxHashMap::default();
        for handle in world.body_handles() {
            let Some(body) = world.body(handle) else {
                warn!(%handle, "world listed a handle it cannot resolve");
                continue;
            };
            let object_id = ObjectId::new(identity_of(body));
            let v = graph.add_vertex(SupportVertex::new(object_id.clone(), handle, body.pose));
            if let Some(previous) = graph.index_vertex(object_id.clone(), v) {
                warn!(
                    object = %object_id,
                    previous = previous.0,
                    replacement = v.0,
                    "duplicate object id; later body takes the index slot"
                );
            }
            by_body.insert(handle, v);
        }
        by_body
    }

    fn apply_manifold<W: PhysicsWorld + ?Sized>(
        &self,
        world: &W,
        graph: &mut SupportGraph,
        by_body: &FxHashMap<BodyHandle, VertexId>,
        manifold: &ContactManifold,
        gravity: Vec3,
        denominator: f32,
    ) {
        let (Some(body_a), Some(body_b)) = (world.body(manifold.body_a), world.body(manifold.body_b))
        else {
            debug!(a = %manifold.body_a, b = %manifold.body_b, "manifold names an unknown body");
            return;
        };
        if body_a.kind != BodyKind::Rigid || body_b.kind != BodyKind::Rigid {
            return;
        }
        let (Some(&vertex_a), Some(&vertex_b)) =
            (by_body.get(&manifold.body_a), by_body.get(&manifold.body_b))
        else {
            debug!(a = %manifold.body_a, b = %manifold.body_b, "manifold involves a detached body");
            return;
        };

        let mut totals = ManifoldTotals::default();
        for point in &manifold.points {
            totals.impact += point.applied_impulse;
            if !point.is_penetrating() {
                continue;
            }
            let depth = point.penetration();
            totals.penetration += depth;
            totals.normal_sum +=
                depth * point.applied_impulse * point.normal_on_b.dot(&gravity) / self.config.scaling;
            let (box_a, shape_a) = contact_aabb(body_a, point, BodySide::A);
            let (box_b, shape_b) = contact_aabb(body_b, point, BodySide::B);
            totals
                .shape_volumes
                .entry((shape_a, shape_b))
                .or_insert_with(|| intersection_volume(&box_a, &box_b));
        }

        if totals.normal_sum == 0.0 {
            return;
        }
        // Normals on B that point along gravity mean A pushes B up.
        let b_supports = totals.normal_sum < 0.0;
        let (lower, upper, upper_inv_mass) = if b_supports {
            (vertex_b, vertex_a, body_a.mass.inv_mass)
        } else {
            (vertex_a, vertex_b, body_b.mass.inv_mass)
        };
        if !(totals.penetration > 0.0 && totals.impact > 0.0) {
            return;
        }

        let Some(edge) = Self::resolve_edge(graph, lower, upper) else {
            return;
        };

        if self.config.debug {
            debug!(
                lower = lower.0,
                upper = upper.0,
                penetration = totals.penetration,
                shape_pairs = totals.shape_volumes.len(),
                impact = totals.impact,
                "support contact"
            );
        }

        if let Some(v) = graph.vertex_mut(lower) {
            v.penetration_distance += totals.penetration;
            v.support_contribution += totals.impact * upper_inv_mass / denominator;
        }
        if let Some(v) = graph.vertex_mut(upper) {
            v.penetration_distance += totals.penetration;
        }

        // Volume is credited once per sub-shape pair over the edge's lifetime.
        let mut volume = 0.0;
        for (&(shape_a, shape_b), &pair_volume) in &totals.shape_volumes {
            let key = if b_supports {
                (shape_b, shape_a)
            } else {
                (shape_a, shape_b)
            };
            if graph
                .edge_mut(edge)
                .is_some_and(|e| e.add_shape_pair(key.0, key.1))
            {
                volume += pair_volume;
            }
        }
        if volume > 0.0 {
            for v in [lower, upper] {
                if let Some(vertex) = graph.vertex_mut(v) {
                    vertex.colliding_volume += volume;
                }
            }
        }
    }

    /// Forward edge, else the reverse edge (anomalous but reused), else a new one.
    fn resolve_edge(graph: &mut SupportGraph, lower: VertexId, upper: VertexId) -> Option<EdgeId> {
        if let Some(edge) = graph.find_edge(lower, upper) {
            return Some(edge);
        }
        if let Some(edge) = graph.find_edge(upper, lower) {
            warn!(
                lower = lower.0,
                upper = upper.0,
                "support edge already exists in reverse; reusing it"
            );
            return Some(edge);
        }
        match graph.add_edge(lower, upper) {
            Ok(edge) => Some(edge),
            Err(err) => {
                error!(%err, "failed to add support edge; skipping manifold");
                None
            }
        }
    }
}
