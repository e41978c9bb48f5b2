// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ground-support propagation along support edges.
use rustc_hash::FxHashSet;
use tracing::debug;

use super::graph::{SupportGraph, VertexId};

/// Flags every vertex reachable from `from` as ground-supported.
///
/// Traversal is an explicit worklist with a visited set, so support cycles
/// terminate and self-loops are ignored. `from` itself is not flagged here;
/// callers flag the root. Returns the number of vertices newly flagged.
pub fn propagate_ground_support(graph: &mut SupportGraph, from: VertexId) -> usize {
    let mut visited: FxHashSet<VertexId> = FxHashSet::default();
    visited.insert(from);
    let mut worklist = vec![from];
    let mut flagged = 0;

    while let Some(current) = worklist.pop() {
        let next: Vec<VertexId> = graph.successors(current).collect();
        for succ in next {
            if !visited.insert(succ) {
                continue;
            }
            let Some(vertex) = graph.vertex_mut(succ) else {
                continue;
            };
            if !vertex.ground_supported {
                vertex.ground_supported = true;
                flagged += 1;
                debug!(
                    object = %vertex.object_id,
                    support_contribution = vertex.support_contribution,
                    penetration = vertex.penetration_distance,
                    colliding_volume = vertex.colliding_volume,
                    "ground supported"
                );
            }
            worklist.push(succ);
        }
    }
    flagged
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::body::BodyHandle;
    use crate::ident::ObjectId;
    use crate::support::graph::SupportVertex;
    use plinth_geom::Transform;

    fn chain(n: usize) -> SupportGraph {
        let mut g = SupportGraph::new();
        for i in 0..n {
            g.add_vertex(SupportVertex::new(
                ObjectId::new(format!("v{i}")),
                BodyHandle(i),
                Transform::identity(),
            ));
        }
        g
    }

    #[test]
    fn flags_transitively() {
        let mut g = chain(4);
        g.add_edge(VertexId(0), VertexId(1)).expect("edge");
        g.add_edge(VertexId(1), VertexId(2)).expect("edge");
        assert_eq!(propagate_ground_support(&mut g, VertexId(0)), 2);
        assert!(g.vertex(VertexId(2)).is_some_and(|v| v.ground_supported));
        assert!(g.vertex(VertexId(3)).is_some_and(|v| !v.ground_supported));
    }

    #[test]
    fn cycles_terminate() {
        let mut g = chain(3);
        g.add_edge(VertexId(0), VertexId(1)).expect("edge");
        g.add_edge(VertexId(1), VertexId(2)).expect("edge");
        g.add_edge(VertexId(2), VertexId(1)).expect("edge");
        assert_eq!(propagate_ground_support(&mut g, VertexId(0)), 2);
    }

    #[test]
    fn already_flagged_vertices_are_not_recounted() {
        let mut g = chain(3);
        g.add_edge(VertexId(0), VertexId(1)).expect("edge");
        g.add_edge(VertexId(1), VertexId(2)).expect("edge");
        if let Some(v) = g.vertex_mut(VertexId(1)) {
            v.ground_supported = true;
        }
        // Still walks through the flagged vertex to reach its successors.
        assert_eq!(propagate_ground_support(&mut g, VertexId(0)), 1);
        assert!(g.vertex(VertexId(2)).is_some_and(|v| v.ground_supported));
    }
}
