// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory support graph: one vertex per body, directed supporter → supported edges.
use std::collections::{BTreeMap, BTreeSet};

use plinth_geom::Transform;
use thiserror::Error;

use crate::body::BodyHandle;
use crate::error::SupportError;
use crate::ident::ObjectId;

/// Dense vertex index within one [`SupportGraph`].
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct VertexId(pub usize);

/// Dense edge index within one [`SupportGraph`].
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct EdgeId(pub usize);

/// Object id → vertex mapping, rebuilt by every graph construction.
pub type VertexIndex = BTreeMap<ObjectId, VertexId>;

/// Per-body evidence gathered during one build.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SupportVertex {
    /// Identity of the body at build time.
    pub object_id: ObjectId,
    /// Body table index the vertex was built from.
    pub body: BodyHandle,
    /// World pose snapshot; not updated after the build.
    pub pose: Transform,
    /// Summed penetration depth of committed manifolds touching this body.
    pub penetration_distance: f32,
    /// Summed intersecting volume, each sub-shape pair credited once per edge.
    pub colliding_volume: f32,
    /// Normalized force evidence that this body holds something up.
    pub support_contribution: f32,
    /// Reachable from the background vertex along support edges.
    pub ground_supported: bool,
}

impl SupportVertex {
    /// Fresh vertex with zeroed accumulators.
    #[must_use]
    pub fn new(object_id: ObjectId, body: BodyHandle, pose: Transform) -> Self {
        Self {
            object_id,
            body,
            pose,
            penetration_distance: 0.0,
            colliding_volume: 0.0,
            support_contribution: 0.0,
            ground_supported: false,
        }
    }
}

/// Directed support relation `from` (supporter) → `to` (supported).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SupportEdge {
    /// Supporting vertex.
    pub from: VertexId,
    /// Supported vertex.
    pub to: VertexId,
    /// `(lower sub-shape, upper sub-shape)` pairs already credited to
    /// `colliding_volume`.
    pub counted_shape_pairs: BTreeSet<(usize, usize)>,
}

impl SupportEdge {
    /// Returns `true` if the sub-shape pair was already credited.
    #[must_use]
    pub fn has_shape_pair(&self, lower: usize, upper: usize) -> bool {
        self.counted_shape_pairs.contains(&(lower, upper))
    }

    /// Records a sub-shape pair; returns `false` if it was already present.
    pub fn add_shape_pair(&mut self, lower: usize, upper: usize) -> bool {
        self.counted_shape_pairs.insert((lower, upper))
    }
}

/// Reasons the graph refuses an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EdgeInsertError {
    /// An endpoint is not a vertex of this graph.
    #[error("vertex {0:?} does not exist")]
    MissingVertex(VertexId),
    /// A body cannot support itself.
    #[error("self-loop on vertex {0:?}")]
    SelfLoop(VertexId),
    /// The ordered pair already has an edge.
    #[error("edge {from:?} -> {to:?} already exists")]
    Duplicate {
        /// Source vertex.
        from: VertexId,
        /// Destination vertex.
        to: VertexId,
    },
}

/// Support graph produced by one build.
///
/// Vertices and edges are dense vectors; adjacency and the ordered-pair index
/// are `BTreeMap`s so iteration order is deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SupportGraph {
    vertices: Vec<SupportVertex>,
    edges: Vec<SupportEdge>,
    out_edges: BTreeMap<VertexId, Vec<EdgeId>>,
    pair_index: BTreeMap<(VertexId, VertexId), EdgeId>,
    index: VertexIndex,
}

impl SupportGraph {
    /// Empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex and returns its id. Indexing by object id is separate.
    pub fn add_vertex(&mut self, vertex: SupportVertex) -> VertexId {
        self.vertices.push(vertex);
        VertexId(self.vertices.len() - 1)
    }

    /// Points `object_id` at `vertex`; returns the vertex it previously named.
    pub fn index_vertex(&mut self, object_id: ObjectId, vertex: VertexId) -> Option<VertexId> {
        self.index.insert(object_id, vertex)
    }

    /// Object id → vertex mapping.
    #[must_use]
    pub fn vertex_index(&self) -> &VertexIndex {
        &self.index
    }

    /// Vertex for `object_id`, if indexed.
    #[must_use]
    pub fn lookup(&self, object_id: &str) -> Option<VertexId> {
        self.index.get(object_id).copied()
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Vertex data.
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> Option<&SupportVertex> {
        self.vertices.get(id.0)
    }

    /// Mutable vertex data.
    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut SupportVertex> {
        self.vertices.get_mut(id.0)
    }

    /// Iterate over vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &SupportVertex)> {
        self.vertices.iter().enumerate().map(|(i, v)| (VertexId(i), v))
    }

    /// Iterate over edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &SupportEdge)> {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeId(i), e))
    }

    /// Edge data.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&SupportEdge> {
        self.edges.get(id.0)
    }

    /// Mutable edge data.
    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut SupportEdge> {
        self.edges.get_mut(id.0)
    }

    /// Edge `from → to`, if present. Direction matters.
    #[must_use]
    pub fn find_edge(&self, from: VertexId, to: VertexId) -> Option<EdgeId> {
        self.pair_index.get(&(from, to)).copied()
    }

    /// Inserts the directed edge `from → to`.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId) -> Result<EdgeId, EdgeInsertError> {
        for v in [from, to] {
            if v.0 >= self.vertices.len() {
                return Err(EdgeInsertError::MissingVertex(v));
            }
        }
        if from == to {
            return Err(EdgeInsertError::SelfLoop(from));
        }
        if self.pair_index.contains_key(&(from, to)) {
            return Err(EdgeInsertError::Duplicate { from, to });
        }
        let id = EdgeId(self.edges.len());
        self.edges.push(SupportEdge {
            from,
            to,
            counted_shape_pairs: BTreeSet::new(),
        });
        self.out_edges.entry(from).or_default().push(id);
        self.pair_index.insert((from, to), id);
        Ok(id)
    }

    /// Vertices directly supported by `id`, in edge insertion order.
    pub fn successors(&self, id: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.out_edges
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|e| self.edges.get(e.0))
            .map(|e| e.to)
    }

    /// Vertices directly supporting `id`.
    pub fn predecessors(&self, id: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.edges.iter().filter(move |e| e.to == id).map(|e| e.from)
    }

    /// Vertex data for `object_id`.
    pub fn vertex_by_id(&self, object_id: &str) -> Result<&SupportVertex, SupportError> {
        self.lookup(object_id)
            .and_then(|v| self.vertex(v))
            .ok_or_else(|| SupportError::UnknownObject(ObjectId::new(object_id)))
    }

    /// Ground-supported flag for `object_id`.
    pub fn is_ground_supported(&self, object_id: &str) -> Result<bool, SupportError> {
        self.vertex_by_id(object_id).map(|v| v.ground_supported)
    }

    /// Ids of the objects directly supporting `object_id`.
    pub fn supporters_of(&self, object_id: &str) -> Result<Vec<&ObjectId>, SupportError> {
        let v = self
            .lookup(object_id)
            .ok_or_else(|| SupportError::UnknownObject(ObjectId::new(object_id)))?;
        Ok(self
            .predecessors(v)
            .filter_map(|p| self.vertex(p))
            .map(|p| &p.object_id)
            .collect())
    }

    /// Ids of the objects `object_id` directly supports.
    pub fn supported_by(&self, object_id: &str) -> Result<Vec<&ObjectId>, SupportError> {
        let v = self
            .lookup(object_id)
            .ok_or_else(|| SupportError::UnknownObject(ObjectId::new(object_id)))?;
        Ok(self
            .successors(v)
            .filter_map(|s| self.vertex(s))
            .map(|s| &s.object_id)
            .collect())
    }
}
