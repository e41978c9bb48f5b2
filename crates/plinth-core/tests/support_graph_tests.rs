// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Support graph construction and ground propagation over recorded ticks.

use plinth_core::geom::{CompoundChild, Shape, Transform, Vec3};
use plinth_core::{
    AnalysisConfig, BodyHandle, ContactManifold, ContactPoint, ObjectId, PhysicsWorld, RigidBody,
    SnapshotWorld, SupportError, SupportGraph, SupportGraphBuilder,
};
use proptest::prelude::*;

fn cube(id: &str, z: f32, inv_mass: f32) -> RigidBody {
    RigidBody::new(
        Shape::Cuboid {
            half_extents: Vec3::splat(0.5),
        },
        Transform::from_translation(Vec3::new(0.0, 0.0, z)),
        inv_mass,
    )
    .with_identity(id)
}

/// `upper` resting on `lower`: the normal on the second body points down.
fn resting(lower: BodyHandle, upper: BodyHandle, depth: f32, impulse: f32) -> ContactManifold {
    ContactManifold::new(lower, upper).with_point(ContactPoint::new(
        -depth,
        impulse,
        Vec3::new(0.0, 0.0, -1.0),
    ))
}

fn build(world: &SnapshotWorld) -> SupportGraph {
    let config = AnalysisConfig::default();
    SupportGraphBuilder::new(&config)
        .build(world, 1.0 / 120.0)
        .expect("valid time step")
}

fn flagged(graph: &SupportGraph, id: &str) -> bool {
    graph.is_ground_supported(id).expect("known id")
}

#[test]
fn no_contacts_means_no_edges_and_only_ground_flagged() {
    let mut world = SnapshotWorld::default();
    world.insert(cube("background", -0.5, 0.0));
    for i in 0..4 {
        world.insert(cube(&format!("box{i}"), 2.0 * i as f32 + 1.0, 1.0));
    }
    let graph = build(&world);
    assert_eq!(graph.vertex_count(), 5);
    assert_eq!(graph.edge_count(), 0);
    let supported: Vec<_> = graph
        .vertices()
        .filter(|(_, v)| v.ground_supported)
        .map(|(_, v)| v.object_id.clone())
        .collect();
    assert_eq!(supported, vec![ObjectId::background()]);
}

#[test]
fn lower_body_supports_upper_body() {
    let mut world = SnapshotWorld::default();
    let a = world.insert(cube("a", 0.0, 1.0));
    let b = world.insert(cube("b", 0.99, 1.0));
    world.push_manifold(resting(a, b, 0.01, 2.0));

    let graph = build(&world);
    assert_eq!(graph.edge_count(), 1);
    let va = graph.lookup("a").expect("a");
    let vb = graph.lookup("b").expect("b");
    assert!(graph.find_edge(va, vb).is_some());
    assert!(graph.find_edge(vb, va).is_none());

    for id in ["a", "b"] {
        let v = graph.vertex_by_id(id).expect("vertex");
        assert!((v.penetration_distance - 0.01).abs() < 1e-6);
    }
    assert!(graph.vertex_by_id("a").expect("a").support_contribution > 0.0);
    // No background, so nothing propagates.
    assert!(!flagged(&graph, "b"));
    assert_eq!(graph.supporters_of("b").expect("b"), vec![&ObjectId::from("a")]);
}

#[test]
fn reversing_gravity_flips_the_supporter() {
    let mut world = SnapshotWorld::default();
    let a = world.insert(cube("a", 0.0, 1.0));
    let b = world.insert(cube("b", 0.99, 1.0));
    world.push_manifold(resting(a, b, 0.01, 2.0));
    let config = AnalysisConfig::default();
    let builder = SupportGraphBuilder::new(&config);

    let down = builder
        .build_with_gravity(&world, Vec3::new(0.0, 0.0, -9.81), 0.01)
        .expect("build");
    let up = builder
        .build_with_gravity(&world, Vec3::new(0.0, 0.0, 9.81), 0.01)
        .expect("build");
    assert_eq!(down.supported_by("a").expect("a"), vec![&ObjectId::from("b")]);
    assert_eq!(up.supported_by("b").expect("b"), vec![&ObjectId::from("a")]);
    assert!(up.supported_by("a").expect("a").is_empty());
}

#[test]
fn building_twice_yields_identical_graphs() {
    let mut world = SnapshotWorld::default();
    let g = world.insert(cube("background", -0.5, 0.0));
    let a = world.insert(cube("a", 0.49, 1.0));
    let b = world.insert(cube("b", 1.48, 0.5));
    world.set_manifolds(vec![resting(g, a, 0.01, 1.0), resting(a, b, 0.02, 0.5)]);
    assert_eq!(build(&world), build(&world));
}

#[test]
fn ground_support_reaches_the_whole_stack() {
    let mut world = SnapshotWorld::default();
    let g = world.insert(cube("background", -0.5, 0.0));
    let a = world.insert(cube("a", 0.49, 1.0));
    let b = world.insert(cube("b", 1.48, 1.0));
    let c = world.insert(cube("c", 2.47, 1.0));
    world.insert(cube("loose", 10.0, 1.0));
    world.set_manifolds(vec![
        resting(g, a, 0.01, 1.0),
        resting(a, b, 0.01, 1.0),
        resting(b, c, 0.01, 1.0),
    ]);
    let graph = build(&world);
    for id in ["background", "a", "b", "c"] {
        assert!(flagged(&graph, id), "{id} should be ground supported");
    }
    assert!(!flagged(&graph, "loose"));
}

#[test]
fn support_cycles_do_not_hang_propagation() {
    // Regression: recursive propagation only guarded against self-loops and
    // never terminated on a longer cycle.
    let mut world = SnapshotWorld::default();
    let g = world.insert(cube("background", -0.5, 0.0));
    let a = world.insert(cube("a", 0.49, 1.0));
    let b = world.insert(cube("b", 1.48, 1.0));
    let c = world.insert(cube("c", 2.47, 1.0));
    world.set_manifolds(vec![
        resting(g, a, 0.01, 1.0),
        resting(a, b, 0.01, 1.0),
        resting(b, c, 0.01, 1.0),
        resting(c, a, 0.01, 1.0),
    ]);
    let graph = build(&world);
    assert_eq!(graph.edge_count(), 4);
    for id in ["a", "b", "c"] {
        assert!(flagged(&graph, id));
    }
}

#[test]
fn reverse_edge_is_reused_not_duplicated() {
    let mut world = SnapshotWorld::default();
    let a = world.insert(cube("a", 0.0, 1.0));
    let b = world.insert(cube("b", 0.99, 1.0));
    world.set_manifolds(vec![resting(a, b, 0.01, 1.0), resting(b, a, 0.01, 1.0)]);
    let graph = build(&world);
    assert_eq!(graph.edge_count(), 1);
    let va = graph.lookup("a").expect("a");
    let vb = graph.lookup("b").expect("b");
    assert!(graph.find_edge(va, vb).is_some());
    assert!(graph.find_edge(vb, va).is_none());
    // Both manifolds still count toward penetration and support.
    let v = graph.vertex_by_id("a").expect("a");
    assert!((v.penetration_distance - 0.02).abs() < 1e-6);
    assert!(graph.vertex_by_id("b").expect("b").support_contribution > 0.0);
}

fn tray(z: f32) -> RigidBody {
    let foot = Shape::Cuboid {
        half_extents: Vec3::new(0.25, 0.25, 0.5),
    };
    RigidBody::new(
        Shape::Compound {
            children: vec![
                CompoundChild {
                    local: Transform::from_translation(Vec3::new(-0.5, 0.0, 0.0)),
                    shape: foot.clone(),
                },
                CompoundChild {
                    local: Transform::from_translation(Vec3::new(0.5, 0.0, 0.0)),
                    shape: foot,
                },
            ],
        },
        Transform::from_translation(Vec3::new(0.0, 0.0, z)),
        1.0,
    )
    .with_identity("tray")
}

fn slab() -> RigidBody {
    RigidBody::new(
        Shape::Cuboid {
            half_extents: Vec3::new(1.0, 1.0, 0.5),
        },
        Transform::identity(),
        0.0,
    )
    .with_identity("background")
}

fn foot_contact(child: usize) -> ContactPoint {
    ContactPoint::new(-0.02, 1.0, Vec3::new(0.0, 0.0, -1.0)).with_child_indices(0, child)
}

#[test]
fn same_sub_shape_pair_credits_volume_once() {
    let mut world = SnapshotWorld::default();
    let s = world.insert(slab());
    let t = world.insert(tray(0.98));
    world.set_manifolds(vec![
        ContactManifold::new(s, t)
            .with_point(foot_contact(0))
            .with_point(foot_contact(0)),
        ContactManifold::new(s, t).with_point(foot_contact(0)),
    ]);
    let graph = build(&world);
    let v = graph.vertex_by_id("tray").expect("tray");
    // Three penetrating points, each 0.02 deep.
    assert!((v.penetration_distance - 0.06).abs() < 1e-5);
    // One foot: 0.5 x 0.5 footprint, 0.02 deep.
    assert!((v.colliding_volume - 0.005).abs() < 1e-5);
    let ground = graph.vertex_by_id("background").expect("background");
    assert!((ground.colliding_volume - v.colliding_volume).abs() < 1e-7);
}

#[test]
fn distinct_sub_shapes_each_credit_volume() {
    let mut world = SnapshotWorld::default();
    let s = world.insert(slab());
    let t = world.insert(tray(0.98));
    world.push_manifold(
        ContactManifold::new(s, t)
            .with_point(foot_contact(0))
            .with_point(foot_contact(1)),
    );
    let graph = build(&world);
    let v = graph.vertex_by_id("tray").expect("tray");
    assert!((v.colliding_volume - 0.01).abs() < 1e-5);
    let edge = graph
        .edges()
        .next()
        .map(|(_, e)| e.counted_shape_pairs.clone())
        .expect("one edge");
    assert_eq!(edge.into_iter().collect::<Vec<_>>(), vec![(0, 0), (0, 1)]);
}

#[test]
fn non_positive_time_step_is_rejected() {
    let world = SnapshotWorld::default();
    let config = AnalysisConfig::default();
    let builder = SupportGraphBuilder::new(&config);
    for dt in [0.0, -0.01, f32::NAN] {
        assert!(matches!(
            builder.build(&world, dt),
            Err(SupportError::InvalidTimeStep(_))
        ));
    }
}

#[test]
fn detached_bodies_get_no_vertex() {
    let mut world = SnapshotWorld::default();
    let a = world.insert(cube("a", 0.0, 1.0));
    let b = world.insert(cube("b", 0.99, 1.0));
    world.push_manifold(resting(a, b, 0.01, 1.0));
    world.set_active(b, false);
    let graph = build(&world);
    assert_eq!(graph.vertex_count(), 1);
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(
        graph.is_ground_supported("b"),
        Err(SupportError::UnknownObject(ObjectId::from("b")))
    );
}

#[test]
fn duplicate_ids_keep_both_vertices_and_index_the_later_one() {
    let mut world = SnapshotWorld::default();
    world.insert(cube("twin", 0.0, 1.0));
    let later = world.insert(cube("twin", 3.0, 1.0));
    let graph = build(&world);
    assert_eq!(graph.vertex_count(), 2);
    let v = graph.vertex_by_id("twin").expect("twin");
    assert_eq!(v.body, later);
}

#[test]
fn unlabelled_bodies_share_the_unrecognized_id() {
    let mut world = SnapshotWorld::default();
    world.insert(RigidBody::new(
        Shape::Sphere { radius: 0.2 },
        Transform::identity(),
        1.0,
    ));
    let graph = build(&world);
    assert!(graph.lookup(ObjectId::UNRECOGNIZED).is_some());
}

proptest! {
    #[test]
    fn gravity_sign_decides_direction(
        depth in 0.001f32..0.1,
        impulse in 0.01f32..10.0,
        g in 1.0f32..20.0,
    ) {
        let mut world = SnapshotWorld::default();
        let a = world.insert(cube("a", 0.0, 1.0));
        let b = world.insert(cube("b", 1.0 - depth, 1.0));
        world.push_manifold(resting(a, b, depth, impulse));
        let config = AnalysisConfig::default();
        let builder = SupportGraphBuilder::new(&config);
        let down = builder.build_with_gravity(&world, Vec3::new(0.0, 0.0, -g), 0.01).expect("build");
        let up = builder.build_with_gravity(&world, Vec3::new(0.0, 0.0, g), 0.01).expect("build");
        let (da, db) = (down.lookup("a").expect("a"), down.lookup("b").expect("b"));
        prop_assert!(down.find_edge(da, db).is_some());
        prop_assert!(up.find_edge(db, da).is_some());
        prop_assert_eq!(up.edge_count(), 1);
    }
}
