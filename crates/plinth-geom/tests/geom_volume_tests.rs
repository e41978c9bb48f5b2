// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Integration tests for plinth-geom intersection volumes and contact bounds.

use plinth_geom::{intersection_volume, Aabb, CompoundChild, Quat, Shape, Transform, Vec3};
use proptest::prelude::*;

fn arb_box() -> impl Strategy<Value = Aabb> {
    (
        -10.0f32..10.0,
        -10.0f32..10.0,
        -10.0f32..10.0,
        0.01f32..5.0,
        0.01f32..5.0,
        0.01f32..5.0,
    )
        .prop_map(|(x, y, z, hx, hy, hz)| {
            Aabb::from_center_half_extents(Vec3::new(x, y, z), Vec3::new(hx, hy, hz))
        })
}

proptest! {
    #[test]
    fn intersection_volume_is_symmetric_and_bounded(a in arb_box(), b in arb_box()) {
        let ab = intersection_volume(&a, &b);
        let ba = intersection_volume(&b, &a);
        prop_assert!(ab >= 0.0);
        prop_assert_eq!(ab, ba);
        let bound = a.volume().min(b.volume());
        prop_assert!(ab <= bound * (1.0 + 1e-5) + 1e-6, "overlap {} exceeds {}", ab, bound);
    }

    #[test]
    fn disjoint_boxes_never_report_volume(a in arb_box(), gap in 0.001f32..50.0) {
        let shift = a.extents().x() + gap;
        let b = Aabb::new(
            a.min().add(&Vec3::new(shift, 0.0, 0.0)),
            a.max().add(&Vec3::new(shift, 0.0, 0.0)),
        );
        prop_assert_eq!(intersection_volume(&a, &b), 0.0);
    }
}

#[test]
fn rotated_compound_child_bounds() {
    use core::f32::consts::FRAC_PI_2;
    // A rod child offset along local X; the body is yawed 90° about Z so the
    // child ends up along world +Y.
    let shape = Shape::Compound {
        children: vec![CompoundChild {
            local: Transform::from_translation(Vec3::new(2.0, 0.0, 0.0)),
            shape: Shape::Cuboid {
                half_extents: Vec3::new(1.0, 0.1, 0.1),
            },
        }],
    };
    let pose = Transform::new(Vec3::ZERO, Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2));
    let (bb, idx) = shape.contact_aabb(&pose, 0).expect("child 0 exists");
    assert_eq!(idx, 0);
    let min = bb.min().to_array();
    let max = bb.max().to_array();
    assert!((min[1] - 1.0).abs() < 1e-4, "min={min:?}");
    assert!((max[1] - 3.0).abs() < 1e-4, "max={max:?}");
    assert!((max[0] - 0.1).abs() < 1e-4, "max={max:?}");
}

#[cfg(feature = "serde")]
#[test]
fn shapes_deserialize_from_tagged_json() {
    let json = r#"{"type":"compound","children":[
        {"local":{"translation":[0.0,0.0,1.0]},"shape":{"type":"sphere","radius":0.5}}
    ]}"#;
    let shape: Shape = serde_json::from_str(json).expect("valid shape json");
    assert!(shape.is_compound());
    assert_eq!(
        shape.child(0).map(|c| c.local.translation()),
        Some(Vec3::new(0.0, 0.0, 1.0))
    );
}
