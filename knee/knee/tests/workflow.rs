//! End-to-end navigation workflow over the whole crate family:
//! landmark capture, shape fitting, frame construction, phase hand-off,
//! implant selection, live alignment, telemetry, and guide calibration.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use approx::assert_relative_eq;
use knee::align::{
    AlignmentEngine, BodyHandles, CondylarPoints, EngineConfig, RegistrationPhase, SampleBus,
    TransformArena,
};
use knee::frames::{build_frame, AnatomicalFrame, Side};
use knee::guide::{fit_circle, solve_motor_target, TieBreak};
use knee::implant::{select_implant, CheckPointPair, ImplantTemplate};
use knee::io::AlignmentRecord;
use knee::registration::{refine_icp, IcpParams};
use knee::shapefit::{fit_shape, LinearShapeModel, SearchParams, ShapeFitParams};
use knee::types::{BoneMesh, Landmark, Plane, RigidTransform, TrackedBody};
use nalgebra::{Point3, UnitQuaternion, Vector3};

/// Synthetic distal femur: six named landmarks plus a large distal facet
/// whose outward normal points distally (-z in bone coordinates).
fn femur_model() -> LinearShapeModel {
    let mut mean = BoneMesh::new();
    mean.vertices.push(Point3::new(0.0, 0.0, 0.0)); // knee center
    mean.vertices.push(Point3::new(0.0, 0.0, 380.0)); // hip center
    mean.vertices.push(Point3::new(45.0, 0.0, 5.0)); // lateral epicondyle
    mean.vertices.push(Point3::new(-45.0, 0.0, 5.0)); // medial epicondyle
    mean.vertices.push(Point3::new(-22.0, 5.0, -28.0)); // medial condyle
    mean.vertices.push(Point3::new(26.0, 5.0, -26.5)); // lateral condyle
    mean.vertices.push(Point3::new(-500.0, -500.0, -30.0));
    mean.vertices.push(Point3::new(500.0, -500.0, -30.0));
    mean.vertices.push(Point3::new(0.0, 500.0, -30.0));
    mean.faces.push([6, 8, 7]);

    for (name, vertex) in [
        ("knee_center", 0),
        ("hip_center", 1),
        ("lateral_epicondyle", 2),
        ("medial_epicondyle", 3),
        ("medial_condyle", 4),
        ("lateral_condyle", 5),
    ] {
        mean.bind_landmark(name, vertex).unwrap();
    }

    // One mode: epicondylar width.
    let mut mode = vec![Vector3::zeros(); 9];
    mode[2] = Vector3::new(5.0, 0.0, 0.0);
    mode[3] = Vector3::new(-5.0, 0.0, 0.0);
    LinearShapeModel::new(mean, vec![mode]).unwrap()
}

fn patient_motion() -> RigidTransform {
    RigidTransform::new(
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 10.0f64.to_radians()),
        Vector3::new(100.0, 50.0, 25.0),
    )
}

/// Digitized targets: the width-1.0 shape moved by the patient pose.
fn digitized_landmarks(model: &LinearShapeModel) -> Vec<Landmark> {
    let motion = patient_motion();
    let names: Vec<String> = model.landmark_names().map(String::from).collect();
    let positions = model.sample_landmarks(&[1.0]).unwrap();
    names
        .into_iter()
        .zip(positions)
        .map(|(name, p)| Landmark::new(name, motion.transform_point(&p), TrackedBody::Femur))
        .collect()
}

fn frame_from_mesh(mesh: &BoneMesh) -> AnatomicalFrame {
    build_frame(
        mesh.landmark_position("knee_center").unwrap(),
        mesh.landmark_position("hip_center").unwrap(),
        mesh.landmark_position("lateral_epicondyle").unwrap(),
        mesh.landmark_position("medial_epicondyle").unwrap(),
        Side::Right,
    )
    .unwrap()
}

#[test]
fn full_navigation_workflow() {
    let model = femur_model();
    let targets = digitized_landmarks(&model);

    // Fit the shape: grid search, deformation, in-process refinement.
    let params = ShapeFitParams::new()
        .with_search(SearchParams::new().with_steps_per_mode(vec![5]));
    let fit = fit_shape(&model, &targets, &params, Some(&model)).unwrap();
    assert!(fit.refined);
    assert_relative_eq!(fit.candidate.coefficients[0], 1.0, epsilon = 1e-9);
    assert!(fit.candidate.residual < 1e-6);

    // Every landmark landed on its digitized target.
    for target in &targets {
        let fitted = fit.mesh.landmark_position(&target.name).unwrap();
        assert_relative_eq!(fitted, target.position, epsilon = 1e-6);
    }

    // Registration phase: frames and mesh, then the atomic hand-off.
    let femur_frame = frame_from_mesh(&fit.mesh);
    let mut phase = RegistrationPhase::new();
    phase.set_femur_frame(femur_frame);
    phase.set_tibia_frame(femur_frame);
    phase.set_bone_mesh(fit.mesh.clone());
    let nav = phase.publish().unwrap();

    // Implant selection in the anatomical frame: the smaller size clears
    // the distal facet, the larger one is embedded.
    let candidates = vec![
        ImplantTemplate::new(
            "3",
            vec![CheckPointPair::new(
                Point3::new(10.0, 0.0, -35.0),
                Point3::new(-10.0, 0.0, -33.0),
            )],
        ),
        ImplantTemplate::new(
            "5",
            vec![CheckPointPair::new(
                Point3::new(10.0, 0.0, -29.0),
                Point3::new(-10.0, 0.0, -28.0),
            )],
        ),
    ];
    let selection = select_implant(&candidates, nav.bone_mesh(), nav.femur_frame());
    assert!(selection.feasible);
    assert_eq!(selection.index, 0);
    assert_eq!(selection.size_label, "3");

    // Live alignment: identity body poses, resection plane 30 mm below the
    // knee center along the mechanical axis.
    let mut arena = TransformArena::new();
    let femur_pose = arena.insert(RigidTransform::identity());
    let tibia_pose = arena.insert(RigidTransform::identity());

    let frame = *nav.femur_frame();
    let plane_point = frame.to_world().transform_point(&Point3::new(0.0, 0.0, -30.0));
    let resection_plane = Plane::new(plane_point, frame.mechanical_axis()).unwrap();
    let condyles = CondylarPoints {
        medial: nav.bone_mesh().landmark_position("medial_condyle").unwrap(),
        lateral: nav.bone_mesh().landmark_position("lateral_condyle").unwrap(),
    };

    let mut engine = AlignmentEngine::new(
        BodyHandles {
            frame,
            chain: vec![femur_pose],
        },
        BodyHandles {
            frame,
            chain: vec![tibia_pose],
        },
        resection_plane,
        condyles,
        EngineConfig::new().with_throttle(1),
    );

    let received = Rc::new(RefCell::new(Vec::new()));
    let mut bus = SampleBus::new();
    let sink = Rc::clone(&received);
    let handle = bus.subscribe(move |s| sink.borrow_mut().push(*s));

    let sample = engine.on_pose_update(&arena, 1_000).unwrap().unwrap();
    bus.publish(&sample);

    // Coincident frames: zero angles. Condyles sit 2.0 / 3.5 mm above the
    // resection plane.
    assert_relative_eq!(sample.varus_valgus_deg, 0.0, epsilon = 1e-9);
    assert_relative_eq!(sample.flexion_deg, 0.0, epsilon = 1e-9);
    assert_relative_eq!(sample.medial_gap_mm, 2.0, epsilon = 1e-6);
    assert_relative_eq!(sample.lateral_gap_mm, 3.5, epsilon = 1e-6);
    assert_eq!(received.borrow().len(), 1);
    assert!(bus.unsubscribe(handle));

    // Telemetry record round trip at display resolution.
    let record = AlignmentRecord {
        timestamp_ms: sample.timestamp_ms,
        varus_valgus_deg: sample.varus_valgus_deg,
        flexion_deg: sample.flexion_deg,
        medial_gap_mm: sample.medial_gap_mm,
        lateral_gap_mm: sample.lateral_gap_mm,
    };
    let parsed = AlignmentRecord::parse(&record.to_line()).unwrap();
    assert_eq!(parsed.timestamp_ms, 1_000);
    assert_relative_eq!(parsed.medial_gap_mm, 2.0, epsilon = 0.01);
    assert_relative_eq!(parsed.lateral_gap_mm, 3.5, epsilon = 0.01);
}

#[test]
fn icp_refines_probe_cloud_onto_fitted_mesh() {
    let model = femur_model();
    let targets = digitized_landmarks(&model);
    let params = ShapeFitParams::new()
        .with_search(SearchParams::new().with_steps_per_mode(vec![5]));
    let fit = fit_shape(&model, &targets, &params, None).unwrap();

    // A probe cloud captured slightly off the registered pose.
    let offset = Vector3::new(1.2, -0.7, 0.4);
    let moving: Vec<Point3<f64>> = fit
        .mesh
        .vertices
        .iter()
        .map(|p| Point3::from(p.coords - offset))
        .collect();

    let result = refine_icp(&moving, &fit.mesh, &IcpParams::default()).unwrap();
    assert!(result.residual < 1e-6, "residual {}", result.residual);
    assert_relative_eq!(result.transform.translation, offset, epsilon = 1e-6);
}

#[test]
fn guide_calibration_drives_the_second_motor() {
    // Sweep of the motor-2 marker around motor 1.
    let center = Point3::new(40.0, -15.0, 80.0);
    let radius = 60.0;
    let points: Vec<Point3<f64>> = (0..36)
        .map(|i| {
            let theta = TAU * f64::from(i) / 36.0;
            center + Vector3::new(radius * theta.cos(), radius * theta.sin(), 0.0)
        })
        .collect();

    let circle = fit_circle(&points).unwrap();
    assert_relative_eq!(circle.center, center, epsilon = 1e-4);
    assert_relative_eq!(circle.radius, radius, epsilon = 1e-4);

    // Drive motor 2 to the cut direction, resolving the two roots by the
    // per-cut policy.
    let target = solve_motor_target(
        circle.center,
        circle.radius,
        circle.normal,
        circle.center,
        Vector3::y(),
        TieBreak::MaxY,
    )
    .unwrap();
    assert_relative_eq!(
        target,
        center + Vector3::new(0.0, radius, 0.0),
        epsilon = 1e-4
    );
}
