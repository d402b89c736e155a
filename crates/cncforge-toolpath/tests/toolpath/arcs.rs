use cncforge_toolpath::{
    interpolate_arc, resolve_line, tokenize, ArcDirection, ModalState, Motion, MotionKind, Step,
    Toolpath, ToolpathConfig,
};
use glam::DVec3;

fn arc_from_origin(text: &str) -> cncforge_toolpath::ArcMove {
    let line = tokenize(1, text).unwrap();
    match resolve_line(ModalState::new(), &line).step {
        Step::Motion(Motion::Arc(arc)) => arc,
        other => panic!("expected an arc, got {:?}", other),
    }
}

#[test]
fn test_offset_arc_center_and_endpoints() {
    let arc = arc_from_origin("G2 X10 Y0 I10 J0 F100");
    assert!(arc.center.distance(DVec3::new(10.0, 0.0, 0.0)) < 1e-9);
    assert!((arc.radius - 10.0).abs() < 1e-9);
    assert_eq!(arc.direction, ArcDirection::Clockwise);

    let points = interpolate_arc(&arc, 10.0);
    assert!(points.len() - 1 >= 4);
    assert!(points[0].distance(DVec3::ZERO) < 1e-4);
    assert!(points[points.len() - 1].distance(DVec3::new(10.0, 0.0, 0.0)) < 1e-4);
}

#[test]
fn test_offsets_ignore_incremental_mode() {
    let program = "G0 X5 Y5\nG91\nG3 X0 Y10 I0 J5 F200";
    let toolpath = Toolpath::assemble(program, &ToolpathConfig::default()).unwrap();
    let arc = toolpath
        .points
        .iter()
        .find_map(|p| p.arc)
        .expect("arc metadata");
    assert!((arc.center[0] - 5.0).abs() < 1e-9);
    assert!((arc.center[1] - 10.0).abs() < 1e-9);
    let last = toolpath.points.last().unwrap();
    assert!((last.x - 5.0).abs() < 1e-9);
    assert!((last.y - 15.0).abs() < 1e-9);
}

#[test]
fn test_degenerate_radius_warns_without_failing() {
    let program = "G0 X0 Y0\nG2 X20 Y0 R8 F100";
    let toolpath = Toolpath::assemble(program, &ToolpathConfig::default()).unwrap();
    assert_eq!(toolpath.warnings.len(), 1);
    assert_eq!(toolpath.warnings[0].line, 2);
    let arc = toolpath.points.iter().find_map(|p| p.arc).unwrap();
    assert!((arc.radius - 10.0).abs() < 1e-5);
    assert!(arc.radius > 10.0);
}

#[test]
fn test_finer_resolution_gives_more_points() {
    let program = "G0 X10 Y0\nG3 X-10 Y0 I-10 J0 F100";
    let coarse = Toolpath::assemble(program, &ToolpathConfig::with_resolution(10.0)).unwrap();
    let fine = Toolpath::assemble(program, &ToolpathConfig::with_resolution(0.5)).unwrap();
    assert!(fine.len() > coarse.len());
    assert!(fine
        .points
        .iter()
        .skip(1)
        .all(|p| p.kind == MotionKind::Arc && p.feed == Some(100.0)));
}

#[test]
fn test_modal_arc_continuation() {
    let program = "G0 X10 Y0\nG2 X0 Y-10 I-10 J0 F100\nX-10 Y0 I0 J10";
    let toolpath = Toolpath::assemble(program, &ToolpathConfig::default()).unwrap();
    let on_line_3 = toolpath.points.iter().filter(|p| p.line == 3).count();
    assert!(on_line_3 >= 4);
    assert!(toolpath.points.iter().filter(|p| p.line == 3).all(|p| p.kind == MotionKind::Arc));
}
