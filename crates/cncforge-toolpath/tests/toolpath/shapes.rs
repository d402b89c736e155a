use cncforge_toolpath::{MotionKind, ShapeKind, Toolpath, ToolpathConfig};

#[test]
fn test_shape_is_bracketed_by_markers() {
    let toolpath = Toolpath::assemble(
        "G0 X0 Y0 Z0\nG12 X0 Y0 Z-2 R10 Q2 F300\nG0 Z5",
        &ToolpathConfig::default(),
    )
    .unwrap();
    let shape: Vec<_> = toolpath.points.iter().filter(|p| p.line == 2).collect();

    let open = shape.first().unwrap();
    assert_eq!(open.kind, MotionKind::ShapeMarker);
    assert_eq!(
        open.shape.map(|s| s.kind),
        Some(ShapeKind::Circle { clockwise: true })
    );

    let close = shape.last().unwrap();
    assert_eq!(close.kind, MotionKind::ShapeMarker);
    assert!(close.shape.is_none());
    assert_eq!((close.x, close.y, close.z), (0.0, 0.0, -2.0));

    assert!(shape[1..shape.len() - 1]
        .iter()
        .all(|p| p.kind == MotionKind::Shape && p.feed == Some(300.0)));
}

#[test]
fn test_tool_rests_at_shape_end() {
    let toolpath = Toolpath::assemble(
        "G13.2 X0 Y0 Z0 R4 Q8\nG1 X1",
        &ToolpathConfig::default(),
    )
    .unwrap();
    let last = toolpath.points.last().unwrap();
    assert_eq!((last.x, last.y, last.z), (1.0, 0.0, 8.0));
}

#[test]
fn test_sphere_cap_is_clamped() {
    let toolpath =
        Toolpath::assemble("G13.1 X0 Y0 Z0 R5 Q30", &ToolpathConfig::default()).unwrap();
    assert_eq!(toolpath.warnings.len(), 1);
    let lowest = toolpath
        .points
        .iter()
        .map(|p| p.z)
        .fold(f64::INFINITY, f64::min);
    assert!((lowest + 5.0).abs() < 1e-6);
}

#[test]
fn test_missing_width_skips_extrusion() {
    let toolpath = Toolpath::assemble("G0 X1\nG13.3 X10 Y0", &ToolpathConfig::default()).unwrap();
    assert_eq!(toolpath.len(), 1);
    assert_eq!(toolpath.warnings.len(), 1);
}
