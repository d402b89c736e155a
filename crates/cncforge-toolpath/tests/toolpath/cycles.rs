use cncforge_toolpath::{
    CycleKind, CyclePhase, MotionKind, Toolpath, ToolpathConfig, ToolpathPoint,
};

fn expand(program: &str) -> Toolpath {
    Toolpath::assemble(program, &ToolpathConfig::default()).unwrap()
}

fn on_line(toolpath: &Toolpath, line: usize) -> Vec<&ToolpathPoint> {
    toolpath.points.iter().filter(|p| p.line == line).collect()
}

#[test]
fn test_single_drilling_line() {
    let toolpath = expand("G81 X20 Y20 Z-10 R0");
    let z: Vec<(f64, bool)> = toolpath.points.iter().map(|p| (p.z, p.is_rapid)).collect();
    assert_eq!(z, vec![(0.0, true), (-10.0, false), (0.0, true)]);
    assert!(toolpath.points.iter().all(|p| p.x == 20.0 && p.y == 20.0));
}

#[test]
fn test_peck_drilling_phases() {
    let toolpath = expand("G0 X0 Y0 Z5\nG83 X0 Y0 Z-20 R-2 Q5 F80");
    let points = on_line(&toolpath, 2);

    let pecks: Vec<&&ToolpathPoint> = points
        .iter()
        .filter(|p| p.cycle.map(|c| c.phase) == Some(CyclePhase::Peck))
        .collect();
    assert_eq!(pecks.len(), 4);
    assert_eq!(pecks.last().unwrap().z, -20.0);
    assert_eq!(
        pecks.iter().map(|p| p.z).collect::<Vec<_>>(),
        vec![-7.0, -12.0, -17.0, -20.0]
    );

    // approach, then peck/retract pairs
    assert_eq!(points.len(), 1 + 2 * 4);
    for pair in points[1..].chunks(2) {
        assert_eq!(pair[0].kind, MotionKind::Linear);
        assert!(pair[1].is_rapid);
        assert_eq!(pair[1].z, -2.0);
    }
    let last = points.last().unwrap();
    assert_eq!(last.z, -2.0);
    assert_eq!(last.cycle.unwrap().phase, CyclePhase::Retract);
}

#[test]
fn test_peck_without_increment_drills_once() {
    let toolpath = expand("G83 X0 Y0 Z-20 R-2");
    assert_eq!(toolpath.len(), 3);
    assert_eq!(toolpath.warnings.len(), 1);
}

#[test]
fn test_dwell_cycles_carry_dwell_time() {
    let toolpath = expand("G82 X1 Y1 Z-4 R1 P0.3 F50");
    let dwell = toolpath
        .points
        .iter()
        .find(|p| p.kind == MotionKind::Dwell)
        .unwrap();
    assert_eq!(dwell.z, -4.0);
    assert_eq!(dwell.cycle.unwrap().dwell, Some(0.3));
    assert_eq!(dwell.cycle.unwrap().kind, Some(CycleKind::DrillingDwell));
}

#[test]
fn test_dwell_cycle_without_p_warns() {
    for program in [
        "G82 X1 Y1 Z-4 R1 F50",
        "G86 X1 Y1 Z-4 R1 F50",
        "G88 X1 Y1 Z-4 R1 F50",
        "G89 X1 Y1 Z-4 R1 F50",
    ] {
        let toolpath = expand(program);
        assert_eq!(toolpath.warnings.len(), 1, "{program}");
        assert!(toolpath.warnings[0].message.contains("without P word"));
        let dwell = toolpath
            .points
            .iter()
            .find(|p| p.kind == MotionKind::Dwell)
            .unwrap();
        assert_eq!(dwell.cycle.unwrap().dwell, Some(0.0));
    }
}

#[test]
fn test_boring_feed_retract() {
    let toolpath = expand("G89 X0 Y0 Z-6 R1 P1 F40");
    let kinds: Vec<MotionKind> = toolpath.points.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            MotionKind::Rapid,
            MotionKind::Linear,
            MotionKind::Dwell,
            MotionKind::Linear
        ]
    );
    assert_eq!(toolpath.points.last().unwrap().z, 1.0);
}

#[test]
fn test_back_boring_seven_phases() {
    let toolpath = expand("G87 X10 Y0 Z-20 R2 Q1.5 F60");
    // approach + seven phases
    assert_eq!(toolpath.len(), 8);
    let shifted = &toolpath.points[1];
    assert_eq!(shifted.x, 11.5);
    assert!(shifted.is_rapid);

    let cut = &toolpath.points[4];
    assert_eq!(cut.cycle.unwrap().phase, CyclePhase::BackCut);
    assert_eq!(cut.z, -18.0);
    assert_eq!(cut.x, 10.0);

    let end = toolpath.points.last().unwrap();
    assert_eq!((end.x, end.y, end.z), (10.0, 0.0, 2.0));
}

#[test]
fn test_back_boring_shift_from_config() {
    let config = ToolpathConfig {
        back_boring_shift: 3.0,
        ..ToolpathConfig::default()
    };
    let toolpath = Toolpath::assemble("G87 X0 Y0 Z-10 R0", &config).unwrap();
    assert_eq!(toolpath.points[1].x, 3.0);
}

#[test]
fn test_incremental_cycle_planes() {
    let toolpath = expand("G0 X0 Y0 Z10\nG91\nG81 X5 Y5 Z-8 R-4 F100");
    let points = on_line(&toolpath, 3);
    assert_eq!(points[0].z, 6.0);
    assert_eq!(points[1].z, -2.0);
    assert_eq!((points[0].x, points[0].y), (5.0, 5.0));
}

#[test]
fn test_unhandled_cycle_falls_back() {
    let toolpath = expand("G73 X0 Y0 Z-5 R1 Q1");
    assert_eq!(toolpath.len(), 3);
    assert_eq!(toolpath.points[0].cycle.unwrap().kind, None);
    assert!(toolpath.warnings[0].message.contains("unhandled cycle type"));
}
