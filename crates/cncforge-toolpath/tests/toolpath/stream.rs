use cncforge_core::ProgramError;
use cncforge_toolpath::{Toolpath, ToolpathConfig, ToolpathStream};

const PROGRAM: &str = "G90
G0 X0 Y0 Z5
G1 Z-5 F100
G81 X20 Y20 Z-10 R0
G0 Z5";

#[test]
fn test_end_to_end_program() {
    let toolpath = Toolpath::assemble(PROGRAM, &ToolpathConfig::default()).unwrap();
    // rapid, feed, three cycle points, rapid
    assert_eq!(toolpath.len(), 6);
    assert!(toolpath.warnings.is_empty());
    let last = toolpath.points.last().unwrap();
    assert_eq!((last.x, last.y, last.z), (20.0, 20.0, 5.0));
}

#[test]
fn test_stream_count_matches() {
    let stream = ToolpathStream::new(PROGRAM, ToolpathConfig::default()).unwrap();
    assert_eq!(stream.count(), 6);
}

#[test]
fn test_long_program_streams() {
    let program: String = (0..5000)
        .map(|i| format!("G1 X{} Y{} F500\n", i % 100, i / 100))
        .collect();
    let mut stream = ToolpathStream::new(&program, ToolpathConfig::default()).unwrap();
    let mut count = 0;
    for point in stream.by_ref() {
        assert_eq!(point.feed, Some(500.0));
        count += 1;
    }
    assert_eq!(count, 5000);
    assert!(stream.warnings().is_empty());
}

#[test]
fn test_empty_program() {
    assert!(matches!(
        ToolpathStream::new("  \n%\n", ToolpathConfig::default()),
        Err(ProgramError::Empty)
    ));
}
