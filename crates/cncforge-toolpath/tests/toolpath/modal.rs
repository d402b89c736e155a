use cncforge_toolpath::{resolve_line, tokenize, ModalState};
use glam::DVec3;
use proptest::prelude::*;

fn modal_word() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("G90".to_string()),
        Just("G91".to_string()),
        Just("G17".to_string()),
        Just("G18".to_string()),
        Just("G19".to_string()),
        Just("G80".to_string()),
        Just("M3".to_string()),
        Just("M5".to_string()),
        (1u32..20000).prop_map(|f| format!("F{}", f)),
        (0u32..24000).prop_map(|s| format!("S{}", s)),
        (1u32..20).prop_map(|t| format!("T{}", t)),
    ]
}

proptest! {
    #[test]
    fn modal_only_lines_never_move_the_tool(
        x in -500.0f64..500.0,
        y in -500.0f64..500.0,
        z in -100.0f64..100.0,
        words in prop::collection::vec(modal_word(), 1..6),
    ) {
        let mut state = ModalState::new();
        state.position = DVec3::new(x, y, z);
        let line = tokenize(1, &words.join(" ")).unwrap();
        let before = state.position;
        let resolution = resolve_line(state, &line);
        prop_assert_eq!(resolution.state.position, before);
    }
}

#[test]
fn test_incremental_moves_accumulate() {
    let mut state = ModalState::new();
    for (i, raw) in ["G91", "G1 X1 F10", "X1", "X1 Y2"].iter().enumerate() {
        let line = tokenize(i + 1, raw).unwrap();
        state = resolve_line(state, &line).state;
    }
    assert_eq!(state.position, DVec3::new(3.0, 2.0, 0.0));
}
