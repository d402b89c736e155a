//! Rewrite rules, in pipeline order

pub mod consolidation;
pub mod fanuc;
pub mod feed_arc;
pub mod heidenhain;
pub mod normalize;
pub mod redundancy;

/// Modal groups a pure modal line may contain, as code keys
pub(crate) const MODAL_GROUPS: &[(&str, &[u32])] = &[
    ("distance", &[900, 910]),
    ("plane", &[170, 180, 190]),
    ("units", &[200, 210]),
    ("cutter_compensation", &[400, 410, 420]),
    ("length_offset", &[430, 440, 490]),
    ("cycle", &[800]),
    ("work_offset", &[540, 550, 560, 570, 580, 590]),
    ("feed_mode", &[930, 940, 950]),
    ("return_level", &[980, 990]),
    ("path_control", &[610, 640]),
];

/// Modal group of a code key
pub(crate) fn modal_group(key: u32) -> Option<&'static str> {
    MODAL_GROUPS
        .iter()
        .find(|(_, codes)| codes.contains(&key))
        .map(|(name, _)| *name)
}
