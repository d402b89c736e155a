//! Heidenhain branch: conversational output
//!
//! Converts the ISO program into numbered conversational blocks framed by
//! `BEGIN PGM` / `END PGM`. Motions are written with absolute coordinates;
//! cycles and shapes are either expanded into straight moves or, with cycle
//! definitions enabled, emitted as `CYCL DEF` blocks called per hole.

use cncforge_core::Plane;
use cncforge_toolpath::{
    expand_cycle, expand_shape, resolve_line, split_comment, tokenize, ArcMove, CycleCode,
    CycleKind, FixedCycle, ModalState, Motion, MotionKind, ProgramLine, Step, ToolpathPoint,
};
use glam::DVec3;
use std::f64::consts::PI;

use crate::format::{format_number, format_signed};
use crate::options::OptimizationOptions;
use crate::pipeline::OptimizationRule;

/// Whether a program is already in conversational form
pub fn is_conversational(lines: &[String]) -> bool {
    lines
        .iter()
        .map(|line| line.trim())
        .find(|line| !line.is_empty())
        .is_some_and(|line| {
            line.trim_start_matches(|c: char| c.is_ascii_digit())
                .trim_start()
                .starts_with("BEGIN PGM")
        })
}

fn component(v: DVec3, axis: char) -> f64 {
    match axis {
        'X' => v.x,
        'Y' => v.y,
        _ => v.z,
    }
}

/// In-plane axes and the normal axis
fn plane_axes(plane: Plane) -> (char, char, char) {
    match plane {
        Plane::XY => ('X', 'Y', 'Z'),
        Plane::ZX => ('Z', 'X', 'Y'),
        Plane::YZ => ('Y', 'Z', 'X'),
    }
}

/// Single-line `CYCL DEF` for a cycle occurrence
fn cycle_definition(
    cycle: &FixedCycle,
    options: &OptimizationOptions,
    spindle: Option<f64>,
) -> String {
    let places = options.decimal_places();
    let q = |number: u32, value: f64| format!("Q{}={}", number, format_signed(value, places));
    let p = &cycle.params;
    let depth = p.z - p.r;
    let feed = p.feed.unwrap_or(0.0);
    let dwell = p.dwell_time.unwrap_or(0.0);

    let (number, name, params) = match cycle.code {
        CycleCode::Known(CycleKind::Drilling)
        | CycleCode::Known(CycleKind::DrillingDwell)
        | CycleCode::Known(CycleKind::PeckDrilling)
        | CycleCode::Unhandled(73) => (
            200,
            "DRILLING",
            vec![
                q(200, 0.0),
                q(201, depth),
                q(206, feed),
                q(202, p.peck_increment.unwrap_or(depth.abs())),
                q(210, 0.0),
                q(203, p.r),
                q(204, 0.0),
                q(211, dwell),
            ],
        ),
        CycleCode::Known(CycleKind::RightTapping) => {
            let pitch = spindle.filter(|s| *s > 0.0).map_or(0.0, |s| feed / s);
            (
                207,
                "RIGID TAPPING NEW",
                vec![q(200, 0.0), q(201, depth), q(239, pitch), q(203, p.r), q(204, 0.0)],
            )
        }
        CycleCode::Known(CycleKind::Boring) | CycleCode::Known(CycleKind::BoringFeedRetract) => (
            201,
            "REAMING",
            vec![
                q(200, 0.0),
                q(201, depth),
                q(206, feed),
                q(211, dwell),
                q(208, feed),
                q(203, p.r),
                q(204, 0.0),
            ],
        ),
        CycleCode::Known(CycleKind::BackBoring) => {
            let config = options.toolpath();
            (
                204,
                "BACK BORING",
                vec![
                    q(200, 0.0),
                    q(249, config.back_boring_cut),
                    q(250, depth.abs()),
                    q(251, p.shift.unwrap_or(config.back_boring_shift)),
                    q(252, 0.0),
                    q(253, feed),
                    q(254, feed),
                    q(255, dwell),
                    q(203, p.r),
                    q(204, 0.0),
                    q(214, 1.0),
                    q(336, 0.0),
                ],
            )
        }
        CycleCode::Known(CycleKind::BoringDwell)
        | CycleCode::Known(CycleKind::BoringManualRetract)
        | CycleCode::Unhandled(_) => (
            202,
            "BORING",
            vec![
                q(200, 0.0),
                q(201, depth),
                q(206, feed),
                q(211, dwell),
                q(208, feed),
                q(214, 0.0),
                q(336, 0.0),
                q(203, p.r),
                q(204, 0.0),
            ],
        ),
    };
    format!("CYCL DEF {} {} {}", number, name, params.join(" "))
}

/// Accumulates conversational blocks for one program
struct Converter<'o> {
    options: &'o OptimizationOptions,
    blocks: Vec<String>,
    position: DVec3,
    feed: Option<f64>,
    definition: Option<String>,
}

impl<'o> Converter<'o> {
    fn new(options: &'o OptimizationOptions) -> Self {
        Self {
            options,
            blocks: Vec::new(),
            position: DVec3::ZERO,
            feed: None,
            definition: None,
        }
    }

    fn places(&self) -> u8 {
        self.options.decimal_places()
    }

    fn coord(&self, axis: char, value: f64) -> String {
        format!("{}{}", axis, format_signed(value, self.places()))
    }

    fn axes(&self, target: DVec3, axes: &[char]) -> String {
        axes.iter()
            .map(|axis| self.coord(*axis, component(target, *axis)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Axes that differ from the current position, all three if none do
    fn changed_axes(&self, target: DVec3) -> Vec<char> {
        let changed: Vec<char> = ['X', 'Y', 'Z']
            .into_iter()
            .filter(|axis| {
                (component(target, *axis) - component(self.position, *axis)).abs() > 1e-9
            })
            .collect();
        if changed.is_empty() {
            vec!['X', 'Y', 'Z']
        } else {
            changed
        }
    }

    fn programmed_axes(&self, line: &ProgramLine, target: DVec3) -> Vec<char> {
        let programmed: Vec<char> = ['X', 'Y', 'Z']
            .into_iter()
            .filter(|axis| line.has(*axis))
            .collect();
        if programmed.is_empty() {
            self.changed_axes(target)
        } else {
            programmed
        }
    }

    fn feed_word(&mut self, feed: Option<f64>) -> String {
        match feed {
            Some(f) if self.feed != Some(f) => {
                self.feed = Some(f);
                format!(" F{}", format_number(f, self.places()))
            }
            _ => String::new(),
        }
    }

    fn push(&mut self, block: impl Into<String>) {
        self.blocks.push(block.into());
    }

    fn rapid(&mut self, target: DVec3, axes: &[char]) {
        let block = format!("L {} R0 FMAX", self.axes(target, axes));
        self.push(block);
        self.position = target;
    }

    fn linear(&mut self, target: DVec3, axes: &[char], feed: Option<f64>) {
        let feed = self.feed_word(feed);
        let block = format!("L {} R0{}", self.axes(target, axes), feed);
        self.push(block);
        self.position = target;
    }

    fn dwell(&mut self, seconds: f64) {
        self.push("CYCL DEF 9.0 DWELL TIME");
        let block = format!("CYCL DEF 9.1 DWELL {}", format_number(seconds, self.places()));
        self.push(block);
    }

    fn arc(&mut self, arc: &ArcMove, radius_form: bool) {
        let (u, v, normal) = plane_axes(arc.plane);
        let rotation = if arc.direction.is_clockwise() { "DR-" } else { "DR+" };
        let mut end = self.axes(arc.end, &[u, v]);
        if arc.helical_end.is_some() {
            end = format!("{} {}", end, self.coord(normal, component(arc.end, normal)));
        }
        let feed = self.feed_word(arc.feed);

        if radius_form {
            let radius = if arc.sweep().abs() > PI + 1e-9 { -arc.radius } else { arc.radius };
            let block = format!(
                "CR {} R{} {} R0{}",
                end,
                format_signed(radius, self.places()),
                rotation,
                feed
            );
            self.push(block);
        } else {
            let center = format!("CC {}", self.axes(arc.center, &[u, v]));
            self.push(center);
            self.push(format!("C {} {} R0{}", end, rotation, feed));
        }
        self.position = arc.end;
    }

    /// Straight-move rendition of expanded cycle or shape points
    fn points(&mut self, points: &[ToolpathPoint]) {
        for point in points {
            let at = point.position();
            if point.kind == MotionKind::Dwell {
                self.dwell(point.cycle.and_then(|c| c.dwell).unwrap_or(0.0));
                continue;
            }
            if at.distance(self.position) < 1e-9 {
                continue;
            }
            let axes = self.changed_axes(at);
            if point.is_rapid {
                self.rapid(at, &axes);
            } else {
                self.linear(at, &axes, point.feed);
            }
        }
    }

    fn cycle(&mut self, cycle: &FixedCycle, spindle: Option<f64>) {
        if !self.options.heidenhain().cycle_definitions {
            let expansion = expand_cycle(cycle, self.options.toolpath());
            self.points(&expansion.points);
            return;
        }

        let definition = cycle_definition(cycle, self.options, spindle);
        if self.definition.as_ref() != Some(&definition) {
            self.push(definition.clone());
            self.definition = Some(definition);
        }
        let p = cycle.params;
        if (self.position.z - p.r).abs() > 1e-9 {
            let clearance = DVec3::new(self.position.x, self.position.y, p.r);
            self.rapid(clearance, &['Z']);
        }
        let call = format!("L {} R0 FMAX M99", self.axes(cycle.end_position(), &['X', 'Y']));
        self.push(call);
        self.position = cycle.end_position();
    }

    fn line(&mut self, raw: &str, number: usize, state: ModalState) -> ModalState {
        let (_, comment) = split_comment(raw);
        if let Some(comment) = comment {
            self.push(format!("; {}", comment));
        }
        let Some(line) = tokenize(number, raw) else {
            return state;
        };

        let resolution = resolve_line(state, &line);
        let next = resolution.state;
        let speed = line
            .value('S')
            .map(|s| format!(" S{}", format_number(s, self.places())))
            .unwrap_or_default();
        match next.tool.filter(|_| line.has('T')) {
            Some(tool) => self.push(format!("TOOL CALL {} Z{}", tool, speed)),
            None if !speed.is_empty() => self.push(format!("TOOL CALL{}", speed)),
            None => {}
        }

        let before = self.blocks.len();
        match resolution.step {
            Step::Idle => {}
            Step::Motion(Motion::Rapid { end, .. }) => {
                let axes = self.programmed_axes(&line, end);
                self.rapid(end, &axes);
            }
            Step::Motion(Motion::Linear { end, feed, .. }) => {
                let axes = self.programmed_axes(&line, end);
                self.linear(end, &axes, feed);
            }
            Step::Motion(Motion::Arc(arc)) => self.arc(&arc, line.has('R')),
            Step::Motion(Motion::Dwell { seconds, .. }) => self.dwell(seconds),
            Step::Motion(Motion::Shape(request)) => {
                let expansion = expand_shape(&request, self.options.toolpath());
                self.points(&expansion.points);
            }
            Step::Cycle(cycle) => self.cycle(&cycle, next.spindle_speed),
        }
        self.position = next.position;

        // tool changes are covered by TOOL CALL
        let m_words: Vec<String> = line
            .m_codes()
            .filter(|m| *m != 6)
            .map(|m| format!("M{}", m))
            .collect();
        if !m_words.is_empty() {
            let m_words = m_words.join(" ");
            let grew = self.blocks.len() > before;
            match self.blocks.last_mut() {
                Some(last) if grew && last.starts_with("L ") => {
                    last.push(' ');
                    last.push_str(&m_words);
                }
                _ => self.push(format!("L {}", m_words)),
            }
        }
        next
    }

    fn finish(self, name: &str, unit: &str) -> Vec<String> {
        std::iter::once(format!("BEGIN PGM {} {}", name, unit))
            .chain(self.blocks)
            .chain(std::iter::once(format!("END PGM {} {}", name, unit)))
            .enumerate()
            .map(|(i, block)| format!("{} {}", i, block))
            .collect()
    }
}

pub struct ConversationalRule;

impl OptimizationRule for ConversationalRule {
    fn name(&self) -> &str {
        "heidenhain"
    }

    fn description(&self) -> &str {
        "Converted to Heidenhain conversational format"
    }

    fn is_enabled(&self, options: &OptimizationOptions) -> bool {
        options.is_heidenhain() && options.heidenhain().conversational
    }

    fn keeps_iso_form(&self) -> bool {
        false
    }

    fn apply(&self, lines: &[String], options: &OptimizationOptions) -> Vec<String> {
        if is_conversational(lines) {
            return lines.to_vec();
        }
        let inch = lines
            .iter()
            .enumerate()
            .filter_map(|(i, raw)| tokenize(i + 1, raw))
            .any(|line| line.has_g(200));
        let unit = if inch { "INCH" } else { "MM" };

        let mut converter = Converter::new(options);
        let mut state = ModalState::new();
        for (i, raw) in lines.iter().enumerate() {
            state = converter.line(raw, i + 1, state);
        }
        converter.finish(options.heidenhain().program_name.trim(), unit)
    }

    fn summarize(&self, _before: &[String], after: &[String]) -> String {
        format!("Converted to {} Heidenhain conversational block(s)", after.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cncforge_core::Controller;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    fn options(definitions: bool) -> OptimizationOptions {
        OptimizationOptions::builder(Controller::Heidenhain)
            .conversational(true)
            .cycle_definitions(definitions)
            .program_name("PART1")
            .build()
            .unwrap()
    }

    #[test]
    fn test_detects_conversational_input() {
        assert!(is_conversational(&lines("\n0 BEGIN PGM X MM\n1 END PGM X MM")));
        assert!(!is_conversational(&lines("G0 X1\nBEGIN PGM X MM")));
    }

    #[test]
    fn test_converts_simple_program() {
        let input = lines(concat!(
            "G90 G21\nT1 M6\nS1200 M3\nG0 X10 Y5 Z5 (approach)\n",
            "G1 Z-1 F200\nG2 X20 Y5 I5 J0\nG0 Z5\nM30",
        ));
        let out = ConversationalRule.apply(&input, &options(false));
        assert_eq!(
            out,
            vec![
                "0 BEGIN PGM PART1 MM",
                "1 TOOL CALL 1 Z",
                "2 TOOL CALL S1200",
                "3 L M3",
                "4 ; approach",
                "5 L X+10 Y+5 Z+5 R0 FMAX",
                "6 L Z-1 R0 F200",
                "7 CC X+15 Y+5",
                "8 C X+20 Y+5 DR- R0",
                "9 L Z+5 R0 FMAX",
                "10 L M30",
                "11 END PGM PART1 MM",
            ]
        );
    }

    #[test]
    fn test_radius_arc_and_dwell() {
        let input = lines("G21\nG1 X10 F100\nG3 X20 Y0 R5\nG4 P1.5");
        let out = ConversationalRule.apply(&input, &options(false));
        assert!(out.contains(&"2 CR X+20 Y+0 R+5 DR+ R0".to_string()));
        assert!(out.contains(&"3 CYCL DEF 9.0 DWELL TIME".to_string()));
        assert!(out.contains(&"4 CYCL DEF 9.1 DWELL 1.5".to_string()));
    }

    #[test]
    fn test_inch_programs() {
        let out = ConversationalRule.apply(&lines("G20\nG0 X1"), &options(false));
        assert_eq!(out[0], "0 BEGIN PGM PART1 INCH");
        assert_eq!(out.last().unwrap(), "2 END PGM PART1 INCH");
    }

    #[test]
    fn test_cycle_definition_called_per_hole() {
        let input = lines("G0 X0 Y0 Z10\nG81 X5 Y5 Z-10 R2 F100\nX15\nG80\nM30");
        let out = ConversationalRule.apply(&input, &options(true));
        assert_eq!(out[1], "1 L X+0 Y+0 Z+10 R0 FMAX");
        assert_eq!(
            out[2],
            concat!(
                "2 CYCL DEF 200 DRILLING Q200=+0 Q201=-12 Q206=+100 Q202=+12 ",
                "Q210=+0 Q203=+2 Q204=+0 Q211=+0"
            )
        );
        assert_eq!(out[3], "3 L Z+2 R0 FMAX");
        assert_eq!(out[4], "4 L X+5 Y+5 R0 FMAX M99");
        assert_eq!(out[5], "5 L X+15 Y+5 R0 FMAX M99");
        assert_eq!(out[6], "6 L M30");
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn test_cycles_expanded_without_definitions() {
        let input = lines("G0 X0 Y0 Z10\nG81 X5 Y5 Z-10 R2 F100\nG80");
        let out = ConversationalRule.apply(&input, &options(false));
        assert_eq!(out[2], "2 L X+5 Y+5 Z+2 R0 FMAX");
        assert_eq!(out[3], "3 L Z-10 R0 F100");
        assert_eq!(out[4], "4 L Z+2 R0 FMAX");
    }

    #[test]
    fn test_conversational_input_passes_through() {
        let input = lines("0 BEGIN PGM A MM\n1 L X+1 R0 FMAX\n2 END PGM A MM");
        assert_eq!(ConversationalRule.apply(&input, &options(false)), input);
    }
}
