//! Canned-cycle expander
//!
//! A single cycle line (G81-G89, plus G73/G76) implies several physical
//! moves. Each cycle kind has its own expansion below; the match over
//! [`CycleKind`] is exhaustive so a new kind cannot be left unhandled.

use cncforge_core::constants::{COORD_TOLERANCE, MAX_PECKS};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use super::modal::{ActiveCycle, ModalState};
use super::tokenizer::ProgramLine;
use crate::config::ToolpathConfig;
use crate::diagnostics::ParseWarning;
use crate::toolpath::{CycleInfo, CyclePhase, ToolpathPoint};

/// Canned cycles with a dedicated expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleKind {
    /// G81
    Drilling,
    /// G82
    DrillingDwell,
    /// G83
    PeckDrilling,
    /// G84
    RightTapping,
    /// G85
    Boring,
    /// G86
    BoringDwell,
    /// G87
    BackBoring,
    /// G88
    BoringManualRetract,
    /// G89
    BoringFeedRetract,
}

impl CycleKind {
    pub const ALL: [CycleKind; 9] = [
        CycleKind::Drilling,
        CycleKind::DrillingDwell,
        CycleKind::PeckDrilling,
        CycleKind::RightTapping,
        CycleKind::Boring,
        CycleKind::BoringDwell,
        CycleKind::BackBoring,
        CycleKind::BoringManualRetract,
        CycleKind::BoringFeedRetract,
    ];

    pub fn g_code(&self) -> u32 {
        match self {
            Self::Drilling => 81,
            Self::DrillingDwell => 82,
            Self::PeckDrilling => 83,
            Self::RightTapping => 84,
            Self::Boring => 85,
            Self::BoringDwell => 86,
            Self::BackBoring => 87,
            Self::BoringManualRetract => 88,
            Self::BoringFeedRetract => 89,
        }
    }

    /// Whether the expansion holds at the bottom for the P word
    pub fn dwells(&self) -> bool {
        matches!(
            self,
            Self::DrillingDwell
                | Self::BoringDwell
                | Self::BoringManualRetract
                | Self::BoringFeedRetract
        )
    }

    pub fn from_g_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.g_code() == code)
    }
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Drilling => "drilling",
            Self::DrillingDwell => "drilling with dwell",
            Self::PeckDrilling => "peck drilling",
            Self::RightTapping => "right-hand tapping",
            Self::Boring => "boring",
            Self::BoringDwell => "boring with dwell",
            Self::BackBoring => "back boring",
            Self::BoringManualRetract => "boring with manual retract",
            Self::BoringFeedRetract => "boring with feed retract",
        };
        write!(f, "{} (G{})", name, self.g_code())
    }
}

/// A recognized cycle code, with or without a dedicated expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleCode {
    Known(CycleKind),
    /// G73 / G76: expanded with the generic feed-and-retract fallback
    Unhandled(u32),
}

impl CycleCode {
    /// Map a code key (G number times ten) to a cycle code
    pub fn from_key(key: u32) -> Option<Self> {
        if key % 10 != 0 {
            return None;
        }
        match key / 10 {
            73 | 76 => Some(Self::Unhandled(key / 10)),
            code => CycleKind::from_g_code(code).map(Self::Known),
        }
    }

    pub fn g_code(&self) -> u32 {
        match self {
            Self::Known(kind) => kind.g_code(),
            Self::Unhandled(code) => *code,
        }
    }

    pub fn kind(&self) -> Option<CycleKind> {
        match self {
            Self::Known(kind) => Some(*kind),
            Self::Unhandled(_) => None,
        }
    }
}

/// Resolved absolute cycle parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleParams {
    pub x: f64,
    pub y: f64,
    /// Hole bottom
    pub z: f64,
    /// Retract plane
    pub r: f64,
    /// Always > 0 when present
    pub peck_increment: Option<f64>,
    pub dwell_time: Option<f64>,
    /// Back boring lateral shift from the Q word
    pub shift: Option<f64>,
    pub feed: Option<f64>,
}

/// One cycle occurrence: a defining line or a repeat of the active cycle
#[derive(Debug, Clone, PartialEq)]
pub struct FixedCycle {
    pub code: CycleCode,
    pub params: CycleParams,
    pub source: String,
    pub lines: RangeInclusive<usize>,
}

impl FixedCycle {
    /// Resolve the active cycle's words against the state at `line`
    ///
    /// In incremental mode R is measured from the current Z and Z from the
    /// R plane. Missing Z or R words fall back to the current Z.
    pub fn resolve(
        state: &ModalState,
        active: &ActiveCycle,
        line: &ProgramLine,
    ) -> (Self, Vec<ParseWarning>) {
        let mut warnings = Vec::new();
        let current = state.position;
        let code = active.code;

        let x = state.resolve_axis(current.x, line.value('X'));
        let y = state.resolve_axis(current.y, line.value('Y'));

        let r = match active.r {
            Some(r) if state.is_incremental() => current.z + r,
            Some(r) => r,
            None => {
                warnings.push(ParseWarning::new(
                    line.number,
                    format!("G{} without R word, using current Z", code.g_code()),
                ));
                current.z
            }
        };
        let z = match active.z {
            Some(z) if state.is_incremental() => r + z,
            Some(z) => z,
            None => {
                warnings.push(ParseWarning::new(
                    line.number,
                    format!("G{} without Z word, using current Z", code.g_code()),
                ));
                current.z
            }
        };

        let peck_increment = match (code, active.q) {
            (CycleCode::Known(CycleKind::PeckDrilling), Some(q)) if q > 0.0 => {
                if peck_count(r, z, q) > MAX_PECKS {
                    warnings.push(ParseWarning::new(
                        line.number,
                        format!(
                            "peck increment Q{} needs more than {} pecks, widened",
                            q, MAX_PECKS
                        ),
                    ));
                    Some((r - z) / MAX_PECKS as f64)
                } else {
                    Some(q)
                }
            }
            (CycleCode::Known(CycleKind::PeckDrilling), _) => {
                warnings.push(ParseWarning::new(
                    line.number,
                    "peck drilling without a positive Q word, expanded as drilling",
                ));
                None
            }
            _ => None,
        };
        let dwell_time = match (code.kind(), active.p) {
            (Some(kind), None) if kind.dwells() => {
                warnings.push(ParseWarning::new(
                    line.number,
                    format!("G{} without P word, dwelling 0 s", code.g_code()),
                ));
                Some(0.0)
            }
            (_, p) => p,
        };
        let shift = match code {
            CycleCode::Known(CycleKind::BackBoring) => active.q.filter(|q| *q > 0.0),
            _ => None,
        };

        let cycle = Self {
            code,
            params: CycleParams {
                x,
                y,
                z,
                r,
                peck_increment,
                dwell_time,
                shift,
                feed: state.feed_rate,
            },
            source: line.raw.clone(),
            lines: line.number..=line.number,
        };
        (cycle, warnings)
    }

    pub fn line(&self) -> usize {
        *self.lines.start()
    }

    /// Where the tool rests once the cycle has run: above the hole at R
    pub fn end_position(&self) -> DVec3 {
        DVec3::new(self.params.x, self.params.y, self.params.r)
    }
}

/// Points and warnings produced by one cycle
#[derive(Debug, Clone, Default)]
pub struct CycleExpansion {
    pub points: Vec<ToolpathPoint>,
    pub warnings: Vec<ParseWarning>,
}

struct PhaseWriter<'a> {
    cycle: &'a FixedCycle,
    points: Vec<ToolpathPoint>,
}

impl<'a> PhaseWriter<'a> {
    fn new(cycle: &'a FixedCycle) -> Self {
        Self {
            cycle,
            points: Vec::new(),
        }
    }

    fn info(&self, phase: CyclePhase, peck: Option<u32>) -> CycleInfo {
        CycleInfo {
            g_code: self.cycle.code.g_code(),
            kind: self.cycle.code.kind(),
            phase,
            peck,
            dwell: None,
        }
    }

    fn rapid(&mut self, at: DVec3, phase: CyclePhase) {
        self.rapid_peck(at, phase, None);
    }

    fn rapid_peck(&mut self, at: DVec3, phase: CyclePhase, peck: Option<u32>) {
        let info = self.info(phase, peck);
        self.points
            .push(ToolpathPoint::rapid(at, self.cycle.line()).with_cycle(info));
    }

    fn feed(&mut self, at: DVec3, phase: CyclePhase) {
        self.feed_peck(at, phase, None);
    }

    fn feed_peck(&mut self, at: DVec3, phase: CyclePhase, peck: Option<u32>) {
        let info = self.info(phase, peck);
        self.points.push(
            ToolpathPoint::linear(at, self.cycle.params.feed, self.cycle.line()).with_cycle(info),
        );
    }

    fn dwell(&mut self, at: DVec3) {
        let mut info = self.info(CyclePhase::Dwell, None);
        info.dwell = Some(self.cycle.params.dwell_time.unwrap_or(0.0));
        self.points
            .push(ToolpathPoint::dwell(at, self.cycle.line()).with_cycle(info));
    }
}

/// Expand one cycle occurrence into its phase sequence
///
/// Every expansion starts with the approach (rapid to X/Y at R) and leaves
/// the tool at X/Y/R.
pub fn expand_cycle(cycle: &FixedCycle, config: &ToolpathConfig) -> CycleExpansion {
    let p = &cycle.params;
    let at_r = DVec3::new(p.x, p.y, p.r);
    let at_z = DVec3::new(p.x, p.y, p.z);

    let mut out = PhaseWriter::new(cycle);
    let mut warnings = Vec::new();
    out.rapid(at_r, CyclePhase::Approach);

    let kind = match cycle.code {
        CycleCode::Known(kind) => kind,
        CycleCode::Unhandled(code) => {
            warnings.push(ParseWarning::new(
                cycle.line(),
                format!("unhandled cycle type G{}, expanded as feed and retract", code),
            ));
            out.feed(at_z, CyclePhase::Plunge);
            out.rapid(at_r, CyclePhase::Retract);
            return CycleExpansion {
                points: out.points,
                warnings,
            };
        }
    };

    match kind {
        CycleKind::Drilling => {
            out.feed(at_z, CyclePhase::Plunge);
            out.rapid(at_r, CyclePhase::Retract);
        }
        CycleKind::DrillingDwell | CycleKind::BoringDwell | CycleKind::BoringManualRetract => {
            out.feed(at_z, CyclePhase::Plunge);
            out.dwell(at_z);
            out.rapid(at_r, CyclePhase::Retract);
        }
        CycleKind::PeckDrilling => match p.peck_increment {
            Some(q) => {
                let count = peck_count(p.r, p.z, q);
                for i in 0..count {
                    let depth = if i + 1 == count {
                        p.z
                    } else {
                        (p.r - (i as f64 + 1.0) * q).max(p.z)
                    };
                    let peck = Some(i as u32 + 1);
                    out.feed_peck(DVec3::new(p.x, p.y, depth), CyclePhase::Peck, peck);
                    out.rapid_peck(at_r, CyclePhase::Retract, peck);
                }
            }
            None => {
                out.feed(at_z, CyclePhase::Plunge);
                out.rapid(at_r, CyclePhase::Retract);
            }
        },
        CycleKind::RightTapping | CycleKind::Boring => {
            out.feed(at_z, CyclePhase::Plunge);
            out.feed(at_r, CyclePhase::Retract);
        }
        CycleKind::BackBoring => {
            let shift = p.shift.unwrap_or(config.back_boring_shift);
            let cut = config.back_boring_cut.min((p.r - p.z).abs());
            let shifted = |z: f64| DVec3::new(p.x + shift, p.y, z);
            let cut_top = DVec3::new(p.x, p.y, p.z + cut);

            out.rapid(shifted(p.r), CyclePhase::Shift);
            out.rapid(shifted(p.z), CyclePhase::Plunge);
            out.feed(at_z, CyclePhase::Center);
            out.feed(cut_top, CyclePhase::BackCut);
            out.rapid(shifted(cut_top.z), CyclePhase::Shift);
            out.rapid(shifted(p.r), CyclePhase::Retract);
            out.rapid(at_r, CyclePhase::Return);
        }
        CycleKind::BoringFeedRetract => {
            out.feed(at_z, CyclePhase::Plunge);
            out.dwell(at_z);
            out.feed(at_r, CyclePhase::Retract);
        }
    }

    CycleExpansion {
        points: out.points,
        warnings,
    }
}

/// `ceil((r - z) / q)`, at least one peck
fn peck_count(r: f64, z: f64, q: f64) -> usize {
    let depth = r - z;
    if depth <= COORD_TOLERANCE {
        return 1;
    }
    ((depth / q - 1e-9).ceil() as usize).max(1)
}
