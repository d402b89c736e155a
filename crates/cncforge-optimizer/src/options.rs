//! Optimization options and their validating builder
//!
//! Options are immutable once built. Every construction path goes through
//! [`OptionsBuilder::build`], which rejects combinations that make no sense
//! together, such as a Fanuc-only flag while targeting Heidenhain.

use cncforge_core::constants::DEFAULT_DECIMAL_PLACES;
use cncforge_core::{Controller, Envelope, FeedLimits, OptionsError};
use cncforge_toolpath::ToolpathConfig;

use crate::presets::Preset;

/// Highest accepted `decimal_places`
pub const MAX_DECIMAL_PLACES: u8 = 6;

/// Default deviation allowed when fitting arcs to line chains
pub const DEFAULT_ARC_TOLERANCE: f64 = 0.01;

/// Default `,R` corner radius
pub const DEFAULT_CORNER_RADIUS: f64 = 0.1;

/// Default Heidenhain program name
pub const DEFAULT_PROGRAM_NAME: &str = "CNCFORGE";

/// Fanuc branch flags
#[derive(Debug, Clone, PartialEq)]
pub struct FanucOptions {
    /// Append `,R` corner rounding between consecutive feed moves
    pub corner_rounding: bool,
    pub corner_radius: f64,
    /// AI contour control bracket (`G05.1 Q1`)
    pub contour_smoothing: bool,
    /// Nano smoothing bracket (`G05.1 Q3`)
    pub nano_smoothing: bool,
    /// No spaces, no leading zeros on codes, no trailing zeros on values
    pub compact_format: bool,
    /// Force a decimal point on every coordinate and feed value
    pub decimal_format: bool,
}

impl Default for FanucOptions {
    fn default() -> Self {
        Self {
            corner_rounding: false,
            corner_radius: DEFAULT_CORNER_RADIUS,
            contour_smoothing: false,
            nano_smoothing: false,
            compact_format: false,
            decimal_format: false,
        }
    }
}

impl FanucOptions {
    fn any_enabled(&self) -> bool {
        self.corner_rounding
            || self.contour_smoothing
            || self.nano_smoothing
            || self.compact_format
            || self.decimal_format
    }
}

/// Heidenhain branch flags
#[derive(Debug, Clone, PartialEq)]
pub struct HeidenhainOptions {
    /// Emit numbered conversational blocks instead of ISO words
    pub conversational: bool,
    /// Emit `CYCL DEF` blocks for recognized canned cycles
    pub cycle_definitions: bool,
    pub program_name: String,
}

impl Default for HeidenhainOptions {
    fn default() -> Self {
        Self {
            conversational: false,
            cycle_definitions: false,
            program_name: DEFAULT_PROGRAM_NAME.to_string(),
        }
    }
}

impl HeidenhainOptions {
    fn any_enabled(&self) -> bool {
        self.conversational || self.cycle_definitions
    }
}

/// A validated set of optimization options
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationOptions {
    controller: Controller,
    strip_comments: bool,
    remove_redundant: bool,
    merge_rapids: bool,
    merge_modal_codes: bool,
    optimize_feed_rates: bool,
    simplify_arcs: bool,
    safety_check: bool,
    decimal_places: u8,
    arc_tolerance: f64,
    envelope: Envelope,
    max_feed_rate: Option<f64>,
    toolpath: ToolpathConfig,
    fanuc: FanucOptions,
    heidenhain: HeidenhainOptions,
}

impl OptimizationOptions {
    /// Start a builder with every rule off except the safety check
    pub fn builder(controller: Controller) -> OptionsBuilder {
        OptionsBuilder::new(controller)
    }

    /// Options of a preset for a controller
    pub fn preset(preset: Preset, controller: Controller) -> Self {
        // presets only set flags that belong to the target controller
        OptionsBuilder::from_preset(preset, controller).finish()
    }

    /// The same options aimed at another controller
    ///
    /// Fails when controller-specific flags do not belong to the new target.
    pub fn retarget(&self, controller: Controller) -> Result<Self, OptionsError> {
        if controller == self.controller {
            return Ok(self.clone());
        }
        let mut options = self.clone();
        options.controller = controller;
        options.validate()?;
        Ok(options)
    }

    pub fn controller(&self) -> Controller {
        self.controller
    }

    pub fn strip_comments(&self) -> bool {
        self.strip_comments
    }

    pub fn remove_redundant(&self) -> bool {
        self.remove_redundant
    }

    pub fn merge_rapids(&self) -> bool {
        self.merge_rapids
    }

    pub fn merge_modal_codes(&self) -> bool {
        self.merge_modal_codes
    }

    pub fn optimize_feed_rates(&self) -> bool {
        self.optimize_feed_rates
    }

    pub fn simplify_arcs(&self) -> bool {
        self.simplify_arcs
    }

    pub fn safety_check(&self) -> bool {
        self.safety_check
    }

    pub fn decimal_places(&self) -> u8 {
        self.decimal_places
    }

    pub fn arc_tolerance(&self) -> f64 {
        self.arc_tolerance
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn toolpath(&self) -> &ToolpathConfig {
        &self.toolpath
    }

    pub fn fanuc(&self) -> &FanucOptions {
        &self.fanuc
    }

    pub fn heidenhain(&self) -> &HeidenhainOptions {
        &self.heidenhain
    }

    /// Controller feed window, with the configured ceiling applied
    pub fn feed_limits(&self) -> FeedLimits {
        let mut limits = self.controller.feed_limits();
        if let Some(max) = self.max_feed_rate {
            limits.max = limits.max.min(max);
        }
        limits
    }

    pub fn is_fanuc(&self) -> bool {
        self.controller == Controller::Fanuc
    }

    pub fn is_heidenhain(&self) -> bool {
        self.controller == Controller::Heidenhain
    }

    fn validate(&self) -> Result<(), OptionsError> {
        if self.fanuc.any_enabled() && !self.is_fanuc() {
            return Err(OptionsError::Incompatible(format!(
                "Fanuc options require the fanuc controller, not {}",
                self.controller.id()
            )));
        }
        if self.heidenhain.any_enabled() && !self.is_heidenhain() {
            return Err(OptionsError::Incompatible(format!(
                "Heidenhain options require the heidenhain controller, not {}",
                self.controller.id()
            )));
        }
        if self.fanuc.contour_smoothing && self.fanuc.nano_smoothing {
            return Err(OptionsError::Incompatible(
                "contour smoothing and nano smoothing are mutually exclusive".to_string(),
            ));
        }
        if self.heidenhain.cycle_definitions && !self.heidenhain.conversational {
            return Err(OptionsError::Incompatible(
                "cycle definitions require conversational output".to_string(),
            ));
        }
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(OptionsError::OutOfRange {
                name: "decimal_places".to_string(),
                value: f64::from(self.decimal_places),
                min: 0.0,
                max: f64::from(MAX_DECIMAL_PLACES),
            });
        }
        if !(self.arc_tolerance.is_finite() && self.arc_tolerance > 0.0) {
            return Err(OptionsError::OutOfRange {
                name: "arc_tolerance".to_string(),
                value: self.arc_tolerance,
                min: 0.0,
                max: f64::MAX,
            });
        }
        if self.fanuc.corner_rounding
            && !(self.fanuc.corner_radius.is_finite() && self.fanuc.corner_radius > 0.0)
        {
            return Err(OptionsError::OutOfRange {
                name: "corner_radius".to_string(),
                value: self.fanuc.corner_radius,
                min: 0.0,
                max: f64::MAX,
            });
        }
        if let Some(max) = self.max_feed_rate {
            let limits = self.controller.feed_limits();
            if !(max.is_finite() && max >= limits.min) {
                return Err(OptionsError::OutOfRange {
                    name: "max_feed_rate".to_string(),
                    value: max,
                    min: limits.min,
                    max: limits.max,
                });
            }
        }
        if !self.envelope.is_valid() {
            return Err(OptionsError::Incompatible(
                "envelope minimum exceeds its maximum".to_string(),
            ));
        }
        if self.heidenhain.conversational && self.heidenhain.program_name.trim().is_empty() {
            return Err(OptionsError::Incompatible(
                "conversational output needs a program name".to_string(),
            ));
        }
        self.toolpath.validate()
    }
}

/// The single way to construct [`OptimizationOptions`]
#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    options: OptimizationOptions,
}

impl OptionsBuilder {
    pub fn new(controller: Controller) -> Self {
        Self {
            options: OptimizationOptions {
                controller,
                strip_comments: false,
                remove_redundant: false,
                merge_rapids: false,
                merge_modal_codes: false,
                optimize_feed_rates: false,
                simplify_arcs: false,
                safety_check: true,
                decimal_places: DEFAULT_DECIMAL_PLACES,
                arc_tolerance: DEFAULT_ARC_TOLERANCE,
                envelope: Envelope::default(),
                max_feed_rate: None,
                toolpath: ToolpathConfig::default(),
                fanuc: FanucOptions::default(),
                heidenhain: HeidenhainOptions::default(),
            },
        }
    }

    /// Start from a preset's values
    pub fn from_preset(preset: Preset, controller: Controller) -> Self {
        let fanuc = controller == Controller::Fanuc;
        let heidenhain = controller == Controller::Heidenhain;
        let builder = Self::new(controller).remove_redundant(true).safety_check(true);

        match preset {
            Preset::Basic => builder,
            Preset::Speed => builder
                .strip_comments(true)
                .merge_rapids(true)
                .merge_modal_codes(true)
                .optimize_feed_rates(true)
                .compact_format(fanuc)
                .conversational(heidenhain)
                .cycle_definitions(heidenhain),
            Preset::Quality => builder
                .simplify_arcs(true)
                .contour_smoothing(fanuc)
                .decimal_format(fanuc)
                .corner_rounding(fanuc),
            Preset::Advanced => builder
                .strip_comments(true)
                .merge_rapids(true)
                .merge_modal_codes(true)
                .optimize_feed_rates(true)
                .simplify_arcs(true)
                .nano_smoothing(fanuc)
                .compact_format(fanuc)
                .decimal_format(fanuc)
                .corner_rounding(fanuc)
                .conversational(heidenhain)
                .cycle_definitions(heidenhain),
        }
    }

    pub fn strip_comments(mut self, enabled: bool) -> Self {
        self.options.strip_comments = enabled;
        self
    }

    pub fn remove_redundant(mut self, enabled: bool) -> Self {
        self.options.remove_redundant = enabled;
        self
    }

    pub fn merge_rapids(mut self, enabled: bool) -> Self {
        self.options.merge_rapids = enabled;
        self
    }

    pub fn merge_modal_codes(mut self, enabled: bool) -> Self {
        self.options.merge_modal_codes = enabled;
        self
    }

    pub fn optimize_feed_rates(mut self, enabled: bool) -> Self {
        self.options.optimize_feed_rates = enabled;
        self
    }

    pub fn simplify_arcs(mut self, enabled: bool) -> Self {
        self.options.simplify_arcs = enabled;
        self
    }

    pub fn safety_check(mut self, enabled: bool) -> Self {
        self.options.safety_check = enabled;
        self
    }

    pub fn decimal_places(mut self, places: u8) -> Self {
        self.options.decimal_places = places;
        self
    }

    pub fn arc_tolerance(mut self, tolerance: f64) -> Self {
        self.options.arc_tolerance = tolerance;
        self
    }

    pub fn envelope(mut self, envelope: Envelope) -> Self {
        self.options.envelope = envelope;
        self
    }

    pub fn max_feed_rate(mut self, max: Option<f64>) -> Self {
        self.options.max_feed_rate = max;
        self
    }

    pub fn toolpath(mut self, config: ToolpathConfig) -> Self {
        self.options.toolpath = config;
        self
    }

    pub fn corner_rounding(mut self, enabled: bool) -> Self {
        self.options.fanuc.corner_rounding = enabled;
        self
    }

    pub fn corner_radius(mut self, radius: f64) -> Self {
        self.options.fanuc.corner_radius = radius;
        self
    }

    pub fn contour_smoothing(mut self, enabled: bool) -> Self {
        self.options.fanuc.contour_smoothing = enabled;
        self
    }

    pub fn nano_smoothing(mut self, enabled: bool) -> Self {
        self.options.fanuc.nano_smoothing = enabled;
        self
    }

    pub fn compact_format(mut self, enabled: bool) -> Self {
        self.options.fanuc.compact_format = enabled;
        self
    }

    pub fn decimal_format(mut self, enabled: bool) -> Self {
        self.options.fanuc.decimal_format = enabled;
        self
    }

    pub fn conversational(mut self, enabled: bool) -> Self {
        self.options.heidenhain.conversational = enabled;
        self
    }

    pub fn cycle_definitions(mut self, enabled: bool) -> Self {
        self.options.heidenhain.cycle_definitions = enabled;
        self
    }

    pub fn program_name(mut self, name: impl Into<String>) -> Self {
        self.options.heidenhain.program_name = name.into();
        self
    }

    /// Validate and produce the options
    pub fn build(self) -> Result<OptimizationOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }

    fn finish(self) -> OptimizationOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_is_valid_for_every_controller() {
        for preset in Preset::ALL {
            for controller in Controller::ALL {
                let options = OptionsBuilder::from_preset(preset, controller).build();
                assert!(options.is_ok(), "{} / {}", preset, controller);
                assert_eq!(
                    options.unwrap(),
                    OptimizationOptions::preset(preset, controller)
                );
            }
        }
    }

    #[test]
    fn test_fanuc_flag_rejected_for_heidenhain() {
        let err = OptionsBuilder::new(Controller::Heidenhain)
            .corner_rounding(true)
            .build()
            .unwrap_err();
        assert!(matches!(err, OptionsError::Incompatible(_)));
    }

    #[test]
    fn test_heidenhain_flag_rejected_for_generic() {
        let err = OptionsBuilder::new(Controller::Generic)
            .conversational(true)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("heidenhain"));
    }

    #[test]
    fn test_smoothing_modes_are_exclusive() {
        let err = OptionsBuilder::new(Controller::Fanuc)
            .contour_smoothing(true)
            .nano_smoothing(true)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn test_cycle_definitions_need_conversational() {
        assert!(OptionsBuilder::new(Controller::Heidenhain)
            .cycle_definitions(true)
            .build()
            .is_err());
        assert!(OptionsBuilder::new(Controller::Heidenhain)
            .conversational(true)
            .cycle_definitions(true)
            .build()
            .is_ok());
    }

    #[test]
    fn test_ranges() {
        let err = OptionsBuilder::new(Controller::Generic)
            .decimal_places(9)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            OptionsError::OutOfRange { ref name, .. } if name == "decimal_places"
        ));

        assert!(OptionsBuilder::new(Controller::Generic)
            .arc_tolerance(0.0)
            .build()
            .is_err());
        assert!(OptionsBuilder::new(Controller::Generic)
            .toolpath(ToolpathConfig::with_resolution(-1.0))
            .build()
            .is_err());
    }

    #[test]
    fn test_feed_ceiling_override() {
        let options = OptionsBuilder::new(Controller::Fanuc)
            .max_feed_rate(Some(3000.0))
            .build()
            .unwrap();
        assert_eq!(options.feed_limits().max, 3000.0);
        assert_eq!(
            OptimizationOptions::preset(Preset::Basic, Controller::Fanuc)
                .feed_limits()
                .max,
            15_000.0
        );
    }

    #[test]
    fn test_retarget() {
        let generic = OptimizationOptions::preset(Preset::Basic, Controller::Generic);
        assert_eq!(
            generic.retarget(Controller::Siemens).unwrap().controller(),
            Controller::Siemens
        );

        let fanuc = OptimizationOptions::preset(Preset::Speed, Controller::Fanuc);
        assert!(fanuc.retarget(Controller::Heidenhain).is_err());
    }
}
