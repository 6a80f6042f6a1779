use enum_map::EnumMap;

use crate::consts::{INPUT_MAX, INPUT_MIN, OUTPUT_MAX, OUTPUT_MIN};
use crate::error::{PllError, Warning};
use crate::params::{PllMode, PllParams, SecondaryChannel};
use crate::phase::generate_secondary_output;
use crate::search::{calc_pll_params, calc_pll_params_highres};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SecondaryRequest {
    pub name: Option<String>,
    /// Requested frequency in MHz.  `None` leaves the channel disabled.
    pub freq: Option<f64>,
    /// Requested phase in degrees.
    pub phase: f64,
}

/// Everything the user asked for in one run.
#[derive(Clone, Debug, PartialEq)]
pub struct PllRequest {
    pub module: String,
    pub clkin_name: String,
    pub clkin: f64,
    pub clkout0_name: String,
    pub clkout0: f64,
    pub secondary: EnumMap<SecondaryChannel, SecondaryRequest>,
    pub mode: PllMode,
}

impl PllRequest {
    pub fn new(clkin: f64, clkout0: f64) -> Self {
        PllRequest {
            module: "pll".to_string(),
            clkin_name: "clkin".to_string(),
            clkin,
            clkout0_name: "clkout0".to_string(),
            clkout0,
            secondary: EnumMap::default(),
            mode: PllMode::Simple,
        }
    }

    /// Like [`PllRequest::new`], for frequencies that may not have been given.
    pub fn from_frequencies(clkin: Option<f64>, clkout0: Option<f64>) -> Result<Self, PllError> {
        match (clkin, clkout0) {
            (Some(clkin), Some(clkout0)) => Ok(Self::new(clkin, clkout0)),
            _ => Err(PllError::MissingFrequency),
        }
    }

    pub fn with_module(self, module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..self
        }
    }

    pub fn with_clkin_name(self, name: impl Into<String>) -> Self {
        Self {
            clkin_name: name.into(),
            ..self
        }
    }

    pub fn with_clkout0_name(self, name: impl Into<String>) -> Self {
        Self {
            clkout0_name: name.into(),
            ..self
        }
    }

    pub fn with_secondary(mut self, channel: SecondaryChannel, freq: f64, phase: f64) -> Self {
        let req = &mut self.secondary[channel];
        req.freq = Some(freq);
        req.phase = phase;
        self
    }

    pub fn with_secondary_name(
        mut self,
        channel: SecondaryChannel,
        name: impl Into<String>,
    ) -> Self {
        self.secondary[channel].name = Some(name.into());
        self
    }

    pub fn with_mode(self, mode: PllMode) -> Self {
        Self { mode, ..self }
    }

    fn secondary_name(&self, channel: SecondaryChannel) -> String {
        self.secondary[channel]
            .name
            .clone()
            .unwrap_or_else(|| channel.default_name().to_string())
    }

    /// Soft checks against the datasheet limits and option conflicts.
    pub fn validate(&self) -> Vec<Warning> {
        let mut res = vec![];
        if !(INPUT_MIN..=INPUT_MAX).contains(&self.clkin) {
            res.push(Warning::InputOutOfRange(self.clkin));
        }
        if !(OUTPUT_MIN..=OUTPUT_MAX).contains(&self.clkout0) {
            res.push(Warning::OutputOutOfRange(self.clkout0));
        }
        let any_secondary = self.secondary.values().any(|req| req.freq.is_some());
        if self.mode == PllMode::HighRes && any_secondary {
            res.push(Warning::SecondaryInHighres);
        }
        res
    }

    /// Searches the dividers, then configures the requested secondary
    /// outputs.  Secondary frequencies are ignored in highres mode, where
    /// CLKOS carries the primary output.
    pub fn run(&self) -> Result<PllParams, PllError> {
        let mut params = match self.mode {
            PllMode::Simple => {
                let mut params = calc_pll_params(self.clkin, self.clkout0)?;
                for (channel, req) in &self.secondary {
                    if let Some(freq) = req.freq {
                        let name = self.secondary_name(channel);
                        generate_secondary_output(&mut params, channel, &name, freq, req.phase)?;
                    }
                }
                params
            }
            PllMode::HighRes => {
                let mut params = calc_pll_params_highres(self.clkin, self.clkout0)?;
                params.secondary[SecondaryChannel::Clkos].name =
                    self.secondary_name(SecondaryChannel::Clkos);
                params
            }
        };
        params.clkin_name = self.clkin_name.clone();
        params.clkout0_name = self.clkout0_name.clone();
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_missing_frequency() {
        assert_matches!(
            PllRequest::from_frequencies(None, Some(48.0)),
            Err(PllError::MissingFrequency)
        );
        assert_matches!(
            PllRequest::from_frequencies(Some(12.0), None),
            Err(PllError::MissingFrequency)
        );
        let req = PllRequest::from_frequencies(Some(12.0), Some(48.0)).unwrap();
        assert_eq!(req, PllRequest::new(12.0, 48.0));
    }

    #[test]
    fn test_warnings() {
        assert!(PllRequest::new(12.0, 48.0).validate().is_empty());
        assert!(PllRequest::new(8.0, 400.0).validate().is_empty());
        assert_eq!(
            PllRequest::new(4.0, 5.0).validate(),
            [Warning::InputOutOfRange(4.0), Warning::OutputOutOfRange(5.0)]
        );
        let req = PllRequest::new(12.0, 48.0)
            .with_secondary(SecondaryChannel::Clkos, 24.0, 0.0)
            .with_mode(PllMode::HighRes);
        assert_eq!(req.validate(), [Warning::SecondaryInHighres]);
    }

    #[test]
    fn test_run_simple() {
        let params = PllRequest::new(12.0, 48.0)
            .with_clkin_name("clk12")
            .with_clkout0_name("clk48")
            .with_secondary(SecondaryChannel::Clkos, 24.0, 180.0)
            .with_secondary(SecondaryChannel::Clkos3, 96.0, 0.0)
            .with_secondary_name(SecondaryChannel::Clkos3, "clk96")
            .run()
            .unwrap();
        assert_eq!(params.clkin_name, "clk12");
        assert_eq!(params.clkout0_name, "clk48");
        assert_eq!(params.clkin_frequency, 12.0);
        let clkos = &params.secondary[SecondaryChannel::Clkos];
        assert_eq!(clkos.name, "clkout1");
        assert_eq!(clkos.cphase, 18);
        assert!(!params.secondary[SecondaryChannel::Clkos2].enabled);
        let clkos3 = &params.secondary[SecondaryChannel::Clkos3];
        assert_eq!(clkos3.name, "clk96");
        assert_eq!(clkos3.div, 6);
    }

    #[test]
    fn test_run_highres_ignores_secondaries() {
        let params = PllRequest::new(12.0, 48.0)
            .with_mode(PllMode::HighRes)
            .with_secondary(SecondaryChannel::Clkos2, 24.0, 90.0)
            .with_secondary_name(SecondaryChannel::Clkos, "clkos_int")
            .run()
            .unwrap();
        assert_eq!(params.mode, PllMode::HighRes);
        assert_eq!(params.secondary[SecondaryChannel::Clkos].name, "clkos_int");
        assert!(!params.secondary[SecondaryChannel::Clkos2].enabled);
    }

    #[test]
    fn test_run_fails_outright() {
        assert_matches!(
            PllRequest::new(1.0, 0.5).run(),
            Err(PllError::SearchExhausted { .. })
        );
        assert_matches!(
            PllRequest::new(12.0, 48.0)
                .with_secondary(SecondaryChannel::Clkos2, 2.0, 0.0)
                .run(),
            Err(PllError::SecondaryUnreachable {
                channel: SecondaryChannel::Clkos2,
                ..
            })
        );
    }
}
