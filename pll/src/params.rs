use std::fmt::Display;

use enum_map::{Enum, EnumMap};

use crate::consts::DEFAULT_PRIMARY_CPHASE;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PllMode {
    /// CLKOP drives the primary output; CLKOS/CLKOS2/CLKOS3 are free for
    /// secondary outputs.
    Simple,
    /// CLKOP only closes the feedback loop and CLKOS drives the primary
    /// output, giving a second divider for finer frequency resolution.
    HighRes,
}

impl Display for PllMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PllMode::Simple => write!(f, "simple"),
            PllMode::HighRes => write!(f, "highres"),
        }
    }
}

/// One of the three secondary PLL outputs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Enum)]
pub enum SecondaryChannel {
    Clkos,
    Clkos2,
    Clkos3,
}

impl SecondaryChannel {
    pub const ALL: [SecondaryChannel; 3] = [
        SecondaryChannel::Clkos,
        SecondaryChannel::Clkos2,
        SecondaryChannel::Clkos3,
    ];

    /// Port and parameter prefix on the `EHXPLLL` primitive.
    pub fn primitive_name(self) -> &'static str {
        match self {
            SecondaryChannel::Clkos => "CLKOS",
            SecondaryChannel::Clkos2 => "CLKOS2",
            SecondaryChannel::Clkos3 => "CLKOS3",
        }
    }

    /// User-facing label, also the default signal name.
    pub fn default_name(self) -> &'static str {
        match self {
            SecondaryChannel::Clkos => "clkout1",
            SecondaryChannel::Clkos2 => "clkout2",
            SecondaryChannel::Clkos3 => "clkout3",
        }
    }
}

impl Display for SecondaryChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.primitive_name())
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct SecondaryOutput {
    pub enabled: bool,
    pub div: u32,
    /// Coarse phase in VCO cycles, already offset by the primary's coarse phase.
    pub cphase: u32,
    /// Fine phase in eighths of a VCO cycle.
    pub fphase: u32,
    pub name: String,
    /// Achieved frequency in MHz.
    pub freq: f64,
    /// Achieved phase shift in degrees.
    pub phase: f64,
}

/// A complete PLL configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct PllParams {
    pub mode: PllMode,
    pub refclk_div: u32,
    pub feedback_div: u32,
    pub output_div: u32,
    pub primary_cphase: u32,
    pub clkin_name: String,
    pub clkout0_name: String,
    pub clkin_frequency: f64,
    pub secondary: EnumMap<SecondaryChannel, SecondaryOutput>,
    pub fout: f64,
    pub fvco: f64,
}

impl PllParams {
    pub(crate) fn new(mode: PllMode, clkin_frequency: f64) -> Self {
        PllParams {
            mode,
            refclk_div: 0,
            feedback_div: 0,
            output_div: 0,
            primary_cphase: DEFAULT_PRIMARY_CPHASE,
            clkin_name: "clkin".to_string(),
            clkout0_name: "clkout0".to_string(),
            clkin_frequency,
            secondary: EnumMap::default(),
            fout: 0.0,
            fvco: 0.0,
        }
    }

    pub fn fpfd(&self) -> f64 {
        self.clkin_frequency / self.refclk_div as f64
    }

    /// Frequency seen by the feedback path, i.e. CLKOP.
    pub fn ffeedback(&self) -> f64 {
        self.fvco / self.output_div as f64
    }

    pub fn enabled_secondaries(
        &self,
    ) -> impl Iterator<Item = (SecondaryChannel, &SecondaryOutput)> {
        self.secondary.iter().filter(|(_, out)| out.enabled)
    }

    /// Whether the channel gets its own module port.  The highres CLKOS
    /// carries the primary output and is not exposed separately.
    pub fn is_ported(&self, channel: SecondaryChannel) -> bool {
        self.secondary[channel].enabled
            && !(channel == SecondaryChannel::Clkos && self.mode == PllMode::HighRes)
    }
}
