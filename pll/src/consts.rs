//! Operating limits of the ECP5 PLL.  All frequencies are in MHz.

pub const INPUT_MIN: f64 = 8.0;
pub const INPUT_MAX: f64 = 400.0;
pub const OUTPUT_MIN: f64 = 10.0;
pub const OUTPUT_MAX: f64 = 400.0;
pub const PFD_MIN: f64 = 3.125;
pub const PFD_MAX: f64 = 400.0;
pub const VCO_MIN: f64 = 400.0;
pub const VCO_MAX: f64 = 800.0;

/// Ties in output error are broken towards this VCO frequency.
pub const VCO_NOMINAL: f64 = 600.0;

pub const REFCLK_DIV_MAX: u32 = 128;
pub const FEEDBACK_DIV_MAX: u32 = 80;
/// Applies to CLKOP and all three CLKOS dividers.
pub const OUTPUT_DIV_MAX: u32 = 128;

/// Fine phase resolution, in steps per VCO cycle.
pub const FINE_PHASE_STEPS: u32 = 8;

/// `CLKOP_CPHASE` when no 180° shift is computed (highres mode).
pub const DEFAULT_PRIMARY_CPHASE: u32 = 9;
