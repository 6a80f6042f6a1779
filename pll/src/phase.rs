//! Secondary outputs and their phase registers.
//!
//! Phase shifts are programmed as a coarse count of whole VCO cycles plus a
//! fine count of eighth cycles, so only multiples of `1/8` VCO cycle can be
//! hit exactly.

use crate::consts::{FINE_PHASE_STEPS, OUTPUT_DIV_MAX};
use crate::error::PllError;
use crate::params::{PllParams, SecondaryChannel};

/// A phase shift quantized to the PLL's coarse/fine phase registers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseShift {
    /// Whole VCO cycles.
    pub cphase: u32,
    /// Eighths of a VCO cycle, `0..8`.
    pub fphase: u32,
    /// The shift actually produced by the registers, in degrees.
    pub actual: f64,
}

impl PhaseShift {
    /// Quantizes `phase` degrees of an output running at `freq` from a VCO at
    /// `fvco`.  `phase` must not be negative; angles of 360° and more shift
    /// by whole output periods.  The result never overshoots.
    pub fn quantize(fvco: f64, freq: f64, phase: f64) -> PhaseShift {
        let period_cycles = fvco / freq;
        let count = phase / 360.0 * period_cycles;
        let cphase = count.floor();
        let fphase = ((count - cphase) * FINE_PHASE_STEPS as f64).floor();
        let actual_cycles = cphase + fphase / FINE_PHASE_STEPS as f64;
        PhaseShift {
            cphase: cphase as u32,
            fphase: fphase as u32,
            actual: 360.0 * actual_cycles / period_cycles,
        }
    }

    /// Size of one fine phase step, in degrees of the output period.
    pub fn step(fvco: f64, freq: f64) -> f64 {
        360.0 / (FINE_PHASE_STEPS as f64 * fvco / freq)
    }
}

/// Configures `channel` to output `frequency` MHz shifted by `phase` degrees,
/// using the VCO frequency already chosen for the primary output.
///
/// The divider is rounded down, so the achieved frequency is the closest one
/// at or above the request.  The coarse phase is stored relative to the
/// primary output's own shift.
pub fn generate_secondary_output(
    params: &mut PllParams,
    channel: SecondaryChannel,
    name: &str,
    frequency: f64,
    phase: f64,
) -> Result<(), PllError> {
    let unreachable = PllError::SecondaryUnreachable {
        channel,
        freq: frequency,
        fvco: params.fvco,
    };
    if !(frequency.is_finite() && frequency > 0.0) {
        return Err(unreachable);
    }
    if !(phase.is_finite() && phase >= 0.0) {
        return Err(PllError::InvalidPhase { channel, phase });
    }
    let div = (params.fvco / frequency).floor();
    if !(1.0..=OUTPUT_DIV_MAX as f64).contains(&div) {
        return Err(unreachable);
    }
    let div = div as u32;
    let freq = params.fvco / div as f64;
    let shift = PhaseShift::quantize(params.fvco, freq, phase);

    let out = &mut params.secondary[channel];
    out.enabled = true;
    out.div = div;
    out.freq = freq;
    out.phase = shift.actual;
    out.cphase = shift.cphase + params.primary_cphase;
    out.fphase = shift.fphase;
    out.name = name.to_string();
    Ok(())
}
