//! Exhaustive divider search.
//!
//! The ECP5 PLL runs its VCO at `f_pfd * feedback * output`, with
//! `f_pfd = f_in / refclk` and `f_out = f_vco / output`: the feedback path
//! taps CLKOP, so the output divider sits inside the loop.  These relations
//! were established by running frequencies through Lattice's own tools:
//!
//! | input | output | refclk | feedback | output | fvco |
//! |------:|-------:|-------:|---------:|-------:|-----:|
//! |    12 |     48 |      1 |        4 |     12 |  576 |
//! |    12 |     60 |      1 |        5 |     10 |  600 |
//! |    20 |     30 |      2 |        3 |     20 |  600 |
//! |    45 |     30 |      3 |        2 |     20 |  600 |
//! |    70 |     40 |      7 |        4 |     15 |  600 |
//! |    90 |     50 |      9 |        5 |     13 |  650 |
//!
//! The search space is small enough that every combination is tried.

use itertools::iproduct;
use rayon::prelude::*;

use crate::consts::{
    DEFAULT_PRIMARY_CPHASE, FEEDBACK_DIV_MAX, OUTPUT_DIV_MAX, OUTPUT_MAX, OUTPUT_MIN, PFD_MAX,
    PFD_MIN, REFCLK_DIV_MAX, VCO_MAX, VCO_MIN, VCO_NOMINAL,
};
use crate::error::PllError;
use crate::params::{PllMode, PllParams, SecondaryChannel};

/// One evaluated divider combination.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Candidate {
    refclk_div: u32,
    feedback_div: u32,
    output_div: u32,
    /// CLKOS divider in highres mode, 0 in simple mode.
    secondary_div: u32,
    fvco: f64,
    fout: f64,
    /// Absolute distance of `fout` from the requested frequency.
    error: f64,
}

impl Candidate {
    fn vco_distance(&self) -> f64 {
        (self.fvco - VCO_NOMINAL).abs()
    }

    /// Lower output error wins; on equal error the VCO closer to nominal
    /// wins.  Full ties are not an improvement, so the first one found stays.
    fn is_better_than(&self, other: &Candidate) -> bool {
        self.error < other.error
            || (self.error == other.error && self.vco_distance() < other.vco_distance())
    }
}

fn keep_better(best: Option<Candidate>, cand: Candidate) -> Option<Candidate> {
    match best {
        Some(best) if !cand.is_better_than(&best) => Some(best),
        _ => Some(cand),
    }
}

fn vco_in_range(fvco: f64) -> bool {
    (VCO_MIN..=VCO_MAX).contains(&fvco)
}

/// Runs `scan` for every reference divider giving a legal PFD frequency.
///
/// Dividers are scanned in parallel, but their winners are merged in divider
/// order, so the result is the one a plain nested loop would pick.
fn search_refclk<F>(input: f64, scan: F) -> Option<Candidate>
where
    F: Fn(u32, f64) -> Option<Candidate> + Sync,
{
    let winners: Vec<Option<Candidate>> = (1..=REFCLK_DIV_MAX)
        .into_par_iter()
        .map(|refclk_div| {
            let fpfd = input / refclk_div as f64;
            if !(PFD_MIN..=PFD_MAX).contains(&fpfd) {
                return None;
            }
            scan(refclk_div, fpfd)
        })
        .collect();
    winners.into_iter().flatten().fold(None, keep_better)
}

/// Picks dividers for CLKOP driving `output` directly from an `input` clock.
pub fn calc_pll_params(input: f64, output: f64) -> Result<PllParams, PllError> {
    let exhausted = PllError::SearchExhausted {
        input,
        output,
        mode: PllMode::Simple,
    };
    if !output.is_finite() {
        return Err(exhausted);
    }
    let best = search_refclk(input, |refclk_div, fpfd| {
        iproduct!(1..=FEEDBACK_DIV_MAX, 1..=OUTPUT_DIV_MAX)
            .filter_map(|(feedback_div, output_div)| {
                let fvco = fpfd * feedback_div as f64 * output_div as f64;
                if !vco_in_range(fvco) {
                    return None;
                }
                let fout = fvco / output_div as f64;
                Some(Candidate {
                    refclk_div,
                    feedback_div,
                    output_div,
                    secondary_div: 0,
                    fvco,
                    fout,
                    error: (fout - output).abs(),
                })
            })
            .fold(None, keep_better)
    })
    .ok_or(exhausted)?;

    let mut params = PllParams::new(PllMode::Simple, input);
    params.refclk_div = best.refclk_div;
    params.feedback_div = best.feedback_div;
    params.output_div = best.output_div;
    params.fout = best.fout;
    params.fvco = best.fvco;
    // Lattice's tools shift CLKOP by 180 degrees; so do we.
    params.primary_cphase = half_period_cycles(best.fvco, best.fout);
    Ok(params)
}

/// Half an output period expressed in whole VCO cycles.
fn half_period_cycles(fvco: f64, fout: f64) -> u32 {
    let period_cycles = fvco / fout;
    (period_cycles * 0.5) as u32
}

/// Picks dividers for the highres configuration: CLKOP only closes the
/// feedback loop and has to stay within the output range, while CLKOS
/// divides the VCO down to `output`.
pub fn calc_pll_params_highres(input: f64, output: f64) -> Result<PllParams, PllError> {
    let exhausted = PllError::SearchExhausted {
        input,
        output,
        mode: PllMode::HighRes,
    };
    if !output.is_finite() {
        return Err(exhausted);
    }
    let best = search_refclk(input, |refclk_div, fpfd| {
        iproduct!(1..=FEEDBACK_DIV_MAX, 1..=OUTPUT_DIV_MAX)
            .filter_map(|(feedback_div, output_div)| {
                let fvco = fpfd * feedback_div as f64 * output_div as f64;
                if !vco_in_range(fvco) {
                    return None;
                }
                let ffeedback = fvco / output_div as f64;
                if !(OUTPUT_MIN..=OUTPUT_MAX).contains(&ffeedback) {
                    return None;
                }
                Some((feedback_div, output_div, fvco))
            })
            .flat_map(|(feedback_div, output_div, fvco)| {
                (1..=OUTPUT_DIV_MAX).map(move |secondary_div| {
                    let fout = fvco / secondary_div as f64;
                    Candidate {
                        refclk_div,
                        feedback_div,
                        output_div,
                        secondary_div,
                        fvco,
                        fout,
                        error: (fout - output).abs(),
                    }
                })
            })
            .fold(None, keep_better)
    })
    .ok_or(exhausted)?;

    let mut params = PllParams::new(PllMode::HighRes, input);
    params.refclk_div = best.refclk_div;
    params.feedback_div = best.feedback_div;
    params.output_div = best.output_div;
    params.fout = best.fout;
    params.fvco = best.fvco;
    // CLKOP is not shifted here, it keeps the default coarse phase.
    params.primary_cphase = DEFAULT_PRIMARY_CPHASE;
    let clkos = &mut params.secondary[SecondaryChannel::Clkos];
    clkos.enabled = true;
    clkos.div = best.secondary_div;
    clkos.freq = best.fout;
    clkos.name = SecondaryChannel::Clkos.default_name().to_string();
    Ok(params)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn candidate(fvco: f64, error: f64) -> Candidate {
        Candidate {
            refclk_div: 1,
            feedback_div: 1,
            output_div: 1,
            secondary_div: 0,
            fvco,
            fout: 0.0,
            error,
        }
    }

    fn dividers(params: &PllParams) -> (u32, u32, u32) {
        (params.refclk_div, params.feedback_div, params.output_div)
    }

    #[test]
    fn test_tie_break() {
        let near = candidate(590.0, 0.5);
        let far = candidate(700.0, 0.5);
        assert!(near.is_better_than(&far));
        assert!(!far.is_better_than(&near));
        // Error always dominates the VCO distance.
        let exact_far = candidate(790.0, 0.0);
        assert!(exact_far.is_better_than(&near));
        // Equal on both keys: the incumbent stays.
        let mirrored = candidate(610.0, 0.5);
        assert!(!mirrored.is_better_than(&near));
        assert_eq!(keep_better(Some(near), mirrored), Some(near));
        assert_eq!(keep_better(None, far), Some(far));
    }

    #[test]
    fn test_known_settings() {
        let p = calc_pll_params(12.0, 48.0).unwrap();
        assert_eq!(dividers(&p), (1, 4, 12));
        assert_eq!(p.fvco, 576.0);
        assert_eq!(p.fout, 48.0);
        assert_eq!(p.primary_cphase, 6);
        assert_eq!(p.mode, PllMode::Simple);

        let p = calc_pll_params(12.0, 60.0).unwrap();
        assert_eq!(dividers(&p), (1, 5, 10));
        assert_eq!(p.fvco, 600.0);
        assert_eq!(p.primary_cphase, 5);

        let p = calc_pll_params(20.0, 30.0).unwrap();
        assert_eq!(dividers(&p), (2, 3, 20));
        assert_eq!(p.fvco, 600.0);

        let p = calc_pll_params(45.0, 30.0).unwrap();
        assert_eq!(dividers(&p), (3, 2, 20));

        let p = calc_pll_params(70.0, 40.0).unwrap();
        assert_eq!(dividers(&p), (7, 4, 15));

        let p = calc_pll_params(43.0, 86.0).unwrap();
        assert_eq!(dividers(&p), (1, 2, 7));
        assert_eq!(p.fvco, 602.0);
    }

    #[test]
    fn test_equidistant_vco_keeps_first() {
        // 400 and 800 MHz are equally far from nominal; the smaller output
        // divider is found first and kept.
        let p = calc_pll_params(200.0, 400.0).unwrap();
        assert_eq!(dividers(&p), (1, 2, 1));
        assert_eq!(p.fvco, 400.0);
        assert_eq!(p.fout, 400.0);
        assert_eq!(p.primary_cphase, 0);

        let p = calc_pll_params(100.0, 400.0).unwrap();
        assert_eq!(dividers(&p), (1, 4, 1));
        assert_eq!(p.fvco, 400.0);
    }

    #[test]
    fn test_inexact_output() {
        let p = calc_pll_params(25.0, 33.333).unwrap();
        assert_eq!(dividers(&p), (3, 4, 18));
        assert_eq!(p.fvco, 600.0);
        assert!((p.fout - 33.333).abs() < 0.001);
    }

    #[test]
    fn test_search_exhausted() {
        assert_matches!(
            calc_pll_params(1.0, 0.5),
            Err(PllError::SearchExhausted {
                mode: PllMode::Simple,
                ..
            })
        );
        assert_matches!(
            calc_pll_params_highres(1.0, 0.5),
            Err(PllError::SearchExhausted {
                mode: PllMode::HighRes,
                ..
            })
        );
        assert_matches!(
            calc_pll_params(f64::NAN, 48.0),
            Err(PllError::SearchExhausted { .. })
        );
    }

    #[test]
    fn test_non_finite_target() {
        for output in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_matches!(
                calc_pll_params(12.0, output),
                Err(PllError::SearchExhausted {
                    mode: PllMode::Simple,
                    ..
                })
            );
            assert_matches!(
                calc_pll_params_highres(12.0, output),
                Err(PllError::SearchExhausted {
                    mode: PllMode::HighRes,
                    ..
                })
            );
        }
    }

    #[test]
    fn test_bounds_hold() {
        for input in [3.125, 8.0, 10.0, 12.0, 25.0, 27.0, 33.33, 100.0, 250.0, 400.0] {
            for output in [1.0, 10.0, 48.0, 125.0, 400.0, 900.0] {
                let Ok(p) = calc_pll_params(input, output) else {
                    panic!("no configuration for {input} -> {output}");
                };
                assert!((PFD_MIN..=PFD_MAX).contains(&p.fpfd()));
                assert!((VCO_MIN..=VCO_MAX).contains(&p.fvco));
                assert!((1..=REFCLK_DIV_MAX).contains(&p.refclk_div));
                assert!((1..=FEEDBACK_DIV_MAX).contains(&p.feedback_div));
                assert!((1..=OUTPUT_DIV_MAX).contains(&p.output_div));
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let a = calc_pll_params(27.0, 74.25).unwrap();
        let b = calc_pll_params(27.0, 74.25).unwrap();
        assert_eq!(a, b);
        assert_eq!(format!("{a:?}"), format!("{b:?}"));
    }

    #[test]
    fn test_highres() {
        let p = calc_pll_params_highres(12.0, 48.0).unwrap();
        assert_eq!(p.mode, PllMode::HighRes);
        assert_eq!(dividers(&p), (1, 1, 48));
        assert_eq!(p.fvco, 576.0);
        assert_eq!(p.fout, 48.0);
        assert_eq!(p.primary_cphase, DEFAULT_PRIMARY_CPHASE);
        let clkos = &p.secondary[SecondaryChannel::Clkos];
        assert!(clkos.enabled);
        assert_eq!(clkos.div, 12);
        assert_eq!(clkos.freq, 48.0);
        assert!(!p.secondary[SecondaryChannel::Clkos2].enabled);
        assert!(!p.is_ported(SecondaryChannel::Clkos));

        let p = calc_pll_params_highres(25.0, 33.333).unwrap();
        assert_eq!(dividers(&p), (1, 1, 24));
        assert_eq!(p.secondary[SecondaryChannel::Clkos].div, 18);
        assert_eq!(p.fvco, 600.0);
        assert!((OUTPUT_MIN..=OUTPUT_MAX).contains(&p.ffeedback()));
    }

    #[test]
    fn test_highres_beats_simple() {
        let simple = calc_pll_params(12.0, 25.175).unwrap();
        let highres = calc_pll_params_highres(12.0, 25.175).unwrap();
        assert!((simple.fout - 25.175).abs() > 1.0);
        assert!((highres.fout - 25.175).abs() < 0.02);
        assert_eq!(highres.secondary[SecondaryChannel::Clkos].div, 27);
        assert_eq!(highres.fvco, 680.0);
        assert!((OUTPUT_MIN..=OUTPUT_MAX).contains(&highres.ffeedback()));
    }
}
