use crate::consts::{INPUT_MAX, INPUT_MIN, OUTPUT_MAX, OUTPUT_MIN};
use crate::fmt::Approx;
use crate::params::{PllMode, SecondaryChannel};

#[derive(Debug, Clone, PartialEq)]
pub enum PllError {
    MissingFrequency,
    SearchExhausted {
        input: f64,
        output: f64,
        mode: PllMode,
    },
    SecondaryUnreachable {
        channel: SecondaryChannel,
        freq: f64,
        fvco: f64,
    },
    InvalidPhase {
        channel: SecondaryChannel,
        phase: f64,
    },
}

impl std::fmt::Display for PllError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PllError::MissingFrequency => write!(f, "missing input or output frequency!"),
            PllError::SearchExhausted {
                input,
                output,
                mode,
            } => write!(
                f,
                "no valid {mode} PLL configuration found for {i} MHz -> {o} MHz",
                i = Approx(*input),
                o = Approx(*output)
            ),
            PllError::SecondaryUnreachable {
                channel,
                freq,
                fvco,
            } => write!(
                f,
                "{name} frequency {fr} MHz cannot be divided from VCO frequency {v} MHz",
                name = channel.default_name(),
                fr = Approx(*freq),
                v = Approx(*fvco)
            ),
            PllError::InvalidPhase { channel, phase } => {
                write!(
                    f,
                    "{name} phase {phase} is not a valid angle",
                    name = channel.default_name()
                )
            }
        }
    }
}

impl std::error::Error for PllError {}

/// Non-fatal problems with a request.  The run still goes ahead.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    InputOutOfRange(f64),
    OutputOutOfRange(f64),
    SecondaryInHighres,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::InputOutOfRange(freq) => write!(
                f,
                "Input frequency {fr}MHz not in range ({lo}MHz, {hi}MHz)",
                fr = Approx(*freq),
                lo = Approx(INPUT_MIN),
                hi = Approx(INPUT_MAX)
            ),
            Warning::OutputOutOfRange(freq) => write!(
                f,
                "Output frequency {fr}MHz not in range ({lo}MHz, {hi}MHz)",
                fr = Approx(*freq),
                lo = Approx(OUTPUT_MIN),
                hi = Approx(OUTPUT_MAX)
            ),
            Warning::SecondaryInHighres => {
                write!(f, "Cannot specify secondary frequency in highres mode")
            }
        }
    }
}

#[test]
fn test_warning_messages() {
    assert_eq!(
        Warning::InputOutOfRange(4.5).to_string(),
        "Input frequency 4.5MHz not in range (8MHz, 400MHz)"
    );
    assert_eq!(
        Warning::OutputOutOfRange(500.0).to_string(),
        "Output frequency 500MHz not in range (10MHz, 400MHz)"
    );
}
