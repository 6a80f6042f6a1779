use std::fmt::Write;

use jzon::JsonValue;

use crate::fmt::Approx;
use crate::params::{PllParams, SecondaryOutput};

/// The human-readable summary printed after a run.
pub fn report(params: &PllParams) -> String {
    let mut out = String::new();
    writeln!(out, "Pll parameters:").unwrap();
    writeln!(out, "Refclk divisor: {}", params.refclk_div).unwrap();
    writeln!(out, "Feedback divisor: {}", params.feedback_div).unwrap();
    writeln!(out, "clkout0 divisor: {}", params.output_div).unwrap();
    writeln!(out, "clkout0 frequency: {} MHz", Approx(params.fout)).unwrap();
    for (channel, sec) in params.enabled_secondaries() {
        let label = channel.default_name();
        writeln!(out, "{label} divisor: {}", sec.div).unwrap();
        writeln!(out, "{label} frequency: {} MHz", Approx(sec.freq)).unwrap();
        writeln!(out, "{label} phase shift: {} degrees", Approx(sec.phase)).unwrap();
    }
    writeln!(out, "VCO frequency: {}", Approx(params.fvco)).unwrap();
    out
}

impl From<&SecondaryOutput> for JsonValue {
    fn from(sec: &SecondaryOutput) -> Self {
        jzon::object! {
            name: sec.name.as_str(),
            div: sec.div,
            cphase: sec.cphase,
            fphase: sec.fphase,
            freq: sec.freq,
            phase: sec.phase,
        }
    }
}

impl From<&PllParams> for JsonValue {
    fn from(params: &PllParams) -> Self {
        jzon::object! {
            mode: params.mode.to_string(),
            clkin: jzon::object! {
                name: params.clkin_name.as_str(),
                freq: params.clkin_frequency,
            },
            clkout0: jzon::object! {
                name: params.clkout0_name.as_str(),
                freq: params.fout,
            },
            refclk_div: params.refclk_div,
            feedback_div: params.feedback_div,
            output_div: params.output_div,
            primary_cphase: params.primary_cphase,
            fpfd: params.fpfd(),
            fvco: params.fvco,
            secondary: jzon::object::Object::from_iter(
                params
                    .enabled_secondaries()
                    .map(|(channel, sec)| (channel.primitive_name(), JsonValue::from(sec)))
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SecondaryChannel;
    use crate::request::PllRequest;

    #[test]
    fn test_report() {
        let params = PllRequest::new(12.0, 48.0)
            .with_secondary(SecondaryChannel::Clkos, 24.0, 100.0)
            .run()
            .unwrap();
        assert_eq!(
            report(&params),
            "Pll parameters:\n\
             Refclk divisor: 1\n\
             Feedback divisor: 4\n\
             clkout0 divisor: 12\n\
             clkout0 frequency: 48 MHz\n\
             clkout1 divisor: 24\n\
             clkout1 frequency: 24 MHz\n\
             clkout1 phase shift: 99.375 degrees\n\
             VCO frequency: 576\n"
        );
    }

    #[test]
    fn test_json() {
        let params = PllRequest::new(12.0, 48.0)
            .with_secondary(SecondaryChannel::Clkos2, 24.0, 180.0)
            .run()
            .unwrap();
        let json = JsonValue::from(&params);
        assert_eq!(json["mode"], "simple");
        assert_eq!(json["refclk_div"], 1);
        assert_eq!(json["feedback_div"], 4);
        assert_eq!(json["output_div"], 12);
        assert_eq!(json["primary_cphase"], 6);
        assert_eq!(json["fvco"], 576.0);
        assert_eq!(json["clkout0"]["name"], "clkout0");
        assert_eq!(json["secondary"]["CLKOS2"]["cphase"], 18);
        assert!(json["secondary"]["CLKOS"].is_null());
    }
}
