use std::{error::Error, path::PathBuf, process::ExitCode};

use clap::Parser;
use ecppll::{PllMode, PllRequest, SecondaryChannel, report::report, verilog::emit_to_file};
use jzon::JsonValue;
use simple_error::SimpleError;

/// ECP5 PLL configuration calculator
#[derive(Debug, Parser)]
#[command(name = "ecppll")]
struct Args {
    /// Module name
    #[arg(short = 'n', long, default_value = "pll")]
    module: String,
    /// Input signal name
    #[arg(long = "clkin_name")]
    clkin_name: Option<String>,
    /// Input frequency in MHz
    #[arg(short = 'i', long)]
    clkin: Option<f64>,
    /// Primary Output(0) signal name
    #[arg(long = "clkout0_name")]
    clkout0_name: Option<String>,
    /// Primary Output(0) frequency in MHz
    #[arg(short = 'o', long)]
    clkout0: Option<f64>,
    /// Secondary Output(1) signal name
    #[arg(long = "clkout1_name")]
    clkout1_name: Option<String>,
    /// Secondary Output(1) frequency in MHz
    #[arg(long)]
    clkout1: Option<f64>,
    /// Secondary Output(1) phase in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    phase1: f64,
    /// Secondary Output(2) signal name
    #[arg(long = "clkout2_name")]
    clkout2_name: Option<String>,
    /// Secondary Output(2) frequency in MHz
    #[arg(long)]
    clkout2: Option<f64>,
    /// Secondary Output(2) phase in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    phase2: f64,
    /// Secondary Output(3) signal name
    #[arg(long = "clkout3_name")]
    clkout3_name: Option<String>,
    /// Secondary Output(3) frequency in MHz
    #[arg(long)]
    clkout3: Option<f64>,
    /// Secondary Output(3) phase in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    phase3: f64,
    /// Output to file
    #[arg(short = 'f', long)]
    file: Option<PathBuf>,
    /// Use secondary PLL output for higher frequency resolution
    #[arg(long)]
    highres: bool,
    /// Print the parameters as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

impl Args {
    fn request(self) -> Result<(PllRequest, Option<PathBuf>, bool), Box<dyn Error>> {
        let mut req =
            PllRequest::from_frequencies(self.clkin, self.clkout0)?.with_module(self.module);
        if let Some(name) = self.clkin_name {
            req = req.with_clkin_name(name);
        }
        if let Some(name) = self.clkout0_name {
            req = req.with_clkout0_name(name);
        }
        let secondaries = [
            (SecondaryChannel::Clkos, self.clkout1_name, self.clkout1, self.phase1),
            (SecondaryChannel::Clkos2, self.clkout2_name, self.clkout2, self.phase2),
            (SecondaryChannel::Clkos3, self.clkout3_name, self.clkout3, self.phase3),
        ];
        for (channel, name, freq, phase) in secondaries {
            if let Some(name) = name {
                req = req.with_secondary_name(channel, name);
            }
            if let Some(freq) = freq {
                req = req.with_secondary(channel, freq, phase);
            }
        }
        if self.highres {
            req = req.with_mode(PllMode::HighRes);
        }
        Ok((req, self.file, self.json))
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let (req, file, json) = args.request()?;
    for warning in req.validate() {
        eprintln!("Warning: {warning}");
    }
    let params = req.run()?;
    if json {
        println!("{}", JsonValue::from(&params).pretty(2));
    } else {
        print!("{}", report(&params));
    }
    if let Some(file) = file {
        emit_to_file(&params, &req.module, &file).map_err(|e| {
            SimpleError::new(format!("cannot write {f}: {e}", f = file.display()))
        })?;
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[test]
fn test_args() {
    use clap::CommandFactory;
    Args::command().debug_assert();

    let args = Args::try_parse_from([
        "ecppll",
        "-i",
        "12",
        "-o",
        "48",
        "--clkout1",
        "24",
        "--phase1",
        "180",
        "--clkout3_name",
        "slow",
        "-f",
        "pll.v",
    ])
    .unwrap();
    let (req, file, json) = args.request().unwrap();
    assert_eq!(req.module, "pll");
    assert_eq!(req.mode, PllMode::Simple);
    assert_eq!(req.secondary[SecondaryChannel::Clkos].freq, Some(24.0));
    assert_eq!(req.secondary[SecondaryChannel::Clkos].phase, 180.0);
    assert_eq!(req.secondary[SecondaryChannel::Clkos2].freq, None);
    assert_eq!(
        req.secondary[SecondaryChannel::Clkos3].name.as_deref(),
        Some("slow")
    );
    assert_eq!(file, Some(PathBuf::from("pll.v")));
    assert!(!json);

    let args = Args::try_parse_from(["ecppll", "-o", "48", "--highres"]).unwrap();
    let err = args.request().unwrap_err();
    assert_eq!(err.to_string(), "missing input or output frequency!");
}
