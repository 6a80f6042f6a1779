//! Verilog wrapper around the `EHXPLLL` primitive.
//!
//! The template is consumed by synthesis flows as-is; parameter names, their
//! order and the port list are part of the interface.

use std::fmt::Write;
use std::path::Path;

use crate::fmt::Approx;
use crate::params::{PllMode, PllParams, SecondaryChannel};

pub fn emit_verilog(params: &PllParams, module: &str) -> String {
    let mut out = String::new();
    writeln!(out, "module {module}\n(").unwrap();
    writeln!(
        out,
        "    input {name}, // {f} MHz, 0 deg",
        name = params.clkin_name,
        f = Approx(params.clkin_frequency)
    )
    .unwrap();
    writeln!(
        out,
        "    output {name}, // {f} MHz, 0 deg",
        name = params.clkout0_name,
        f = Approx(params.fout)
    )
    .unwrap();
    for channel in SecondaryChannel::ALL {
        if params.is_ported(channel) {
            let sec = &params.secondary[channel];
            writeln!(
                out,
                "    output {name}, // {f} MHz, {p} deg",
                name = sec.name,
                f = Approx(sec.freq),
                p = Approx(sec.phase)
            )
            .unwrap();
        }
    }
    writeln!(out, "    output locked").unwrap();
    writeln!(out, ");").unwrap();
    writeln!(out, "wire clkfb;").unwrap();
    writeln!(out, "wire clkos;").unwrap();
    writeln!(out, "wire clkop;").unwrap();
    writeln!(
        out,
        "(* ICP_CURRENT=\"12\" *) (* LPF_RESISTOR=\"8\" *) (* MFG_ENABLE_FILTEROPAMP=\"1\" *) (* MFG_GMCREF_SEL=\"2\" *)"
    )
    .unwrap();
    writeln!(out, "EHXPLLL #(").unwrap();
    writeln!(out, "        .PLLRST_ENA(\"DISABLED\"),").unwrap();
    writeln!(out, "        .INTFB_WAKE(\"DISABLED\"),").unwrap();
    writeln!(out, "        .STDBY_ENABLE(\"DISABLED\"),").unwrap();
    writeln!(out, "        .DPHASE_SOURCE(\"DISABLED\"),").unwrap();
    writeln!(out, "        .CLKOP_FPHASE(0),").unwrap();
    writeln!(out, "        .CLKOP_CPHASE({}),", params.primary_cphase).unwrap();
    writeln!(out, "        .OUTDIVIDER_MUXA(\"DIVA\"),").unwrap();
    writeln!(out, "        .CLKOP_ENABLE(\"ENABLED\"),").unwrap();
    writeln!(out, "        .CLKOP_DIV({}),", params.output_div).unwrap();
    for (channel, sec) in params.enabled_secondaries() {
        let prim = channel.primitive_name();
        writeln!(out, "        .{prim}_ENABLE(\"ENABLED\"),").unwrap();
        writeln!(out, "        .{prim}_DIV({}),", sec.div).unwrap();
        writeln!(out, "        .{prim}_CPHASE({}),", sec.cphase).unwrap();
        writeln!(out, "        .{prim}_FPHASE({}),", sec.fphase).unwrap();
    }
    writeln!(out, "        .CLKFB_DIV({}),", params.feedback_div).unwrap();
    writeln!(out, "        .CLKI_DIV({}),", params.refclk_div).unwrap();
    writeln!(out, "        .FEEDBK_PATH(\"INT_OP\")").unwrap();
    writeln!(out, "    ) pll_i (").unwrap();
    writeln!(out, "        .CLKI({}),", params.clkin_name).unwrap();
    writeln!(out, "        .CLKFB(clkfb),").unwrap();
    writeln!(out, "        .CLKINTFB(clkfb),").unwrap();
    writeln!(out, "        .CLKOP(clkop),").unwrap();
    for (channel, sec) in params.enabled_secondaries() {
        let net = if params.is_ported(channel) {
            sec.name.as_str()
        } else {
            "clkos"
        };
        writeln!(out, "        .{prim}({net}),", prim = channel.primitive_name()).unwrap();
    }
    for port in [
        "RST",
        "STDBY",
        "PHASESEL0",
        "PHASESEL1",
        "PHASEDIR",
        "PHASESTEP",
        "PLLWAKESYNC",
        "ENCLKOP",
    ] {
        writeln!(out, "        .{port}(1'b0),").unwrap();
    }
    writeln!(out, "        .LOCK(locked)").unwrap();
    writeln!(out, "\t);").unwrap();
    let primary_net = match params.mode {
        PllMode::Simple => "clkop",
        PllMode::HighRes => "clkos",
    };
    writeln!(out, "assign {} = {primary_net};", params.clkout0_name).unwrap();
    writeln!(out, "endmodule").unwrap();
    out
}

pub fn emit_to_file(
    params: &PllParams,
    module: &str,
    fname: impl AsRef<Path>,
) -> std::io::Result<()> {
    std::fs::write(fname, emit_verilog(params, module))
}
