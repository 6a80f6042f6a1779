//! Divider and phase calculator for the Lattice ECP5 `EHXPLLL` primitive.
//!
//! The entry point is [`PllRequest`]: describe the input clock and the wanted
//! outputs, call [`PllRequest::run`] to get a finished [`PllParams`], then
//! hand that to [`report::report`] or [`verilog::emit_verilog`].

pub mod consts;
pub mod error;
pub mod fmt;
pub mod params;
pub mod phase;
pub mod report;
pub mod request;
pub mod search;
pub mod verilog;

pub use error::{PllError, Warning};
pub use params::{PllMode, PllParams, SecondaryChannel, SecondaryOutput};
pub use request::{PllRequest, SecondaryRequest};
