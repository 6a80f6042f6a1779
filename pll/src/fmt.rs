use std::fmt::Display;

/// Formats a value like C's `%g`: six significant digits, trailing zeros
/// dropped, scientific notation for very large or small magnitudes.
///
/// The report and the Verilog comments have always been printed this way,
/// and downstream scripts scrape them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Approx(pub f64);

const PRECISION: i32 = 6;

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

impl Display for Approx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let v = self.0;
        if v == 0.0 || !v.is_finite() {
            return write!(f, "{v}");
        }
        // The exponent after rounding to the target precision decides the
        // notation, same as printf.
        let sci = format!("{v:.prec$e}", prec = (PRECISION - 1) as usize);
        let (mantissa, exp) = sci.split_once('e').unwrap();
        let exp: i32 = exp.parse().unwrap();
        if exp < -4 || exp >= PRECISION {
            let sign = if exp < 0 { '-' } else { '+' };
            write!(
                f,
                "{m}e{sign}{e:02}",
                m = trim_fraction(mantissa),
                e = exp.abs()
            )
        } else {
            let decimals = (PRECISION - 1 - exp) as usize;
            let fixed = format!("{v:.decimals$}");
            write!(f, "{}", trim_fraction(&fixed))
        }
    }
}

#[test]
fn test_approx() {
    assert_eq!(Approx(48.0).to_string(), "48");
    assert_eq!(Approx(576.0).to_string(), "576");
    assert_eq!(Approx(3.125).to_string(), "3.125");
    assert_eq!(Approx(33.333333333333336).to_string(), "33.3333");
    assert_eq!(Approx(25.185185185185187).to_string(), "25.1852");
    assert_eq!(Approx(99.375).to_string(), "99.375");
    assert_eq!(Approx(-12.5).to_string(), "-12.5");
    assert_eq!(Approx(0.0).to_string(), "0");
    assert_eq!(Approx(0.0001).to_string(), "0.0001");
    assert_eq!(Approx(0.00001).to_string(), "1e-05");
    assert_eq!(Approx(1e6).to_string(), "1e+06");
    assert_eq!(Approx(1234567.0).to_string(), "1.23457e+06");
}
