//! Display formatters for chart values.
//!
//! Formatting is presentation only; nothing in the pipeline reads a
//! formatted value back.

use projection_spi::ValueFormatter;

const PREFIXES: [&str; 9] = ["", "K", "M", "G", "T", "P", "E", "Z", "Y"];

/// Prints values as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFormatter;

impl ValueFormatter for RawFormatter {
    fn format(&self, value: f64) -> String {
        value.to_string()
    }

    fn name(&self) -> &str {
        "raw"
    }
}

/// 1024-based sizes with two decimals, e.g. `1.50 Kb`.
///
/// Values are truncated to an integer first and zero prints as `0`.
#[derive(Debug, Clone)]
pub struct BinarySizeFormatter {
    name: &'static str,
    unit: &'static str,
}

impl BinarySizeFormatter {
    pub fn bits() -> Self {
        Self {
            name: "bits",
            unit: "b",
        }
    }

    pub fn bytes() -> Self {
        Self {
            name: "bytes",
            unit: "B",
        }
    }

    /// Prefix only, no unit.
    pub fn plain() -> Self {
        Self {
            name: "1024",
            unit: "",
        }
    }

    pub fn unit(&self) -> &str {
        self.unit
    }
}

impl ValueFormatter for BinarySizeFormatter {
    fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let whole = value.trunc();
        if whole == 0.0 {
            return "0".to_string();
        }
        let magnitude = whole.abs();
        let power = ((magnitude.log2() / 10.0).floor() as usize).min(PREFIXES.len() - 1);
        let sign = if whole < 0.0 { "-" } else { "" };
        let scaled = magnitude / 1024f64.powi(power as i32);
        format!("{}{:.2} {}{}", sign, scaled, PREFIXES[power], self.unit)
            .trim_end()
            .to_string()
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Look a formatter up by name: `raw`, `bits`, `bytes` or `1024`.
pub fn formatter_by_name(name: &str) -> Option<Box<dyn ValueFormatter>> {
    match name.trim().to_lowercase().as_str() {
        "raw" => Some(Box::new(RawFormatter)),
        "bits" => Some(Box::new(BinarySizeFormatter::bits())),
        "bytes" => Some(Box::new(BinarySizeFormatter::bytes())),
        "1024" => Some(Box::new(BinarySizeFormatter::plain())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits() {
        let f = BinarySizeFormatter::bits();
        assert_eq!(f.format(0.0), "0");
        assert_eq!(f.format(512.0), "512.00 b");
        assert_eq!(f.format(1024.0), "1.00 Kb");
        assert_eq!(f.format(1536.0), "1.50 Kb");
        assert_eq!(f.format(3.0 * 1024.0 * 1024.0 * 1024.0), "3.00 Gb");
    }

    #[test]
    fn test_bytes_and_plain() {
        assert_eq!(BinarySizeFormatter::bytes().format(2048.0), "2.00 KB");
        assert_eq!(BinarySizeFormatter::plain().format(2048.0), "2.00 K");
        assert_eq!(BinarySizeFormatter::plain().format(10.0), "10.00");
    }

    #[test]
    fn test_truncates_fractions() {
        let f = BinarySizeFormatter::bits();
        assert_eq!(f.format(0.9), "0");
        assert_eq!(f.format(1023.9), "1023.00 b");
    }

    #[test]
    fn test_negative_and_non_finite() {
        let f = BinarySizeFormatter::bytes();
        assert_eq!(f.format(-2048.0), "-2.00 KB");
        assert_eq!(f.format(f64::NAN), "NaN");
        assert_eq!(f.format(f64::INFINITY), "inf");
    }

    #[test]
    fn test_largest_prefix_is_clamped() {
        let f = BinarySizeFormatter::bits();
        let huge = 1024f64.powi(10);
        assert_eq!(f.format(huge), format!("{:.2} Yb", 1024f64.powi(2)));
    }

    #[test]
    fn test_raw() {
        assert_eq!(RawFormatter.format(12.5), "12.5");
        assert_eq!(RawFormatter.name(), "raw");
    }

    #[test]
    fn test_lookup() {
        for name in ["raw", "bits", "bytes", "1024"] {
            let f = formatter_by_name(name).unwrap();
            assert_eq!(f.name(), name);
        }
        assert!(formatter_by_name("kilo").is_none());
    }
}
