//! Display formatting for values handed to a renderer.

/// Formats a numeric value for axis labels or tooltips.
///
/// The pipeline never formats anything itself; formatters exist only for
/// presentation layers sitting on top of it.
pub trait ValueFormatter: Send + Sync {
    fn format(&self, value: f64) -> String;

    /// Name used in configuration and logs
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPoint(usize);

    impl ValueFormatter for FixedPoint {
        fn format(&self, value: f64) -> String {
            format!("{:.*}", self.0, value)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_formatter_as_trait_object() {
        let formatters: Vec<Box<dyn ValueFormatter>> =
            vec![Box::new(FixedPoint(0)), Box::new(FixedPoint(2))];
        let rendered: Vec<String> = formatters.iter().map(|f| f.format(1.23456)).collect();
        assert_eq!(rendered, vec!["1", "1.23"]);
        assert_eq!(formatters[0].name(), "fixed");
    }
}
