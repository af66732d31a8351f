// Unit normalization for tooltip statistics

pub const DEFAULT_DIVISOR: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitNormalizer {
    divisor: f64,
    use_default: bool,
}

impl UnitNormalizer {
    pub fn new(divisor: f64, use_default: bool) -> Self {
        Self {
            divisor,
            use_default,
        }
    }

    pub fn effective_divisor(&self) -> f64 {
        if self.use_default || self.divisor <= 0.0 || self.divisor.is_nan() {
            DEFAULT_DIVISOR
        } else {
            self.divisor
        }
    }

    /// Scale a raw magnitude and format it with two decimals.
    pub fn to_si(&self, value: f64) -> String {
        format!("{:.2}", value / self.effective_divisor())
    }
}

impl Default for UnitNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_DIVISOR, true)
    }
}
