use std::{fmt::Display, ops::Deref};

/// Whole-number share of a goal, as shown next to the progress ring.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Truncated rather than rounded, 99.9% of a goal is not 100%.
        write!(f, "{}%", self.0.trunc() as i64)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Converts a fraction in `[0, 1]` into a percentage. Anything outside is clamped.
    pub fn from_fraction(fraction: f64) -> Percentage {
        Percentage::new_opt(fraction.clamp(0., 1.) * 100.).unwrap_or(Percentage(0.))
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Percentage;

    #[test]
    fn display_truncates() {
        assert_eq!(Percentage::from_fraction(0.999).to_string(), "99%");
        assert_eq!(Percentage::from_fraction(1.0).to_string(), "100%");
        assert_eq!(Percentage::from_fraction(0.0).to_string(), "0%");
    }

    #[test]
    fn from_fraction_clamps() {
        assert_eq!(*Percentage::from_fraction(1.7), 100.);
        assert_eq!(*Percentage::from_fraction(-0.3), 0.);
        assert_eq!(*Percentage::from_fraction(f64::NAN), 0.);
    }

    #[test]
    fn negative_is_rejected() {
        assert!(Percentage::new_opt(-1.).is_none());
        assert!(Percentage::new_opt(12.5).is_some());
    }
}
