use serde::{Deserialize, Serialize};

/// Money amount represented in minor units (kobo/cents) to avoid
/// floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in minor units (e.g. 50000 = 500.00).
    minor: i64,
}

impl Money {
    /// Creates a new amount from minor units.
    pub fn from_minor(minor: i64) -> Self {
        Self { minor }
    }

    /// Creates a new amount from whole major units.
    pub fn from_major(major: i64) -> Self {
        Self { minor: major * 100 }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { minor: 0 }
    }

    /// Returns the amount in minor units.
    pub fn minor(&self) -> i64 {
        self.minor
    }

    /// Returns the whole major-unit portion.
    pub fn major(&self) -> i64 {
        self.minor / 100
    }

    /// Returns the minor-unit remainder after the major portion.
    pub fn minor_part(&self) -> i64 {
        self.minor.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.minor > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Scales by a distance in kilometres, rounding to the nearest minor unit.
    pub fn scale_by_km(&self, km: f64) -> Money {
        Money {
            minor: (self.minor as f64 * km).round() as i64,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.minor < 0 {
            write!(f, "-{}.{:02}", self.major().abs(), self.minor_part())
        } else {
            write!(f, "{}.{:02}", self.major(), self.minor_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            minor: self.minor + rhs.minor,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            minor: self.minor - rhs.minor,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.minor += rhs.minor;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.minor -= rhs.minor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_minor() {
        let money = Money::from_minor(1234);
        assert_eq!(money.minor(), 1234);
        assert_eq!(money.major(), 12);
        assert_eq!(money.minor_part(), 34);
    }

    #[test]
    fn test_money_from_major() {
        let money = Money::from_major(500);
        assert_eq!(money.minor(), 50000);
        assert_eq!(money.major(), 500);
        assert_eq!(money.minor_part(), 0);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_minor(1234).to_string(), "12.34");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(-1234).to_string(), "-12.34");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
    }

    #[test]
    fn test_scale_by_km_rounds() {
        // 150.00 per km over 3.333 km = 499.95
        let per_km = Money::from_minor(15000);
        assert_eq!(per_km.scale_by_km(3.333).minor(), 49995);
        assert_eq!(per_km.scale_by_km(0.0).minor(), 0);
    }

    #[test]
    fn test_money_add_assign() {
        let mut money = Money::from_minor(100);
        money += Money::from_minor(50);
        assert_eq!(money.minor(), 150);
        money -= Money::from_minor(30);
        assert_eq!(money.minor(), 120);
    }
}
