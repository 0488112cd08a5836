//! Type-safe price representation in minor currency units.
//!
//! Prices are whole numbers of kopecks. The shop only sells in rubles, so the
//! currency is carried for display and never converted.

use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Minor units per major unit (kopecks per ruble).
const MINOR_PER_MAJOR: u64 = 100;

/// A non-negative price in minor currency units.
///
/// Arithmetic saturates instead of overflowing, so cart totals are always
/// defined.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(0);

    /// Create a price from minor units (kopecks).
    #[must_use]
    pub const fn from_minor(amount: u64) -> Self {
        Self(amount)
    }

    /// Create a price from whole major units (rubles).
    #[must_use]
    pub const fn from_major(amount: u64) -> Self {
        Self(amount.saturating_mul(MINOR_PER_MAJOR))
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn minor(self) -> u64 {
        self.0
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }

    /// The currency every price is denominated in.
    #[must_use]
    pub const fn currency(self) -> CurrencyCode {
        CurrencyCode::RUB
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Renders `2 500 ₽`, or `2 500,50 ₽` when there are kopecks.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let major = self.0 / MINOR_PER_MAJOR;
        let minor = self.0 % MINOR_PER_MAJOR;

        f.write_str(&group_thousands(major))?;
        if minor != 0 {
            write!(f, ",{minor:02}")?;
        }
        write!(f, " {}", self.currency().symbol())
    }
}

/// Insert a space between every group of three digits.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    RUB,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::RUB => "₽",
        }
    }
}
