use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An exact decimal amount in a single, implied currency unit.
///
/// Unlike a ledger posting this is never rounded on construction: amounts
/// arrive from bank exports and invoice systems with whatever precision they
/// carry, and equality checks are done against an explicit tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    pub fn abs_diff(self, other: Money) -> Decimal {
        (self.0 - other.0).abs()
    }

    /// True when the two amounts differ by strictly less than `tolerance`.
    pub fn within(self, other: Money, tolerance: Decimal) -> bool {
        self.abs_diff(other) < tolerance
    }
}
