use std::fmt;

/// One signal that fired for a pair, carrying the value that decided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchReason {
    ExactAmount,
    VendorInDescription { vendor: String },
    DateWithin { days: u64 },
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchReason::ExactAmount => write!(f, "Exact amount match"),
            MatchReason::VendorInDescription { vendor } => {
                write!(f, "Vendor '{vendor}' found in bank description")
            }
            MatchReason::DateWithin { days: 1 } => write!(f, "Date within 1 day"),
            MatchReason::DateWithin { days } => write!(f, "Date within {days} days"),
        }
    }
}
