pub mod candidate;
pub mod money;
pub mod record;

pub use candidate::{Explanation, MatchCandidate};
pub use money::Money;
pub use record::{days_apart, BankTransaction, Invoice, RecordError, RecordKind};
