use serde::{Deserialize, Serialize};

/// Why a pairing was proposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    /// `round(score * 100)`.
    pub confidence: u8,
    /// Signals that fired, in evaluation order.
    pub reasons: Vec<String>,
    pub text: String,
}

impl Explanation {
    pub fn new(score: f64, reasons: Vec<String>) -> Self {
        let confidence = (score.clamp(0.0, 1.0) * 100.0).round() as u8;
        let text = format!("Confidence {}%: {}", confidence, reasons.join(", "));
        Explanation {
            confidence,
            reasons,
            text,
        }
    }
}

/// A proposed invoice/transaction pairing for human review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub invoice_id: String,
    pub transaction_id: String,
    pub score: f64,
    pub explanation: Explanation,
}
