use recon_core::{days_apart, BankTransaction, Explanation, Invoice, MatchCandidate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::reason::MatchReason;

/// Outcome of scoring a single invoice/transaction pair, before filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct PairScore {
    /// Composite score, already clamped to `[0, 1]`.
    pub score: Decimal,
    pub reasons: Vec<MatchReason>,
}

/// Stateless scorer over the full invoice × transaction cross product.
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    config: EngineConfig,
}

impl MatchEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Scores every pair and returns those at or above the acceptance
    /// threshold, best first. Equal scores are ordered by invoice id, then
    /// transaction id.
    pub fn score_matches(
        &self,
        invoices: &[Invoice],
        transactions: &[BankTransaction],
    ) -> Vec<MatchCandidate> {
        let mut accepted: Vec<(Decimal, MatchCandidate)> = transactions
            .iter()
            .flat_map(|txn| {
                invoices
                    .iter()
                    .filter_map(move |inv| self.candidate_for(inv, txn))
            })
            .collect();

        accepted.sort_by(|(score_a, a), (score_b, b)| {
            score_b
                .cmp(score_a)
                .then_with(|| a.invoice_id.cmp(&b.invoice_id))
                .then_with(|| a.transaction_id.cmp(&b.transaction_id))
        });

        tracing::debug!(
            invoices = invoices.len(),
            transactions = transactions.len(),
            candidates = accepted.len(),
            "scored invoice/transaction pairs"
        );

        accepted.into_iter().map(|(_, c)| c).collect()
    }

    /// Evaluates all signals for one pair without applying the threshold.
    pub fn score_pair(&self, inv: &Invoice, txn: &BankTransaction) -> PairScore {
        let cfg = &self.config;
        let mut score = Decimal::ZERO;
        let mut reasons = Vec::new();

        if inv.amount.within(txn.amount, cfg.amount_tolerance) {
            score += cfg.amount_weight;
            reasons.push(MatchReason::ExactAmount);
        }

        if let Some(vendor) = inv.vendor.as_deref() {
            if vendor_in_description(vendor, &txn.description) {
                score += cfg.vendor_weight;
                reasons.push(MatchReason::VendorInDescription {
                    vendor: vendor.to_string(),
                });
            }
        }

        let days = days_apart(inv.date, txn.date);
        if days <= u64::from(cfg.date_window_days) {
            score += cfg.date_weight;
            reasons.push(MatchReason::DateWithin { days });
        }

        // Overflow past 1.0 is capped, not renormalised.
        let score = score.clamp(Decimal::ZERO, Decimal::ONE);
        PairScore { score, reasons }
    }

    fn candidate_for(
        &self,
        inv: &Invoice,
        txn: &BankTransaction,
    ) -> Option<(Decimal, MatchCandidate)> {
        let PairScore { score, reasons } = self.score_pair(inv, txn);
        if score < self.config.acceptance_threshold {
            return None;
        }

        let score_f64 = score.to_f64().unwrap_or_default();
        let reasons = reasons.iter().map(ToString::to_string).collect();
        Some((
            score,
            MatchCandidate {
                invoice_id: inv.id.clone(),
                transaction_id: txn.id.clone(),
                score: score_f64,
                explanation: Explanation::new(score_f64, reasons),
            },
        ))
    }
}

/// Scores with the default weights and threshold.
pub fn score_matches(
    invoices: &[Invoice],
    transactions: &[BankTransaction],
) -> Vec<MatchCandidate> {
    MatchEngine::default().score_matches(invoices, transactions)
}

/// Case-insensitive literal containment. Empty strings never match.
fn vendor_in_description(vendor: &str, description: &str) -> bool {
    if vendor.is_empty() || description.is_empty() {
        return false;
    }
    description.to_lowercase().contains(&vendor.to_lowercase())
}
