//! Token usage accounting.
//!
//! `TokenUsage` is the count for one model call. `TokenUsageReport` groups
//! counts by feature and forms a monoid: [`TokenUsageReport::default`] is the
//! identity and [`TokenUsageReport::merge`] is associative and commutative, so
//! per-call, per-turn and per-conversation rollups all use the same fold.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::Add;

/// Feature key for classifier calls.
pub const FEATURE_CLASSIFICATION: &str = "classification";

/// Feature key for response-generator and summary calls.
pub const FEATURE_RESPONSE_GENERATION: &str = "response_generation";

/// Token counts for a single model call (or a sum of calls).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_token_count: u64,
    pub output_token_count: u64,
    pub total_token_count: u64,
}

impl TokenUsage {
    /// Creates usage whose total is input + output.
    pub fn new(input_token_count: u64, output_token_count: u64) -> Self {
        Self::from_counts(
            input_token_count,
            output_token_count,
            input_token_count.saturating_add(output_token_count),
        )
    }

    /// Creates usage with a provider-reported total, which may exceed
    /// input + output when the provider bills extra tokens.
    pub fn from_counts(
        input_token_count: u64,
        output_token_count: u64,
        total_token_count: u64,
    ) -> Self {
        Self {
            input_token_count,
            output_token_count,
            total_token_count,
        }
    }

    /// Creates zero usage.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Sums two usages field by field.
    pub fn merge(&self, other: &TokenUsage) -> Self {
        Self {
            input_token_count: self.input_token_count.saturating_add(other.input_token_count),
            output_token_count: self
                .output_token_count
                .saturating_add(other.output_token_count),
            total_token_count: self.total_token_count.saturating_add(other.total_token_count),
        }
    }
}

impl Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: TokenUsage) -> TokenUsage {
        self.merge(&rhs)
    }
}

/// Token usage keyed by feature name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenUsageReport {
    features: BTreeMap<String, TokenUsage>,
}

impl TokenUsageReport {
    /// The identity report: no features, all zeros.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A report holding a single feature's usage.
    pub fn single(feature: impl Into<String>, usage: TokenUsage) -> Self {
        let mut features = BTreeMap::new();
        features.insert(feature.into(), usage);
        Self { features }
    }

    /// Returns a new report with `usage` added under `feature`.
    pub fn record(&self, feature: impl Into<String>, usage: TokenUsage) -> Self {
        self.merge(&Self::single(feature, usage))
    }

    /// Combines two reports, summing features present in both.
    pub fn merge(&self, other: &TokenUsageReport) -> Self {
        let mut features = self.features.clone();
        for (feature, usage) in &other.features {
            features
                .entry(feature.clone())
                .and_modify(|existing| *existing = existing.merge(usage))
                .or_insert(*usage);
        }
        Self { features }
    }

    /// Usage recorded under `feature`, if any.
    pub fn get(&self, feature: &str) -> Option<&TokenUsage> {
        self.features.get(feature)
    }

    /// Iterates features in key order.
    pub fn features(&self) -> impl Iterator<Item = (&str, &TokenUsage)> {
        self.features.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Sum across every feature.
    pub fn total(&self) -> TokenUsage {
        self.features.values().copied().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Sum for TokenUsage {
    fn sum<I: Iterator<Item = TokenUsage>>(iter: I) -> Self {
        iter.fold(TokenUsage::zero(), |acc, u| acc.merge(&u))
    }
}

impl<'a> Sum<&'a TokenUsageReport> for TokenUsageReport {
    fn sum<I: Iterator<Item = &'a TokenUsageReport>>(iter: I) -> Self {
        iter.fold(TokenUsageReport::empty(), |acc, r| acc.merge(r))
    }
}
