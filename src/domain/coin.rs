//! Canonical price representation.
//!
//! On-chain payloads carry prices in two shapes: a structured
//! `{"amount": "1000000", "denom": "uxion"}` object or a bare string
//! (sometimes a bare number). Everything is normalized into [`Coin`]
//! immediately after reading raw payloads so the projection logic never
//! branches on shape.

use serde::{Deserialize, Serialize};

/// A normalized amount/denomination pair.
///
/// Amounts stay `String` end to end: chain amounts are u128-scale
/// integers and JSON numbers would lose precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    /// Integer amount in the smallest denomination unit.
    pub amount: String,
    /// Denomination (e.g. `"uxion"`).
    pub denom: String,
}

/// A price as it appears in a raw event payload, before normalization.
///
/// The structured form is preferred when both interpretations are
/// possible.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    /// Structured `{amount, denom}` object. `denom` may be absent.
    Structured {
        /// Integer amount as a string.
        amount: String,
        /// Optional denomination.
        denom: Option<String>,
    },
    /// Bare string amount with no denomination.
    Bare(String),
    /// Bare numeric amount (seen from some indexer pipelines).
    Number(u64),
}

impl RawPrice {
    /// Normalizes into a [`Coin`], defaulting the denomination to
    /// `default_denom` when the payload does not carry one.
    #[must_use]
    pub fn normalize(&self, default_denom: &str) -> Coin {
        match self {
            Self::Structured { amount, denom } => Coin {
                amount: amount.clone(),
                denom: denom
                    .clone()
                    .unwrap_or_else(|| default_denom.to_string()),
            },
            Self::Bare(amount) => Coin {
                amount: amount.clone(),
                denom: default_denom.to_string(),
            },
            Self::Number(amount) => Coin {
                amount: amount.to_string(),
                denom: default_denom.to_string(),
            },
        }
    }
}
