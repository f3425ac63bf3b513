//! Canonical account identifiers.
//!
//! Account ids reach the system as JWT claims, query strings, or shell
//! arguments, and have historically arrived as integers, floats, or strings.
//! Everything past the boundary works with [`AccountId`] only.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::SubtrackError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u64);

impl AccountId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Resolves a loosely typed identity claim into the canonical integer id.
    ///
    /// Integers and integer strings are accepted as-is; floats only when they
    /// carry no fractional part.
    pub fn from_claim(claim: &Value) -> Result<Self, SubtrackError> {
        match claim {
            Value::Number(number) => {
                if let Some(raw) = number.as_u64() {
                    return Ok(Self(raw));
                }
                match number.as_f64() {
                    Some(raw) if raw >= 0.0 && raw.fract() == 0.0 && raw <= u64::MAX as f64 => {
                        Ok(Self(raw as u64))
                    }
                    _ => Err(SubtrackError::InvalidInput(format!(
                        "account id `{number}` is not a non-negative integer"
                    ))),
                }
            }
            Value::String(text) => text.parse(),
            other => Err(SubtrackError::InvalidInput(format!(
                "unsupported account id claim: {other}"
            ))),
        }
    }
}

impl FromStr for AccountId {
    type Err = SubtrackError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        input.trim().parse::<u64>().map(Self).map_err(|_| {
            SubtrackError::InvalidInput(format!("invalid account id `{}`", input.trim()))
        })
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AccountId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn claims_resolve_to_canonical_id() {
        assert_eq!(AccountId::from_claim(&json!(42)).unwrap(), AccountId(42));
        assert_eq!(AccountId::from_claim(&json!(42.0)).unwrap(), AccountId(42));
        assert_eq!(AccountId::from_claim(&json!("42")).unwrap(), AccountId(42));
    }

    #[test]
    fn ambiguous_claims_are_rejected() {
        assert!(AccountId::from_claim(&json!(4.5)).is_err());
        assert!(AccountId::from_claim(&json!(-3)).is_err());
        assert!(AccountId::from_claim(&json!("abc")).is_err());
        assert!(AccountId::from_claim(&json!(null)).is_err());
    }
}
