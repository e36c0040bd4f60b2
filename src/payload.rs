use crate::encoding;
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Kind of supplier event recorded in a block.
///
/// Known tags get their own variant; anything else is carried verbatim in
/// [`Action::Other`] so blocks from producers with a wider vocabulary still
/// encode (and therefore hash) to the exact same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Register,
    ContractFail,
    RatingUpdate,
    Init,
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Register => "REGISTER",
            Action::ContractFail => "CONTRACT_FAIL",
            Action::RatingUpdate => "RATING_UPDATE",
            Action::Init => "INIT",
            Action::Other(tag) => tag,
        }
    }
}

impl From<String> for Action {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "REGISTER" => Action::Register,
            "CONTRACT_FAIL" => Action::ContractFail,
            "RATING_UPDATE" => Action::RatingUpdate,
            "INIT" => Action::Init,
            _ => Action::Other(tag),
        }
    }
}

impl From<&str> for Action {
    fn from(tag: &str) -> Self {
        Action::from(tag.to_string())
    }
}

impl FromStr for Action {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Action::from(s))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Action::from)
    }
}

/// A single supplier event: who, what happened, and how the rating moved.
///
/// Field order is part of the hash format and must not change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payload {
    /// Taxpayer identification number (INN) of the supplier.
    #[serde(rename = "inn")]
    pub subject_id: String,
    /// Registered company name.
    #[serde(rename = "company_name")]
    pub subject_name: String,
    pub action: Action,
    /// Signed rating adjustment, e.g. `-0.5` or `1`.
    #[serde(rename = "rating_change", serialize_with = "serialize_finite")]
    pub rating_delta: f64,
    /// Free-text annotation (contract number, reason, ...).
    pub details: String,
}

impl Payload {
    pub fn new(
        subject_id: impl Into<String>,
        subject_name: impl Into<String>,
        action: impl Into<Action>,
        rating_delta: f64,
        details: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            subject_name: subject_name.into(),
            action: action.into(),
            rating_delta,
            details: details.into(),
        }
    }

    /// Canonical JSON text of this payload, as fed into the block fingerprint.
    ///
    /// Fails only for a non-finite `rating_delta`, which has no JSON form.
    pub fn canonical_json(&self) -> Result<String> {
        if !self.rating_delta.is_finite() {
            return Err(LedgerError::UnsupportedValue(format!(
                "rating_change {}",
                self.rating_delta
            )));
        }
        encoding::to_string(self)
    }
}

fn serialize_finite<S>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if !value.is_finite() {
        return Err(serde::ser::Error::custom(format!(
            "unsupported value: rating_change {}",
            value
        )));
    }
    serializer.serialize_f64(*value)
}
