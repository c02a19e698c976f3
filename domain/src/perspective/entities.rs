//! Perspective identity

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Regional Internet Registry a perspective's network belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rir {
    Arin,
    Ripe,
    Apnic,
    Lacnic,
    Afrinic,
}

impl Rir {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rir::Arin => "arin",
            Rir::Ripe => "ripe",
            Rir::Apnic => "apnic",
            Rir::Lacnic => "lacnic",
            Rir::Afrinic => "afrinic",
        }
    }
}

impl std::fmt::Display for Rir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Rir {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arin" => Ok(Rir::Arin),
            "ripe" | "ripe-ncc" | "ripe_ncc" => Ok(Rir::Ripe),
            "apnic" => Ok(Rir::Apnic),
            "lacnic" => Ok(Rir::Lacnic),
            "afrinic" => Ok(Rir::Afrinic),
            _ => Err(DomainError::UnknownRir(s.to_string())),
        }
    }
}

/// An independent network vantage point
///
/// The code selects where the check runs; it never changes what the check
/// does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Perspective {
    pub code: String,
    pub rir: Rir,
}

impl Perspective {
    pub fn new(code: impl Into<String>, rir: Rir) -> Self {
        Self {
            code: code.into(),
            rir,
        }
    }
}

impl std::fmt::Display for Perspective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code, self.rir)
    }
}
