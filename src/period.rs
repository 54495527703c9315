use std::{fmt::Display, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SrError;

static PERIOD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[1-9][0-9]*(?:d|wk|mo|y)|ytd|max)$").expect("Invalid period pattern")
});

/// Lookback window label as understood by the market-data provider, e.g. `6mo`.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period(String);

impl Period {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Period {
    fn default() -> Self {
        Self("6mo".to_string())
    }
}

impl FromStr for Period {
    type Err = SrError;
    fn from_str(s: &str) -> Result<Self, <Self as FromStr>::Err> {
        let s = s.trim().to_lowercase();

        if PERIOD_PATTERN.is_match(&s) {
            Ok(Self(s))
        } else {
            Err(SrError::Invalid {
                code: "INVALID_PERIOD",
                message: format!(
                    "Unsupported period '{s}', expected e.g. 1mo, 3mo, 6mo, 1y, ytd or max"
                ),
            })
        }
    }
}

impl TryFrom<String> for Period {
    type Error = SrError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.0
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
