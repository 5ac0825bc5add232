use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Providers
// ============================================================================

/// Upstream scraper backends. Declaration order is the fan-out order and
/// therefore the tie-break order when two results share the same agony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Orbitz,
    Expedia,
    Priceline,
    Travelocity,
    United,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::Orbitz,
        Provider::Expedia,
        Provider::Priceline,
        Provider::Travelocity,
        Provider::United,
    ];

    /// Path segment appended to the scraper base URL.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Orbitz => "Orbitz",
            Provider::Expedia => "Expedia",
            Provider::Priceline => "Priceline",
            Provider::Travelocity => "Travelocity",
            Provider::United => "United",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvider(pub String);

impl fmt::Display for UnknownProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown provider: {}", self.0)
    }
}

impl std::error::Error for UnknownProvider {}

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

// ============================================================================
// Results
// ============================================================================

/// A single itinerary as reported by a provider.
///
/// Only `provider` and `agony` are interpreted; everything else is carried
/// through to the client untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightResult {
    pub provider: String,
    /// Lower is better. Kept as a JSON number so integers stay integers on the way out.
    pub agony: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FlightResult {
    pub fn agony_score(&self) -> f64 {
        self.agony.as_f64().unwrap_or(f64::INFINITY)
    }
}

/// Body returned by `GET <base>/<provider>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub results: Vec<FlightResult>,
}
