use crate::error::LookupError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of entity a lookup field searches for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Airport,
    Airline,
}

impl Category {
    /// Path of the lookup endpoint, relative to the API base URL
    pub fn endpoint(&self) -> &'static str {
        match self {
            Category::Airport => "/airports",
            Category::Airline => "/airlines",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Airport => "airport",
            Category::Airline => "airline",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One matchable airport or airline returned by the lookup service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireCandidate")]
pub struct Candidate {
    pub code: String,
    pub name: String,
    /// City for airports, country or alliance group for airlines
    pub city: Option<String>,
}

/// Candidate as sent by the lookup API. Airports usually carry `city` and
/// `country` together, airlines `country` or `group`; any other fields are
/// ignored.
#[derive(Deserialize)]
struct WireCandidate {
    code: String,
    name: String,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl From<WireCandidate> for Candidate {
    fn from(wire: WireCandidate) -> Self {
        let city = [wire.city, wire.group, wire.country]
            .into_iter()
            .flatten()
            .find(|label| !label.trim().is_empty());
        Self {
            code: wire.code,
            name: wire.name,
            city,
        }
    }
}

impl Candidate {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            city: None,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Label used when the committed selection is shown in place of the query
    pub fn display_label(&self) -> String {
        match self.city.as_deref().filter(|c| !c.is_empty()) {
            Some(city) => format!("{} ({})", city, self.code),
            None => format!("{} ({})", self.name, self.code),
        }
    }

    /// Two-part line used by result lists: code, then name and city
    pub fn list_line(&self) -> (String, String) {
        let detail = match self.city.as_deref().filter(|c| !c.is_empty()) {
            Some(city) => format!("{} · {}", self.name, city),
            None => self.name.clone(),
        };
        (self.code.clone(), detail)
    }
}

/// Decode a lookup response body.
///
/// The body must be a JSON array of candidate objects; any other JSON value is
/// rejected with [`LookupError::NotAnArray`].
pub fn parse_candidates(body: &[u8]) -> Result<Vec<Candidate>, LookupError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if !value.is_array() {
        return Err(LookupError::NotAnArray {
            found: json_kind(&value),
        });
    }
    Ok(serde_json::from_value(value)?)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_candidates_accepts_city_aliases() {
        let body = br#"[
            {"code": "JFK", "name": "John F. Kennedy International", "city": "New York"},
            {"code": "BA", "name": "British Airways", "country": "United Kingdom"},
            {"code": "LH", "name": "Lufthansa", "group": "Star Alliance"},
            {"code": "XXX", "name": "Unlabelled"}
        ]"#;

        let candidates = parse_candidates(body).unwrap();
        assert_eq!(candidates.len(), 4);
        assert_eq!(candidates[0].city.as_deref(), Some("New York"));
        assert_eq!(candidates[1].city.as_deref(), Some("United Kingdom"));
        assert_eq!(candidates[2].city.as_deref(), Some("Star Alliance"));
        assert_eq!(candidates[3].city, None);
    }

    #[test]
    fn test_parse_candidates_prefers_city_over_country() {
        let body = br#"[
            {"code": "JFK", "name": "John F. Kennedy International", "city": "New York", "country": "United States"},
            {"code": "AF", "name": "Air France", "city": "", "group": "SkyTeam", "country": "France", "iata": "AF"}
        ]"#;

        let candidates = parse_candidates(body).unwrap();
        assert_eq!(candidates[0].city.as_deref(), Some("New York"));
        assert_eq!(candidates[0].display_label(), "New York (JFK)");
        assert_eq!(candidates[1].city.as_deref(), Some("SkyTeam"));
    }

    #[test]
    fn test_parse_candidates_rejects_non_array() {
        let err = parse_candidates(br#"{"error": "rate limited"}"#).unwrap_err();
        assert!(matches!(err, LookupError::NotAnArray { found: "object" }));

        let err = parse_candidates(b"null").unwrap_err();
        assert!(matches!(err, LookupError::NotAnArray { found: "null" }));
    }

    #[test]
    fn test_parse_candidates_rejects_garbage() {
        assert!(matches!(
            parse_candidates(b"<html>502 Bad Gateway</html>"),
            Err(LookupError::Decode(_))
        ));
        // Array of the wrong shape
        assert!(matches!(
            parse_candidates(br#"[{"iata": "JFK"}]"#),
            Err(LookupError::Decode(_))
        ));
    }

    #[test]
    fn test_display_label() {
        let jfk = Candidate::new("JFK", "John F. Kennedy International").with_city("New York");
        assert_eq!(jfk.display_label(), "New York (JFK)");

        let ba = Candidate::new("BA", "British Airways");
        assert_eq!(ba.display_label(), "British Airways (BA)");
    }

    #[test]
    fn test_category_endpoints() {
        assert_eq!(Category::Airport.endpoint(), "/airports");
        assert_eq!(Category::Airline.endpoint(), "/airlines");
        assert_eq!(Category::Airline.to_string(), "airline");
    }
}
