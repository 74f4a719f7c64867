use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::maps::LatLng;

/// Alert identifier as assigned by the remote source. The API has emitted
/// both numeric and string ids over time, so both are accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AlertId {
    Int(i64),
    Str(String),
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertId::Int(n) => write!(f, "{}", n),
            AlertId::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Channel that produced the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertOrigin {
    /// In-transit emergency trigger.
    Sos,
    /// Conversational intake; carries the reporter's starting position.
    Chatbot,
}

impl AlertOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertOrigin::Sos => "sos",
            AlertOrigin::Chatbot => "chatbot",
        }
    }

    fn from_wire(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("chatbot") => AlertOrigin::Chatbot,
            // Absent or anything else defaults to SOS.
            _ => AlertOrigin::Sos,
        }
    }
}

/// Raw coordinate pair as received from the API. Values arrive as numbers or
/// as strings ("+20.652494"); either component may be missing or garbage.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeoPoint {
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub lng: Option<f64>,
}

impl GeoPoint {
    /// Renderable position, only when both components parsed to finite
    /// numbers. Unparsable coordinates suppress the marker, not the row.
    pub fn lat_lng(&self) -> Option<LatLng> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(LatLng { lat, lng })
            }
            _ => None,
        }
    }
}

/// Embedded reference to the reporting user.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Reporter {
    #[serde(default, rename = "firstName", alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(default, rename = "lastName", alias = "last_name")]
    pub last_name: Option<String>,
    #[serde(default, rename = "photoUrl", alias = "photo_url")]
    pub photo_url: Option<String>,
}

impl Reporter {
    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("").trim();
        let last = self.last_name.as_deref().unwrap_or("").trim();
        let name = format!("{} {}", first, last);
        let name = name.trim();
        if name.is_empty() {
            "unknown".to_string()
        } else {
            name.to_string()
        }
    }
}

/// Wire form of one alert record. The API emits camelCase on new records and
/// snake_case on ones migrated from the legacy backend, so every field
/// carries an alias. Nothing outside this module sees the dual naming.
#[derive(Debug, Deserialize)]
pub struct WireAlert {
    pub id: AlertId,
    #[serde(default, rename = "type", alias = "alert_type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(
        default,
        rename = "reportedAt",
        alias = "reported_at",
        deserialize_with = "parse_timestamp_option"
    )]
    pub reported_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "reporterUser", alias = "reporter_user")]
    pub reporter_user: Option<Reporter>,
    #[serde(default)]
    pub location: GeoPoint,
    #[serde(default, rename = "originLocation", alias = "origin_location")]
    pub origin_location: Option<GeoPoint>,
    #[serde(default)]
    pub message: Option<String>,
}

impl WireAlert {
    /// Normalizes into the canonical in-memory shape. This is the single
    /// point where the naming convention and loose typing are resolved.
    pub fn into_alert(self) -> Alert {
        let kind = match self.kind {
            Some(k) if !k.trim().is_empty() => k.trim().to_lowercase(),
            _ => "other".to_string(),
        };
        Alert {
            id: self.id,
            kind,
            origin: AlertOrigin::from_wire(self.origin.as_deref()),
            reported_at: self.reported_at,
            reporter: self.reporter_user,
            location: self.location,
            origin_location: self.origin_location,
            message: self.message,
        }
    }
}

/// One reported travel incident, canonical form.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: AlertId,
    /// Lower-cased categorical tag; "other" when the source omitted it.
    pub kind: String,
    pub origin: AlertOrigin,
    pub reported_at: Option<DateTime<Utc>>,
    pub reporter: Option<Reporter>,
    pub location: GeoPoint,
    pub origin_location: Option<GeoPoint>,
    pub message: Option<String>,
}

impl Alert {
    pub fn reporter_name(&self) -> String {
        self.reporter
            .as_ref()
            .map(Reporter::full_name)
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Origin→destination pair for route resolution. Only chatbot alerts
    /// carry a start position, and both ends must be numeric to query the
    /// routing provider.
    pub fn route_endpoints(&self) -> Option<(LatLng, LatLng)> {
        if self.origin != AlertOrigin::Chatbot {
            return None;
        }
        let from = self.origin_location.as_ref()?.lat_lng()?;
        let to = self.location.lat_lng()?;
        Some((from, to))
    }
}

fn parse_f64_option<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrFloat {
        String(String),
        Float(f64),
    }

    let v: Option<StringOrFloat> = Option::deserialize(deserializer)?;
    match v {
        Some(StringOrFloat::Float(f)) => Ok(Some(f)),
        Some(StringOrFloat::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                // Bad coordinates are handled by omission, not by failing
                // the whole record.
                Ok(s.parse::<f64>().ok())
            }
        }
        None => Ok(None),
    }
}

fn parse_timestamp_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrEpoch {
        String(String),
        Epoch(i64),
    }

    let v: Option<StringOrEpoch> = Option::deserialize(deserializer)?;
    match v {
        Some(StringOrEpoch::Epoch(ms)) => Ok(DateTime::<Utc>::from_timestamp_millis(ms)),
        Some(StringOrEpoch::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            if let Ok(t) = DateTime::parse_from_rfc3339(s) {
                return Ok(Some(t.with_timezone(&Utc)));
            }
            // Legacy backend emits naive datetimes in two formats.
            for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
                if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
                    return Ok(Some(t.and_utc()));
                }
            }
            Ok(None)
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsing_camel_case_record() {
        let payload = r#"
        {
            "id": 482,
            "type": "Mecanica",
            "origin": "chatbot",
            "reportedAt": "2025-11-29T06:15:15Z",
            "reporterUser": {
                "firstName": "Laura",
                "lastName": "Mendez",
                "photoUrl": "https://cdn.siscom.mx/u/482.jpg"
            },
            "location": { "lat": "+20.652494", "lng": "-100.391404" },
            "originLocation": { "lat": 20.588793, "lng": -100.389888 },
            "message": "Se quedo sin frenos en la caseta"
        }
        "#;

        let alert = serde_json::from_str::<WireAlert>(payload)
            .unwrap()
            .into_alert();
        assert_eq!(alert.id, AlertId::Int(482));
        assert_eq!(alert.kind, "mecanica");
        assert_eq!(alert.origin, AlertOrigin::Chatbot);
        assert_eq!(alert.reporter_name(), "Laura Mendez");
        let pos = alert.location.lat_lng().unwrap();
        assert_eq!(pos.lat, 20.652494);
        assert_eq!(pos.lng, -100.391404);
        assert!(alert.route_endpoints().is_some());
    }

    #[test]
    fn test_parsing_snake_case_record() {
        let payload = r#"
        {
            "id": "a-91",
            "alert_type": "COMBUSTIBLE",
            "reported_at": "2025-11-28 22:03:41",
            "reporter_user": { "first_name": "Pedro", "last_name": "Ruiz" },
            "location": { "lat": 19.4326, "lng": -99.1332 }
        }
        "#;

        let alert = serde_json::from_str::<WireAlert>(payload)
            .unwrap()
            .into_alert();
        assert_eq!(alert.id, AlertId::Str("a-91".to_string()));
        assert_eq!(alert.kind, "combustible");
        // Absent origin defaults to SOS.
        assert_eq!(alert.origin, AlertOrigin::Sos);
        assert!(alert.reported_at.is_some());
        // SOS alerts never route, even with coordinates present.
        assert!(alert.route_endpoints().is_none());
    }

    #[test]
    fn test_bad_coordinates_suppress_position_not_record() {
        let payload = r#"
        {
            "id": 7,
            "type": "medica",
            "origin": "sos",
            "reportedAt": 1764396915000,
            "location": { "lat": "N/A", "lng": "-100.39" }
        }
        "#;

        let alert = serde_json::from_str::<WireAlert>(payload)
            .unwrap()
            .into_alert();
        assert!(alert.location.lat_lng().is_none());
        assert_eq!(alert.reporter_name(), "unknown");
        assert_eq!(
            alert.reported_at.unwrap().timestamp_millis(),
            1764396915000
        );
    }

    #[test]
    fn test_missing_kind_defaults_to_other() {
        let payload = r#"{ "id": 1, "location": { "lat": 1.0, "lng": 2.0 } }"#;
        let alert = serde_json::from_str::<WireAlert>(payload)
            .unwrap()
            .into_alert();
        assert_eq!(alert.kind, "other");
        assert_eq!(alert.origin, AlertOrigin::Sos);
        assert!(alert.reported_at.is_none());
    }

    #[test]
    fn test_chatbot_without_origin_location_does_not_route() {
        let payload = r#"
        {
            "id": 2,
            "type": "policia",
            "origin": "chatbot",
            "location": { "lat": 19.0, "lng": -99.0 },
            "originLocation": { "lat": 19.1 }
        }
        "#;
        let alert = serde_json::from_str::<WireAlert>(payload)
            .unwrap()
            .into_alert();
        assert!(alert.route_endpoints().is_none());
    }
}
