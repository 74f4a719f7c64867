use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RouteError;
use crate::models::alert::Alert;

/// Map zoom used when the detail overlay centers on one alert.
pub const DETAIL_ZOOM: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// One point marker for the rendering surface.
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub position: LatLng,
    pub color: &'static str,
    pub tooltip: String,
}

/// Marker color by alert kind, matching the dashboard palette.
pub fn marker_color(kind: &str) -> &'static str {
    match kind {
        "mechanical" | "mecanica" => "#f97316",
        "medical" | "medica" => "#ef4444",
        "fuel" | "combustible" => "#eab308",
        "police" | "policia" => "#3b82f6",
        "informative" | "informativa" => "#14b8a6",
        "food" | "alimentos" => "#a855f7",
        _ => "#6b7280",
    }
}

/// Builds the marker set for a list of alerts. Alerts whose coordinates do
/// not parse to finite numbers get no marker; their rows are unaffected.
pub fn build_markers(alerts: &[Alert]) -> Vec<Marker> {
    alerts
        .iter()
        .filter_map(|alert| {
            let position = alert.location.lat_lng()?;
            Some(Marker {
                position,
                color: marker_color(&alert.kind),
                tooltip: format!("{} · {}", alert.kind, alert.reporter_name()),
            })
        })
        .collect()
}

/// Travel-mode hint for the routing query. Alert routes are always driven,
/// so only that mode exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Driving,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
        }
    }
}

/// Resolved route, opaque to this crate; the renderer draws the polyline.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    /// Encoded overview polyline as returned by the provider.
    pub polyline: String,
    pub summary: String,
    pub distance_meters: u64,
    pub duration_seconds: u64,
}

/// External routing collaborator. Inherently network-bound; callers must not
/// block on it and must tolerate it never resolving.
#[async_trait]
pub trait RouteResolver: Send + Sync {
    async fn resolve(
        &self,
        origin: LatLng,
        destination: LatLng,
        mode: TravelMode,
    ) -> Result<Route, RouteError>;
}

/// Google Directions API client.
pub struct GoogleDirectionsResolver {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GoogleDirectionsResolver {
    const DEFAULT_ENDPOINT: &'static str = "https://maps.googleapis.com/maps/api/directions/json";

    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Points the resolver at a different endpoint (test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    summary: String,
    overview_polyline: OverviewPolyline,
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
struct OverviewPolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    distance: LegValue,
    duration: LegValue,
}

#[derive(Debug, Deserialize)]
struct LegValue {
    value: u64,
}

#[async_trait]
impl RouteResolver for GoogleDirectionsResolver {
    async fn resolve(
        &self,
        origin: LatLng,
        destination: LatLng,
        mode: TravelMode,
    ) -> Result<Route, RouteError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("origin", origin.to_string()),
                ("destination", destination.to_string()),
                ("mode", mode.as_str().to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<DirectionsResponse>()
            .await?;

        if response.status != "OK" {
            return Err(RouteError::Provider {
                status: response.status,
            });
        }
        let route = response.routes.into_iter().next().ok_or(RouteError::NoRoute)?;
        let (distance_meters, duration_seconds) = route
            .legs
            .iter()
            .fold((0, 0), |(d, t), leg| (d + leg.distance.value, t + leg.duration.value));

        Ok(Route {
            polyline: route.overview_polyline.points,
            summary: route.summary,
            distance_meters,
            duration_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::alert::WireAlert;

    fn alert(json: &str) -> Alert {
        serde_json::from_str::<WireAlert>(json).unwrap().into_alert()
    }

    #[test]
    fn test_markers_skip_unparsable_coordinates() {
        let alerts = vec![
            alert(r#"{ "id": 1, "type": "medica", "location": { "lat": 19.43, "lng": -99.13 } }"#),
            alert(r#"{ "id": 2, "type": "policia", "location": { "lat": "??", "lng": -99.13 } }"#),
        ];
        let markers = build_markers(&alerts);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].color, marker_color("medica"));
        assert_eq!(markers[0].position.lat, 19.43);
    }

    #[test]
    fn test_unknown_kind_gets_default_color() {
        assert_eq!(marker_color("volcanic"), marker_color("something-else"));
        assert_ne!(marker_color("medica"), marker_color("volcanic"));
    }

    #[test]
    fn test_directions_response_decoding() {
        let body = r#"
        {
            "status": "OK",
            "routes": [{
                "summary": "MEX 57D",
                "overview_polyline": { "points": "a~l~Fjk~uOwHJy@P" },
                "legs": [
                    { "distance": { "value": 1500 }, "duration": { "value": 300 } },
                    { "distance": { "value": 500 }, "duration": { "value": 120 } }
                ]
            }]
        }
        "#;
        let decoded: DirectionsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(decoded.status, "OK");
        let route = &decoded.routes[0];
        assert_eq!(route.overview_polyline.points, "a~l~Fjk~uOwHJy@P");
        assert_eq!(route.legs.len(), 2);
    }

    #[test]
    fn test_zero_results_is_provider_error_status() {
        let body = r#"{ "status": "ZERO_RESULTS", "routes": [] }"#;
        let decoded: DirectionsResponse = serde_json::from_str(body).unwrap();
        assert_ne!(decoded.status, "OK");
        assert!(decoded.routes.is_empty());
    }
}
