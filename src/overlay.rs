use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::maps::{LatLng, Route, RouteResolver, TravelMode};
use crate::models::alert::Alert;

/// Where the map sits before any alert has been inspected.
pub const DEFAULT_MAP_CENTER: LatLng = LatLng {
    lat: 23.6345,
    lng: -102.5528,
};

struct Selected {
    alert: Alert,
    route: Option<Route>,
    /// Selection this entry belongs to; route completions carrying another
    /// token are dropped.
    seq: u64,
}

struct OverlayInner {
    selected: Option<Selected>,
    map_center: LatLng,
}

/// Detail overlay for one inspected alert: holds the selection, the map
/// center, and the route resolved for chatbot alerts.
///
/// Selecting replaces everything; dismissing clears everything. A route
/// resolution in flight for a previous selection can never write into a
/// newer one.
pub struct DetailOverlay {
    resolver: Arc<dyn RouteResolver>,
    inner: Mutex<OverlayInner>,
    selection_seq: AtomicU64,
}

impl DetailOverlay {
    pub fn new(resolver: Arc<dyn RouteResolver>) -> Self {
        Self {
            resolver,
            inner: Mutex::new(OverlayInner {
                selected: None,
                map_center: DEFAULT_MAP_CENTER,
            }),
            selection_seq: AtomicU64::new(0),
        }
    }

    /// Opens the overlay on an alert (or moves it to a new one). The route
    /// always starts empty; for a chatbot alert with a usable start position
    /// one resolution is kicked off in the background.
    pub fn select(self: &Arc<Self>, alert: Alert) {
        let seq = self.selection_seq.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut inner = self.inner.lock().unwrap();
            // Unparsable coordinates keep the previous center.
            if let Some(center) = alert.location.lat_lng() {
                inner.map_center = center;
            }
            inner.selected = Some(Selected {
                alert: alert.clone(),
                route: None,
                seq,
            });
        }

        let Some((from, to)) = alert.route_endpoints() else {
            return;
        };

        let overlay = Arc::clone(self);
        tokio::spawn(async move {
            match overlay.resolver.resolve(from, to, TravelMode::Driving).await {
                Ok(route) => overlay.apply_route(seq, route),
                // Overlay still renders, marker only.
                Err(e) => warn!("Route resolution failed for alert {}: {}", alert.id, e),
            }
        });
    }

    fn apply_route(&self, seq: u64, route: Route) {
        let mut inner = self.inner.lock().unwrap();
        match inner.selected.as_mut() {
            Some(selected) if selected.seq == seq => selected.route = Some(route),
            _ => debug!("Dropped route for superseded selection {}", seq),
        }
    }

    /// Closes the overlay. Selection and route go together; idempotent.
    pub fn dismiss(&self) {
        // Bump the token so an in-flight resolution cannot land later.
        self.selection_seq.fetch_add(1, Ordering::SeqCst);
        self.inner.lock().unwrap().selected = None;
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().unwrap().selected.is_some()
    }

    pub fn selected_alert(&self) -> Option<Alert> {
        self.inner
            .lock()
            .unwrap()
            .selected
            .as_ref()
            .map(|s| s.alert.clone())
    }

    pub fn route(&self) -> Option<Route> {
        self.inner
            .lock()
            .unwrap()
            .selected
            .as_ref()
            .and_then(|s| s.route.clone())
    }

    pub fn map_center(&self) -> LatLng {
        self.inner.lock().unwrap().map_center
    }
}
