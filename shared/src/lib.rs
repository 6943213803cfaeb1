use serde::{Deserialize, Serialize};

pub type RouteId = u32;
pub type MarkerId = u32;

/// Ordered color tokens handed to the map surface for new routes.
pub const PALETTE: [&str; 8] = [
    "red",
    "blue",
    "green",
    "orange",
    "purple",
    "darkred",
    "cadetblue",
    "darkgreen",
];

/// Default color for a route id: `PALETTE[id mod len]`.
pub fn palette_color(id: RouteId) -> &'static str {
    PALETTE[id as usize % PALETTE.len()]
}

/// Coordinate as written to disk (`lon`, not `lng`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    #[serde(alias = "lng")]
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub marker_id: MarkerId,
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lng,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub color: String,
    pub points: Vec<Point>,
}

impl Route {
    pub fn new(id: RouteId, color: impl Into<String>) -> Self {
        Self {
            id,
            color: color.into(),
            points: Vec::new(),
        }
    }
}

/// Notification sent by the map surface after it already drew the change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MapEvent {
    PointAdded {
        lat: f64,
        lng: f64,
        marker_id: MarkerId,
        route_id: RouteId,
    },
    MarkerMoved {
        lat: f64,
        lng: f64,
        marker_id: MarkerId,
        route_id: RouteId,
    },
}

/// Command pushed to the map surface. Field order matches the call order
/// the surface expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum MapCommand {
    AddRoute {
        route_id: RouteId,
        color: String,
    },
    SetCurrentRoute {
        route_id: RouteId,
    },
    AddMarkerToRoute {
        route_id: RouteId,
        marker_id: MarkerId,
        lat: f64,
        lng: f64,
    },
    ClearCurrentRoute {
        route_id: RouteId,
    },
    ClearAllRoutes,
    RemoveMarker {
        marker_id: MarkerId,
    },
    #[serde(rename = "toggle_poi")]
    TogglePoi,
}

/// One entry of the route selector widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub id: RouteId,
    pub color: String,
    pub point_count: usize,
    pub active: bool,
}

/// Everything the host UI lists: selector entries plus the active route's
/// point rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteListing {
    pub active_route_id: RouteId,
    pub routes: Vec<RouteSummary>,
    pub rows: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps_around() {
        assert_eq!(palette_color(0), "red");
        assert_eq!(palette_color(PALETTE.len() as RouteId), "red");
        assert_eq!(palette_color(9), "blue");
    }

    #[test]
    fn coordinate_accepts_lng_alias() {
        let coord: Coordinate = serde_json::from_str(r#"{"lat": 1.0, "lng": 2.0}"#).unwrap();
        assert_eq!(coord, Coordinate { lat: 1.0, lon: 2.0 });
    }

    #[test]
    fn map_event_uses_event_tag() {
        let event: MapEvent = serde_json::from_str(
            r#"{"event": "point_added", "lat": 1.5, "lng": 2.5, "marker_id": 0, "route_id": 3}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            MapEvent::PointAdded {
                lat: 1.5,
                lng: 2.5,
                marker_id: 0,
                route_id: 3
            }
        );
    }

    #[test]
    fn toggle_poi_command_name() {
        let json = serde_json::to_string(&MapCommand::TogglePoi).unwrap();
        assert_eq!(json, r#"{"command":"toggle_poi"}"#);
    }
}
