// Module store - canonical in-memory route collection
// Every map marker and list row is a projection of this state.

use std::collections::BTreeMap;

use shared::{Coordinate, MarkerId, Point, Route, RouteId, palette_color};

use crate::error::StoreError;

const DEFAULT_ROUTE_ID: RouteId = 0;

/// Route collection with a monotonic id allocator.
///
/// Invariants:
/// - `active_route_id` is always a key of `routes`
/// - `next_route_id` is greater than every id ever handed out since the
///   last [`RouteStore::reset_all`]
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStore {
    routes: BTreeMap<RouteId, Route>,
    active_route_id: RouteId,
    next_route_id: RouteId,
}

impl Default for RouteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteStore {
    /// Collection holding only the default route (id 0, first palette color).
    pub fn new() -> Self {
        let mut routes = BTreeMap::new();
        routes.insert(
            DEFAULT_ROUTE_ID,
            Route::new(DEFAULT_ROUTE_ID, palette_color(DEFAULT_ROUTE_ID)),
        );
        Self {
            routes,
            active_route_id: DEFAULT_ROUTE_ID,
            next_route_id: DEFAULT_ROUTE_ID + 1,
        }
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn active_route_id(&self) -> RouteId {
        self.active_route_id
    }

    pub fn active_route(&self) -> &Route {
        &self.routes[&self.active_route_id]
    }

    pub fn next_route_id(&self) -> RouteId {
        self.next_route_id
    }

    /// Allocate a new empty route and make it active. A supplied color is
    /// used verbatim, otherwise the palette color for the new id.
    pub fn create_route(&mut self, color: Option<&str>) -> RouteId {
        let id = self.next_route_id;
        self.next_route_id += 1;
        let color = color.map_or_else(|| palette_color(id).to_string(), str::to_string);
        self.routes.insert(id, Route::new(id, color));
        self.active_route_id = id;
        tracing::debug!("created route {id}");
        id
    }

    /// # Errors
    /// Returns [`StoreError::NotFound`] if `id` is not a known route.
    pub fn set_active_route(&mut self, id: RouteId) -> Result<(), StoreError> {
        if !self.routes.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        self.active_route_id = id;
        Ok(())
    }

    /// Append a point and return its marker id. An unknown `route_id`
    /// falls back to the active route, since map events may carry a stale id.
    pub fn add_point(&mut self, route_id: RouteId, lat: f64, lng: f64) -> MarkerId {
        let target = if self.routes.contains_key(&route_id) {
            route_id
        } else {
            tracing::debug!(
                "unknown route {route_id}, appending to active route {}",
                self.active_route_id
            );
            self.active_route_id
        };
        let route = self
            .routes
            .entry(target)
            .or_insert_with(|| Route::new(target, palette_color(target)));
        let marker_id = route.points.len() as MarkerId;
        route.points.push(Point {
            marker_id,
            lat,
            lng,
        });
        marker_id
    }

    /// Rewrite the coordinates of one marker in place. Returns whether a
    /// point matched; a miss is not an error.
    pub fn move_point(&mut self, route_id: RouteId, marker_id: MarkerId, lat: f64, lng: f64) -> bool {
        let Some(point) = self
            .routes
            .get_mut(&route_id)
            .and_then(|route| route.points.iter_mut().find(|p| p.marker_id == marker_id))
        else {
            tracing::debug!("ignoring move of unknown marker {marker_id} on route {route_id}");
            return false;
        };
        point.lat = lat;
        point.lng = lng;
        true
    }

    /// Empty a route's points, keeping its id and color. Returns the
    /// removed points; unknown ids yield nothing.
    pub fn clear_route(&mut self, route_id: RouteId) -> Vec<Point> {
        self.routes
            .get_mut(&route_id)
            .map(|route| std::mem::take(&mut route.points))
            .unwrap_or_default()
    }

    pub fn reset_all(&mut self) {
        *self = Self::new();
    }

    /// Create a route and append `points` with fresh marker ids.
    pub fn import_route(&mut self, color: Option<&str>, points: &[Coordinate]) -> RouteId {
        let id = self.create_route(color);
        for coord in points {
            self.add_point(id, coord.lat, coord.lon);
        }
        id
    }
}
