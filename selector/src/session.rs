// Module session - one editing session over a route store
// Pairs every store mutation that has a visual analog with the map command
// announcing it, and refreshes the list views afterwards.

use shared::{MapCommand, MapEvent, MarkerId, Point, RouteId, RouteListing};

use crate::bridge::{CommandSink, InboundHandler};
use crate::codec::{self, ParsedDocument};
use crate::error::{CodecError, StoreError};
use crate::listing::{RouteListView, StoreObserver};
use crate::store::RouteStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Also send `RemoveMarker` for every marker before clearing, for map
    /// surfaces that only remove markers one at a time.
    pub per_marker_clear: bool,
}

pub struct Session<S: CommandSink> {
    store: RouteStore,
    sink: S,
    list_view: RouteListView,
    observers: Vec<Box<dyn StoreObserver + Send>>,
    options: SessionOptions,
}

impl<S: CommandSink> Session<S> {
    pub fn new(sink: S) -> Self {
        Self::with_options(sink, SessionOptions::default())
    }

    pub fn with_options(sink: S, options: SessionOptions) -> Self {
        let store = RouteStore::new();
        let list_view = RouteListView::new(&store);
        Self {
            store,
            sink,
            list_view,
            observers: Vec::new(),
            options,
        }
    }

    pub fn store(&self) -> &RouteStore {
        &self.store
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn listing(&self) -> &RouteListing {
        self.list_view.listing()
    }

    /// Register an extra view; it is rendered immediately and after every
    /// later mutation.
    pub fn subscribe(&mut self, mut observer: Box<dyn StoreObserver + Send>) {
        observer.store_changed(&self.store);
        self.observers.push(observer);
    }

    /// Announce the initial default route to a freshly loaded map surface.
    pub fn announce_default_route(&mut self) {
        let route = self.store.active_route();
        let (route_id, color) = (route.id, route.color.clone());
        self.sink.send(MapCommand::AddRoute { route_id, color });
        self.sink.send(MapCommand::SetCurrentRoute { route_id });
    }

    pub fn new_route(&mut self, color: Option<&str>) -> RouteId {
        let route_id = self.store.create_route(color);
        let color = self.store.active_route().color.clone();
        tracing::info!("new route {route_id} ({color})");
        self.sink.send(MapCommand::AddRoute { route_id, color });
        self.sink.send(MapCommand::SetCurrentRoute { route_id });
        self.notify();
        route_id
    }

    /// # Errors
    /// Returns [`StoreError::NotFound`] and leaves the surface untouched if
    /// the route does not exist.
    pub fn select_route(&mut self, route_id: RouteId) -> Result<(), StoreError> {
        self.store.set_active_route(route_id)?;
        self.sink.send(MapCommand::SetCurrentRoute { route_id });
        self.notify();
        Ok(())
    }

    pub fn add_point(&mut self, route_id: RouteId, lat: f64, lng: f64) -> MarkerId {
        let marker_id = self.store.add_point(route_id, lat, lng);
        self.notify();
        marker_id
    }

    pub fn move_point(&mut self, route_id: RouteId, marker_id: MarkerId, lat: f64, lng: f64) {
        if self.store.move_point(route_id, marker_id, lat, lng) {
            self.notify();
        }
    }

    pub fn clear_current_route(&mut self) {
        let route_id = self.store.active_route_id();
        let removed = self.store.clear_route(route_id);
        tracing::info!("cleared route {route_id} ({} point(s))", removed.len());
        self.remove_markers(&removed);
        self.sink.send(MapCommand::ClearCurrentRoute { route_id });
        self.notify();
    }

    pub fn clear_all(&mut self) {
        if self.options.per_marker_clear {
            let markers: Vec<Point> = self
                .store
                .routes()
                .flat_map(|route| route.points.iter().copied())
                .collect();
            self.remove_markers(&markers);
        }
        self.store.reset_all();
        tracing::info!("reset all routes");
        self.sink.send(MapCommand::ClearAllRoutes);
        self.announce_default_route();
        self.notify();
    }

    pub fn toggle_poi(&mut self) {
        self.sink.send(MapCommand::TogglePoi);
    }

    /// Import every record of a parsed document. Each route is announced
    /// before its markers; the last imported route becomes current.
    pub fn import_parsed(&mut self, parsed: &ParsedDocument) -> Vec<RouteId> {
        let mut imported = Vec::with_capacity(parsed.records.len());
        for record in &parsed.records {
            let route_id = self
                .store
                .import_route(record.color.as_deref(), &record.points);
            self.announce_route(route_id);
            imported.push(route_id);
        }
        if let Some(&route_id) = imported.last() {
            self.sink.send(MapCommand::SetCurrentRoute { route_id });
        }
        tracing::info!("imported {} route(s)", imported.len());
        self.notify();
        imported
    }

    /// # Errors
    /// Parse failures abandon the whole import with the store untouched.
    pub fn import_document(&mut self, text: &str) -> Result<Vec<RouteId>, CodecError> {
        let parsed = codec::parse_document(text).inspect_err(|err| {
            tracing::warn!("route import rejected: {err}");
        })?;
        Ok(self.import_parsed(&parsed))
    }

    pub fn export_document(&self) -> Result<String, CodecError> {
        codec::export_document(&self.store)
    }

    /// Rebuild the map surface from scratch out of the store contents.
    pub fn sync_surface(&mut self) {
        self.sink.discard_pending();
        self.sink.send(MapCommand::ClearAllRoutes);
        let ids: Vec<RouteId> = self.store.routes().map(|route| route.id).collect();
        for route_id in ids {
            self.announce_route(route_id);
        }
        let route_id = self.store.active_route_id();
        self.sink.send(MapCommand::SetCurrentRoute { route_id });
    }

    fn announce_route(&mut self, route_id: RouteId) {
        let Some(route) = self.store.route(route_id) else {
            return;
        };
        self.sink.send(MapCommand::AddRoute {
            route_id,
            color: route.color.clone(),
        });
        for point in &route.points {
            self.sink.send(MapCommand::AddMarkerToRoute {
                route_id,
                marker_id: point.marker_id,
                lat: point.lat,
                lng: point.lng,
            });
        }
    }

    fn remove_markers(&mut self, points: &[Point]) {
        if !self.options.per_marker_clear {
            return;
        }
        for point in points {
            self.sink.send(MapCommand::RemoveMarker {
                marker_id: point.marker_id,
            });
        }
    }

    fn notify(&mut self) {
        self.list_view.store_changed(&self.store);
        for observer in &mut self.observers {
            observer.store_changed(&self.store);
        }
    }
}

impl<S: CommandSink> InboundHandler for Session<S> {
    fn handle_event(&mut self, event: MapEvent) {
        tracing::debug!("map event {event:?}");
        match event {
            MapEvent::PointAdded {
                lat, lng, route_id, ..
            } => {
                self.add_point(route_id, lat, lng);
            }
            MapEvent::MarkerMoved {
                lat,
                lng,
                marker_id,
                route_id,
            } => self.move_point(route_id, marker_id, lat, lng),
        }
    }
}
