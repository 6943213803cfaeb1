use shared::{Point, RouteListing, RouteSummary};

use crate::store::RouteStore;

/// Re-rendered after every store mutation.
pub trait StoreObserver {
    fn store_changed(&mut self, store: &RouteStore);
}

/// Projection behind the host UI's route selector and point list.
#[derive(Debug, Default, Clone)]
pub struct RouteListView {
    listing: RouteListing,
}

impl RouteListView {
    pub fn new(store: &RouteStore) -> Self {
        Self {
            listing: render(store),
        }
    }

    pub fn listing(&self) -> &RouteListing {
        &self.listing
    }
}

impl StoreObserver for RouteListView {
    fn store_changed(&mut self, store: &RouteStore) {
        self.listing = render(store);
    }
}

pub fn render(store: &RouteStore) -> RouteListing {
    let active = store.active_route_id();
    let routes = store
        .routes()
        .map(|route| RouteSummary {
            id: route.id,
            color: route.color.clone(),
            point_count: route.points.len(),
            active: route.id == active,
        })
        .collect();
    let rows = store.active_route().points.iter().map(format_row).collect();

    RouteListing {
        active_route_id: active,
        routes,
        rows,
    }
}

fn format_row(point: &Point) -> String {
    format!(
        "{:.6}, {:.6} [ID:{}]",
        point.lat, point.lng, point.marker_id
    )
}
