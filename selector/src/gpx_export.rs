use geo_types::Point as GeoPoint;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};
use shared::{Point, Route};

use crate::error::CodecError;

/// One GPX track per route, one segment per track, points in path order.
pub fn encode_routes_as_gpx<'a>(
    routes: impl IntoIterator<Item = &'a Route>,
) -> Result<String, CodecError> {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some("map_point_selector".into()),
        ..Default::default()
    };
    gpx.tracks.extend(routes.into_iter().map(to_track));

    let mut buffer = Vec::new();
    gpx::write(&gpx, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn to_track(route: &Route) -> Track {
    let mut track = Track {
        name: Some(format!("route {}", route.id)),
        description: Some(route.color.clone()),
        ..Default::default()
    };
    let mut segment = TrackSegment::new();
    segment.points.extend(route.points.iter().map(to_waypoint));
    track.segments.push(segment);
    track
}

fn to_waypoint(point: &Point) -> Waypoint {
    Waypoint::new(GeoPoint::new(point.lng, point.lat))
}
