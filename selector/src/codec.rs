// Module codec - YAML route documents
// Writes the canonical multi-route schema; reads it and the legacy
// single-route `global_route` schema.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use shared::{Coordinate, Route, RouteId};

use crate::error::CodecError;
use crate::store::RouteStore;

/// Canonical on-disk document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDocument {
    pub routes: Vec<RouteEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub id: RouteId,
    pub color: String,
    pub points: Vec<Coordinate>,
}

/// One route read from a document. File ids are never kept; the store
/// allocates a fresh one on import.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRecord {
    pub color: Option<String>,
    pub points: Vec<Coordinate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    pub records: Vec<RouteRecord>,
    /// Points dropped for lacking a usable `lat` or `lon`/`lng`.
    pub skipped_points: usize,
    /// Entries under `routes` that were not mappings.
    pub skipped_records: usize,
}

pub fn document_from_routes<'a>(routes: impl IntoIterator<Item = &'a Route>) -> RouteDocument {
    RouteDocument {
        routes: routes
            .into_iter()
            .map(|route| RouteEntry {
                id: route.id,
                color: route.color.clone(),
                points: route.points.iter().map(|p| p.coordinate()).collect(),
            })
            .collect(),
    }
}

pub fn to_document(store: &RouteStore) -> RouteDocument {
    document_from_routes(store.routes())
}

pub fn render_document(document: &RouteDocument) -> Result<String, CodecError> {
    serde_yaml::to_string(document).map_err(CodecError::Serialize)
}

pub fn export_document(store: &RouteStore) -> Result<String, CodecError> {
    render_document(&to_document(store))
}

/// Parse either schema. Nothing is imported here, so a failure leaves any
/// store untouched.
///
/// # Errors
/// [`CodecError::Parse`] on malformed YAML, [`CodecError::UnrecognizedDocument`]
/// when the top level is not a `routes` or `global_route` list.
pub fn parse_document(text: &str) -> Result<ParsedDocument, CodecError> {
    let value: Value = serde_yaml::from_str(text)?;
    let routes = value.get("routes");
    let legacy = value.get("global_route");
    if routes.is_none() && legacy.is_none() {
        return Err(CodecError::UnrecognizedDocument);
    }

    let mut parsed = ParsedDocument::default();

    if let Some(routes) = routes {
        let Value::Sequence(entries) = routes else {
            return Err(CodecError::UnrecognizedDocument);
        };
        for entry in entries {
            if !entry.is_mapping() {
                parsed.skipped_records += 1;
                continue;
            }
            let color = entry.get("color").and_then(color_token);
            let points = match entry.get("points").or_else(|| entry.get("global_route")) {
                Some(list) => read_points(list, &mut parsed.skipped_points),
                None => Vec::new(),
            };
            parsed.records.push(RouteRecord { color, points });
        }
    }

    if let Some(legacy) = legacy {
        if !legacy.is_sequence() {
            return Err(CodecError::UnrecognizedDocument);
        }
        // Color comes from the palette once the store allocates the id.
        let points = read_points(legacy, &mut parsed.skipped_points);
        parsed.records.push(RouteRecord {
            color: None,
            points,
        });
    }

    if parsed.skipped_points > 0 || parsed.skipped_records > 0 {
        tracing::warn!(
            "skipped {} point(s) and {} route record(s) without usable data",
            parsed.skipped_points,
            parsed.skipped_records
        );
    }

    Ok(parsed)
}

fn read_points(list: &Value, skipped: &mut usize) -> Vec<Coordinate> {
    let Value::Sequence(items) = list else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let coord = point_coordinate(item);
            if coord.is_none() {
                *skipped += 1;
            }
            coord
        })
        .collect()
}

/// Scalar colors are kept as written; anything else falls back to the palette.
fn color_token(value: &Value) -> Option<String> {
    match value {
        Value::String(color) => Some(color.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null => None,
        other => {
            tracing::warn!("ignoring non-scalar route color {other:?}");
            None
        }
    }
}

fn point_coordinate(item: &Value) -> Option<Coordinate> {
    let lat = item.get("lat").and_then(Value::as_f64)?;
    let lon = item
        .get("lon")
        .and_then(Value::as_f64)
        .or_else(|| item.get("lng").and_then(Value::as_f64))?;
    (lat.is_finite() && lon.is_finite()).then_some(Coordinate { lat, lon })
}

/// Import every record through [`RouteStore::import_route`].
pub fn apply_document(store: &mut RouteStore, parsed: &ParsedDocument) -> Vec<RouteId> {
    parsed
        .records
        .iter()
        .map(|record| store.import_route(record.color.as_deref(), &record.points))
        .collect()
}

pub fn import_document(store: &mut RouteStore, text: &str) -> Result<Vec<RouteId>, CodecError> {
    let parsed = parse_document(text)?;
    Ok(apply_document(store, &parsed))
}

pub fn read_document_file(path: &Path) -> Result<ParsedDocument, CodecError> {
    let text = fs::read_to_string(path)?;
    parse_document(&text)
}

pub fn write_document_file(store: &RouteStore, path: &Path) -> Result<(), CodecError> {
    let yaml = export_document(store)?;
    fs::write(path, yaml)?;
    tracing::info!("saved {} route(s) to {}", store.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::palette_color;

    #[test]
    fn exports_canonical_schema() {
        let mut store = RouteStore::new();
        store.add_point(0, 45.5, 4.25);
        let yaml = export_document(&store).unwrap();
        assert!(yaml.contains("routes:"));
        assert!(yaml.contains("lon: 4.25"));
        assert!(!yaml.contains("lng"));

        let doc: RouteDocument = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(doc, to_document(&store));
    }

    #[test]
    fn legacy_document_promotes_single_route() {
        let mut store = RouteStore::new();
        let text = "global_route:\n  - lat: 1.0\n    lon: 2.0\n  - lat: 3.0\n    lng: 4.0\n";
        let ids = import_document(&mut store, text).unwrap();
        assert_eq!(ids, vec![1]);

        let route = store.route(1).unwrap();
        assert_eq!(route.color, palette_color(1));
        let points: Vec<_> = route
            .points
            .iter()
            .map(|p| (p.marker_id, p.lat, p.lng))
            .collect();
        assert_eq!(points, vec![(0, 1.0, 2.0), (1, 3.0, 4.0)]);
    }

    #[test]
    fn record_ids_are_reallocated() {
        let mut store = RouteStore::new();
        store.create_route(None);
        store.create_route(None);
        assert_eq!(store.next_route_id(), 3);

        let text = r#"{routes: [{id: 99, color: "blue", points: [{lat: 5.0, lon: 6.0}]}]}"#;
        let ids = import_document(&mut store, text).unwrap();
        assert_eq!(ids, vec![3]);
        assert_eq!(store.next_route_id(), 4);
        assert!(store.route(99).is_none());
        assert_eq!(store.route(3).unwrap().color, "blue");
    }

    #[test]
    fn unknown_top_level_is_rejected() {
        let mut store = RouteStore::new();
        let before = store.clone();
        let err = import_document(&mut store, r#"{"foo": []}"#).unwrap_err();
        assert!(matches!(err, CodecError::UnrecognizedDocument));
        assert!(err.is_parse_failure());
        assert_eq!(store, before);
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let err = parse_document("routes: [unterminated").unwrap_err();
        assert!(matches!(err, CodecError::Parse(_)));
    }

    #[test]
    fn points_without_coordinates_are_skipped() {
        let text = r#"
routes:
  - color: green
    global_route:
      - lat: 1.0
        lon: 1.5
      - lat: 2.0
      - lon: 3.0
      - lat: 4.0
        lng: 4.5
  - 7
"#;
        let parsed = parse_document(text).unwrap();
        assert_eq!(parsed.skipped_points, 2);
        assert_eq!(parsed.skipped_records, 1);
        assert_eq!(
            parsed.records,
            vec![RouteRecord {
                color: Some("green".into()),
                points: vec![
                    Coordinate { lat: 1.0, lon: 1.5 },
                    Coordinate { lat: 4.0, lon: 4.5 }
                ],
            }]
        );
    }

    #[test]
    fn lon_takes_precedence_over_lng() {
        let parsed = parse_document("global_route:\n  - {lat: 1, lon: 2, lng: 9}\n").unwrap();
        assert_eq!(parsed.records[0].points, vec![Coordinate { lat: 1.0, lon: 2.0 }]);
    }

    #[test]
    fn points_take_precedence_over_nested_global_route() {
        let text = r#"
routes:
  - color: navy
    points:
      - {lat: 1.0, lon: 2.0}
    global_route:
      - {lat: 7.0, lon: 8.0}
      - {lat: 9.0, lon: 10.0}
"#;
        let mut store = RouteStore::new();
        let ids = import_document(&mut store, text).unwrap();
        assert_eq!(ids, vec![1]);
        let points = &store.route(1).unwrap().points;
        assert_eq!(points.len(), 1);
        assert_eq!((points[0].lat, points[0].lng), (1.0, 2.0));
    }

    #[test]
    fn scalar_colors_are_kept_verbatim() {
        let text = "routes:\n  - {color: 123, points: []}\n  - {color: [1, 2], points: []}\n";
        let parsed = parse_document(text).unwrap();
        assert_eq!(parsed.records[0].color.as_deref(), Some("123"));
        assert_eq!(parsed.records[1].color, None);
    }

    #[test]
    fn integer_coordinates_are_accepted() {
        let parsed = parse_document("global_route:\n  - {lat: 45, lon: 5}\n").unwrap();
        assert_eq!(parsed.records[0].points, vec![Coordinate { lat: 45.0, lon: 5.0 }]);
    }

    #[test]
    fn both_schemas_in_one_document_are_imported() {
        let mut store = RouteStore::new();
        let text = "routes:\n  - color: red\n    points: []\nglobal_route:\n  - {lat: 1, lon: 2}\n";
        let ids = import_document(&mut store, text).unwrap();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.route(2).unwrap().points.len(), 1);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("route.yaml");

        let mut store = RouteStore::new();
        store.add_point(0, 1.0, 2.0);
        write_document_file(&store, &path).unwrap();

        let parsed = read_document_file(&path).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].points, vec![Coordinate { lat: 1.0, lon: 2.0 }]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn route_shape() -> impl Strategy<Value = (Option<String>, Vec<(f64, f64)>)> {
            (
                prop::option::of(
                    prop::sample::select(vec!["teal", "navy", "#ff8800", "light blue"])
                        .prop_map(str::to_string),
                ),
                prop::collection::vec((-90.0..=90.0, -180.0..=180.0), 0..8),
            )
        }

        proptest! {
            #[test]
            fn prop_export_import_round_trip(shapes in prop::collection::vec(route_shape(), 0..5)) {
                let mut source = RouteStore::new();
                for (color, points) in &shapes {
                    let id = source.create_route(color.as_deref());
                    for (lat, lng) in points {
                        source.add_point(id, *lat, *lng);
                    }
                }

                let yaml = export_document(&source).unwrap();
                let mut target = RouteStore::new();
                target.create_route(None);
                let ids = import_document(&mut target, &yaml).unwrap();

                prop_assert_eq!(ids.len(), source.len());
                for (original, id) in source.routes().zip(&ids) {
                    let imported = target.route(*id).unwrap();
                    prop_assert_eq!(&imported.color, &original.color);
                    prop_assert_eq!(&imported.points, &original.points);
                }
            }
        }
    }
}
