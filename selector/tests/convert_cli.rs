use std::process::Command;

use selector::codec::{RouteDocument, parse_document};

const LEGACY: &str = "global_route:\n  - lat: 45.93\n    lon: 4.57\n  - lat: 45.94\n    lng: 4.58\n  - lat: 45.95\n";

#[test]
fn converts_legacy_file_to_canonical_schema() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("legacy.yaml");
    let output = dir.path().join("routes.yaml");
    std::fs::write(&input, LEGACY).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_convert_routes"))
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let text = std::fs::read_to_string(&output).unwrap();
    let document: RouteDocument = serde_yaml::from_str(&text).unwrap();
    assert_eq!(document.routes.len(), 1);
    assert_eq!(document.routes[0].points.len(), 2);
    assert_eq!(document.routes[0].points[1].lon, 4.58);

    let reparsed = parse_document(&text).unwrap();
    assert_eq!(reparsed.records[0].points, document.routes[0].points);
}

#[test]
fn rejects_unrecognized_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("other.yaml");
    std::fs::write(&input, "foo: []\n").unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_convert_routes"))
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(dir.path().join("out.yaml"))
        .status()
        .unwrap();
    assert!(!status.success());
    assert!(!dir.path().join("out.yaml").exists());
}
