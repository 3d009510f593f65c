use super::*;

#[test]
fn empty_object_yields_defaults() {
    let cfg = ServiceConfig::from_json("{}").unwrap();
    assert_eq!(cfg, ServiceConfig::default());
    assert_eq!(cfg.socket_addr().to_string(), "127.0.0.1:5000");
    assert_eq!(cfg.max_frames, 60);
    assert_eq!(cfg.bounds().unwrap(), BoxSize::new(800, 800).unwrap());
}

#[test]
fn fields_override_defaults() {
    let cfg = ServiceConfig::from_json(
        r#"{"port": 8080, "bind_address": "0.0.0.0", "box_width": 400, "threads": 2,
            "parallel_frames": false, "overlay_path": "flag.png"}"#,
    )
    .unwrap();
    assert_eq!(cfg.socket_addr().to_string(), "0.0.0.0:8080");
    assert_eq!(cfg.distort_params().unwrap().bounds.width, 400);
    assert_eq!(cfg.overlay_path.as_deref(), Some(Path::new("flag.png")));

    let opts = cfg.pipeline_opts().unwrap();
    assert!(!opts.parallel);
    assert_eq!(opts.threads(), Some(2));
}

#[test]
fn invalid_values_are_rejected() {
    for doc in [
        r#"{"max_frames": 0}"#,
        r#"{"box_height": 0}"#,
        r#"{"overlay_opacity": 1.2}"#,
        r#"{"threads": 0}"#,
        r#"{"max_body_bytes": 0}"#,
    ] {
        let err = ServiceConfig::from_json(doc).unwrap_err();
        assert!(matches!(err, MagikdError::InvalidInput(_)), "{doc}");
    }
}

#[test]
fn unknown_fields_are_serde_errors() {
    let err = ServiceConfig::from_json(r#"{"prot": 1}"#).unwrap_err();
    assert!(matches!(err, MagikdError::Serde(_)));
}

#[test]
fn from_path_reads_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("magikd.json");
    std::fs::write(&path, r#"{"port": 9000}"#).unwrap();
    assert_eq!(ServiceConfig::from_path(&path).unwrap().port, 9000);

    let missing = ServiceConfig::from_path(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(missing, MagikdError::Other(_)));
}
