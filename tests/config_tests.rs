use std::path::PathBuf;
use std::time::Duration;

use presentation_surface::Error;
use presentation_surface::config::{Configuration, DEFAULT_CONTROL_SOCKET_PATH};
use presentation_surface::surface::background::BackgroundSpec;
use presentation_surface::surface::geometry::Size;

#[test]
fn empty_config_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(
        cfg.control_socket_path,
        PathBuf::from(DEFAULT_CONTROL_SOCKET_PATH)
    );
    assert!(!cfg.surface.stage_view);
    assert_eq!(cfg.surface.initial_size, Size::new(1920.0, 1080.0));
    assert_eq!(cfg.background, BackgroundSpec::Colour { rgb: [0, 0, 0] });
    assert_eq!(cfg.notices.cycle, Duration::from_secs(10));
}

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
control-socket-path: /tmp/stage.sock
surface:
  stage-view: true
  show-border: false
  initial-size:
    width: 1280
    height: 720
  placeholder-colour: [0, 0, 0]
background:
  kind: video
  path: /media/loop.mp4
notices:
  cycle: 4s
  default-times: 2
  band-fraction: 0.2
ui:
  tick-interval: 100ms
  reply-timeout: 1s
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert!(cfg.surface.stage_view);
    assert!(!cfg.surface.show_border);
    assert_eq!(cfg.surface.initial_size, Size::new(1280.0, 720.0));
    assert_eq!(
        cfg.background,
        BackgroundSpec::Video {
            path: PathBuf::from("/media/loop.mp4")
        }
    );
    assert_eq!(cfg.notices.cycle, Duration::from_secs(4));
    assert_eq!(cfg.notices.default_times, 2);
    assert_eq!(cfg.ui.tick_interval, Duration::from_millis(100));

    let options = cfg.canvas_options();
    assert!(options.stage_view);
    assert!(!options.show_border);
}

#[test]
fn unknown_fields_are_rejected() {
    let yaml = r#"
surface:
  fullscreen: true
"#;
    assert!(serde_yaml::from_str::<Configuration>(yaml).is_err());
}

#[test]
fn unknown_background_kind_is_rejected() {
    let yaml = r#"
background:
  kind: slideshow
  path: /media/deck.pptx
"#;
    assert!(serde_yaml::from_str::<Configuration>(yaml).is_err());
}

#[test]
fn validation_rejects_bad_values() {
    let cases = [
        "control-socket-path: \"\"\n",
        "notices:\n  band-fraction: 0.0\n",
        "notices:\n  band-fraction: 1.5\n",
        "notices:\n  default-times: 0\n",
        "notices:\n  cycle: 0s\n",
        "ui:\n  tick-interval: 0s\n",
        "surface:\n  initial-size:\n    width: -5\n    height: 10\n",
    ];
    for yaml in cases {
        let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.validated().is_err(), "expected rejection for {yaml:?}");
    }
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("surface.yaml");
    std::fs::write(&path, "background:\n  kind: colour\n  rgb: [5, 6, 7]\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.background, BackgroundSpec::Colour { rgb: [5, 6, 7] });
    assert!(Configuration::from_yaml_file(dir.path().join("missing.yaml")).is_err());
}

#[test]
fn yaml_errors_are_config_errors() {
    assert!(matches!(
        Configuration::from_yaml_str("surface: [unclosed"),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        Configuration::from_yaml_str("surface:\n  fullscreen: true\n"),
        Err(Error::Config(_))
    ));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "notices:\n  cycle: soon\n").unwrap();
    let err = Configuration::from_yaml_file(&path).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Config(_))));
}
