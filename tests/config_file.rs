use std::fs::File;
use std::io::Write;
use tempfile::tempdir;

use liked_playlist_sync::config::Config;

#[test]
fn config_from_path_parses_toml() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("cfg.toml");
    let mut f = File::create(&cfg_path).unwrap();
    let toml = r#"
client_id = "cid"
client_secret = "secret"
refresh_token = "rt"
playlist_id = " 37i9dQZF1DXcBWIGoYBM5M "
likes_count = 75
http_timeout_ms = 5000
log_dir = "/tmp/liked-sync"
"#;
    f.write_all(toml.as_bytes()).unwrap();
    let cfg = Config::from_path(&cfg_path).expect("parse config");
    assert_eq!(cfg.playlist_id(), Some("37i9dQZF1DXcBWIGoYBM5M"));
    assert_eq!(cfg.likes_count.as_deref(), Some("75"));
    assert_eq!(cfg.http_timeout_ms, 5000);
    assert_eq!(cfg.api_base, "https://api.spotify.com/v1");
    assert!(cfg.missing_required().is_empty());
    assert!(cfg.validate().is_ok());
}

#[test]
fn config_from_path_rejects_bad_types() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("cfg.toml");
    std::fs::write(&cfg_path, "http_timeout_ms = \"fast\"\n").unwrap();
    assert!(Config::from_path(&cfg_path).is_err());
}
