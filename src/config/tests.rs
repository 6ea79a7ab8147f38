use super::load_config;
use super::settings::Settings;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.http.port, 3000);
    assert_eq!(settings.http.static_dir, "front-init");
    assert_eq!(settings.relay.port, 5000);
    assert_eq!(settings.relay.buffer_size, 1024);
    assert_eq!(settings.relay.backlog, 1);
    assert!(settings.relay.read_timeout_ms.is_none());
    assert_eq!(settings.datastore.uri, "mongodb://mongodb:27017");
    assert_eq!(settings.datastore.database, "msg_db");
    assert_eq!(settings.datastore.collection, "messages");
    assert_eq!(settings.datastore.max_attempts, 10);
    assert_eq!(settings.datastore.retry_interval_ms, 1000);
}

#[test]
fn test_addresses() {
    let settings = Settings::default();
    assert_eq!(settings.http.bind_addr(), "0.0.0.0:3000");
    assert_eq!(settings.relay.bind_addr(), "0.0.0.0:5000");
    assert_eq!(settings.relay.forward_addr(), "127.0.0.1:5000");
}

#[test]
#[serial]
fn load_config_without_sources_uses_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let missing = tmp.path().join("absent");

    let cfg = load_config(missing.to_str()).expect("load_config failed");
    assert_eq!(cfg.relay.port, 5000);
    assert_eq!(cfg.datastore.collection, "messages");
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");

    fs::create_dir_all("config").expect("create config dir");
    let toml = r#"
        [http]
        port = 8081
        static_dir = "public"

        [relay]
        port = 5050
        read_timeout_ms = 2500

        [datastore]
        uri = "sled://./data"
        max_attempts = 3
    "#;
    fs::write("config/default.toml", toml).expect("write config file");

    let cfg = load_config(None);

    // restore cwd before asserting so a failure does not leak the tempdir cwd
    env::set_current_dir(orig).expect("restore cwd");

    let cfg = cfg.expect("load_config failed");
    assert_eq!(cfg.http.port, 8081);
    assert_eq!(cfg.http.static_dir, "public");
    assert_eq!(cfg.http.host, "0.0.0.0");
    assert_eq!(cfg.relay.port, 5050);
    assert_eq!(cfg.relay.read_timeout_ms, Some(2500));
    assert_eq!(cfg.relay.buffer_size, 1024);
    assert_eq!(cfg.datastore.uri, "sled://./data");
    assert_eq!(cfg.datastore.max_attempts, 3);
    assert_eq!(cfg.datastore.database, "msg_db");
}

#[test]
#[serial]
fn load_config_from_env_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let missing = tmp.path().join("absent");

    temp_env::with_vars(
        [
            ("FORMRELAY_RELAY__PORT", Some("6000")),
            ("FORMRELAY_DATASTORE__URI", Some("mongodb://localhost:27017")),
            ("FORMRELAY_LOG__LEVEL", Some("debug")),
        ],
        || {
            let cfg = load_config(missing.to_str()).expect("load_config failed");
            assert_eq!(cfg.relay.port, 6000);
            assert_eq!(cfg.relay.forward_addr(), "127.0.0.1:6000");
            assert_eq!(cfg.datastore.uri, "mongodb://localhost:27017");
            assert_eq!(cfg.log.level, "debug");
            assert_eq!(cfg.http.port, 3000);
        },
    );
}
