use std::{env, fs};

use intranet_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("intranet.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081
seed_demo_data = true

[logging]
level = "debug"

[cache.user]
ttl_secs = 60

[cache.filter_list]
ttl_secs = 120
max_entries = 50

[cache.cleanup]
initial_delay_secs = 5
interval_secs = 30
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses; unset policy fields keep their defaults
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 8081);
    assert!(cfg.server.seed_demo_data);
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.cache.user.ttl_secs, 60);
    assert_eq!(cfg.cache.user.max_entries, 200);
    assert_eq!(cfg.cache.filter_list.max_entries, 50);
    assert_eq!(cfg.cache.user_language.ttl_secs, 600);
    assert_eq!(cfg.cache.cleanup.interval_secs, 30);

    // 2) Env override should win over file
    unsafe {
        env::set_var("INTRANET__CACHE__USER__TTL_SECS", "5");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.cache.user.ttl_secs, 5);
    assert_eq!(cfg_env.cache.user.max_entries, 200);
    unsafe {
        env::remove_var("INTRANET__CACHE__USER__TTL_SECS");
    }

    // 3) Invalid values are rejected
    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "[cache.branch]\nttl_secs = 0\n").expect("write bad toml");
    let err = load_config(bad.to_str()).expect_err("zero ttl must be rejected");
    assert!(err.contains("cache.branch.ttl_secs"), "unexpected error: {err}");

    let bad_level = dir.path().join("bad_level.toml");
    fs::write(&bad_level, "[logging]\nlevel = \"loud\"\n").expect("write bad toml");
    assert!(load_config(bad_level.to_str()).is_err());
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("absent.toml");

    let cfg = load_config(path.to_str()).expect("defaults are valid");
    assert_eq!(cfg.server.port, 8080);
    assert!(!cfg.server.seed_demo_data);
    assert_eq!(cfg.cache.cleanup.initial_delay_secs, 60);
    assert_eq!(cfg.cache.cleanup.interval_secs, 300);
}
