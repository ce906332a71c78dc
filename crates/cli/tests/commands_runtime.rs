use std::env;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use storefront_cli::commands::{config, migrate, seed};
use storefront_core::config::LoadOptions;
use tempfile::TempDir;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("STOREFRONT_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run(&defaults());
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["message"], "applied pending migrations");
    });
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("STOREFRONT_DATABASE_URL", "postgres://localhost/storefront")], || {
        let result = migrate::run(&defaults());
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn migrate_returns_connectivity_failure_for_unreachable_database() {
    with_env(
        &[
            ("STOREFRONT_DATABASE_URL", "sqlite:///storefront-missing-dir/nested/catalog.db"),
            ("STOREFRONT_DATABASE_TIMEOUT_SECS", "1"),
        ],
        || {
            let result = migrate::run(&defaults());
            assert_eq!(result.exit_code, 4, "expected db connectivity failure code");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["error_class"], "db_connectivity");
        },
    );
}

#[test]
fn seed_returns_catalog_summary() {
    with_env(&[("STOREFRONT_DATABASE_URL", "sqlite::memory:")], || {
        let result = seed::run(&defaults());
        assert_eq!(result.exit_code, 0, "expected deterministic seed success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["message"], "catalog seed loaded: 17 products, 79 orders");
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    with_env(&[("STOREFRONT_DATABASE_URL", "sqlite::memory:")], || {
        let first = seed::run(&defaults());
        let second = seed::run(&defaults());

        assert_eq!(first.exit_code, 0);
        assert_eq!(second.exit_code, 0);
        assert_eq!(
            parse_payload(&first.output)["message"],
            parse_payload(&second.output)["message"]
        );
    });
}

#[test]
fn config_reports_env_and_default_sources() {
    with_env(
        &[("STOREFRONT_DATABASE_URL", "sqlite::memory:"), ("STOREFRONT_LOG_LEVEL", "debug")],
        || {
            let result = config::run(&defaults());
            assert_eq!(result.exit_code, 0);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "config");
            let message = payload["message"].as_str().unwrap_or_default();
            assert!(message.contains(
                "- database.url = sqlite::memory: (source: env (STOREFRONT_DATABASE_URL))"
            ));
            assert!(
                message.contains("- logging.level = debug (source: env (STOREFRONT_LOG_LEVEL))")
            );
            assert!(message.contains("- server.port = 3000 (source: default)"));
        },
    );
}

#[test]
fn config_returns_failure_for_malformed_numeric_env() {
    with_env(&[("STOREFRONT_SERVER_PORT", "not-a-port")], || {
        let result = config::run(&defaults());
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn explicit_settings_file_is_loaded_and_attributed() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("storefront.toml");
    std::fs::write(&path, "[database]\nurl = \"sqlite::memory:\"\n\n[server]\nport = 8088\n")
        .expect("write settings");
    let options = LoadOptions { config_path: Some(path.clone()) };

    with_env(&[], || {
        let migrated = migrate::run(&options);
        assert_eq!(migrated.exit_code, 0, "migrate should use the file's in-memory url");

        let result = config::run(&options);
        let payload = parse_payload(&result.output);
        let message = payload["message"].as_str().unwrap_or_default();
        let expected = format!("- server.port = 8088 (source: file ({}))", path.display());
        assert!(message.contains(&expected), "{message}");
        assert!(message.contains("- server.bind_address = 127.0.0.1 (source: default)"));
    });
}

#[test]
fn missing_explicit_settings_file_is_a_config_failure() {
    let options = LoadOptions { config_path: Some("/storefront-missing/settings.toml".into()) };

    with_env(&[("STOREFRONT_DATABASE_URL", "sqlite::memory:")], || {
        for result in [migrate::run(&options), seed::run(&options), config::run(&options)] {
            assert_eq!(result.exit_code, 2);
            assert_eq!(parse_payload(&result.output)["error_class"], "config_validation");
        }
    });
}

fn defaults() -> LoadOptions {
    LoadOptions::default()
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "STOREFRONT_DATABASE_URL",
        "STOREFRONT_DATABASE_MAX_CONNECTIONS",
        "STOREFRONT_DATABASE_TIMEOUT_SECS",
        "STOREFRONT_SERVER_BIND_ADDRESS",
        "STOREFRONT_SERVER_PORT",
        "STOREFRONT_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "STOREFRONT_LOGGING_LEVEL",
        "STOREFRONT_LOGGING_FORMAT",
        "STOREFRONT_LOG_LEVEL",
        "STOREFRONT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
