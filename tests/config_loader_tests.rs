use std::{
    env, fs,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;
use voice_admin::config::{ConfigError, ConfigLoader};

const VARS: &[&str] = &[
    "VOICE_ADMIN_PROFILE",
    "VOICE_ADMIN_API_BIND_ADDR",
    "VOICE_ADMIN_LOG_LEVEL",
    "VOICE_ADMIN_LOG_FORMAT",
    "VOICE_ADMIN_DATABASE_URL",
    "VOICE_ADMIN_OPERATOR_TOKEN",
    "VOICE_ADMIN_OPERATOR_TOKENS",
    "VOICE_ADMIN_ADMIN_TOKENS",
    "VOICE_ADMIN_AUDIT_CROSS_TENANT",
    "VOICE_ADMIN_DEFAULT_PAGE_SIZE",
];

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    fs::write(dir.path().join(name), contents).unwrap();
}

fn loader(dir: &TempDir) -> ConfigLoader {
    ConfigLoader::with_base_dir(dir.path().to_path_buf())
}

#[test]
fn loads_defaults_when_only_token_present() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    unsafe {
        env::set_var("VOICE_ADMIN_OPERATOR_TOKEN", "op-token");
    }

    let cfg = loader(&temp_dir).load().expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.log_format, "json");
    assert_eq!(cfg.operator_tokens, vec!["op-token".to_string()]);
    assert!(cfg.admin_tokens.is_empty());
    assert!(cfg.audit_cross_tenant);
    assert_eq!(cfg.default_page_size, 50);
    cfg.bind_addr().expect("default bind addr parses");
    clear_env();
}

#[test]
fn missing_operator_tokens_is_rejected() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    let err = loader(&temp_dir).load().unwrap_err();

    assert!(matches!(err, ConfigError::MissingOperatorTokens));
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    write_env_file(
        &temp_dir,
        ".env",
        "VOICE_ADMIN_API_BIND_ADDR=127.0.0.1:3000\nVOICE_ADMIN_OPERATOR_TOKEN=base-token\n",
    );
    write_env_file(
        &temp_dir,
        ".env.local",
        "VOICE_ADMIN_PROFILE=test\nVOICE_ADMIN_API_BIND_ADDR=127.0.0.1:4000\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test",
        "VOICE_ADMIN_API_BIND_ADDR=192.168.0.10:5000\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test.local",
        "VOICE_ADMIN_API_BIND_ADDR=10.0.0.5:6000\n",
    );

    let cfg = loader(&temp_dir).load().expect("layered config loads");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.api_bind_addr, "10.0.0.5:6000");
    assert_eq!(cfg.operator_tokens, vec!["base-token".to_string()]);
    clear_env();
}

#[test]
fn process_env_overrides_files() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    write_env_file(
        &temp_dir,
        ".env",
        "VOICE_ADMIN_OPERATOR_TOKEN=file-token\nVOICE_ADMIN_DEFAULT_PAGE_SIZE=20\n",
    );
    unsafe {
        env::set_var("VOICE_ADMIN_OPERATOR_TOKENS", "a, b ,,c");
        env::set_var("VOICE_ADMIN_DEFAULT_PAGE_SIZE", "75");
        env::set_var("VOICE_ADMIN_AUDIT_CROSS_TENANT", "false");
        env::set_var("VOICE_ADMIN_ADMIN_TOKENS", "root-token");
    }

    let cfg = loader(&temp_dir).load().expect("config loads");

    assert_eq!(cfg.operator_tokens, vec!["a", "b", "c"]);
    assert_eq!(cfg.admin_tokens, vec!["root-token"]);
    assert_eq!(cfg.default_page_size, 75);
    assert!(!cfg.audit_cross_tenant);
    clear_env();
}

#[test]
fn invalid_values_are_reported() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    unsafe {
        env::set_var("VOICE_ADMIN_OPERATOR_TOKEN", "op-token");
        env::set_var("VOICE_ADMIN_DEFAULT_PAGE_SIZE", "500");
    }
    let err = loader(&temp_dir).load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPageSize { value: 500 }));

    unsafe {
        env::remove_var("VOICE_ADMIN_DEFAULT_PAGE_SIZE");
        env::set_var("VOICE_ADMIN_API_BIND_ADDR", "not-an-address");
    }
    let err = loader(&temp_dir).load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));

    unsafe {
        env::remove_var("VOICE_ADMIN_API_BIND_ADDR");
        env::set_var("VOICE_ADMIN_LOG_FORMAT", "xml");
    }
    let err = loader(&temp_dir).load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidLogFormat { .. }));
    clear_env();
}

#[test]
fn redacted_json_hides_secrets() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    unsafe {
        env::set_var("VOICE_ADMIN_OPERATOR_TOKEN", "super-secret");
        env::set_var(
            "VOICE_ADMIN_DATABASE_URL",
            "postgresql://app:hunter2@db:5432/voice",
        );
    }
    let cfg = loader(&temp_dir).load().expect("config loads");
    let json = cfg.redacted_json().unwrap();

    assert!(!json.contains("super-secret"));
    assert!(!json.contains("hunter2"));
    assert!(json.contains("postgresql://app:[REDACTED]@db:5432/voice"));
    clear_env();
}
