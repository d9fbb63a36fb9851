use booknet::config::{ConfigError, ConfigLoader};
use booknet::controller::FirstPageBehavior;
use std::{
    env, fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

const KEYS: &[&str] = &[
    "BOOKNET_PROFILE",
    "BOOKNET_API_BASE_URL",
    "BOOKNET_LOG_LEVEL",
    "BOOKNET_LOG_FORMAT",
    "BOOKNET_REQUEST_TIMEOUT_MS",
    "BOOKNET_MY_BOOKS_PAGE_SIZE",
    "BOOKNET_BORROWED_PAGE_SIZE",
    "BOOKNET_FIRST_PAGE_REFETCH",
    "BOOKNET_TOKEN",
    "BOOKNET_TOKEN_FILE",
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
    for key in KEYS {
        unsafe {
            env::remove_var(key);
        }
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    fs::write(path, contents).unwrap();
}

fn empty_loader() -> (TempDir, ConfigLoader) {
    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    (temp_dir, loader)
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();

    let (_dir, loader) = empty_loader();
    let cfg = loader.load().expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_base_url, "http://localhost:8088/api/v1");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.log_format, "pretty");
    assert_eq!(cfg.request_timeout_ms, 10_000);
    assert_eq!(cfg.my_books_page_size().get(), 4);
    assert_eq!(cfg.borrowed_page_size().get(), 5);
    assert_eq!(cfg.first_page_behavior(), FirstPageBehavior::Refetch);
    assert!(cfg.token.is_none());
    assert!(cfg.token_file.is_none());
    cfg.base_url().expect("default base url parses");
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "BOOKNET_MY_BOOKS_PAGE_SIZE=6\n");
    write_env_file(
        &temp_dir,
        ".env.local",
        "BOOKNET_PROFILE=test\nBOOKNET_MY_BOOKS_PAGE_SIZE=7\nBOOKNET_LOG_LEVEL=debug\n",
    );
    write_env_file(&temp_dir, ".env.test", "BOOKNET_MY_BOOKS_PAGE_SIZE=8\n");
    write_env_file(
        &temp_dir,
        ".env.test.local",
        "BOOKNET_MY_BOOKS_PAGE_SIZE=9\nUNRELATED_KEY=ignored\n",
    );

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("layered config loads");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.my_books_page_size().get(), 9);
    assert_eq!(cfg.log_level, "debug");
}

#[test]
fn process_env_overrides_files() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "BOOKNET_API_BASE_URL=http://files.example.com/api/v1\nBOOKNET_BORROWED_PAGE_SIZE=3\n",
    );
    unsafe {
        env::set_var("BOOKNET_API_BASE_URL", "https://books.example.com/api/v1");
        env::set_var("BOOKNET_FIRST_PAGE_REFETCH", "false");
        env::set_var("BOOKNET_TOKEN", "  jwt-value  ");
    }

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads");

    assert_eq!(cfg.api_base_url, "https://books.example.com/api/v1");
    assert_eq!(cfg.borrowed_page_size().get(), 3);
    assert_eq!(cfg.first_page_behavior(), FirstPageBehavior::CursorOnly);
    assert_eq!(cfg.token.as_deref(), Some("jwt-value"));

    let redacted = cfg.redacted_json().unwrap();
    assert!(!redacted.contains("jwt-value"));
    assert!(redacted.contains("[REDACTED]"));
    clear_env();
}

#[test]
fn rejects_zero_page_size() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("BOOKNET_BORROWED_PAGE_SIZE", "0");
    }
    let (_dir, loader) = empty_loader();
    let err = loader.load().expect_err("zero page size rejected");
    assert!(matches!(
        err,
        ConfigError::InvalidPageSize {
            field: "BORROWED_PAGE_SIZE",
            value: 0
        }
    ));
    clear_env();
}

#[test]
fn rejects_unparsable_numbers() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("BOOKNET_REQUEST_TIMEOUT_MS", "soon");
    }
    let (_dir, loader) = empty_loader();
    let err = loader.load().expect_err("non-numeric timeout rejected");
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            key: "REQUEST_TIMEOUT_MS",
            ..
        }
    ));
    clear_env();
}

#[test]
fn rejects_invalid_base_url_and_log_format() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("BOOKNET_API_BASE_URL", "not a url");
    }
    let (_dir, loader) = empty_loader();
    assert!(matches!(
        loader.load(),
        Err(ConfigError::InvalidBaseUrl { .. })
    ));

    clear_env();
    unsafe {
        env::set_var("BOOKNET_LOG_FORMAT", "xml");
    }
    assert!(matches!(
        loader.load(),
        Err(ConfigError::InvalidLogFormat { .. })
    ));
    clear_env();
}

#[test]
fn token_file_path_is_read_from_env() {
    let _guard = env_guard();
    clear_env();

    let (dir, loader) = empty_loader();
    let token_path = dir.path().join("token");
    unsafe {
        env::set_var("BOOKNET_TOKEN_FILE", &token_path);
    }
    let cfg = loader.load().expect("config loads");
    assert_eq!(cfg.token_file.as_deref(), Some(token_path.as_path()));
    clear_env();
}
