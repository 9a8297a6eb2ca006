use biblioteca::infrastructure::config::Config;
use serial_test::serial;
use std::path::PathBuf;

const VARS: &[&str] = &[
    "PORT",
    "DATABASE_URL",
    "CATALOG_PATH",
    "CATALOG_URL",
    "STRIP_ACCENTS",
    "ADMIN_USERNAME",
    "SESSION_MINUTES",
    "CORS_ALLOWED_ORIGINS",
    "SEED_DEMO",
];

fn clear_env() {
    for var in VARS {
        // Tests touching the environment are serialized
        unsafe { std::env::remove_var(var) };
    }
}

#[test]
#[serial]
fn test_defaults() {
    clear_env();
    let config = Config::from_env();

    assert_eq!(config.port, 8000);
    assert_eq!(config.catalog_path, PathBuf::from("catalogo.csv"));
    assert!(config.catalog_url.is_none());
    assert!(config.strip_accents);
    assert_eq!(config.admin_username, "admin");
    assert_eq!(config.session_minutes, 30);
    assert!(config.cors_allowed_origins.is_empty());
    assert!(!config.seed_demo);
}

#[test]
#[serial]
fn test_overrides() {
    clear_env();
    unsafe {
        std::env::set_var("PORT", "9100");
        std::env::set_var("STRIP_ACCENTS", "false");
        std::env::set_var("SESSION_MINUTES", "5");
        std::env::set_var("CATALOG_URL", "https://example.org/livros.csv");
        std::env::set_var(
            "CORS_ALLOWED_ORIGINS",
            "http://localhost:3000, https://biblioteca.example.org,",
        );
    }

    let config = Config::from_env();
    clear_env();

    assert_eq!(config.port, 9100);
    assert!(!config.strip_accents);
    assert_eq!(config.session_minutes, 5);
    assert_eq!(
        config.catalog_url.as_deref(),
        Some("https://example.org/livros.csv")
    );
    assert_eq!(
        config.cors_allowed_origins,
        vec![
            "http://localhost:3000".to_string(),
            "https://biblioteca.example.org".to_string()
        ]
    );
}

#[test]
#[serial]
fn test_invalid_numbers_fall_back() {
    clear_env();
    unsafe {
        std::env::set_var("PORT", "eighty");
        std::env::set_var("SESSION_MINUTES", "0");
    }

    let config = Config::from_env();
    clear_env();

    assert_eq!(config.port, 8000);
    assert_eq!(config.session_minutes, 30);
}
