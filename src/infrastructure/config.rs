use std::env;
use std::path::PathBuf;

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no" | "off"))
        .unwrap_or(default)
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Local catalog file; also where admin uploads are written
    pub catalog_path: PathBuf,
    /// When set, the catalog is read from this URL instead (read-only)
    pub catalog_url: Option<String>,
    /// Accent stripping for code normalization; one setting for the whole process
    pub strip_accents: bool,
    pub admin_username: String,
    pub admin_password_hash: Option<String>,
    pub admin_password: Option<String>,
    pub session_minutes: i64,
    pub jwt_secret: Option<String>,
    pub cors_allowed_origins: Vec<String>,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://biblioteca.db?mode=rwc".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            catalog_path: env::var("CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("catalogo.csv")),
            catalog_url: env::var("CATALOG_URL").ok().filter(|u| !u.trim().is_empty()),
            strip_accents: env_flag("STRIP_ACCENTS", true),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password_hash: env::var("ADMIN_PASSWORD_HASH").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            session_minutes: env::var("SESSION_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .filter(|m: &i64| *m > 0)
                .unwrap_or(30),
            jwt_secret: env::var("JWT_SECRET").ok().or_else(|| {
                if cfg!(debug_assertions) {
                    Some("secret".to_string())
                } else {
                    None
                }
            }),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(Vec::new),
            seed_demo: env::var("SEED_DEMO").is_ok(),
        }
    }
}
