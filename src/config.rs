use std::path::PathBuf;

/// Runtime configuration, read once at boot from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub port: u16,
    /// Explicit CORS allow-list. Empty means "allow any origin".
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let db_path = std::env::var("TUTIOND_DB")
            .map(PathBuf::from)
            .map_err(|_| anyhow::anyhow!("TUTIOND_DB is not set"))?;
        let jwt_secret = std::env::var("TUTIOND_JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("TUTIOND_JWT_SECRET is not set"))?;
        let port = match std::env::var("TUTIOND_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("TUTIOND_PORT is not a valid port: {raw}"))?,
            Err(_) => 5000,
        };
        let cors_origins = std::env::var("TUTIOND_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            db_path,
            jwt_secret,
            port,
            cors_origins,
        })
    }
}
