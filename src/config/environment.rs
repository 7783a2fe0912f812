use std::env;

/// Deployment environment. Only `Production` turns on the practitioner
/// link expiry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "test" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Where the pool connects: a full URL, or discrete parts that are handed
/// to the driver unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Url(String),
    Parts {
        host: String,
        port: u16,
        user: String,
        password: String,
        name: String,
    },
}

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseTarget,
    pub db_max_connections: u32,
    pub port: u16,
    pub environment: AppEnvironment,
    pub access_jwt_secret: String,
    pub refresh_jwt_secret: String,
    pub link_signing_secret: String,
    pub app_base_url: String,
    pub mail_from: String,
    pub sendgrid_api_key: Option<String>,
    pub ingest_api_url: Option<String>,
    pub ingest_api_key: Option<String>,
    pub ingest_schedule: String,
    pub guard_check_disabled: bool,
    pub require_signed_link: bool,
    /// Only set behind a proxy that overwrites `X-Forwarded-For`.
    pub trust_forwarded_for: bool,
    pub auth_rate_limit_burst: u32,
}

pub const DEFAULT_INGEST_SCHEDULE: &str = "0 59 23 * * * *";

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests never touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database = match var("DATABASE_URL") {
            Some(url) => DatabaseTarget::Url(url),
            None => DatabaseTarget::Parts {
                host: var("DB_HOST").ok_or("DATABASE_URL or DB_HOST must be set")?,
                port: parse_or(var("DB_PORT"), 3306, "DB_PORT")?,
                user: var("DB_USER").ok_or("DB_USER must be set")?,
                // Not filtered: a password may legitimately be blank.
                password: lookup("DB_PASSWORD").unwrap_or_default(),
                name: var("DB_NAME").ok_or("DB_NAME must be set")?,
            },
        };

        let db_max_connections = parse_or(var("DB_MAX_CONNECTIONS"), 5, "DB_MAX_CONNECTIONS")?;
        let port = parse_or(var("PORT"), 3000, "PORT")?;

        let environment = var("APP_ENV")
            .or_else(|| var("NODE_ENV"))
            .map(|v| AppEnvironment::parse(&v))
            .unwrap_or(AppEnvironment::Development);

        let access_jwt_secret =
            var("ACCESS_JWT_SECRET").ok_or("ACCESS_JWT_SECRET must be set")?;
        let refresh_jwt_secret =
            var("REFRESH_JWT_SECRET").ok_or("REFRESH_JWT_SECRET must be set")?;

        if access_jwt_secret == refresh_jwt_secret {
            return Err("ACCESS_JWT_SECRET and REFRESH_JWT_SECRET must differ".to_string());
        }

        let link_signing_secret = match var("LINK_SIGNING_SECRET") {
            Some(secret) => secret,
            None => {
                tracing::warn!("LINK_SIGNING_SECRET not set, signing practitioner links with the access secret");
                access_jwt_secret.clone()
            }
        };

        let app_base_url = var("APP_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            database,
            db_max_connections,
            port,
            environment,
            access_jwt_secret,
            refresh_jwt_secret,
            link_signing_secret,
            app_base_url,
            mail_from: var("MAIL_FROM").unwrap_or_else(|| "no-reply@localhost".to_string()),
            sendgrid_api_key: var("SENDGRID_API_KEY"),
            ingest_api_url: var("INGEST_API_URL").map(|u| u.trim_end_matches('/').to_string()),
            ingest_api_key: var("INGEST_API_KEY"),
            ingest_schedule: var("INGEST_SCHEDULE")
                .unwrap_or_else(|| DEFAULT_INGEST_SCHEDULE.to_string()),
            guard_check_disabled: flag(var("GUARD_CHECK_DISABLED")),
            require_signed_link: flag(var("REQUIRE_SIGNED_LINK")),
            trust_forwarded_for: flag(var("TRUST_FORWARDED_FOR")),
            auth_rate_limit_burst: parse_or(var("AUTH_RATE_LIMIT_BURST"), 20, "AUTH_RATE_LIMIT_BURST")?,
        })
    }
}

fn flag(value: Option<String>) -> bool {
    value
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T, key: &str) -> Result<T, String> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| format!("{} has an invalid value: {}", key, v)),
        None => Ok(default),
    }
}
