use serde::Deserialize;

pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";
pub const DEFAULT_CLINIC_EMAIL: &str = "clinic@example.com";
pub const DEFAULT_EMAIL_FROM: &str = "HealthCare Clinic <onboarding@resend.dev>";
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// PostgreSQL URL. `None` runs the service on the in-memory lead store.
    pub database_url: Option<String>,
    pub port: u16,
    /// Shared admin secret. `None` rejects every admin request.
    pub admin_password: Option<String>,
    pub admin_session_ttl_secs: u64,
    /// Email provider key. `None` turns notifications into logged no-ops.
    pub resend_api_key: Option<String>,
    pub resend_base_url: String,
    pub clinic_email: String,
    pub email_from: String,
    pub openrouter_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub site_url: String,
}

/// Reads an optional variable, treating blank values as unset.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

/// Host part of a database URL, for logging without credentials.
fn database_host(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| "<unparsable>".to_string())
}

fn http_url(name: &str, value: String) -> anyhow::Result<String> {
    let parsed = url::Url::parse(&value)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(value.trim_end_matches('/').to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: optional_var("DB_URL")
                .or_else(|| optional_var("DATABASE_URL"))
                .map(|url| {
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })
                .transpose()?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            admin_password: optional_var("ADMIN_PASSWORD"),
            admin_session_ttl_secs: match optional_var("ADMIN_SESSION_TTL_SECS") {
                Some(raw) => raw.parse().map_err(|_| {
                    anyhow::anyhow!("ADMIN_SESSION_TTL_SECS must be a number of seconds")
                })?,
                None => DEFAULT_SESSION_TTL_SECS,
            },
            resend_api_key: optional_var("RESEND_API_KEY"),
            resend_base_url: http_url(
                "RESEND_BASE_URL",
                optional_var("RESEND_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_RESEND_BASE_URL.to_string()),
            )?,
            clinic_email: optional_var("CLINIC_EMAIL")
                .unwrap_or_else(|| DEFAULT_CLINIC_EMAIL.to_string()),
            email_from: optional_var("EMAIL_FROM")
                .unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
            openrouter_api_key: optional_var("OPENROUTER_API_KEY"),
            groq_api_key: optional_var("GROQ_API_KEY"),
            site_url: optional_var("NEXT_PUBLIC_SITE_URL")
                .or_else(|| optional_var("SITE_URL"))
                .unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
        };

        if config.admin_session_ttl_secs == 0 {
            anyhow::bail!("ADMIN_SESSION_TTL_SECS must be greater than zero");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        match config.database_url {
            Some(ref url) => tracing::debug!("Database host: {}", database_host(url)),
            None => tracing::warn!("DB_URL not set, leads will be kept in memory only"),
        }
        if config.admin_password.is_none() {
            tracing::warn!("ADMIN_PASSWORD not set, admin endpoints will reject every request");
        }
        if config.resend_api_key.is_none() {
            tracing::warn!("RESEND_API_KEY not found. Email notifications will be disabled.");
        }
        if config.openrouter_api_key.is_none() && config.groq_api_key.is_none() {
            tracing::warn!("Neither OPENROUTER_API_KEY nor GROQ_API_KEY set, chat is disabled");
        }
        tracing::debug!("Email provider URL: {}", config.resend_base_url);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
