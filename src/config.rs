use crate::errors::AppError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_STRIPE_BASE_URL: &str = "https://api.stripe.com/v1";
pub const DEFAULT_MONEYBIRD_BASE_URL: &str = "https://moneybird.com/api/v2";
pub const DEFAULT_CURSOR_FILE: &str = "last_uploaded_timestamp.txt";

/// Stripe refuses list requests with a larger `limit`.
pub const MAX_PAYMENTS_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub stripe_secret_key: String,
    pub stripe_base_url: String,
    pub moneybird_api_token: String,
    pub moneybird_administration_id: String,
    pub moneybird_tax_rate_id: String,
    pub moneybird_base_url: String,
    pub cursor_file: PathBuf,
    pub payments_limit: u32,
    pub stripe_max_pages: u32,
    pub http_timeout: Duration,
    /// `None` runs a single sync and exits.
    pub sync_interval: Option<Duration>,
}

impl Config {
    /// Loads `.env` (if present) and reads configuration from the environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Stripe Base URL: {}", config.stripe_base_url);
        tracing::debug!("Moneybird Base URL: {}", config.moneybird_base_url);
        tracing::debug!(
            "Moneybird administration: {}",
            config.moneybird_administration_id
        );
        tracing::debug!("Cursor file: {}", config.cursor_file.display());
        tracing::debug!(
            "Payments limit: {} x {} page(s)",
            config.payments_limit,
            config.stripe_max_pages
        );
        if let Some(interval) = config.sync_interval {
            tracing::info!("Sync interval configured: {}s", interval.as_secs());
        }

        Ok(config)
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let required = |key: &str| {
            lookup(key)
                .ok_or_else(|| {
                    AppError::ConfigError(format!("{} environment variable required", key))
                })
                .and_then(|value| {
                    if value.trim().is_empty() {
                        return Err(AppError::ConfigError(format!("{} cannot be empty", key)));
                    }
                    Ok(value)
                })
        };

        let base_url = |key: &str, default: &str| -> Result<String, AppError> {
            let raw = optional(key).unwrap_or_else(|| default.to_string());
            if !raw.starts_with("http://") && !raw.starts_with("https://") {
                return Err(AppError::ConfigError(format!(
                    "{} must start with http:// or https://",
                    key
                )));
            }
            url::Url::parse(&raw)
                .map_err(|e| AppError::ConfigError(format!("{} is not a valid URL: {}", key, e)))?;
            Ok(raw.trim_end_matches('/').to_string())
        };

        let number = |key: &str, default: u64| -> Result<u64, AppError> {
            match optional(key) {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    AppError::ConfigError(format!("{} must be a non-negative integer", key))
                }),
                None => Ok(default),
            }
        };

        let payments_limit = number("PAYMENTS_LIMIT", MAX_PAYMENTS_LIMIT as u64)?;
        if payments_limit == 0 || payments_limit > MAX_PAYMENTS_LIMIT as u64 {
            return Err(AppError::ConfigError(format!(
                "PAYMENTS_LIMIT must be between 1 and {}",
                MAX_PAYMENTS_LIMIT
            )));
        }

        let stripe_max_pages = number("STRIPE_MAX_PAGES", 1)?;
        if stripe_max_pages == 0 || stripe_max_pages > u32::MAX as u64 {
            return Err(AppError::ConfigError(
                "STRIPE_MAX_PAGES must be at least 1".to_string(),
            ));
        }

        let http_timeout = number("HTTP_TIMEOUT_SECS", 30)?;
        if http_timeout == 0 {
            return Err(AppError::ConfigError(
                "HTTP_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        let sync_interval = match optional("SYNC_INTERVAL_SECS") {
            Some(_) => {
                let secs = number("SYNC_INTERVAL_SECS", 0)?;
                if secs == 0 {
                    return Err(AppError::ConfigError(
                        "SYNC_INTERVAL_SECS must be greater than 0".to_string(),
                    ));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_base_url: base_url("STRIPE_BASE_URL", DEFAULT_STRIPE_BASE_URL)?,
            moneybird_api_token: required("MONEYBIRD_API_TOKEN")?,
            moneybird_administration_id: required("MONEYBIRD_ADMINISTRATION_ID")?,
            moneybird_tax_rate_id: required("MONEYBIRD_TAX_RATE_ID")?,
            moneybird_base_url: base_url("MONEYBIRD_BASE_URL", DEFAULT_MONEYBIRD_BASE_URL)?,
            cursor_file: optional("CURSOR_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CURSOR_FILE)),
            payments_limit: payments_limit as u32,
            stripe_max_pages: stripe_max_pages as u32,
            http_timeout: Duration::from_secs(http_timeout),
            sync_interval,
        })
    }
}
