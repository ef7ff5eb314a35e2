// src/config.rs

use std::env;
use std::time::Duration;
use url::Url;

use crate::errors::AppError;
use crate::pagination::PageSize;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub search_debounce: Duration,
    pub default_page_size: PageSize,
}

impl AppConfig {
    /// Czyta konfigurację ze zmiennych środowiskowych (po wcześniejszym `dotenv()`).
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Wersja przyjmująca dowolne źródło wartości, np. mapę w testach.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("ADMIN_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let base_url = Url::parse(&base_url).map_err(|e| {
            AppError::Config(format!(
                "ADMIN_API_BASE_URL musi być poprawnym adresem URL: {}",
                e
            ))
        })?;

        let timeout_secs = parse_number(&lookup, "ADMIN_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let debounce_ms = parse_number(&lookup, "SEARCH_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS)?;
        let page_size = parse_number(
            &lookup,
            "DEFAULT_PAGE_SIZE",
            u64::from(PageSize::default().get()),
        )?;
        let default_page_size = u32::try_from(page_size)
            .map_err(|_| AppError::InvalidPageSize(u32::MAX))
            .and_then(|size| PageSize::try_from(size))?;

        Ok(Self {
            api: ApiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            search_debounce: Duration::from_millis(debounce_ms),
            default_page_size,
        })
    }
}

fn parse_number<F>(lookup: &F, key: &str, default: u64) -> Result<u64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| AppError::Config(format!("{} musi być liczbą, otrzymano '{}'", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config.api.base_url.as_str(), "http://localhost:5000/api");
        assert_eq!(config.api.timeout, Duration::from_secs(15));
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert_eq!(config.default_page_size, PageSize::Ten);
    }

    #[test]
    fn values_are_read_from_lookup() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("ADMIN_API_BASE_URL", "https://admin.example.com/api"),
            ("SEARCH_DEBOUNCE_MS", "250"),
            ("DEFAULT_PAGE_SIZE", "25"),
        ]))
        .unwrap();

        assert_eq!(config.api.base_url.host_str(), Some("admin.example.com"));
        assert_eq!(config.search_debounce, Duration::from_millis(250));
        assert_eq!(config.default_page_size, PageSize::TwentyFive);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("ADMIN_API_TIMEOUT_SECS", "dużo")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = AppConfig::from_lookup(lookup_from(&[("DEFAULT_PAGE_SIZE", "7")])).unwrap_err();
        assert!(matches!(err, AppError::InvalidPageSize(7)));

        let err = AppConfig::from_lookup(lookup_from(&[("ADMIN_API_BASE_URL", "nie url")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
