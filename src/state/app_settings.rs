use courtside_api::client::DEFAULT_BASE_URL;
use log::LevelFilter;
use reqwest::Url;
use std::str::FromStr;

pub const API_URL_ENV: &str = "COURTSIDE_API_URL";
pub const LOG_ENV: &str = "COURTSIDE_LOG";

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub api_url: String,
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// Problems found while reading the environment, shown once the UI is up.
    pub warnings: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            full_screen: false,
            log_level: None,
            warnings: Vec::new(),
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_vars(std::env::var(API_URL_ENV).ok(), std::env::var(LOG_ENV).ok())
    }

    fn from_vars(api_url: Option<String>, log_level: Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(raw) = api_url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            match Url::parse(&raw) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {
                    settings.api_url = raw.trim_end_matches('/').to_string();
                }
                _ => settings.warnings.push(format!(
                    "{API_URL_ENV}={raw:?} is not an http(s) URL, using {DEFAULT_BASE_URL}"
                )),
            }
        }

        if let Some(raw) = log_level.filter(|l| !l.trim().is_empty()) {
            match LevelFilter::from_str(raw.trim()) {
                Ok(level) => settings.log_level = Some(level),
                Err(_) => settings.warnings.push(format!("{LOG_ENV}={raw:?} is not a log level")),
            }
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_environment() {
        let settings = AppSettings::from_vars(None, None);
        assert_eq!(settings.api_url, DEFAULT_BASE_URL);
        assert!(settings.log_level.is_none());
        assert!(settings.warnings.is_empty());
    }

    #[test]
    fn custom_url_and_level() {
        let settings = AppSettings::from_vars(
            Some("https://stats.example.edu/api/".into()),
            Some("debug".into()),
        );
        assert_eq!(settings.api_url, "https://stats.example.edu/api");
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn invalid_values_fall_back_with_warnings() {
        let settings = AppSettings::from_vars(Some("localhost:3000".into()), Some("loud".into()));
        assert_eq!(settings.api_url, DEFAULT_BASE_URL);
        assert!(settings.log_level.is_none());
        assert_eq!(settings.warnings.len(), 2);
    }
}
