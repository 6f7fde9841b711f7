//! Configuration types.

use reqwest::Url;

use crate::error::ConfigError;

/// Default base URL of the registration API.
pub const DEFAULT_API_URL: &str = "https://api.father.srv.br/api/v2";

/// Registration API endpoints.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; company and contact routes hang off it.
    pub api_url: Url,
    /// Full URL of the password-creation endpoint.
    pub password_url: Url,
}

impl ApiConfig {
    /// Build from explicit URLs. `password_url` defaults to
    /// `{api_url}/password`.
    pub fn new(api_url: &str, password_url: Option<&str>) -> Result<Self, ConfigError> {
        let api_url = parse_url("PARTNER_SIGNUP_API_URL", api_url)?;
        let password_url = match password_url {
            Some(url) => parse_url("PARTNER_SIGNUP_PASSWORD_URL", url)?,
            None => parse_url(
                "PARTNER_SIGNUP_PASSWORD_URL",
                &format!("{}/password", api_url.as_str().trim_end_matches('/')),
            )?,
        };
        Ok(Self {
            api_url,
            password_url,
        })
    }

    /// Build config from environment variables, falling back to the public
    /// API for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url =
            std::env::var("PARTNER_SIGNUP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let password_url = std::env::var("PARTNER_SIGNUP_PASSWORD_URL").ok();
        Self::new(&api_url, password_url.as_deref())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        let api_url = Url::parse(DEFAULT_API_URL).expect("default API URL is valid");
        let password_url =
            Url::parse(&format!("{DEFAULT_API_URL}/password")).expect("default password URL is valid");
        Self {
            api_url,
            password_url,
        }
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{value:?} is not a valid URL: {e}"),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{value:?} cannot be used as a base URL"),
        });
    }
    Ok(url)
}
