use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub request_timeout_secs: u64,
    pub token_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            base_url: get_env_or("LMS_API_URL", "http://localhost:8000")?
                .parse()
                .map_err(|e| Error::Config(format!("Invalid LMS_API_URL: {}", e)))?,
            request_timeout_secs: get_env_parse_or("LMS_REQUEST_TIMEOUT_SECS", 30)?,
            token_file: PathBuf::from(get_env_or("LMS_TOKEN_FILE", ".lms_session.json")?),
        })
    }
}

fn get_env_or(name: &str, default: &str) -> Result<String> {
    match env::var(name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Ok(default.to_string()),
    }
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_env_is_unset() {
        env::remove_var("LMS_API_URL");
        env::remove_var("LMS_REQUEST_TIMEOUT_SECS");
        env::remove_var("LMS_TOKEN_FILE");

        let config = Config::from_env().expect("config");
        assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.token_file, PathBuf::from(".lms_session.json"));
    }
}
