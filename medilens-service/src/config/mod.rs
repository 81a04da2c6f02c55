use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Model used by the original deployment for both text and vision requests.
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
const DEFAULT_OVERPASS_TIMEOUT_SECS: u64 = 30;
const DEFAULT_FRONTEND_BUILD_DIR: &str = "frontend/build";

#[derive(Debug, Clone, Deserialize)]
pub struct MedilensConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub overpass: OverpassSettings,
    pub frontend: FrontendSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    /// Empty outside production selects the mock provider.
    pub api_key: String,
    pub text_model: String,
    pub vision_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassSettings {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrontendSettings {
    /// Directory holding the prebuilt frontend bundle (index.html and assets).
    pub build_dir: String,
}

impl MedilensConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(MedilensConfig {
            common,
            gemini: GeminiSettings {
                api_key: get_env("GEMINI_API_KEY", Some(""), is_prod)?,
                text_model: get_env("MEDILENS_TEXT_MODEL", Some(DEFAULT_MODEL), is_prod)?,
                vision_model: get_env("MEDILENS_VISION_MODEL", Some(DEFAULT_MODEL), is_prod)?,
            },
            overpass: OverpassSettings {
                url: get_env("OVERPASS_URL", Some(DEFAULT_OVERPASS_URL), is_prod)?,
                timeout_secs: get_env(
                    "OVERPASS_TIMEOUT_SECS",
                    Some(&DEFAULT_OVERPASS_TIMEOUT_SECS.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_OVERPASS_TIMEOUT_SECS),
            },
            frontend: FrontendSettings {
                build_dir: get_env("FRONTEND_BUILD_DIR", Some(DEFAULT_FRONTEND_BUILD_DIR), is_prod)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
