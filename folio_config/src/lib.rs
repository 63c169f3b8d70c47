use std::path::Path;

use anyhow::Context;
use config::{File, FileFormat};
pub use duration::Duration;
use serde::Deserialize;
use url::Url;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

pub const EMAILJS_SERVICE_ID: &str = "EMAILJS_SERVICE_ID";
pub const EMAILJS_TEMPLATE_ID: &str = "EMAILJS_TEMPLATE_ID";
pub const EMAILJS_PUBLIC_KEY: &str = "EMAILJS_PUBLIC_KEY";

/// Environment variables that override credentials from the config files.
const ENV_OVERRIDES: [(&str, &str); 3] = [
    (EMAILJS_SERVICE_ID, "emailjs.service_id"),
    (EMAILJS_TEMPLATE_ID, "emailjs.template_id"),
    (EMAILJS_PUBLIC_KEY, "emailjs.public_key"),
];

/// Loads the config files at `paths` (later files take precedence) and applies
/// the `EMAILJS_*` environment variables on top.
pub fn load(paths: &[impl AsRef<Path>]) -> anyhow::Result<Config> {
    load_with_env(paths, |key| std::env::var(key).ok())
}

/// Like [`load`], but reads the environment through `env`.
pub fn load_with_env(
    paths: &[impl AsRef<Path>],
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Config> {
    let builder = paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?;

    ENV_OVERRIDES
        .into_iter()
        .try_fold(builder, |builder, (var, key)| {
            let value = env(var).filter(|value| !value.is_empty());
            builder
                .set_override_option(key, value)
                .with_context(|| format!("Failed to apply {var}"))
        })?
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub contact: ContactConfig,
    pub emailjs: EmailJsConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    pub cooldown: Duration,
    pub success_dismiss: Duration,
    pub message_max_length: usize,
}

#[derive(Deserialize)]
pub struct EmailJsConfig {
    pub endpoint: Url,
    pub timeout: Duration,
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    pub public_key: Option<String>,
}

impl std::fmt::Debug for EmailJsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("EmailJsConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .field("service_id", &self.service_id)
            .field("template_id", &self.template_id)
            .field("public_key", &redact(&self.public_key))
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SiteConfig {
    pub url: Option<Url>,
    pub github_url: Option<Url>,
    pub linkedin_url: Option<Url>,
    pub twitter_url: Option<Url>,
    pub discord_url: Option<Url>,
    pub instagram_url: Option<Url>,
}

impl SiteConfig {
    /// Keys of optional site settings that are not set.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("site.url", &self.url),
            ("site.github_url", &self.github_url),
            ("site.linkedin_url", &self.linkedin_url),
            ("site.twitter_url", &self.twitter_url),
            ("site.discord_url", &self.discord_url),
            ("site.instagram_url", &self.instagram_url),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}
