use std::env;

use airmozilla_common::Slug;
use airmozilla_common::database::DatabaseSettings;
use anyhow::{Context, anyhow};
use config::{Config, Environment, File};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::domain::SuggestConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_port: String,
    pub media_root: String,
    pub database: DatabaseSettings,
    pub suggest: SuggestSettings,
    pub smtp: Option<SmtpSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestSettings {
    pub default_channel_slug: String,
    pub upcoming_sidebar_count: usize,
    #[serde(default)]
    pub debug: bool,
    /// Falls back to `!debug` when absent
    pub include_analytics: Option<bool>,
    pub email_from_address: String,
    pub login_url: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        let run_mode = load_env("RUN_MODE", "development");

        let s = Config::builder()
            .add_source(File::with_name("./config/default"))
            .add_source(File::with_name(&format!("./config/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("app").separator("_"))
            .build()?;

        s.try_deserialize().with_context(|| "failed to read config")
    }
}

impl SuggestSettings {
    pub fn to_config(&self) -> anyhow::Result<SuggestConfig> {
        let default_channel_slug = Slug::try_new(&self.default_channel_slug).map_err(|e| {
            anyhow!(
                "invalid default channel slug '{}': {}",
                self.default_channel_slug,
                e
            )
        })?;

        Ok(SuggestConfig {
            default_channel_slug,
            upcoming_sidebar_count: self.upcoming_sidebar_count,
            include_analytics: self.include_analytics.unwrap_or(!self.debug),
            email_from_address: self.email_from_address.clone(),
            login_url: self.login_url.clone(),
            max_upload_bytes: self.max_upload_bytes,
        })
    }
}

fn load_env(key: &str, default_value: &'static str) -> String {
    env::var(key).unwrap_or_else(|_| default_value.into())
}
