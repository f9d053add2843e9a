use std::env;

use anyhow::Context;
use airmozilla_common::database::DatabaseSettings;
use config::{Config, Environment, File};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::domain::migration::DefaultChannel;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub suggest: SuggestSettings,
}

/// Only the part of the `suggest` section the migration needs
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestSettings {
    pub default_channel_slug: String,
    pub default_channel_name: String,
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

    pub fn default_channel(&self) -> DefaultChannel {
        DefaultChannel {
            slug: self.suggest.default_channel_slug.clone(),
            name: self.suggest.default_channel_name.clone(),
        }
    }
}

fn load_env(key: &str, default_value: &'static str) -> String {
    env::var(key).unwrap_or_else(|_| default_value.into())
}
