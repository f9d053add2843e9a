use airmozilla_common::database;

use crate::infrastructure::AppStateImpl;
use crate::infrastructure::http::{HttpServer, HttpServerConfig};
use crate::infrastructure::mail::MailerAdapter;
use crate::infrastructure::media::LocalMediaStorage;
use crate::infrastructure::persistence::catalog::PostgresEventCatalog;
use crate::infrastructure::persistence::suggestions::PostgresSuggestionRepository;
use crate::infrastructure::persistence::users::PostgresUserDirectory;
use crate::infrastructure::settings::Settings;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod domain;
mod infrastructure;
#[cfg(test)]
mod test_utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = settings.suggest.to_config()?;
    tracing::info!(
        default_channel = %config.default_channel_slug,
        include_analytics = config.include_analytics,
        "configuration loaded"
    );

    let database = database::connect(&settings.database).await?;
    tracing::info!("connected to database");

    let mailer = MailerAdapter::from_settings(settings.smtp.as_ref())?;
    let state = AppStateImpl::new(
        PostgresSuggestionRepository::new(database),
        PostgresUserDirectory::new(database),
        PostgresEventCatalog::new(database),
        mailer,
        LocalMediaStorage::new(&settings.media_root),
        config,
    );

    let server_config = HttpServerConfig {
        port: &settings.server_port,
    };
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
