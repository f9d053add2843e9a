use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{AppState, Clock, SuggestConfig};
use crate::infrastructure::mail::MailerAdapter;
use crate::infrastructure::media::LocalMediaStorage;
use crate::infrastructure::persistence::catalog::PostgresEventCatalog;
use crate::infrastructure::persistence::suggestions::PostgresSuggestionRepository;
use crate::infrastructure::persistence::users::PostgresUserDirectory;

pub mod http;
pub mod mail;
pub mod media;
pub mod persistence;
pub mod settings;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone)]
pub struct AppStateImpl {
    suggestions: PostgresSuggestionRepository,
    users: PostgresUserDirectory,
    catalog: PostgresEventCatalog,
    mailer: MailerAdapter,
    storage: LocalMediaStorage,
    clock: SystemClock,
    config: Arc<SuggestConfig>,
}

impl AppStateImpl {
    pub fn new(
        suggestions: PostgresSuggestionRepository,
        users: PostgresUserDirectory,
        catalog: PostgresEventCatalog,
        mailer: MailerAdapter,
        storage: LocalMediaStorage,
        config: SuggestConfig,
    ) -> Self {
        Self {
            suggestions,
            users,
            catalog,
            mailer,
            storage,
            clock: SystemClock,
            config: Arc::new(config),
        }
    }
}

impl AppState for AppStateImpl {
    type R = PostgresSuggestionRepository;
    type U = PostgresUserDirectory;
    type C = PostgresEventCatalog;
    type V = PostgresUserDirectory;
    type M = MailerAdapter;
    type P = LocalMediaStorage;
    type K = SystemClock;

    fn suggestions(&self) -> &Self::R {
        &self.suggestions
    }

    fn users(&self) -> &Self::U {
        &self.users
    }

    fn catalog(&self) -> &Self::C {
        &self.catalog
    }

    fn reviewers(&self) -> &Self::V {
        &self.users
    }

    fn mailer(&self) -> &Self::M {
        &self.mailer
    }

    fn storage(&self) -> &Self::P {
        &self.storage
    }

    fn clock(&self) -> &Self::K {
        &self.clock
    }

    fn config(&self) -> &SuggestConfig {
        &self.config
    }
}
