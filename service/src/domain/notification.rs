use std::fmt;
use std::future::Future;

use airmozilla_common::{ADD_EVENT_PERMISSION, User};
use itertools::Itertools;

use crate::domain::AppState;
use crate::domain::repository::{RepositoryError, ReviewerDirectory};
use crate::domain::suggestion::{Step, SuggestedEvent};
use crate::domain::timezone::TimezoneError;

pub const SUBJECT_PREFIX: &str = "[Air Mozilla] New suggested event: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

pub trait Mailer: Send + Sync + 'static {
    fn send(&self, email: OutgoingEmail) -> impl Future<Output = Result<(), MailError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid e-mail address: {0}")]
    Address(String),
    #[error("failed to build e-mail: {0}")]
    Build(String),
    #[error("mail transport failed: {0}")]
    Transport(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("no user holding '{0}' has an e-mail address")]
    NoRecipients(&'static str),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Timezone(#[from] TimezoneError),
    #[error(transparent)]
    Mail(#[from] MailError),
}

/// Scheme and host the request came in on, e.g. `https://air.mozilla.org`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    pub fn new(scheme: &str, host: &str) -> Self {
        BaseUrl(format!("{}://{}", scheme, host.trim_end_matches('/')))
    }

    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-empty addresses, each once
pub fn recipients(emails: Vec<String>) -> Result<Vec<String>, NotificationError> {
    let recipients: Vec<String> = emails
        .into_iter()
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty())
        .sorted()
        .dedup()
        .collect();

    if recipients.is_empty() {
        return Err(NotificationError::NoRecipients(ADD_EVENT_PERMISSION));
    }
    Ok(recipients)
}

/// Addresses of everybody allowed to review suggestions
pub async fn reviewers<S: AppState>(state: &S) -> Result<Vec<String>, NotificationError> {
    let emails = state
        .reviewers()
        .reviewer_emails(ADD_EVENT_PERMISSION)
        .await?;
    recipients(emails)
}

pub fn compose(
    event: &SuggestedEvent,
    owner: &User,
    base_url: &BaseUrl,
    from: &str,
    to: Vec<String>,
) -> Result<OutgoingEmail, NotificationError> {
    let submitter = if owner.email.is_empty() {
        &owner.username
    } else {
        &owner.email
    };
    let start_time = event.local_start_time()?.unwrap_or_default();
    let location = event
        .location
        .as_ref()
        .map(|location| location.name.as_str())
        .unwrap_or_default();

    let body = format!(
        "{submitter} has suggested a new event.\n\n\
         Title: {title}\n\
         Start time: {start_time}\n\
         Location: {location}\n\n\
         {description}\n\n\
         Review it at: {url}\n",
        title = event.title,
        description = event.description,
        url = base_url.join(&Step::Summary.url(event.id)),
    );

    Ok(OutgoingEmail {
        from: from.to_string(),
        to,
        subject: format!("{}{}", SUBJECT_PREFIX, event.title),
        body,
    })
}
