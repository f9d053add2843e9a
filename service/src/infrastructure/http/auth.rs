//! Identity of the requesting user.
//!
//! Authentication happens in the proxy in front of the service, which passes
//! the id of the signed in user in [`REMOTE_USER_HEADER`]. Missing, unknown
//! and inactive users are anonymous.

use airmozilla_common::{User, UserId};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::domain::AppState;
use crate::domain::repository::UserDirectory;
use crate::infrastructure::http::api::{ApiError, ApiRedirect};

pub const REMOTE_USER_HEADER: &str = "x-remote-user-id";

/// Characters of `next` left readable in the login url
const NEXT_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Signed in user; anonymous requests are sent to the login page
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

impl<S: AppState> FromRequestParts<S> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match resolve(parts, state).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map_or("/", |path| path.as_str());
                let login = login_url(&state.config().login_url, next);
                Err(ApiRedirect(login).into_response())
            }
            Err(e) => Err(e.into_response()),
        }
    }
}

impl<S: AppState> FromRequestParts<S> for OptionalUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(resolve(parts, state).await?))
    }
}

async fn resolve<S: AppState>(parts: &Parts, state: &S) -> Result<Option<User>, ApiError> {
    let id = parts
        .headers
        .get(REMOTE_USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok());
    let Some(id) = id else {
        return Ok(None);
    };

    let user = state.users().find_user(UserId(id)).await?;
    Ok(user.filter(|user| user.is_active))
}

fn login_url(login: &str, next: &str) -> String {
    format!("{}?next={}", login, utf8_percent_encode(next, NEXT_SAFE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{OWNER, TestState};
    use axum::body::Body;
    use axum::extract::Request;
    use axum::http::{StatusCode, header};

    fn parts(user: Option<&str>) -> Parts {
        parts_for("/suggest/7/title/", user)
    }

    fn parts_for(uri: &str, user: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(user) = user {
            builder = builder.header(REMOTE_USER_HEADER, user);
        }
        builder.body(Body::empty()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_known_user_is_resolved() {
        let state = TestState::new();
        let CurrentUser(user) = CurrentUser::from_request_parts(&mut parts(Some("10")), &state)
            .await
            .unwrap();
        assert_eq!(user.id, UserId(OWNER));
    }

    #[tokio::test]
    async fn test_anonymous_is_sent_to_login() {
        let state = TestState::new();
        for value in [None, Some("abc"), Some("999")] {
            let response = CurrentUser::from_request_parts(&mut parts(value), &state)
                .await
                .unwrap_err();
            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(
                response.headers()[header::LOCATION],
                "/login/?next=/suggest/7/title/"
            );
        }
    }

    #[tokio::test]
    async fn test_login_next_keeps_query_encoded() {
        let state = TestState::new();
        let response =
            CurrentUser::from_request_parts(&mut parts_for("/suggest/?a=1&b=two", None), &state)
                .await
                .unwrap_err();
        assert_eq!(
            response.headers()[header::LOCATION],
            "/login/?next=/suggest/%3Fa%3D1%26b%3Dtwo"
        );
    }

    #[tokio::test]
    async fn test_inactive_user_is_anonymous() {
        let state = TestState::new();
        let mut owner = state.user(OWNER);
        owner.is_active = false;
        state.store.add_user(owner);

        let OptionalUser(user) = OptionalUser::from_request_parts(&mut parts(Some("10")), &state)
            .await
            .unwrap();
        assert!(user.is_none());
    }
}
