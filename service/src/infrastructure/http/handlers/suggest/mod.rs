use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::domain::AppState;
use crate::domain::notification::BaseUrl;
use crate::domain::storage::Upload;
use crate::domain::suggestion::forms::{
    DescriptionForm, DetailsForm, PlaceholderForm, StartForm, StepForm, TitleForm,
};
use crate::domain::suggestion::wizard::{self, StepResponse};
use crate::domain::suggestion::{Field, Step, SuggestionId, WizardError};
use crate::infrastructure::http::api::{ApiError, ApiRedirect, ApiSuccess};
use crate::infrastructure::http::auth::CurrentUser;
use crate::infrastructure::http::handlers::suggest::dto::StepPageResponse;
use crate::infrastructure::http::querystring::FormString;

mod dto;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

pub async fn start_page<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, ApiError> {
    let page = wizard::start_page(&state, &user).await?;
    render(StepResponse::Page(page))
}

pub async fn start<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    FormString(form): FormString<StartForm>,
) -> Result<Response, ApiError> {
    render(wizard::start(&state, &user, form).await?)
}

pub async fn show_step<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    Path((id, segment)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (id, step) = locate(&id, &segment)?;
    render(wizard::show_step(&state, &user, id, step).await?)
}

/// Saves one of the editing steps; on the summary it submits or retracts
pub async fn submit_step<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    Path((id, segment)): Path<(String, String)>,
    request: Request,
) -> Result<Response, ApiError> {
    let (id, step) = locate(&id, &segment)?;
    let response = match step {
        Step::Summary => {
            let base_url = base_url(request.headers());
            wizard::toggle_submission(&state, &user, id, &base_url).await?
        }
        step => {
            let form = read_form(step, request, &state).await?;
            wizard::submit_step(&state, &user, id, form).await?
        }
    };
    render(response)
}

pub async fn delete<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    render(wizard::delete(&state, &user, id).await?)
}

fn render(response: StepResponse) -> Result<Response, ApiError> {
    match response {
        StepResponse::Redirect(url) => Ok(ApiRedirect(url).into_response()),
        StepResponse::Page(page) => {
            let page = StepPageResponse::try_from(page).map_err(WizardError::from)?;
            Ok(ApiSuccess::new(StatusCode::OK, page).into_response())
        }
    }
}

fn parse_id(id: &str) -> Result<SuggestionId, ApiError> {
    id.parse::<i64>()
        .map(SuggestionId)
        .map_err(|_| ApiError::NotFound)
}

fn locate(id: &str, segment: &str) -> Result<(SuggestionId, Step), ApiError> {
    let step = Step::from_segment(segment).ok_or(ApiError::NotFound)?;
    Ok((parse_id(id)?, step))
}

/// Scheme and host the client used, for links in notifications
fn base_url(headers: &HeaderMap) -> BaseUrl {
    let scheme = headers
        .get(FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    BaseUrl::new(scheme, host)
}

async fn read_form<S: AppState>(
    step: Step,
    request: Request,
    state: &S,
) -> Result<StepForm, ApiError> {
    let form = match step {
        Step::Title => {
            let FormString(form) = FormString::<TitleForm>::from_request(request, state).await?;
            StepForm::Title(form)
        }
        Step::Description => {
            let FormString(form) =
                FormString::<DescriptionForm>::from_request(request, state).await?;
            StepForm::Description(form)
        }
        Step::Details => {
            let FormString(form) = FormString::<DetailsForm>::from_request(request, state).await?;
            StepForm::Details(form)
        }
        Step::Placeholder => StepForm::Placeholder(placeholder_form(request, state).await?),
        Step::Start | Step::Summary => return Err(ApiError::NotFound),
    };
    Ok(form)
}

/// A post without multipart body is a form without file
async fn placeholder_form<S: AppState>(
    request: Request,
    state: &S,
) -> Result<PlaceholderForm, ApiError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));
    if !is_multipart {
        return Ok(PlaceholderForm::default());
    }

    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| upload_error(e.status(), e.body_text()))?;

    let mut form = PlaceholderForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e.status(), e.body_text()))?
    {
        if field.name() != Some(Field::Placeholder.name()) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| upload_error(e.status(), e.body_text()))?;

        // browsers send an empty part when no file was picked
        if file_name.is_empty() && bytes.is_empty() {
            continue;
        }
        form.placeholder_img = Some(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Ok(form)
}

fn upload_error(status: StatusCode, message: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(message)
    } else {
        ApiError::BadRequest(message)
    }
}
