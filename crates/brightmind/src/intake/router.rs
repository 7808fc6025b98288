use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartError, rejection::JsonRejection, DefaultBodyLimit, FromRequest,
        Multipart, Request, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use super::domain::{Attachment, ContactRequest, Envelope, RegistrationRequest};
use super::repository::{ContactRepository, RegistrationRepository};
use super::service::{IntakeError, IntakeService};

const CONTACT_SENT: &str = "Message sent successfully! We'll get back to you within 24 hours.";
const CONTACT_FAILED: &str =
    "An error occurred while sending your message. Please try again later.";
const REGISTERED: &str = "Account created successfully! Welcome to BrightMind.";
const REGISTRATION_FAILED: &str =
    "An error occurred during registration. Please try again later.";

/// Room for multipart boundaries and text parts on top of the attachment itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Router builder exposing the contact, registration, and admin listing endpoints.
pub fn intake_router<C, U>(service: Arc<IntakeService<C, U>>) -> Router
where
    C: ContactRepository + 'static,
    U: RegistrationRepository + 'static,
{
    let body_limit = service.limits().max_attachment_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/api/contact", post(contact_handler::<C, U>))
        .route("/api/register", post(register_handler::<C, U>))
        .route("/api/users", get(users_handler::<C, U>))
        .route("/api/contacts", get(contacts_handler::<C, U>))
        .route("/api/health", get(health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

#[derive(Debug, Serialize)]
struct Listing<T> {
    success: bool,
    count: usize,
    data: Vec<T>,
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(Envelope::<()>::failure(message))).into_response()
}

/// Map a service error onto the envelope; storage failures hide their detail behind `fallback`.
fn error_response(err: IntakeError, fallback: &'static str) -> Response {
    match err {
        IntakeError::Validation(inner) => failure(StatusCode::BAD_REQUEST, inner.to_string()),
        IntakeError::Malformed(_) | IntakeError::DuplicateEmail => {
            failure(StatusCode::BAD_REQUEST, err.to_string())
        }
        IntakeError::AttachmentTooLarge { .. } => {
            failure(StatusCode::PAYLOAD_TOO_LARGE, err.to_string())
        }
        IntakeError::Repository(_) | IntakeError::PasswordHash(_) => {
            error!(error = %err, "intake request failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, fallback)
        }
    }
}

pub(crate) async fn contact_handler<C, U>(
    State(service): State<Arc<IntakeService<C, U>>>,
    request: Request,
) -> Response
where
    C: ContactRepository + 'static,
    U: RegistrationRepository + 'static,
{
    let limit = service.limits().max_attachment_bytes;
    let (fields, attachment) = match read_contact(request, limit).await {
        Ok(parsed) => parsed,
        Err(err) => return error_response(err, CONTACT_FAILED),
    };

    match service.submit_contact(fields, attachment) {
        Ok(submission) => (
            StatusCode::CREATED,
            Json(Envelope::ok(CONTACT_SENT, submission.receipt())),
        )
            .into_response(),
        Err(err) => error_response(err, CONTACT_FAILED),
    }
}

/// Accept the contact form as multipart (with optional `attachment` part), JSON, or urlencoded.
async fn read_contact(
    request: Request,
    limit: usize,
) -> Result<(ContactRequest, Option<Attachment>), IntakeError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok());

    match content_type {
        Some(kind) if kind.type_() == mime::MULTIPART && kind.subtype() == mime::FORM_DATA => {
            read_multipart(request, limit).await
        }
        Some(kind) if kind.essence_str() == mime::APPLICATION_JSON.essence_str() => {
            let Json(fields) = Json::<ContactRequest>::from_request(request, &())
                .await
                .map_err(|rejection| IntakeError::Malformed(rejection.body_text()))?;
            Ok((fields, None))
        }
        Some(kind) if kind.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() => {
            let Form(fields) = Form::<ContactRequest>::from_request(request, &())
                .await
                .map_err(|rejection| IntakeError::Malformed(rejection.body_text()))?;
            Ok((fields, None))
        }
        _ => Err(IntakeError::Malformed(
            "expected a multipart/form-data, JSON, or urlencoded body".to_string(),
        )),
    }
}

async fn read_multipart(
    request: Request,
    limit: usize,
) -> Result<(ContactRequest, Option<Attachment>), IntakeError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| IntakeError::Malformed(rejection.body_text()))?;
    let multipart_error = |err: MultipartError| {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            IntakeError::AttachmentTooLarge { limit }
        } else {
            IntakeError::Malformed(err.body_text())
        }
    };

    let mut fields = ContactRequest::default();
    let mut attachment = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "attachment" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            // browsers send an empty part when no file was picked
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            let file_name = if file_name.is_empty() {
                "attachment".to_string()
            } else {
                file_name
            };
            attachment = Some(Attachment::new(file_name, content_type, bytes.to_vec()));
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            fields.set_field(&name, value);
        }
    }

    Ok((fields, attachment))
}

pub(crate) async fn register_handler<C, U>(
    State(service): State<Arc<IntakeService<C, U>>>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Response
where
    C: ContactRepository + 'static,
    U: RegistrationRepository + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match tokio::task::spawn_blocking(move || service.register(request)).await {
        Ok(Ok(user)) => (
            StatusCode::CREATED,
            Json(Envelope::ok(REGISTERED, user.receipt())),
        )
            .into_response(),
        Ok(Err(err)) => error_response(err, REGISTRATION_FAILED),
        Err(join_error) => {
            error!(error = %join_error, "registration task aborted");
            failure(StatusCode::INTERNAL_SERVER_ERROR, REGISTRATION_FAILED)
        }
    }
}

pub(crate) async fn users_handler<C, U>(
    State(service): State<Arc<IntakeService<C, U>>>,
) -> Response
where
    C: ContactRepository + 'static,
    U: RegistrationRepository + 'static,
{
    match service.registrations() {
        Ok(users) => Json(Listing {
            success: true,
            count: users.len(),
            data: users,
        })
        .into_response(),
        Err(err) => error_response(err, "Error fetching users"),
    }
}

pub(crate) async fn contacts_handler<C, U>(
    State(service): State<Arc<IntakeService<C, U>>>,
) -> Response
where
    C: ContactRepository + 'static,
    U: RegistrationRepository + 'static,
{
    match service.contacts() {
        Ok(contacts) => Json(Listing {
            success: true,
            count: contacts.len(),
            data: contacts,
        })
        .into_response(),
        Err(err) => error_response(err, "Error fetching contact forms"),
    }
}

pub(crate) async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "BrightMind API is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
