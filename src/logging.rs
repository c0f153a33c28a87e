//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{Method, header::CONTENT_TYPE, request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::Error;

/// The number of characters of a body logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED_FIELDS: [&str; 2] = ["password", "confirm_password"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Password fields in submitted forms are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body = match read_body(body).await {
        Ok(body) => body,
        Err(error) => return error.into_response(),
    };

    let body_text = String::from_utf8_lossy(&body);
    if is_form_submission(&parts) {
        log_request(&parts, &redact_form_fields(&body_text));
    } else {
        log_request(&parts, &body_text);
    }

    let response = next.run(Request::from_parts(parts, Body::from(body))).await;

    let (parts, body) = response.into_parts();
    let body = match read_body(body).await {
        Ok(body) => body,
        Err(error) => return error.into_response(),
    };
    log_response(&parts, &String::from_utf8_lossy(&body));

    Response::from_parts(parts, Body::from(body))
}

async fn read_body(body: Body) -> Result<Bytes, Error> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .inspect_err(|error| tracing::error!("could not read body for logging: {error}"))
        .map_err(|_| Error::BodyReadError)
}

fn is_form_submission(parts: &request::Parts) -> bool {
    let is_form = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("application/x-www-form-urlencoded"));

    is_form && (parts.method == Method::POST || parts.method == Method::PUT)
}

fn redact_form_fields(form_text: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if REDACTED_FIELDS.contains(&name) => format!("{name}=********"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if it is short enough.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_request(parts: &request::Parts, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("Received request: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!("Received request: {parts:#?}\nbody: {body:?}"),
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("Sending response: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {parts:#?}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod tests {
    use axum::{Form, Router, middleware, routing::post};
    use axum_test::TestServer;
    use serde::{Deserialize, Serialize};

    use super::{LOG_BODY_LENGTH_LIMIT, logging_middleware, redact_form_fields, truncate};

    #[test]
    fn redacts_password_fields() {
        let form = "email=a%40example.com&password=hunter2&confirm_password=hunter2&remember_me=on";

        let redacted = redact_form_fields(form);

        assert_eq!(
            redacted,
            "email=a%40example.com&password=********&confirm_password=********&remember_me=on"
        );
    }

    #[test]
    fn leaves_similar_field_names_alone() {
        let form = "old_password_hint=abc&date=2023-03-15";

        assert_eq!(redact_form_fields(form), form);
    }

    #[test]
    fn truncates_on_character_boundaries() {
        let body = "₹".repeat(LOG_BODY_LENGTH_LIMIT + 1);

        let truncated = truncate(&body).expect("want truncated body");

        assert_eq!(truncated.chars().count(), LOG_BODY_LENGTH_LIMIT);
        assert_eq!(truncate("short"), None);
    }

    #[derive(Serialize, Deserialize)]
    struct EchoForm {
        email: String,
        password: String,
    }

    async fn echo(Form(form): Form<EchoForm>) -> String {
        form.email
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        let app = Router::new()
            .route("/echo", post(echo))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post("/echo")
            .form(&EchoForm {
                email: "a@example.com".to_owned(),
                password: "hunter2".to_owned(),
            })
            .await;

        response.assert_status_ok();
        response.assert_text("a@example.com");
    }
}
