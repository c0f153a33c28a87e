//! Full page responses for the 403, 404 and 500 errors.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use axum_htmx::HxRedirect;

use crate::{endpoints, html::error_view};

/// The page shown when a route or record does not exist.
pub struct NotFoundError;

impl IntoResponse for NotFoundError {
    fn into_response(self) -> Response {
        let page = error_view(
            "Not Found",
            "404",
            "Page not found.",
            "Sorry, we can't find that page. Check the address or go back to the homepage.",
        );

        (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
    }
}

/// The fallback route handler for unknown paths.
pub async fn get_404_not_found() -> Response {
    NotFoundError.into_response()
}

/// The page shown when a non-admin user requests an admin-only page.
pub struct ForbiddenError;

impl IntoResponse for ForbiddenError {
    fn into_response(self) -> Response {
        let page = error_view(
            "Forbidden",
            "403",
            "Admins only.",
            "Your account is not allowed to do this. Ask an admin for help.",
        );

        (StatusCode::FORBIDDEN, Html(page.into_string())).into_response()
    }
}

/// The page shown when something unexpected went wrong on the server.
pub struct InternalServerError<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerError<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

impl IntoResponse for InternalServerError<'_> {
    fn into_response(self) -> Response {
        let page = error_view("Internal Server Error", "500", self.description, self.fix);

        (StatusCode::INTERNAL_SERVER_ERROR, Html(page.into_string())).into_response()
    }
}

pub async fn get_internal_server_error_page() -> Response {
    InternalServerError::default().into_response()
}

/// Send an HTMX client to the internal server error page.
pub fn get_internal_server_error_redirect() -> Response {
    (
        HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
