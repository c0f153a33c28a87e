//! Middleware restricting routes to admin users.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRequest;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
};

/// The state needed to look up whether a user is an admin.
#[derive(Debug, Clone)]
pub struct AdminState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AdminState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn is_admin(user_id: UserID, state: &AdminState) -> Result<bool, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_user_by_id(user_id, &connection).map(|user| user.is_admin)
}

/// Only run `request` if the logged in user is an admin.
///
/// Must be layered inside [crate::auth::auth_guard] or
/// [crate::auth::auth_guard_hx], which provide the user's ID.
/// HTMX requests are refused with an alert, other requests with the 403 page.
pub async fn admin_guard(
    State(state): State<AdminState>,
    Extension(user_id): Extension<UserID>,
    HxRequest(is_htmx): HxRequest,
    request: Request,
    next: Next,
) -> Response {
    let refuse = |error: Error| {
        if is_htmx {
            error.into_alert_response()
        } else {
            error.into_response()
        }
    };

    match is_admin(user_id, &state) {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            tracing::warn!("User {user_id} tried to access {} without admin rights", request.uri());
            refuse(Error::AdminOnly)
        }
        // A deleted user keeps a valid cookie until it expires.
        Err(Error::NotFound) => refuse(Error::AdminOnly),
        Err(error) => refuse(error),
    }
}
