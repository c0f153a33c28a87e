//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    AppState,
    auth::{
        admin_guard, auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page,
        post_log_in, register_user,
    },
    endpoints,
    error_pages::{get_404_not_found, get_internal_server_error_page},
    pages::{get_about_page, get_home_page, get_profile_page},
    record::{
        create_record_endpoint, delete_record_endpoint, edit_record_endpoint,
        get_edit_record_page, get_new_record_page,
    },
    report::{get_dashboard_page, get_table_page, post_table},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_home_page))
        .route(endpoints::ABOUT_VIEW, get(get_about_page))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TABLE_VIEW, get(get_table_page))
        .route(endpoints::PROFILE_VIEW, get(get_profile_page))
        .route(endpoints::NEW_RECORD_VIEW, get(get_new_record_page))
        .route(endpoints::EDIT_RECORD_VIEW, get(get_edit_record_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // The admin guard needs the user ID, so it must run inside the auth guard.
    let admin_routes = Router::new()
        .route(endpoints::RECORD, delete(delete_record_endpoint))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_guard));

    // These routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_api_routes = Router::new()
        .route(endpoints::TABLE_VIEW, post(post_table))
        .route(endpoints::RECORDS_API, post(create_record_endpoint))
        .route(endpoints::RECORD, put(edit_record_endpoint))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx));

    let router = protected_routes
        .merge(protected_api_routes)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state);

    add_tracing_layer(router)
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request| {
            let method = request.method();
            let uri = request.uri();

            let matched_path = request
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        AppState, Error,
        auth::{
            COOKIE_TOKEN, Email, NewUser, PasswordHash, UserName, ValidatedPassword, create_user,
        },
        endpoints::{self, format_endpoint},
        record::get_record,
    };

    use super::build_router;

    const PASSWORD: &str = "averysafeandsecurepassword";

    fn get_test_server(is_admin: bool) -> (TestServer, AppState) {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, "42", "Etc/UTC").unwrap();
        {
            let connection = state.db_connection.lock().unwrap();
            create_user(
                NewUser {
                    name: UserName::new_unchecked("Test"),
                    email: Email::new_unchecked("test@example.com"),
                    password_hash: PasswordHash::new(ValidatedPassword::new_unchecked(PASSWORD), 4)
                        .unwrap(),
                    is_admin,
                },
                &connection,
            )
            .unwrap();
        }

        let server =
            TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

        (server, state)
    }

    async fn log_in(server: &TestServer) -> Cookie<'static> {
        server
            .post(endpoints::LOG_IN_API)
            .form(&[("email", "test@example.com"), ("password", PASSWORD)])
            .await
            .cookie(COOKIE_TOKEN)
    }

    #[tokio::test]
    async fn public_pages_are_reachable() {
        let (server, _) = get_test_server(false);

        for endpoint in [
            endpoints::ROOT,
            endpoints::ABOUT_VIEW,
            endpoints::LOG_IN_VIEW,
            endpoints::REGISTER_VIEW,
        ] {
            let response = server.get(endpoint).await;

            assert_eq!(
                response.status_code(),
                StatusCode::OK,
                "want 200 OK for {endpoint}"
            );
        }
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (server, _) = get_test_server(false);

        server.get("/does/not/exist").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn pages_redirect_to_log_in_when_logged_out() {
        let (server, _) = get_test_server(false);

        for endpoint in [
            endpoints::DASHBOARD_VIEW,
            endpoints::TABLE_VIEW,
            endpoints::PROFILE_VIEW,
            endpoints::NEW_RECORD_VIEW,
        ] {
            let response = server.get(endpoint).await;

            response.assert_status_see_other();
            assert!(
                response.header("location").to_str().unwrap().starts_with(endpoints::LOG_IN_VIEW),
                "want redirect to log in for {endpoint}"
            );
        }
    }

    #[tokio::test]
    async fn api_redirects_to_log_in_when_logged_out() {
        let (server, _) = get_test_server(false);

        let response = server
            .post(endpoints::RECORDS_API)
            .form(&[("date", "2023-03-15")])
            .await;

        let redirect = response.header("hx-redirect");
        assert!(
            redirect.to_str().unwrap().starts_with(endpoints::LOG_IN_VIEW),
            "got {redirect:?}"
        );
    }

    #[tokio::test]
    async fn logged_in_user_can_add_and_view_records() {
        let (server, state) = get_test_server(false);
        let token = log_in(&server).await;

        let response = server
            .post(endpoints::RECORDS_API)
            .add_cookie(token.clone())
            .form(&[("date", "2023-03-15"), ("jalgaon_memo", "500"), ("advance", "100")])
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("hx-redirect"), endpoints::TABLE_VIEW);
        {
            let connection = state.db_connection.lock().unwrap();
            let record = get_record(date!(2023 - 03 - 15), &connection).unwrap();
            assert_eq!(record.income.jalgaon_memo, 500);
            assert_eq!(record.expenses.advance, 100);
        }

        let response = server
            .post(endpoints::TABLE_VIEW)
            .add_cookie(token.clone())
            .form(&[("mpicker", "2023-03")])
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("2023-03-15"));

        server
            .get(&format_endpoint(endpoints::EDIT_RECORD_VIEW, date!(2023 - 03 - 15)))
            .add_cookie(token)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn only_admins_can_delete_records() {
        let (server, state) = get_test_server(false);
        let token = log_in(&server).await;
        server
            .post(endpoints::RECORDS_API)
            .add_cookie(token.clone())
            .form(&[("date", "2023-03-15")])
            .await;

        let response = server
            .delete(&format_endpoint(endpoints::RECORD, date!(2023 - 03 - 15)))
            .add_cookie(token)
            .add_header("HX-Request", "true")
            .await;

        response.assert_status_forbidden();
        let connection = state.db_connection.lock().unwrap();
        assert!(get_record(date!(2023 - 03 - 15), &connection).is_ok());
    }

    #[tokio::test]
    async fn admins_can_delete_records() {
        let (server, state) = get_test_server(true);
        let token = log_in(&server).await;
        server
            .post(endpoints::RECORDS_API)
            .add_cookie(token.clone())
            .form(&[("date", "2023-03-15")])
            .await;

        let response = server
            .delete(&format_endpoint(endpoints::RECORD, date!(2023 - 03 - 15)))
            .add_cookie(token)
            .add_header("HX-Request", "true")
            .await;

        response.assert_status_ok();
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_record(date!(2023 - 03 - 15), &connection),
            Err(Error::NotFound)
        );
    }
}
