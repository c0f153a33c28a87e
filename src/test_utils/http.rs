use axum::{body::Body, http::StatusCode, response::Response};

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    let got = response.status();
    assert_eq!(got, StatusCode::OK, "want status 200 OK, got {got}");
}

#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    let got = response
        .headers()
        .get("hx-redirect")
        .unwrap_or_else(|| panic!("want HX-Redirect to {endpoint}, got no header"))
        .to_str()
        .expect("HX-Redirect header is not valid ASCII");

    assert_eq!(got, endpoint, "want HX-Redirect to {endpoint}, got {got}");
}
