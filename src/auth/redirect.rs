//! Where to send a user after they log in.
//!
//! A protected page remembers itself in the log-in URL's `redirect_url`
//! query parameter. HTMX calls to `/api` remember the page they were made
//! from, taken from the `HX-Current-URL` header.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// Reduce `raw_url` to a same-site path and query, or `None` if it points
/// somewhere else or back at the log-in page.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    same_site_path(&uri)
}

fn same_site_path(uri: &Uri) -> Option<String> {
    let path_and_query = uri.path_and_query()?;
    let path = path_and_query.path();

    // "//host" is a protocol-relative URL to another site.
    if !path.starts_with('/') || path.starts_with("//") || path == endpoints::LOG_IN_VIEW {
        return None;
    }

    Some(path_and_query.as_str().to_owned())
}

/// The page an HTMX request was made from.
fn hx_current_page(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_htmx = headers
        .get("hx-request")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));

    if !is_htmx {
        tracing::warn!("API request to {} is missing the HX-Request header", request.uri());
        return None;
    }

    let current_url = headers
        .get("hx-current-url")
        .and_then(|value| value.to_str().ok())?;
    // HTMX sends the full URL, so the host is dropped before the same-site check.
    let page = current_url.parse::<Uri>().ok().and_then(|uri| same_site_path(&uri));

    if page.is_none() {
        tracing::warn!("Ignoring HX-Current-URL {current_url}");
    }

    page
}

/// The log-in page URL with `target` as the page to return to.
pub(super) fn log_in_url_with_target(target: &str) -> String {
    match serde_urlencoded::to_string([("redirect_url", target)]) {
        Ok(query) => format!("{}?{query}", endpoints::LOG_IN_VIEW),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {target}: {error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

/// The log-in page URL that returns the user to where `request` was made from.
///
/// Falls back to the dashboard when the original page cannot be worked out.
pub fn build_log_in_redirect_url(request: &Request) -> String {
    let target = if request.uri().path().starts_with("/api") {
        hx_current_page(request)
    } else {
        request.uri().path_and_query().and_then(|path_and_query| {
            normalize_redirect_url(path_and_query.as_str())
        })
    };

    log_in_url_with_target(target.as_deref().unwrap_or(endpoints::DASHBOARD_VIEW))
}
