use std::{collections::BTreeMap, time::Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use metrics::{counter, histogram};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::error::{ErrorReport, HttpError};
use crate::presentation::views::render_error_page;

use super::AppState;

/// Request-scoped correlation data, attached before anything else runs.
#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

/// Parsed JSON request body, attached when the request carries a JSON
/// content type.
#[derive(Debug, Clone)]
pub struct JsonBody(pub serde_json::Value);

/// Parsed urlencoded form body: a flat name → values mapping. Repeated
/// names accumulate; nested keys are not expanded.
#[derive(Debug, Clone, Default)]
pub struct FormBody(pub BTreeMap<String, Vec<String>>);

impl FormBody {
    pub fn first(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// Cookie name → value mapping parsed from the `Cookie` header. Requests
/// without the header carry an empty mapping.
#[derive(Debug, Clone, Default)]
pub struct RequestCookies(pub BTreeMap<String, String>);

impl RequestCookies {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Development-verbose request logging: one line per completed request,
/// with the diagnostic chain for failures.
pub async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();

    counter!(
        "brezza_http_requests_total",
        "method" => method.to_string(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    histogram!("brezza_http_request_duration_ms").record(elapsed_ms as f64);

    if status.is_client_error() || status.is_server_error() {
        let report = response.extensions().get::<ErrorReport>();
        let (source, detail, chain) = match report {
            Some(report) => (
                report.source,
                report
                    .messages
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "no diagnostic available".to_string()),
                report.messages.clone(),
            ),
            None => ("unknown", "no diagnostic available".to_string(), Vec::new()),
        };

        if status.is_server_error() {
            error!(
                target = "brezza::http::request",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?chain,
                request_id = request_id,
                "request failed",
            );
        } else {
            warn!(
                target = "brezza::http::request",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                request_id = request_id,
                "client request error",
            );
        }
    } else {
        info!(
            target = "brezza::http::request",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            query = uri.query().unwrap_or(""),
            elapsed_ms = elapsed_ms,
            request_id = request_id,
            "request completed",
        );
    }

    response
}

/// Buffer and parse JSON request bodies, attaching the value for downstream
/// handlers. Malformed JSON becomes a 400 carried to the error renderer.
pub async fn parse_json_body(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    const SOURCE: &str = "infra::http::middleware::parse_json_body";

    if !content_type_is(request.headers(), "application/json") {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return HttpError::from_error(
                SOURCE,
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large",
                &err,
            )
            .into_response();
        }
    };

    let mut request = Request::from_parts(parts, Body::from(bytes.clone()));
    if !bytes.is_empty() {
        match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(value) => {
                request.extensions_mut().insert(JsonBody(value));
            }
            Err(err) => {
                return HttpError::from_error(
                    SOURCE,
                    StatusCode::BAD_REQUEST,
                    "Malformed JSON body",
                    &err,
                )
                .into_response();
            }
        }
    }

    next.run(request).await
}

/// Buffer and parse urlencoded form bodies into a flat field mapping.
pub async fn parse_form_body(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    const SOURCE: &str = "infra::http::middleware::parse_form_body";

    if !content_type_is(request.headers(), "application/x-www-form-urlencoded") {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return HttpError::from_error(
                SOURCE,
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large",
                &err,
            )
            .into_response();
        }
    };

    let mut request = Request::from_parts(parts, Body::from(bytes.clone()));
    request
        .extensions_mut()
        .insert(FormBody(collect_form_fields(&bytes)));

    next.run(request).await
}

/// Parse the `Cookie` header into a name → value mapping. An absent header
/// yields an empty mapping, never an error.
pub async fn parse_cookies(mut request: Request<Body>, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let cookies = RequestCookies(
        jar.iter()
            .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
            .collect(),
    );
    request.extensions_mut().insert(cookies);

    next.run(request).await
}

/// Terminal error renderer: every error-status response leaving the router
/// is replaced by the rendered error view. The public message always shows;
/// the diagnostic chain renders only in development.
pub async fn render_error_pages(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let report = response
        .extensions_mut()
        .remove::<ErrorReport>()
        .unwrap_or_else(|| {
            ErrorReport::from_message(
                "infra::http::middleware::render_error_pages",
                status,
                status.canonical_reason().unwrap_or("Error"),
                format!("response completed with status {status} and no diagnostic"),
            )
        });

    counter!("brezza_http_errors_total").increment(1);

    let detail = if state.env.is_development() {
        report.messages.clone()
    } else {
        Vec::new()
    };

    let mut rendered = render_error_page(
        state.site.clone(),
        status,
        report.public_message.clone(),
        detail,
    );
    report.attach(&mut rendered);
    rendered
}

fn content_type_is(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .eq_ignore_ascii_case(expected)
        })
        .unwrap_or(false)
}

fn collect_form_fields(bytes: &[u8]) -> BTreeMap<String, Vec<String>> {
    let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in url::form_urlencoded::parse(bytes) {
        fields
            .entry(name.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn content_type_matching_ignores_parameters_and_case() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("Application/JSON; charset=utf-8"),
        );
        assert!(content_type_is(&headers, "application/json"));
        assert!(!content_type_is(
            &headers,
            "application/x-www-form-urlencoded"
        ));

        let empty = HeaderMap::new();
        assert!(!content_type_is(&empty, "application/json"));
    }

    #[test]
    fn form_fields_accumulate_repeated_names() {
        let form = FormBody(collect_form_fields(b"a=1&b=2&a=3"));
        assert_eq!(form.0["a"], vec!["1", "3"]);
        assert_eq!(form.0["b"], vec!["2"]);
        assert_eq!(form.first("a"), Some("1"));
        assert_eq!(form.first("missing"), None);
    }

    #[test]
    fn form_fields_decode_percent_escapes_flat() {
        let fields = collect_form_fields(b"user%5Bname%5D=ada&note=a+b");
        // Bracketed names stay literal keys; nothing expands into nesting.
        assert_eq!(fields["user[name]"], vec!["ada"]);
        assert_eq!(fields["note"], vec!["a b"]);
    }

    #[test]
    fn cookie_header_parses_into_flat_mapping() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("a=1; b=2"));
        let jar = CookieJar::from_headers(&headers);
        let cookies = RequestCookies(
            jar.iter()
                .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
                .collect(),
        );

        assert_eq!(cookies.get("a"), Some("1"));
        assert_eq!(cookies.get("b"), Some("2"));
        assert_eq!(cookies.get("missing"), None);
    }
}
