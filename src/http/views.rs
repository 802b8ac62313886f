//! XML view rendering.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use minijinja::{Value, context};

use crate::errors::HttpError;
use crate::http::context::AppState;
use crate::http::errors::{ApiError, ErrorMessage};

const XML_CONTENT_TYPE: &str = "application/xml";
const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

fn render_body(state: &AppState, template: &str, ctx: Value) -> Result<String, HttpError> {
    state
        .templates
        .get_template(template)
        .and_then(|t| t.render(ctx))
        .map_err(|e| HttpError::TemplateRenderingFailed(format!("{}: {}", template, e)))
}

fn xml_headers(headers: &mut http::HeaderMap) {
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
}

/// Render an XML view with the given status
pub fn render(
    state: &AppState,
    status: StatusCode,
    template: &str,
    ctx: Value,
) -> Result<Response, ApiError> {
    let body = render_body(state, template, ctx)?;
    let mut response = (status, body).into_response();
    xml_headers(response.headers_mut());
    Ok(response)
}

/// Render the success view
pub fn success(state: &AppState, status: StatusCode, message: &str) -> Result<Response, ApiError> {
    render(state, status, "success.xml", context! { message })
}

/// Replace the body of every error response with the XML error view.
///
/// Handler errors carry their message in an [`ErrorMessage`] extension;
/// framework rejections (unknown route, bad path parameter, oversized body)
/// fall back to the status reason phrase.
pub async fn render_error_views(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let message = response
        .extensions()
        .get::<ErrorMessage>()
        .map(|m| m.0.clone())
        .unwrap_or_else(|| {
            format!("{}.", status.canonical_reason().unwrap_or("Request failed"))
        });

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);

    match render_body(
        &state,
        "error.xml",
        context! { code => status.as_u16(), message },
    ) {
        Ok(body) => {
            xml_headers(&mut parts.headers);
            Response::from_parts(parts, Body::from(body))
        }
        Err(err) => {
            tracing::error!(error = ?err, "error view rendering failed");
            parts.headers.remove(CONTENT_TYPE);
            Response::from_parts(parts, Body::empty())
        }
    }
}
