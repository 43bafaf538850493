//! Admin token middleware.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};

use pricing_types::CurrencyRepository;

use super::handlers::{AppState, error_response};

/// Extracts the token from an Authorization header.
/// Accepts `"Bearer <token>"` or the bare token.
fn extract_token(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?;
    Some(header.strip_prefix("Bearer ").unwrap_or(header).trim())
}

/// Guards the admin routes.
///
/// The presented token is hashed with SHA-256 and compared in constant time
/// against the configured hash. With no admin token configured every admin
/// request is rejected.
pub async fn admin_auth<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(stored_hash) = state.admin_token_hash.as_deref() else {
        return error_response(StatusCode::UNAUTHORIZED, "Admin API is disabled");
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match extract_token(auth_header) {
        Some(token) if !token.is_empty() => {
            if pricing_repo::security::verify_token(token, stored_hash) {
                next.run(request).await
            } else {
                tracing::warn!(path = %request.uri().path(), "Rejected admin token");
                error_response(StatusCode::UNAUTHORIZED, "Invalid admin token")
            }
        }
        _ => error_response(
            StatusCode::UNAUTHORIZED,
            "Missing or invalid Authorization header",
        ),
    }
}
