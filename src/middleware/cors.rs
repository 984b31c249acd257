use axum::{
    body::Body,
    extract::State,
    http::{
        header::{self, HeaderValue},
        Method, Request, Response, StatusCode,
    },
    middleware::Next,
};
use tracing::debug;

use crate::app::AppState;
use crate::app_config::AppConfig;

/// Pick the origin to echo back, if any.
///
/// A `*` entry reflects any origin outside production; otherwise the
/// origin must be listed explicitly.
pub fn resolve_allowed_origin(config: &AppConfig, origin: Option<&str>) -> Option<HeaderValue> {
    let origin = origin?;
    let has_wildcard = config.cors_allowed_origins.iter().any(|o| o == "*");

    let allowed = if has_wildcard && !config.is_production() {
        debug!("CORS: Reflecting origin: {}", origin);
        true
    } else if config.cors_allowed_origins.iter().any(|o| o == origin) {
        debug!("CORS: Origin allowed from whitelist: {}", origin);
        true
    } else {
        debug!("CORS: Origin not in whitelist: {}", origin);
        false
    };

    if allowed {
        HeaderValue::from_str(origin).ok()
    } else {
        None
    }
}

/// CORS middleware for the browser dashboard
pub async fn dynamic_cors_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response<Body>, StatusCode> {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok());
    let allowed_origin = resolve_allowed_origin(&state.config, origin);

    // Preflight never reaches the router
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());

        if let Some(allowed) = allowed_origin {
            let headers = response.headers_mut();
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allowed);
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, POST, OPTIONS"),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("content-type, accept, origin, x-requested-with"),
            );
            headers.insert(
                header::ACCESS_CONTROL_MAX_AGE,
                HeaderValue::from_static("3600"),
            );
        }

        *response.status_mut() = StatusCode::OK;
        return Ok(response);
    }

    let mut response = next.run(req).await;

    if let Some(allowed) = allowed_origin {
        response
            .headers_mut()
            .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allowed);
        response
            .headers_mut()
            .insert(header::VARY, HeaderValue::from_static("origin"));
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::Environment;

    fn config_with(origins: &[&str], environment: Environment) -> AppConfig {
        let mut config = AppConfig::from_env().expect("config");
        config.cors_allowed_origins = origins.iter().map(|o| o.to_string()).collect();
        config.environment = environment;
        config
    }

    #[test]
    #[serial_test::serial]
    fn test_wildcard_reflects_outside_production() {
        let config = config_with(&["*"], Environment::Development);
        assert_eq!(
            resolve_allowed_origin(&config, Some("http://localhost:3000")),
            Some(HeaderValue::from_static("http://localhost:3000"))
        );

        let config = config_with(&["*"], Environment::Production);
        assert_eq!(
            resolve_allowed_origin(&config, Some("http://localhost:3000")),
            None
        );
    }

    #[test]
    #[serial_test::serial]
    fn test_whitelist() {
        let config = config_with(&["https://dash.example.com"], Environment::Production);
        assert!(resolve_allowed_origin(&config, Some("https://dash.example.com")).is_some());
        assert!(resolve_allowed_origin(&config, Some("https://evil.example.com")).is_none());
        assert!(resolve_allowed_origin(&config, None).is_none());
    }
}
