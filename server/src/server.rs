use crate::config::AppConfig;
use crate::routes;
use crate::state::AppState;
use axum::{routing::get, Router};
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/texts",
            get(routes::get_texts)
                .post(routes::create_text)
                .put(routes::update_text)
                .delete(routes::delete_text),
        )
        .route("/texts/reading", get(routes::get_reading))
        .route(
            "/dictionary",
            get(routes::get_dictionary)
                .post(routes::create_entry)
                .put(routes::update_entry)
                .delete(routes::delete_entry),
        )
        .route("/dictionary/lookup", get(routes::lookup_word))
}

/// The full application: `/api` routes plus, when configured, the static
/// front-end for every other path.
pub fn build_router(app_state: AppState, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new().nest("/api", api_routes());
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn start_server(
    config: &AppConfig,
    app_state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(app_state, config.static_dir.as_deref());

    let listener = TcpListener::bind(config.listen).await?;
    let addr = listener.local_addr()?;
    info!(%addr, data_dir = %config.data_dir.display(), "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DataDir;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if body.is_some() {
            request = request.header("content-type", "application/json");
        }
        let request = request
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn app(dir: &TempDir, static_dir: Option<&Path>) -> Router {
        build_router(AppState::new(&DataDir::new(dir.path())), static_dir)
    }

    #[tokio::test]
    async fn api_routes_are_nested_and_method_routed() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, None);

        let (status, body) = send(&app, Method::GET, "/api/texts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "data": []}));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/texts",
            Some(r#"{"title": "Metta", "content": "Sabbe satta"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) =
            send(&app, Method::GET, &format!("/api/texts/reading?id={id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["verses"][0]["content"], "Sabbe satta");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/dictionary",
            Some(
                r#"{"word": "satta", "katakana": "サッター",
                    "translations": {"ja": "生けるもの", "en": "beings"}}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["word"], "satta");

        let (status, body) =
            send(&app, Method::GET, "/api/dictionary/lookup?token=Satta,", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["katakana"], "サッター");

        let (status, _) = send(&app, Method::DELETE, "/api/dictionary?word=satta", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::DELETE, &format!("/api/texts?id={id}"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_body_is_400() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, None);

        let (status, body) = send(&app, Method::POST, "/api/texts", Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "error": "Invalid request body"}));

        let (status, body) =
            send(&app, Method::POST, "/api/texts", Some(r#"{"content": "no title"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
        assert!(!dir.path().join("texts.json").exists());
    }

    #[tokio::test]
    async fn unknown_keys_through_the_router() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, None);

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/dictionary",
            Some(r#"{"word": "zz", "katakana": "ズ"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"success": false, "error": "Failed to update dictionary entry"})
        );

        let (status, body) =
            send(&app, Method::GET, "/api/texts/reading?id=text-missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Text not found");

        let (status, body) = send(&app, Method::GET, "/api/dictionary?word=1st", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn static_dir_serves_paths_outside_api() {
        let dir = TempDir::new().unwrap();
        let site = TempDir::new().unwrap();
        fs::write(site.path().join("index.json"), r#"{"page": "home"}"#).unwrap();
        let app = app(&dir, Some(site.path()));

        let (status, body) = send(&app, Method::GET, "/index.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], "home");

        let (status, body) = send(&app, Method::GET, "/api/dictionary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));
    }
}
