use axum::{Json, Router, routing::get};
use serde::Serialize;

/// Body of the `/healthz` response. Uptime monitors only look at the status
/// code, the body is for humans poking the endpoint by hand.
#[derive(Serialize)]
struct Health {
    ok: bool,
}

async fn healthz() -> Json<Health> {
    Json(Health { ok: true })
}

async fn banner() -> &'static str {
    "Bot is running"
}

/// The liveness routes. In webhook mode this router is merged into the
/// Telegram update router so a single listener serves both. Every path
/// other than `/healthz` answers with the banner, so uptime monitors can
/// point anywhere.
pub fn router() -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .fallback(banner)
}

pub async fn run(addr: std::net::SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind health listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(listener).await {
        tracing::error!("health server failed: {err}");
    }
}

pub async fn run_with_listener(listener: tokio::net::TcpListener) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Health server listening on {}", addr);

    axum::serve(listener, router()).await
}

pub fn spawn_with_listener(
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(listener).await {
            tracing::error!("health server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn healthz_reports_ok() {
        let res = router()
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "ok": true }));
    }

    #[tokio::test]
    async fn root_serves_banner() {
        let res = router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn any_other_path_serves_banner() {
        let res = router()
            .oneshot(
                Request::builder()
                    .uri("/some/other/path")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Bot is running");
    }
}
