//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use shepherd_learning::ModerationLearning;
use shepherd_oracle::OpenAiBackend;

use crate::config::Args;
use crate::error::Result;
use crate::routes;

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Largest request body accepted (bytes).
pub const MAX_BODY_BYTES: usize = 256 * 1024;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Classification and learning loop
    pub learning: Arc<ModerationLearning>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, learning: Arc<ModerationLearning>) -> Self {
        Self {
            args,
            learning,
            started_at: Instant::now(),
        }
    }

    /// Validate `args` and wire the OpenAI-compatible backend into the
    /// learning loop.
    pub fn build(args: Args) -> Result<Self> {
        args.validate()?;
        let config = args.learning()?;

        let backend = OpenAiBackend::new(
            args.llm_base_url.clone(),
            args.llm_model.clone(),
            args.llm_api_key.clone(),
            args.http_timeout(&config),
        )?;
        let learning = ModerationLearning::new(Arc::new(backend), config)?;

        Ok(Self::new(args, Arc::new(learning)))
    }
}

/// Accept connections until the process exits.
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Shepherd gateway listening on {} (model: {})",
        state.args.listen,
        state.learning.oracle().backend_id()
    );

    // Expired pending predictions are purged in the background
    let _sweeper = state.learning.spawn_maintenance();

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("[{}] {} {}", addr, method, path);

    let body = if method == Method::POST {
        match read_body(req.into_body()).await {
            Ok(body) => body,
            Err(response) => return Ok(to_boxed(response)),
        }
    } else {
        Bytes::new()
    };

    Ok(to_boxed(route(&state, &method, &path, &body).await))
}

/// Dispatch a request whose body has already been read.
pub async fn route(
    state: &AppState,
    method: &Method,
    path: &str,
    body: &Bytes,
) -> Response<Full<Bytes>> {
    let learning = state.learning.as_ref();

    match (method, path) {
        (&Method::OPTIONS, _) => preflight_response(),

        (&Method::GET, "/health") | (&Method::GET, "/healthz") => {
            routes::health_check(state).await
        }

        (&Method::POST, "/classify") => routes::handle_classify(learning, body).await,

        (&Method::POST, "/decisions") => routes::handle_record_decision(learning, body).await,

        (&Method::GET, "/feedback") => routes::handle_feedback(learning).await,

        (&Method::GET, "/stats") => routes::handle_stats(learning).await,

        _ => not_found_response(path),
    }
}

/// Collect a request body, giving up once it passes `MAX_BODY_BYTES`.
async fn read_body<B>(body: B) -> std::result::Result<Bytes, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            warn!("Request body exceeds {} bytes", MAX_BODY_BYTES);
            Err(routes::error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large",
            ))
        }
        Err(e) => {
            warn!("Request body error: {}", e);
            Err(routes::bad_request_response("Failed to read request body"))
        }
    }
}

/// Convert a Full<Bytes> body to BoxBody
fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
        "hint": "Available: POST /classify, POST /decisions, GET /feedback, GET /stats, GET /health"
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use clap::Parser;
    use shepherd_learning::LearningConfig;
    use shepherd_oracle::MockBackend;

    fn state() -> AppState {
        let backend = Arc::new(MockBackend::default().with_response(
            r#"{"priority":"critical","category":"privacy_violation","confidence":0.9}"#,
        ));
        let learning = ModerationLearning::new(backend, LearningConfig::default()).unwrap();
        AppState::new(Args::parse_from(["shepherd-gateway"]), Arc::new(learning))
    }

    #[tokio::test]
    async fn test_routes() {
        let state = state();

        let response = route(
            &state,
            &Method::POST,
            "/classify",
            &Bytes::from(r#"{"content":"Any personal info for sale?","contentType":"comment","contentId":"p-1"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = route(
            &state,
            &Method::POST,
            "/decisions",
            &Bytes::from(r#"{"contentId":"p-1","finalPriority":"critical","finalCategory":"privacy_violation","action":"removed","moderatorId":"m"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = route(&state, &Method::GET, "/feedback", &Bytes::new()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.learning.get_feedback().await.accuracy_rate, 1.0);
    }

    #[test]
    fn test_build_from_args() {
        let state = AppState::build(Args::parse_from(["shepherd-gateway", "--llm-model", "llama3.1"]))
            .unwrap();
        assert_eq!(state.learning.oracle().backend_id(), "llama3.1");

        let bad = Args::parse_from(["shepherd-gateway", "--oracle-timeout-ms", "0"]);
        assert!(matches!(AppState::build(bad), Err(GatewayError::Config(_))));
    }

    #[tokio::test]
    async fn test_body_size_limit() {
        let ok = read_body(Full::new(Bytes::from(vec![b'a'; MAX_BODY_BYTES])))
            .await
            .unwrap();
        assert_eq!(ok.len(), MAX_BODY_BYTES);

        let response = read_body(Full::new(Bytes::from(vec![b'a'; MAX_BODY_BYTES + 1])))
            .await
            .unwrap_err();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_preflight_and_not_found() {
        let state = state();

        let response = route(&state, &Method::OPTIONS, "/classify", &Bytes::new()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["Access-Control-Allow-Methods"],
            "GET, POST, OPTIONS"
        );

        let response = route(&state, &Method::GET, "/classify", &Bytes::new()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
