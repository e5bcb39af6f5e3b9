use crate::body::JobOutcome;
use crate::error::ServerError;
use crate::gate::Gate;
use crate::job::{JobParameters, JobRequest};
use crate::reporter::JobReporter;
use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

pub(crate) fn router<R: JobReporter + Sync + 'static>(gate: Arc<Gate<R>>) -> Router {
    Router::new()
        .route("/run", post(run::<R>))
        .route("/health", get(health))
        .with_state(gate)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

pub(crate) async fn server_task<R: JobReporter + Sync + 'static>(
    port: u16,
    gate: Arc<Gate<R>>,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let socket_addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    let listener = TcpListener::bind(socket_addr).await?;
    serve(listener, gate, shutdown).await
}

pub(crate) async fn serve<R: JobReporter + Sync + 'static>(
    listener: TcpListener,
    gate: Arc<Gate<R>>,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(gate))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    debug!("Server shut down");
    Ok(())
}

/// Runs the job to completion before answering.
///
/// The body is read as plain JSON first so a request that fails to deserialize still gets an
/// error body naming its environment and target.
async fn run<R: JobReporter + Sync + 'static>(
    State(gate): State<Arc<Gate<R>>>,
    body: Result<Json<Value>, JsonRejection>,
) -> JobOutcome {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("Rejected job request: {rejection}");
            let error = format!("Invalid job request: {}", rejection.body_text());
            return gate.reject(None, &JobParameters::default(), error).await;
        }
    };

    match JobRequest::deserialize(&body) {
        Ok(request) => gate.run_job(request).await,
        Err(err) => {
            warn!("Rejected job request: {err}");
            let salvaged = JobRequest::salvage(&body);
            let error = format!("Invalid job request: {err}");
            gate.reject(salvaged.job_id.as_deref(), &salvaged.parameters, error)
                .await
        }
    }
}

async fn health() -> StatusCode {
    StatusCode::OK
}

impl IntoResponse for JobOutcome {
    fn into_response(self) -> Response {
        let status = match self {
            JobOutcome::Completed(_) => StatusCode::OK,
            JobOutcome::Errored(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}
