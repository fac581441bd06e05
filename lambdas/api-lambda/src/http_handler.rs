use lambda_http::{Body, Error, Request, RequestExt, Response};
use reservations_shared::{router, AppState};
use std::sync::Arc;
use tracing::Instrument;

/// Main Lambda handler - every outcome, including failures, becomes a JSON response
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let correlation_id = correlation_id(&event);
    tracing::info!(
        correlation_id = %correlation_id,
        "API Lambda invoked - Method: {} Path: {}",
        event.method(),
        event.uri().path()
    );

    // Every log line emitted while serving the request carries the id
    let span = tracing::info_span!("request", correlation_id = %correlation_id);
    let response = router::handle(&event, &state, &correlation_id)
        .instrument(span)
        .await?;

    tracing::info!(
        correlation_id = %correlation_id,
        "Responding with {}",
        response.status().as_u16()
    );
    Ok(response)
}

/// The Lambda request id when running under the runtime, otherwise a fresh one
fn correlation_id(event: &Request) -> String {
    event
        .lambda_context_ref()
        .map(|ctx| ctx.request_id.clone())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
