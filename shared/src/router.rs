use lambda_http::{http::Method, Body, Error, Request, RequestExt, Response};

use crate::auth::bearer_token;
use crate::error::ApiError;
use crate::identity::{IdentityError, IdentityProvider};
use crate::types::Identity;
use crate::{reservations, tables, users, AppState};

/// Route a request to its operation.
///
/// | Path             | Method | Operation           | Bearer token |
/// |------------------|--------|---------------------|--------------|
/// | `/signup`        | POST   | register user       | no           |
/// | `/signin`        | POST   | authenticate user   | no           |
/// | `/tables`        | GET    | list tables         | yes          |
/// | `/tables`        | POST   | create table        | yes          |
/// | `/tables/{id}`   | GET    | get table by id     | yes          |
/// | `/reservations`  | POST   | create reservation  | yes          |
/// | `/reservations`  | GET    | list reservations   | yes          |
///
/// Anything else is a 400 "Invalid request".
pub async fn dispatch(event: &Request, state: &AppState) -> Result<Response<Body>, ApiError> {
    let method = event.method();
    let path = route_path(event);
    let body: &[u8] = event.body();
    let config = &state.config;

    let segments: Vec<&str> = path.strip_prefix('/').unwrap_or(path).split('/').collect();

    match (method, segments.as_slice()) {
        (&Method::POST, ["signup"]) => {
            users::signup(state.identity.as_ref(), &config.password_policy, body).await
        }
        (&Method::POST, ["signin"]) => users::signin(state.identity.as_ref(), body).await,

        // --- TABLES ---
        (&Method::GET, ["tables"]) => {
            authorize(event, state.identity.as_ref()).await?;
            tables::list_tables(state.store.as_ref(), &config.tables_table).await
        }
        (&Method::POST, ["tables"]) => {
            authorize(event, state.identity.as_ref()).await?;
            tables::create_table(state.store.as_ref(), &config.tables_table, body).await
        }
        (&Method::GET, ["tables", table_id]) if !table_id.is_empty() => {
            authorize(event, state.identity.as_ref()).await?;
            tables::get_table(state.store.as_ref(), &config.tables_table, table_id).await
        }

        // --- RESERVATIONS ---
        (&Method::POST, ["reservations"]) => {
            authorize(event, state.identity.as_ref()).await?;
            reservations::create_reservation(
                state.store.as_ref(),
                &config.reservations_table,
                body,
            )
            .await
        }
        (&Method::GET, ["reservations"]) => {
            authorize(event, state.identity.as_ref()).await?;
            reservations::list_reservations(state.store.as_ref(), &config.reservations_table)
                .await
        }

        _ => {
            tracing::warn!("No route matched - Method: {} Path: {}", method, path);
            Err(ApiError::validation("Invalid request"))
        }
    }
}

/// Dispatch and render any failure as the error envelope.
pub async fn handle(
    event: &Request,
    state: &AppState,
    correlation_id: &str,
) -> Result<Response<Body>, Error> {
    match dispatch(event, state).await {
        Ok(response) => Ok(response),
        Err(e) => Ok(e.into_response(correlation_id).map_err(Box::new)?),
    }
}

/// Path as the client sent it. API Gateway REST events put the stage in
/// front of the URI path (`/api/signin`); the raw path from the event does
/// not carry it. Requests built outside the runtime have no raw path.
fn route_path(event: &Request) -> &str {
    match event.raw_http_path() {
        "" => event.uri().path(),
        raw => raw,
    }
}

/// Require a bearer token the identity provider accepts.
async fn authorize(event: &Request, identity: &dyn IdentityProvider) -> Result<Identity, ApiError> {
    let token = bearer_token(event.headers())
        .ok_or_else(|| ApiError::Unauthorized("Missing access token".to_string()))?;

    match identity.verify_token(token).await {
        Ok(caller) => {
            tracing::debug!("Request authorized for {}", caller.username);
            Ok(caller)
        }
        Err(IdentityError::InvalidToken) => Err(ApiError::Unauthorized(
            "Invalid or expired access token".to_string(),
        )),
        Err(e) => Err(ApiError::collaborator("Cannot verify access token", e)),
    }
}
