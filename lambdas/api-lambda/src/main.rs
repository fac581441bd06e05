use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{run, service_fn, tracing, Error, Request};
use reservations_shared::auth::CognitoIdentityProvider;
use reservations_shared::config::Config;
use reservations_shared::dynamo::DynamoItemStore;
use reservations_shared::AppState;
use std::sync::Arc;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // Fail the cold start, not every request, when configuration is incomplete
    let config = Config::from_env()?;
    tracing::info!(
        "Starting with tables_table={} reservations_table={}",
        config.tables_table,
        config.reservations_table
    );

    // Initialize AWS clients once at startup
    let aws_config = aws_config::load_from_env().await;

    let identity = CognitoIdentityProvider::new(
        CognitoClient::new(&aws_config),
        config.user_pool_id.clone(),
        config.client_id.clone(),
        config.client_secret.clone(),
    );
    let store = DynamoItemStore::new(DynamoClient::new(&aws_config));

    let state = AppState::new(config, Arc::new(identity), Arc::new(store));

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
