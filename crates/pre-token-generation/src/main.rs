use env_logger::Env;
use fine_grained_permissions::{Config, DynamoPermissionStore, PreTokenGenerationEvent};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use pre_token_generation::handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env()?;
    let store = DynamoPermissionStore::from_config(&config).await;
    log::info!("Reading permissions from table {}", store.table_name());

    let store = &store;
    let func = service_fn(move |event: LambdaEvent<PreTokenGenerationEvent>| async move {
        handler(store, event).await
    });
    lambda_runtime::run(func).await?;
    Ok(())
}
