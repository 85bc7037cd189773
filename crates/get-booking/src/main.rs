use chrono::Utc;
use env_logger::Env;
use get_booking::{handle, ProxyRequest, ProxyResponse};
use lambda_runtime::{service_fn, Error, LambdaEvent};

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let func = service_fn(handler);
    lambda_runtime::run(func).await?;
    Ok(())
}

async fn handler(event: LambdaEvent<ProxyRequest>) -> Result<ProxyResponse, Error> {
    let (request, context) = event.into_parts();
    log::debug!(
        "Request {} {:?} {:?}",
        context.request_id,
        request.http_method,
        request.path
    );

    Ok(handle(&request, Utc::now())?)
}
