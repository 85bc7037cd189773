use fine_grained_permissions::{enrich, PermissionStore, PreTokenGenerationEvent};
use lambda_runtime::{Error, LambdaEvent};

/// Pre-token-generation trigger: adds the caller's group permissions to the
/// identity and access token claims.
///
/// Store failures are returned as errors, which fails the sign-in.
pub async fn handler<S>(
    store: &S,
    event: LambdaEvent<PreTokenGenerationEvent>,
) -> Result<PreTokenGenerationEvent, Error>
where
    S: PermissionStore + ?Sized,
{
    let (event, context) = event.into_parts();

    if log::log_enabled!(log::Level::Debug) {
        if let Ok(body) = serde_json::to_string_pretty(&event) {
            log::debug!("Request {}: {}", context.request_id, body);
        }
    }

    Ok(enrich(store, event).await?)
}
