use std::collections::BTreeSet;

use crate::error::EnrichError;
use crate::store::PermissionStore;
use crate::trigger::{
    ClaimsAndScopeOverrideDetails, PreTokenGenerationEvent, PreTokenGenerationResponse,
    TokenGenerationOverride,
};

pub const PERMISSIONS_CLAIM: &str = "permissions";

/// Union of the permissions stored for `client_id` across `groups`.
///
/// An empty group list never reaches the store.
pub async fn resolve_permissions<S>(
    store: &S,
    client_id: &str,
    groups: &[String],
) -> Result<BTreeSet<String>, EnrichError>
where
    S: PermissionStore + ?Sized,
{
    if groups.is_empty() {
        return Ok(BTreeSet::new());
    }

    let records = store.batch_get(client_id, groups).await?;
    Ok(records
        .into_iter()
        .flat_map(|record| record.permissions)
        .collect())
}

pub fn join_permissions(permissions: &BTreeSet<String>) -> String {
    permissions
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Fills in the trigger response: the caller's attributes, plus a
/// `permissions` claim when the caller belongs to any group, are added to
/// both the identity and the access token.
pub async fn enrich<S>(
    store: &S,
    mut event: PreTokenGenerationEvent,
) -> Result<PreTokenGenerationEvent, EnrichError>
where
    S: PermissionStore + ?Sized,
{
    let mut claims = event.request.user_attributes.clone();
    let groups = &event.request.group_configuration.groups_to_override;

    if !groups.is_empty() {
        let client_id = &event.caller_context.client_id;
        let permissions = resolve_permissions(store, client_id, groups).await?;
        log::info!(
            "Resolved {} permissions for client {} across {} groups",
            permissions.len(),
            client_id,
            groups.len()
        );
        claims.insert(PERMISSIONS_CLAIM.to_string(), join_permissions(&permissions));
    }

    event.response = PreTokenGenerationResponse {
        claims_and_scope_override_details: ClaimsAndScopeOverrideDetails {
            id_token_generation: Some(TokenGenerationOverride::claims(claims.clone())),
            access_token_generation: Some(TokenGenerationOverride::claims(claims)),
            group_override_details: None,
        },
    };

    Ok(event)
}
