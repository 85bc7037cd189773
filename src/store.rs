use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::operation::batch_get_item::BatchGetItemOutput;
use aws_sdk_dynamodb::types::{AttributeValue, KeysAndAttributes};

use crate::config::Config;
use crate::error::StoreError;

pub const PARTITION_KEY: &str = "pk";
pub const SORT_KEY: &str = "sk";
pub const PERMISSIONS_ATTRIBUTE: &str = "permissions";

/// Permissions granted to members of `group` when signing in through `client_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRecord {
    pub client_id: String,
    pub group: String,
    pub permissions: BTreeSet<String>,
}

#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Fetches the records stored for each `(client_id, group)` pair in one
    /// round trip. Pairs without a record are simply absent from the result.
    async fn batch_get(
        &self,
        client_id: &str,
        groups: &[String],
    ) -> Result<Vec<PermissionRecord>, StoreError>;
}

/// DynamoDB table keyed by `pk` (client id) and `sk` (group name).
#[derive(Debug, Clone)]
pub struct DynamoPermissionStore {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoPermissionStore {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub async fn from_config(config: &Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        Self::new(aws_sdk_dynamodb::Client::new(&sdk_config), &config.table_name)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl PermissionStore for DynamoPermissionStore {
    async fn batch_get(
        &self,
        client_id: &str,
        groups: &[String],
    ) -> Result<Vec<PermissionRecord>, StoreError> {
        // BatchGetItem rejects a request that names the same key twice.
        let distinct: BTreeSet<&String> = groups.iter().collect();
        if distinct.is_empty() {
            return Ok(Vec::new());
        }

        let keys = distinct
            .into_iter()
            .map(|group| record_key(client_id, group))
            .collect::<Vec<_>>();
        let request = KeysAndAttributes::builder()
            .set_keys(Some(keys))
            .build()
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let output = self
            .client
            .batch_get_item()
            .request_items(&self.table_name, request)
            .send()
            .await
            .map_err(|e| StoreError::Request(DisplayErrorContext(&e).to_string()))?;

        let unprocessed = unprocessed_key_count(&output, &self.table_name);
        if unprocessed > 0 {
            log::warn!(
                "{} permission keys left unprocessed for client {} in table {}",
                unprocessed,
                client_id,
                self.table_name
            );
        }

        let items = output
            .responses()
            .and_then(|responses| responses.get(&self.table_name))
            .map(Vec::as_slice)
            .unwrap_or_default();

        Ok(items.iter().filter_map(record_from_item).collect())
    }
}

fn unprocessed_key_count(output: &BatchGetItemOutput, table_name: &str) -> usize {
    output
        .unprocessed_keys()
        .and_then(|pending| pending.get(table_name))
        .map_or(0, |keys| keys.keys().len())
}

fn record_key(client_id: &str, group: &str) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (PARTITION_KEY.to_string(), AttributeValue::S(client_id.to_string())),
        (SORT_KEY.to_string(), AttributeValue::S(group.to_string())),
    ])
}

fn record_from_item(item: &HashMap<String, AttributeValue>) -> Option<PermissionRecord> {
    let client_id = item.get(PARTITION_KEY)?.as_s().ok()?.clone();
    let group = item.get(SORT_KEY)?.as_s().ok()?.clone();
    let permissions = item
        .get(PERMISSIONS_ATTRIBUTE)
        .and_then(|value| value.as_ss().ok())
        .map(|set| set.iter().cloned().collect())
        .unwrap_or_default();

    Some(PermissionRecord {
        client_id,
        group,
        permissions,
    })
}

/// Map-backed store for tests and local runs. Counts every `batch_get` call.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    records: HashMap<(String, String), BTreeSet<String>>,
    calls: AtomicUsize,
    failing: bool,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every request fails, for exercising error propagation.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_record<I, P>(mut self, client_id: &str, group: &str, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.insert(client_id, group, permissions);
        self
    }

    pub fn insert<I, P>(&mut self, client_id: &str, group: &str, permissions: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.records.insert(
            (client_id.to_string(), group.to_string()),
            permissions.into_iter().map(Into::into).collect(),
        );
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn batch_get(
        &self,
        client_id: &str,
        groups: &[String],
    ) -> Result<Vec<PermissionRecord>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(StoreError::Request("store unavailable".to_string()));
        }

        let distinct: BTreeSet<&String> = groups.iter().collect();
        let records = distinct
            .into_iter()
            .filter_map(|group| {
                self.records
                    .get(&(client_id.to_string(), group.clone()))
                    .map(|permissions| PermissionRecord {
                        client_id: client_id.to_string(),
                        group: group.clone(),
                        permissions: permissions.clone(),
                    })
            })
            .collect();

        Ok(records)
    }
}
