use crate::error::ConfigError;

pub const TABLE_NAME_VAR: &str = "TABLE_NAME";
pub const REGION_VAR: &str = "PERMISSIONS_REGION";

/// Runtime settings shared by the handlers, read once per cold start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub table_name: String,
    /// Overrides the SDK's region chain when set.
    pub region: Option<String>,
}

impl Config {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let table_name = lookup(TABLE_NAME_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar(TABLE_NAME_VAR))?;
        let region = lookup(REGION_VAR).filter(|v| !v.trim().is_empty());

        Ok(Self { table_name, region })
    }
}
