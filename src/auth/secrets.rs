use crate::config::SecretsConfig;
use crate::error::{AppError, Result};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// A named place a secret blob can be looked up.
pub trait SecretResolver: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` when this source does not hold the key.
    fn resolve(&self, key: &str) -> Result<Option<String>>;
}

/// Secrets injected by the hosting platform as environment variables.
pub struct EnvResolver;

impl EnvResolver {
    fn var_name(key: &str) -> String {
        key.to_ascii_uppercase()
    }
}

impl SecretResolver for EnvResolver {
    fn name(&self) -> &str {
        "env"
    }

    fn resolve(&self, key: &str) -> Result<Option<String>> {
        Ok(std::env::var(Self::var_name(key)).ok())
    }
}

/// Top-level string entries of a local TOML secrets file.
pub struct SecretsFileResolver {
    path: PathBuf,
}

impl SecretsFileResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SecretResolver for SecretsFileResolver {
    fn name(&self) -> &str {
        "file"
    }

    fn resolve(&self, key: &str) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            AppError::Auth(format!("Failed to read secrets file {:?}: {}", self.path, e))
        })?;
        let table: toml::Table = toml::from_str(&contents).map_err(|e| {
            AppError::Auth(format!("Failed to parse secrets file {:?}: {}", self.path, e))
        })?;

        Ok(table
            .get(key)
            .and_then(|value| value.as_str())
            .map(str::to_string))
    }
}

/// Secret contents that are known to be non-empty JSON.
#[derive(Clone)]
pub struct SecretBlob(String);

impl SecretBlob {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::Auth("Secret is empty".to_string()));
        }

        serde_json::from_str::<serde_json::Value>(trimmed)
            .map_err(|e| AppError::Auth(format!("Secret is not valid JSON: {}", e)))?;

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Never print the secret itself.
impl std::fmt::Debug for SecretBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretBlob(..)")
    }
}

/// Ordered list of resolvers; the first one holding a non-blank value wins.
pub struct ResolverChain {
    resolvers: Vec<Box<dyn SecretResolver>>,
}

impl ResolverChain {
    pub fn new(resolvers: Vec<Box<dyn SecretResolver>>) -> Self {
        Self { resolvers }
    }

    pub fn from_config(config: &SecretsConfig) -> Result<Self> {
        let resolvers = config
            .sources
            .iter()
            .map(|source| -> Result<Box<dyn SecretResolver>> {
                match source.as_str() {
                    "env" => Ok(Box::new(EnvResolver)),
                    "file" => Ok(Box::new(SecretsFileResolver::new(config.file.clone()))),
                    other => Err(AppError::Config(format!(
                        "Unknown secret source '{}', expected 'env' or 'file'",
                        other
                    ))),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(resolvers))
    }

    pub fn resolve(&self, key: &str) -> Result<SecretBlob> {
        for resolver in &self.resolvers {
            match resolver.resolve(key)? {
                Some(value) if !value.trim().is_empty() => {
                    debug!(source = resolver.name(), key, "Resolved secret");
                    return SecretBlob::parse(&value);
                }
                _ => debug!(source = resolver.name(), key, "Secret not found"),
            }
        }

        let tried = self
            .resolvers
            .iter()
            .map(|r| r.name())
            .collect::<Vec<_>>()
            .join(", ");
        Err(AppError::Auth(format!(
            "'{}' not found in any secret source ({})",
            key, tried
        )))
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;
    use std::collections::HashMap;

    pub(crate) struct StaticResolver {
        pub name: &'static str,
        pub values: HashMap<String, String>,
    }

    impl StaticResolver {
        pub(crate) fn new(name: &'static str, entries: &[(&str, &str)]) -> Self {
            Self {
                name,
                values: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }
        }
    }

    impl SecretResolver for StaticResolver {
        fn name(&self) -> &str {
            self.name
        }

        fn resolve(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.get(key).cloned())
        }
    }
}
