use crate::config::StorageConfig;
use crate::error::{ProcessingError, Result};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use tracing::debug;

/// Key-addressed object storage. `put_object` replaces whatever the key held.
pub trait BlobStore {
    fn put_object(&self, key: &str, body: Vec<u8>) -> Result<()>;

    fn get_object(&self, key: &str) -> Result<Vec<u8>>;

    /// Human-readable location of `key`, for log lines and reports
    fn describe(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Access key pair read from the environment.
#[derive(Clone)]
pub struct StorageCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl StorageCredentials {
    pub fn from_env(access_key_var: &str, secret_key_var: &str) -> Result<Self> {
        let read = |variable: &str| {
            std::env::var(variable)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ProcessingError::MissingCredentials {
                    variable: variable.to_string(),
                })
        };

        Ok(Self {
            access_key_id: read(access_key_var)?,
            secret_access_key: read(secret_key_var)?,
        })
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// A bucket laid out as a directory tree: `<root>/<bucket>/<key>`.
///
/// Credentials are looked up on every access, so a missing key pair
/// fails the persistence stage and nothing before it.
pub struct FsBlobStore {
    bucket_dir: PathBuf,
    bucket: String,
    credential_vars: Option<(String, String)>,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, bucket: &str) -> Self {
        Self {
            bucket_dir: root.into().join(bucket),
            bucket: bucket.to_string(),
            credential_vars: None,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        let store = Self::new(&config.root, &config.bucket);
        if config.require_credentials {
            store.with_credentials(&config.access_key_var, &config.secret_key_var)
        } else {
            store
        }
    }

    pub fn with_credentials(mut self, access_key_var: &str, secret_key_var: &str) -> Self {
        self.credential_vars = Some((access_key_var.to_string(), secret_key_var.to_string()));
        self
    }

    fn authorize(&self) -> Result<()> {
        if let Some((access, secret)) = &self.credential_vars {
            let credentials = StorageCredentials::from_env(access, secret)?;
            debug!(access_key_id = %credentials.access_key_id, bucket = %self.bucket, "storage credentials resolved");
        }
        Ok(())
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !safe {
            return Err(ProcessingError::Persistence {
                key: key.to_string(),
                message: "object keys must be relative paths without '..'".to_string(),
            });
        }

        Ok(self.bucket_dir.join(relative))
    }

    fn io_error(key: &str, error: impl fmt::Display) -> ProcessingError {
        ProcessingError::Persistence {
            key: key.to_string(),
            message: error.to_string(),
        }
    }
}

impl BlobStore for FsBlobStore {
    fn put_object(&self, key: &str, body: Vec<u8>) -> Result<()> {
        self.authorize()?;
        let path = self.object_path(key)?;
        let parent = path.parent().unwrap_or(&self.bucket_dir);

        std::fs::create_dir_all(parent).map_err(|e| Self::io_error(key, e))?;

        // Write beside the target, then rename over it
        let mut staging = NamedTempFile::new_in(parent).map_err(|e| Self::io_error(key, e))?;
        staging
            .write_all(&body)
            .map_err(|e| Self::io_error(key, e))?;
        staging
            .persist(&path)
            .map_err(|e| Self::io_error(key, e.error))?;

        debug!(path = %path.display(), bytes = body.len(), "object written");
        Ok(())
    }

    fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        self.authorize()?;
        let path = self.object_path(key)?;
        std::fs::read(&path).map_err(|e| Self::io_error(key, e))
    }

    fn describe(&self, key: &str) -> String {
        format!("{}/{}", self.bucket, key)
    }
}

/// Process-local store, for tests and dry runs.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        let mut keys: Vec<String> = objects.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl BlobStore for MemoryBlobStore {
    fn put_object(&self, key: &str, body: Vec<u8>) -> Result<()> {
        let mut objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        objects.insert(key.to_string(), body);
        Ok(())
    }

    fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        objects
            .get(key)
            .cloned()
            .ok_or_else(|| ProcessingError::Persistence {
                key: key.to_string(),
                message: "no such object".to_string(),
            })
    }

    fn describe(&self, key: &str) -> String {
        format!("memory://{}", key)
    }
}
