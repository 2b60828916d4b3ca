mod client;

pub use client::DriveClient;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use google_drive3::api::Scope;
use std::io::Write;

// Full read/write access to the user's files
pub(crate) const AUTH_SCOPE: Scope = Scope::Full;

/// Metadata of a file in the remote store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemoteFile {
    pub id: String,
    pub name: Option<String>,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub modified_time: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait DriveOperations {
    async fn fetch_metadata(&self, file_id: &str) -> Result<RemoteFile>;

    /// Stream the file content into `sink`, returning the number of bytes written.
    async fn download(&self, file_id: &str, sink: &mut (dyn Write + Send)) -> Result<u64>;

    /// Replace the content of an existing file.
    async fn upload(&self, file_id: &str, content: Vec<u8>, mime_type: &str) -> Result<()>;
}
