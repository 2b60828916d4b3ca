use super::{AUTH_SCOPE, DriveOperations, RemoteFile};
use crate::auth::AuthType;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use google_drive3::api::DriveHub;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use indicatif::ProgressStyle;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::io::Write;
use tracing::{Span, debug, instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;
use url::Url;

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const METADATA_FIELDS: &str = "id,name,mimeType,size,modifiedTime";

pub struct DriveClient {
    hub: DriveHub<HttpsConnector<HttpConnector>>,
    auth: AuthType,
    http: reqwest::Client,
}

impl DriveClient {
    pub fn new(auth: AuthType) -> Result<Self> {
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| AppError::Drive(format!("Failed to load native root certificates: {}", e)))?
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(connector);
        let hub = DriveHub::new(client, auth.clone());

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Drive(format!("Failed to build reqwest client: {}", e)))?;

        Ok(Self { hub, auth, http })
    }

    async fn access_token(&self) -> Result<String> {
        let token = self
            .auth
            .token(&[AUTH_SCOPE])
            .await
            .map_err(|e| AppError::Auth(format!("Failed to get token: {}", e)))?;

        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| AppError::Auth("Token response has no access token".to_string()))
    }
}

/// Build `{base}/{file_id}?{params}` with the id encoded as a single path segment.
fn file_url(base: &str, file_id: &str, params: &[(&str, &str)]) -> Result<Url> {
    let mut url =
        Url::parse(base).map_err(|e| AppError::Drive(format!("Invalid API URL: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| AppError::Drive(format!("API URL cannot have path segments: {}", base)))?
        .push(file_id);
    url.query_pairs_mut().extend_pairs(params);

    Ok(url)
}

fn is_not_found(error: &google_drive3::Error) -> bool {
    match error {
        google_drive3::Error::BadRequest(value) => {
            value.pointer("/error/code").and_then(|code| code.as_u64()) == Some(404)
        }
        google_drive3::Error::Failure(response) => response.status().as_u16() == 404,
        _ => false,
    }
}

#[async_trait]
impl DriveOperations for DriveClient {
    #[instrument(name = "Fetching file metadata", skip(self))]
    async fn fetch_metadata(&self, file_id: &str) -> Result<RemoteFile> {
        let (_, file) = self
            .hub
            .files()
            .get(file_id)
            .supports_all_drives(true)
            .param("fields", METADATA_FIELDS)
            .add_scope(AUTH_SCOPE)
            .doit()
            .await
            .map_err(|e| match is_not_found(&e) {
                true => AppError::NotFound(file_id.to_string()),
                false => AppError::Drive(format!("Failed to fetch metadata for '{}': {}", file_id, e)),
            })?;

        Ok(RemoteFile {
            id: file.id.unwrap_or_else(|| file_id.to_string()),
            name: file.name,
            mime_type: file.mime_type,
            size: file.size.and_then(|s| u64::try_from(s).ok()),
            modified_time: file.modified_time,
        })
    }

    #[instrument(name = "Downloading file", skip(self, sink))]
    async fn download(&self, file_id: &str, sink: &mut (dyn Write + Send)) -> Result<u64> {
        let url = file_url(
            DRIVE_FILES_URL,
            file_id,
            &[("alt", "media"), ("supportsAllDrives", "true")],
        )?;
        let token = self.access_token().await?;

        let mut response = self.http.get(url).bearer_auth(&token).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(file_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Drive(format!(
                "Failed to download '{}': {} - {}",
                file_id, status, body
            )));
        }

        let span = Span::current();
        span.pb_set_style(
            &ProgressStyle::with_template(
                "[{elapsed_precise}] {bar:40.cyan/blue} {bytes:>9}/{total_bytes:9} {msg}",
            )
            .map_err(|e| AppError::Other(e.into()))?,
        );
        if let Some(length) = response.content_length() {
            span.pb_set_length(length);
        }

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            sink.write_all(&chunk)?;
            written += chunk.len() as u64;
            span.pb_inc(chunk.len() as u64);
        }
        sink.flush()?;

        debug!(bytes = written, "Download complete");

        Ok(written)
    }

    #[instrument(name = "Uploading file", skip(self, content), fields(bytes = content.len()))]
    async fn upload(&self, file_id: &str, content: Vec<u8>, mime_type: &str) -> Result<()> {
        let url = file_url(
            DRIVE_UPLOAD_URL,
            file_id,
            &[("uploadType", "media"), ("supportsAllDrives", "true")],
        )?;
        let token = self.access_token().await?;

        let response = self
            .http
            .patch(url)
            .bearer_auth(&token)
            .header(CONTENT_TYPE, mime_type)
            .body(content)
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("Failed to send '{}': {}", file_id, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(file_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upload(format!(
                "Failed to upload '{}': {} - {}",
                file_id, status, body
            )));
        }

        Ok(())
    }
}
