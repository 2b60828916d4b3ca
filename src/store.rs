use crate::config::Config;
use crate::drive::DriveOperations;
use crate::error::{AppError, Result};
use crate::notify::{LogNotifier, Notifier};
use crate::session::{Connector, GoogleDriveConnector, SessionCache};
use crate::staging::StagingArea;
use crate::tabular::{self, Table, TabularFormat};
use std::fs;
use tracing::{debug, info, instrument};

/// Reads and writes tables stored in existing remote files.
///
/// Every operation shares one lazily established session. Failures are
/// reported through the notifier and then returned to the caller.
pub struct TabularStore<C: Connector> {
    sessions: SessionCache<C>,
    staging: StagingArea,
    notifier: Box<dyn Notifier>,
}

impl TabularStore<GoogleDriveConnector> {
    pub fn from_config(config: Config) -> Result<Self> {
        let staging = StagingArea::from_config(&config.staging);
        let connector = GoogleDriveConnector::from_config(config)?;
        Ok(Self::new(connector, staging))
    }
}

impl<C> TabularStore<C>
where
    C: Connector + Sync,
    C::Session: DriveOperations,
{
    pub fn new(connector: C, staging: StagingArea) -> Self {
        Self {
            sessions: SessionCache::new(connector),
            staging,
            notifier: Box::new(LogNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// Establish the session without transferring anything.
    pub async fn connect(&self) -> Result<&C::Session> {
        let result = self.sessions.get_session().await;
        self.report(result, || {
            "Google Drive authentication failed. Missing or invalid credentials".to_string()
        })
    }

    #[instrument(name = "Reading table", skip(self))]
    pub async fn read_tabular(&self, file_id: &str, format: &str) -> Result<Table> {
        let result = self.try_read(file_id, format).await;
        self.report(result, || format!("Failed to read '{}' from Google Drive", file_id))
    }

    pub async fn read_excel(&self, file_id: &str) -> Result<Table> {
        self.read_tabular(file_id, "excel").await
    }

    pub async fn read_csv(&self, file_id: &str) -> Result<Table> {
        self.read_tabular(file_id, "csv").await
    }

    #[instrument(name = "Writing table", skip(self, table))]
    pub async fn write_tabular(&self, table: &Table, file_id: &str, format: &str) -> Result<()> {
        let result = self.try_write(table, file_id, format).await;
        self.report(result, || format!("Failed to write '{}' to Google Drive", file_id))
    }

    pub async fn write_csv(&self, table: &Table, file_id: &str) -> Result<()> {
        self.write_tabular(table, file_id, "csv").await
    }

    async fn try_read(&self, file_id: &str, format: &str) -> Result<Table> {
        let format: TabularFormat = format.parse()?;
        let drive = self.sessions.get_session().await?;

        let metadata = drive.fetch_metadata(file_id).await?;
        debug!(
            name = ?metadata.name,
            mime_type = ?metadata.mime_type,
            size = ?metadata.size,
            "Fetched file metadata"
        );

        let mut staging = self.staging.create(format)?;
        drive.download(file_id, staging.as_file_mut()).await?;

        let table = tabular::read_path(staging.path(), format)?;
        info!(
            rows = table.row_count(),
            columns = table.column_count(),
            "Table read"
        );

        Ok(table)
    }

    async fn try_write(&self, table: &Table, file_id: &str, format: &str) -> Result<()> {
        let format: TabularFormat = format.parse()?;

        let staging = self.staging.create(format)?;
        tabular::write_path(table, staging.path(), format)?;
        let content = fs::read(staging.path())?;

        let drive = self.sessions.get_session().await?;
        drive
            .upload(file_id, content, format.mime_type())
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) | AppError::Upload(_) | AppError::Auth(_) => e,
                other => AppError::Upload(other.to_string()),
            })?;

        info!(rows = table.row_count(), %format, "Table written");

        Ok(())
    }

    fn report<T>(&self, result: Result<T>, context: impl FnOnce() -> String) -> Result<T> {
        if let Err(e) = &result {
            self.notifier.error(&format!("{}: {}", context(), e));
        }
        result
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::{MockConnector, MockDriveState, RecordingNotifier};
    use super::*;
    use crate::tabular::Cell;
    use crate::tabular::test_helpers::mock_table;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    struct Harness {
        store: TabularStore<MockConnector>,
        state: Arc<MockDriveState>,
        notifier: RecordingNotifier,
        staging_dir: TempDir,
    }

    fn harness(state: MockDriveState) -> Harness {
        let state = Arc::new(state);
        let staging_dir = tempfile::tempdir().unwrap();
        let notifier = RecordingNotifier::default();
        let store = TabularStore::new(
            MockConnector {
                state: state.clone(),
            },
            StagingArea::new(Some(staging_dir.path().to_path_buf()), false),
        )
        .with_notifier(notifier.clone());

        Harness {
            store,
            state,
            notifier,
            staging_dir,
        }
    }

    fn staged_files(harness: &Harness) -> usize {
        fs::read_dir(harness.staging_dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_csv_write_then_read() {
        let h = harness(MockDriveState::with_files(&["abc123"]));
        let table = mock_table();

        h.store.write_tabular(&table, "abc123", "csv").await.unwrap();
        let read_back = h.store.read_tabular("abc123", "csv").await.unwrap();

        assert_eq!(read_back.columns(), ["name", "value"]);
        assert_eq!(
            read_back.rows(),
            [
                vec![Cell::from("x"), Cell::Int(1)],
                vec![Cell::from("y"), Cell::Int(2)],
            ]
        );
        assert_eq!(h.state.connects.load(Ordering::SeqCst), 1);
        assert_eq!(staged_files(&h), 0);
    }

    #[tokio::test]
    async fn test_excel_write_then_read() {
        let h = harness(MockDriveState::with_files(&["sheet1"]));
        let table = Table::new(
            vec!["item".to_string(), "price".to_string(), "in_stock".to_string()],
            vec![
                vec![Cell::from("apple"), Cell::Float(0.5), Cell::Bool(true)],
                vec![Cell::from("pear"), Cell::Int(2), Cell::Bool(false)],
            ],
        )
        .unwrap();

        h.store.write_tabular(&table, "sheet1", "excel").await.unwrap();
        let read_back = h.store.read_excel("sheet1").await.unwrap();

        assert_eq!(read_back, table);
        assert_eq!(staged_files(&h), 0);
    }

    #[tokio::test]
    async fn test_read_unknown_id_is_not_found() {
        let h = harness(MockDriveState::default());

        let result = h.store.read_csv("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(staged_files(&h), 0);
        assert_eq!(h.notifier.messages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_format_fails_before_connecting() {
        let h = harness(MockDriveState::with_files(&["abc123"]));

        let result = h.store.write_tabular(&mock_table(), "abc123", "parquet").await;

        assert!(matches!(result, Err(AppError::UnsupportedFormat(_))));
        assert_eq!(h.state.connects.load(Ordering::SeqCst), 0);
        assert_eq!(h.state.uploads.load(Ordering::SeqCst), 0);
        assert_eq!(staged_files(&h), 0);
    }

    #[tokio::test]
    async fn test_read_unsupported_format_fails_before_connecting() {
        let h = harness(MockDriveState::with_files(&["abc123"]));

        let result = h.store.read_tabular("abc123", "parquet").await;

        assert!(matches!(result, Err(AppError::UnsupportedFormat(_))));
        assert_eq!(h.state.connects.load(Ordering::SeqCst), 0);
        assert_eq!(staged_files(&h), 0);
        assert_eq!(h.notifier.messages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_closure_notifier_sees_each_failure_once() {
        let h = harness(MockDriveState::with_files(&["abc123"]));
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let store = h
            .store
            .with_notifier(move |message: &str| sink.lock().unwrap().push(message.to_string()));

        let result = store.read_tabular("missing", "csv").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("Failed to read 'missing'"));
        assert!(h.notifier.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_cleans_staging() {
        let h = harness(MockDriveState {
            fail_uploads: true,
            ..MockDriveState::with_files(&["abc123"])
        });

        let result = h.store.write_csv(&mock_table(), "abc123").await;

        assert!(matches!(result, Err(AppError::Upload(_))));
        assert_eq!(staged_files(&h), 0);
        let messages = h.notifier.messages.lock().unwrap();
        assert!(messages[0].contains("Failed to write 'abc123'"));
    }

    #[tokio::test]
    async fn test_write_does_not_create_files() {
        let h = harness(MockDriveState::default());

        let result = h.store.write_csv(&mock_table(), "new-file").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(h.state.files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_content_is_parse_error() {
        let h = harness(MockDriveState::with_files(&["abc123"]));
        h.store.write_csv(&mock_table(), "abc123").await.unwrap();

        let result = h.store.read_excel("abc123").await;

        assert!(matches!(result, Err(AppError::Parse(_))));
        assert_eq!(staged_files(&h), 0);
    }

    #[tokio::test]
    async fn test_session_shared_across_operations() {
        let h = harness(MockDriveState::with_files(&["a", "b"]));

        h.store.connect().await.unwrap();
        h.store.write_csv(&mock_table(), "a").await.unwrap();
        h.store.write_tabular(&mock_table(), "b", "excel").await.unwrap();
        h.store.read_csv("a").await.unwrap();

        assert_eq!(h.state.connects.load(Ordering::SeqCst), 1);
        assert_eq!(h.state.uploads.load(Ordering::SeqCst), 2);
    }
}
