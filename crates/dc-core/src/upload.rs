//! Staged file selection and the sequential upload/removal orchestrator.

use dc_client_api::{ClientApi, ClientApiError};
use thiserror::Error;
use tracing::debug;

use crate::session::SessionState;

/// A file picked by the user but not yet committed to the server.
///
/// Transient: it exists between selection and either promotion into the
/// committed table set or discard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl PendingFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }
}

/// Outcome of one `select_files` call.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Names newly staged, in candidate order.
    pub staged: Vec<String>,
    /// Candidates dropped for an unsupported extension.
    pub rejected: usize,
}

/// Result of one commit batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files committed before the batch ended, in completion order.
    pub committed: Vec<String>,
    /// The failure that ended the batch, if any.
    pub failed: Option<BatchFailure>,
}

#[derive(Debug)]
pub struct BatchFailure {
    pub name: String,
    pub error: ClientApiError,
}

/// Error from a removal request.
#[derive(Debug, Error)]
pub enum RemoveError {
    /// The name is not a committed table. Nothing was sent or changed.
    #[error("unknown table: {0}")]
    UnknownTable(String),
    #[error(transparent)]
    Client(#[from] ClientApiError),
}

/// The pending-file list plus the selection rules applied to it.
#[derive(Debug)]
pub struct UploadStaging {
    pending: Vec<PendingFile>,
    allow_pdf: bool,
}

impl UploadStaging {
    pub fn new(allow_pdf: bool) -> Self {
        Self {
            pending: Vec::new(),
            allow_pdf,
        }
    }

    /// Staged files in selection order.
    pub fn pending(&self) -> &[PendingFile] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Filter `candidates` into the pending list.
    ///
    /// Candidates with a disallowed extension are counted for the caller's
    /// notice; a name already pending or committed is skipped silently
    /// (dedup by name, not content). Nothing here touches the network.
    pub fn select_files(
        &mut self,
        candidates: Vec<PendingFile>,
        committed: &[String],
    ) -> Selection {
        let mut selection = Selection::default();
        for candidate in candidates {
            if !self.extension_allowed(&candidate.name) {
                selection.rejected += 1;
                continue;
            }
            let duplicate = self.pending.iter().any(|p| p.name == candidate.name)
                || committed.contains(&candidate.name);
            if duplicate {
                continue;
            }
            selection.staged.push(candidate.name.clone());
            self.pending.push(candidate);
        }
        selection
    }

    /// Drop one pending file without any remote call. Returns whether the
    /// name was present.
    pub fn discard(&mut self, name: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.name != name);
        self.pending.len() != before
    }

    /// Submit every pending file, strictly one at a time.
    ///
    /// An explicit fold over the drained pending list: each success applies
    /// the returned schema to `session` before the next request is issued,
    /// so the sequential dependency is visible here rather than implicit.
    /// The first failure ends the batch; the failed file and the files
    /// after it stay pending. Committed files are never rolled back.
    pub async fn commit<C>(&mut self, session: &mut SessionState, client: &C) -> BatchReport
    where
        C: ClientApi + ?Sized,
    {
        let mut report = BatchReport::default();
        let mut queue = std::mem::take(&mut self.pending).into_iter();

        for file in queue.by_ref() {
            debug!(file = %file.name, "uploading table");
            match client.upload_table(&file.name, file.content.clone()).await {
                Ok(schema) => {
                    session.apply_upload(&file.name, schema);
                    report.committed.push(file.name);
                }
                Err(error) => {
                    debug!(file = %file.name, %error, "upload failed, ending batch");
                    report.failed = Some(BatchFailure {
                        name: file.name.clone(),
                        error,
                    });
                    self.pending.push(file);
                    break;
                }
            }
        }
        self.pending.extend(queue);

        report
    }

    fn extension_allowed(&self, name: &str) -> bool {
        let extension = name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        extension == "csv" || (self.allow_pdf && extension == "pdf")
    }
}

/// Remove one committed table.
///
/// Rejected locally when `name` is not committed: no request is issued and
/// nothing changes. State changes only on a server-confirmed removal.
pub async fn remove_table<C>(
    session: &mut SessionState,
    client: &C,
    name: &str,
) -> Result<(), RemoveError>
where
    C: ClientApi + ?Sized,
{
    if !session.has_table(name) {
        return Err(RemoveError::UnknownTable(name.to_string()));
    }
    debug!(table = %name, "removing table");
    let schema = client.remove_table(name).await?;
    session.apply_removal(name, schema);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dc_rest_client_mock::{MockClient, RecordedCall};

    fn pending(name: &str) -> PendingFile {
        PendingFile::new(name, format!("{name} bytes").into_bytes())
    }

    #[test]
    fn selection_filters_extensions_and_counts_rejects() {
        let mut staging = UploadStaging::new(false);
        let selection = staging.select_files(
            vec![pending("sales.csv"), pending("report.pdf"), pending("notes.txt")],
            &[],
        );

        assert_eq!(selection.staged, ["sales.csv"]);
        assert_eq!(selection.rejected, 2);
        assert_eq!(staging.pending().len(), 1);
    }

    #[test]
    fn pdf_mode_extends_the_allow_list() {
        let mut staging = UploadStaging::new(true);
        let selection =
            staging.select_files(vec![pending("report.pdf"), pending("REPORT.CSV")], &[]);

        assert_eq!(selection.staged, ["report.pdf", "REPORT.CSV"]);
        assert_eq!(selection.rejected, 0);
    }

    #[test]
    fn duplicate_names_are_skipped_silently() {
        let mut staging = UploadStaging::new(false);
        staging.select_files(vec![pending("sales.csv")], &[]);

        let selection = staging.select_files(
            vec![pending("sales.csv"), pending("regions.csv")],
            &["committed.csv".to_string()],
        );
        assert_eq!(selection.staged, ["regions.csv"]);
        assert_eq!(selection.rejected, 0);

        let selection = staging.select_files(vec![pending("committed.csv")], &["committed.csv".to_string()]);
        assert_eq!(selection.staged, Vec::<String>::new());
        assert_eq!(selection.rejected, 0);
    }

    #[test]
    fn discard_drops_a_pending_file_locally() {
        let mut staging = UploadStaging::new(false);
        staging.select_files(vec![pending("sales.csv")], &[]);

        assert!(staging.discard("sales.csv"));
        assert!(!staging.discard("sales.csv"));
        assert!(staging.is_empty());
    }

    #[tokio::test]
    async fn commit_uploads_sequentially_and_threads_schema() {
        let mut staging = UploadStaging::new(false);
        let mut session = SessionState::new();
        staging.select_files(vec![pending("sales.csv"), pending("regions.csv")], &[]);

        let mock = MockClient::new();
        mock.push_upload(Ok(MockClient::schema_for(&["sales"])));
        mock.push_upload(Ok(MockClient::schema_for(&["sales", "regions"])));

        let report = staging.commit(&mut session, &mock).await;

        assert_eq!(report.committed, ["sales.csv", "regions.csv"]);
        assert!(report.failed.is_none());
        assert!(staging.is_empty());
        assert_eq!(session.tables(), ["sales.csv", "regions.csv"]);
        assert_eq!(
            session.schema(),
            Some(&MockClient::schema_for(&["sales", "regions"]))
        );
        assert_eq!(
            mock.calls(),
            vec![
                RecordedCall::Upload {
                    filename: "sales.csv".into(),
                    bytes: "sales.csv bytes".len(),
                },
                RecordedCall::Upload {
                    filename: "regions.csv".into(),
                    bytes: "regions.csv bytes".len(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn first_failure_ends_the_batch_and_keeps_the_rest_pending() {
        let mut staging = UploadStaging::new(false);
        let mut session = SessionState::new();
        staging.select_files(
            vec![pending("a.csv"), pending("b.csv"), pending("c.csv")],
            &[],
        );

        let mock = MockClient::new();
        mock.push_upload(Ok(MockClient::schema_for(&["a"])));
        mock.push_upload(Err(ClientApiError::Api {
            message: "Error tokenizing data".into(),
            suggestion: None,
        }));

        let report = staging.commit(&mut session, &mock).await;

        assert_eq!(report.committed, ["a.csv"]);
        let failure = report.failed.expect("batch should record the failure");
        assert_eq!(failure.name, "b.csv");

        // a stays committed, b and c are still pending in order
        assert_eq!(session.tables(), ["a.csv"]);
        let names: Vec<_> = staging.pending().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["b.csv", "c.csv"]);

        // c.csv was never attempted
        assert_eq!(mock.calls().len(), 2);
    }

    #[tokio::test]
    async fn commit_with_nothing_pending_issues_no_requests() {
        let mut staging = UploadStaging::new(false);
        let mut session = SessionState::new();

        let report = staging.commit(&mut session, &MockClient::new()).await;

        assert!(report.committed.is_empty());
        assert!(report.failed.is_none());
    }

    #[tokio::test]
    async fn removing_an_unknown_table_never_reaches_the_network() {
        let mut session = SessionState::new();
        session.apply_upload("sales.csv", MockClient::schema_for(&["sales"]));

        let mock = MockClient::new();
        let err = remove_table(&mut session, &mock, "ghost.csv")
            .await
            .unwrap_err();

        assert!(matches!(err, RemoveError::UnknownTable(name) if name == "ghost.csv"));
        assert_eq!(session.tables(), ["sales.csv"]);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn confirmed_removal_updates_tables_and_schema() {
        let mut session = SessionState::new();
        session.apply_upload("sales.csv", MockClient::schema_for(&["sales"]));
        session.apply_upload("regions.csv", MockClient::schema_for(&["sales", "regions"]));

        let mock = MockClient::new();
        mock.push_removal(Ok(MockClient::schema_for(&["regions"])));

        remove_table(&mut session, &mock, "sales.csv")
            .await
            .expect("removal should succeed");

        assert_eq!(session.tables(), ["regions.csv"]);
        assert_eq!(session.schema(), Some(&MockClient::schema_for(&["regions"])));
        assert_eq!(
            mock.calls(),
            vec![RecordedCall::Remove {
                filename: "sales.csv".into(),
            }]
        );
    }

    #[tokio::test]
    async fn failed_removal_leaves_state_untouched() {
        let mut session = SessionState::new();
        session.apply_upload("sales.csv", MockClient::schema_for(&["sales"]));

        let mock = MockClient::new();
        mock.push_removal(Err(ClientApiError::Transport("connection refused".into())));

        let err = remove_table(&mut session, &mock, "sales.csv")
            .await
            .unwrap_err();

        assert!(matches!(err, RemoveError::Client(_)));
        assert_eq!(session.tables(), ["sales.csv"]);
        assert_eq!(session.schema(), Some(&MockClient::schema_for(&["sales"])));
    }
}
