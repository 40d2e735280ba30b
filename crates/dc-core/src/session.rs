//! Session state: committed tables, current schema, active view.

use dc_rest_api_contract::SchemaInfo;

/// Which primary view the client is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Conversation with the analysis service.
    Chat,
    /// Staged-file and committed-table management.
    UploadManager,
}

/// Single source of truth for committed tables, the current schema, and the
/// view mode.
///
/// `tables` holds each filename at most once, in upload completion order.
/// The schema is opaque to the client and replaced wholesale by every
/// successful upload or removal response, so it always describes the
/// current table set.
#[derive(Debug, Clone)]
pub struct SessionState {
    tables: Vec<String>,
    schema: Option<SchemaInfo>,
    view: ViewMode,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            schema: None,
            view: ViewMode::UploadManager,
        }
    }

    /// Committed table names in upload completion order.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t == name)
    }

    /// The latest server-confirmed schema, if any table was ever committed.
    pub fn schema(&self) -> Option<&SchemaInfo> {
        self.schema.as_ref()
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    /// Switch views. Moving to the chat is ignored while no table is
    /// committed; the upload manager is the only usable view until data
    /// exists.
    pub fn set_view(&mut self, view: ViewMode) {
        if view == ViewMode::Chat && self.tables.is_empty() {
            return;
        }
        self.view = view;
    }

    /// Record a successful upload: append the filename if absent and
    /// replace the schema. Idempotent for a repeated identical update.
    pub fn apply_upload(&mut self, filename: &str, schema: SchemaInfo) {
        if !self.has_table(filename) {
            self.tables.push(filename.to_string());
        }
        self.schema = Some(schema);
    }

    /// Record a successful removal: drop the filename if present and
    /// replace the schema. When the last table goes away the view falls
    /// back to the upload manager.
    pub fn apply_removal(&mut self, filename: &str, schema: SchemaInfo) {
        self.tables.retain(|t| t != filename);
        self.schema = Some(schema);
        if self.tables.is_empty() {
            self.view = ViewMode::UploadManager;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(label: &str) -> SchemaInfo {
        SchemaInfo(serde_json::json!({ label: { "columns": [] } }))
    }

    #[test]
    fn uploads_append_in_completion_order_without_duplicates() {
        let mut session = SessionState::new();
        session.apply_upload("sales.csv", schema("sales"));
        session.apply_upload("regions.csv", schema("regions"));
        session.apply_upload("sales.csv", schema("sales"));

        assert_eq!(session.tables(), ["sales.csv", "regions.csv"]);
        assert_eq!(session.schema(), Some(&schema("sales")));
    }

    #[test]
    fn removal_drops_exactly_that_entry_and_replaces_schema() {
        let mut session = SessionState::new();
        session.apply_upload("sales.csv", schema("sales"));
        session.apply_upload("regions.csv", schema("both"));

        session.apply_removal("sales.csv", schema("regions"));
        assert_eq!(session.tables(), ["regions.csv"]);
        assert_eq!(session.schema(), Some(&schema("regions")));
    }

    #[test]
    fn chat_view_requires_a_committed_table() {
        let mut session = SessionState::new();
        session.set_view(ViewMode::Chat);
        assert_eq!(session.view(), ViewMode::UploadManager);

        session.apply_upload("sales.csv", schema("sales"));
        session.set_view(ViewMode::Chat);
        assert_eq!(session.view(), ViewMode::Chat);
    }

    #[test]
    fn removing_the_last_table_forces_the_upload_manager() {
        let mut session = SessionState::new();
        session.apply_upload("sales.csv", schema("sales"));
        session.set_view(ViewMode::Chat);

        session.apply_removal("sales.csv", SchemaInfo::empty());
        assert_eq!(session.view(), ViewMode::UploadManager);
    }
}
