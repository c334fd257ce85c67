// ABOUTME: Conversation export — projects the message store into {role, text} records.
// ABOUTME: Serializes records as pretty JSON and writes them to disk atomically.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::store::{MessageStore, Role};

/// One exported message. Roles are `"user"` or `"assistant"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub role: String,
    pub text: String,
}

/// Build export records from the current store contents, skipping system turns.
pub fn export_records(store: &MessageStore) -> Vec<ExportRecord> {
    store
        .all()
        .iter()
        .filter_map(|turn| {
            let role = match turn.role() {
                Role::Human => "user",
                Role::Assistant => "assistant",
                Role::System => return None,
            };
            Some(ExportRecord {
                role: role.to_string(),
                text: turn.text().to_string(),
            })
        })
        .collect()
}

/// Serialize the store as a pretty-printed JSON array.
pub fn export_json(store: &MessageStore) -> Result<String> {
    Ok(serde_json::to_string_pretty(&export_records(store))?)
}

/// Write the export to `path` (atomic write via tmp + rename). Returns the
/// number of records written.
pub fn write_export(store: &MessageStore, path: &Path) -> Result<usize> {
    let records = export_records(store);
    let content = serde_json::to_string_pretty(&records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(records.len())
}
