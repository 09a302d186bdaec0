// ABOUTME: JSON snapshot format consumed and produced by the persistence layer
// ABOUTME: Wraps a project with export metadata; the whole project serializes at once

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::project::Project;

fn default_snapshot_version() -> String {
    "1.0".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    #[serde(default = "default_snapshot_version")]
    pub version: String,
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
}

impl Default for SnapshotMetadata {
    fn default() -> Self {
        Self {
            version: default_snapshot_version(),
            exported_at: Some(Utc::now()),
        }
    }
}

/// A whole-project snapshot: `{ metadata, project: { id, name, nodes, edges } }`.
/// There is no partial persistence of a single node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    #[serde(default)]
    pub metadata: SnapshotMetadata,
    pub project: Project,
}

impl WorkflowSnapshot {
    pub fn new(project: Project) -> Self {
        Self {
            metadata: SnapshotMetadata::default(),
            project,
        }
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Ok(Self::from_json(&content)?)
    }

    pub async fn to_file<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        tokio::fs::write(path.as_ref(), self.to_json()?).await?;
        Ok(())
    }
}
