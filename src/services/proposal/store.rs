//! Proposal Stores
//!
//! `FileProposalStore` keeps proposals inside the project:
//!
//! ```text
//! <project>/.agent-orchestrator/<location>/
//!     index.json
//!     <id>/proposal.md
//!     <id>/tasks.md
//!     <id>/design.md      (only when the proposal has a design section)
//!     <id>/metadata.json
//! ```
//!
//! `MemoryProposalStore` keeps them in memory for embedding and tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::proposal::{
    ProposalDraft, ProposalIndex, ProposalIndexItem, ProposalLocation, ProposalRecord,
    ProposalStatus,
};
use crate::services::proposal::ProposalStore;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{project_data_dir, APP_DIR_NAME};

const INDEX_FILE: &str = "index.json";
const METADATA_FILE: &str = "metadata.json";
const MAX_SLUG_CHARS: usize = 48;

/// Build a readable, unique proposal id from its title
pub fn generate_proposal_id(title: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = true;
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
        if slug.len() >= MAX_SLUG_CHARS {
            break;
        }
    }
    let slug = slug.trim_matches('-');
    let suffix = Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..8];
    if slug.is_empty() {
        format!("proposal-{suffix}")
    } else {
        format!("{slug}-{suffix}")
    }
}

fn validate_proposal_id(id: &str) -> AppResult<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::validation(format!("Invalid proposal id: {id}")))
    }
}

fn relative_path(location: ProposalLocation, id: &str) -> String {
    format!("{}/{}/{}", APP_DIR_NAME, location.as_str(), id)
}

fn new_record(draft: ProposalDraft, source_agent_id: Option<&str>) -> ProposalRecord {
    let id = generate_proposal_id(&draft.title);
    let now = Utc::now();
    ProposalRecord {
        path: relative_path(ProposalLocation::Proposals, &id),
        id,
        status: ProposalStatus::Draft,
        location: ProposalLocation::Proposals,
        document: draft,
        source_agent_id: source_agent_id.map(str::to_string),
        created_at: now,
        updated_at: now,
    }
}

// ============================================================================
// Markdown rendering
// ============================================================================

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

/// Render proposal.md
pub fn render_proposal_md(record: &ProposalRecord) -> String {
    let doc = &record.document;
    let changes: Vec<String> = doc.what_changes.iter().map(|c| format!("- {c}")).collect();
    format!(
        "# Proposal: {}\n\n## Why\n\n{}\n\n## What Changes\n\n{}\n\n## Impact\n\n- **Specs affected**: {}\n- **Files affected**: {}\n- **Breaking changes**: {}\n",
        doc.title,
        doc.why,
        changes.join("\n"),
        join_or_none(&doc.impact.specs),
        join_or_none(&doc.impact.files),
        if doc.impact.breaking_changes { "Yes" } else { "No" }
    )
}

/// Render tasks.md
pub fn render_tasks_md(record: &ProposalRecord) -> String {
    let mut content = String::from("# Tasks\n\n");
    for (i, task) in record.document.tasks.iter().enumerate() {
        if task.category.is_empty() {
            content.push_str(&format!("## Task {}: {}\n\n", i + 1, task.title));
        } else {
            content.push_str(&format!(
                "## Task {}: {} ({})\n\n",
                i + 1,
                task.title,
                task.category
            ));
        }
        if !task.description.is_empty() {
            content.push_str(&format!("{}\n\n", task.description));
        }
        content.push_str(&format!("**Estimated**: {} hours\n\n", task.estimated_hours));
    }
    content
}

// ============================================================================
// File store
// ============================================================================

/// Proposal store backed by the project's data directory
#[derive(Debug, Clone, Copy, Default)]
pub struct FileProposalStore;

impl FileProposalStore {
    pub fn new() -> Self {
        Self
    }

    fn location_dir(project_root: &Path, location: ProposalLocation) -> PathBuf {
        project_data_dir(project_root).join(location.as_str())
    }

    fn proposal_dir(project_root: &Path, location: ProposalLocation, id: &str) -> PathBuf {
        Self::location_dir(project_root, location).join(id)
    }

    /// Write every file of a proposal and refresh its location index
    pub async fn save(&self, project_root: &Path, record: &ProposalRecord) -> AppResult<()> {
        validate_proposal_id(&record.id)?;
        let dir = Self::proposal_dir(project_root, record.location, &record.id);
        tokio::fs::create_dir_all(&dir).await?;

        tokio::fs::write(dir.join("proposal.md"), render_proposal_md(record)).await?;
        tokio::fs::write(dir.join("tasks.md"), render_tasks_md(record)).await?;
        let design_path = dir.join("design.md");
        match &record.document.design {
            Some(design) => tokio::fs::write(&design_path, design).await?,
            None => {
                if tokio::fs::try_exists(&design_path).await? {
                    tokio::fs::remove_file(&design_path).await?;
                }
            }
        }
        let metadata = serde_json::to_string_pretty(record)?;
        tokio::fs::write(dir.join(METADATA_FILE), metadata).await?;

        self.upsert_index(project_root, record).await?;
        debug!(
            proposal_id = %record.id,
            location = record.location.as_str(),
            "[Proposal] Saved"
        );
        Ok(())
    }

    pub async fn load(
        &self,
        project_root: &Path,
        location: ProposalLocation,
        id: &str,
    ) -> AppResult<ProposalRecord> {
        validate_proposal_id(id)?;
        let path = Self::proposal_dir(project_root, location, id).join(METADATA_FILE);
        if !tokio::fs::try_exists(&path).await? {
            return Err(AppError::not_found(format!(
                "Proposal {} in {}",
                id,
                location.as_str()
            )));
        }
        let content = tokio::fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// All proposals in every location, most recently updated first.
    ///
    /// Unreadable entries are skipped.
    pub async fn list(&self, project_root: &Path) -> AppResult<ProposalIndex> {
        let mut proposals = Vec::new();
        for location in ProposalLocation::ALL {
            let dir = Self::location_dir(project_root, location);
            if !tokio::fs::try_exists(&dir).await? {
                continue;
            }
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let metadata_path = entry.path().join(METADATA_FILE);
                let Ok(content) = tokio::fs::read_to_string(&metadata_path).await else {
                    continue;
                };
                match serde_json::from_str::<ProposalRecord>(&content) {
                    Ok(record) => proposals.push(ProposalIndexItem::from(&record)),
                    Err(e) => warn!(
                        path = %metadata_path.display(),
                        "[Proposal] Skipping unreadable metadata: {}", e
                    ),
                }
            }
        }
        proposals.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(ProposalIndex {
            proposals,
            last_updated: Some(Utc::now()),
        })
    }

    pub async fn delete(
        &self,
        project_root: &Path,
        location: ProposalLocation,
        id: &str,
    ) -> AppResult<()> {
        validate_proposal_id(id)?;
        let dir = Self::proposal_dir(project_root, location, id);
        if !tokio::fs::try_exists(&dir).await? {
            return Err(AppError::not_found(format!(
                "Proposal {} in {}",
                id,
                location.as_str()
            )));
        }
        tokio::fs::remove_dir_all(&dir).await?;
        self.remove_from_index(project_root, location, id).await?;
        info!(proposal_id = %id, "[Proposal] Deleted");
        Ok(())
    }

    /// Move a proposal to another location (proposals -> changes -> archive)
    pub async fn move_to(
        &self,
        project_root: &Path,
        id: &str,
        from: ProposalLocation,
        to: ProposalLocation,
    ) -> AppResult<ProposalRecord> {
        let mut record = self.load(project_root, from, id).await?;
        if from == to {
            return Ok(record);
        }

        let target = Self::proposal_dir(project_root, to, id);
        if tokio::fs::try_exists(&target).await? {
            tokio::fs::remove_dir_all(&target).await?;
        }
        tokio::fs::create_dir_all(Self::location_dir(project_root, to)).await?;
        tokio::fs::rename(Self::proposal_dir(project_root, from, id), &target).await?;
        self.remove_from_index(project_root, from, id).await?;

        record.location = to;
        record.path = relative_path(to, id);
        record.updated_at = Utc::now();
        let metadata = serde_json::to_string_pretty(&record)?;
        tokio::fs::write(target.join(METADATA_FILE), metadata).await?;
        self.upsert_index(project_root, &record).await?;

        info!(
            proposal_id = %id,
            from = from.as_str(),
            to = to.as_str(),
            "[Proposal] Moved"
        );
        Ok(record)
    }

    async fn read_index(&self, path: &Path) -> AppResult<ProposalIndex> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(ProposalIndex::default());
        }
        let content = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("[Proposal] Rebuilding corrupt index {}: {}", path.display(), e);
            ProposalIndex::default()
        }))
    }

    async fn write_index(&self, path: &Path, mut index: ProposalIndex) -> AppResult<()> {
        index.proposals.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        index.last_updated = Some(Utc::now());
        let content = serde_json::to_string_pretty(&index)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    async fn upsert_index(&self, project_root: &Path, record: &ProposalRecord) -> AppResult<()> {
        let path = Self::location_dir(project_root, record.location).join(INDEX_FILE);
        let mut index = self.read_index(&path).await?;
        let item = ProposalIndexItem::from(record);
        match index.proposals.iter_mut().find(|p| p.id == record.id) {
            Some(existing) => *existing = item,
            None => index.proposals.push(item),
        }
        self.write_index(&path, index).await
    }

    async fn remove_from_index(
        &self,
        project_root: &Path,
        location: ProposalLocation,
        id: &str,
    ) -> AppResult<()> {
        let path = Self::location_dir(project_root, location).join(INDEX_FILE);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(());
        }
        let mut index = self.read_index(&path).await?;
        index.proposals.retain(|p| p.id != id);
        self.write_index(&path, index).await
    }
}

#[async_trait]
impl ProposalStore for FileProposalStore {
    async fn create_proposal(
        &self,
        project_root: &Path,
        draft: ProposalDraft,
        source_agent_id: Option<&str>,
    ) -> AppResult<ProposalRecord> {
        let record = new_record(draft, source_agent_id);
        self.save(project_root, &record).await?;
        info!(
            proposal_id = %record.id,
            title = %record.document.title,
            "[Proposal] Created"
        );
        Ok(record)
    }

    async fn open_review_modal(&self, proposal: &ProposalRecord) -> AppResult<()> {
        // No UI attached; listeners pick up the ProposalCreated event instead.
        info!(proposal_id = %proposal.id, "[Proposal] Review requested");
        Ok(())
    }
}

// ============================================================================
// Memory store
// ============================================================================

/// In-memory proposal store
#[derive(Debug, Default)]
pub struct MemoryProposalStore {
    proposals: Mutex<Vec<ProposalRecord>>,
    reviews: Mutex<Vec<String>>,
    fail_with: Option<String>,
}

impl MemoryProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `create_proposal` always fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    pub async fn proposals(&self) -> Vec<ProposalRecord> {
        self.proposals.lock().await.clone()
    }

    /// Ids of proposals a review was requested for, in order
    pub async fn reviews(&self) -> Vec<String> {
        self.reviews.lock().await.clone()
    }
}

#[async_trait]
impl ProposalStore for MemoryProposalStore {
    async fn create_proposal(
        &self,
        _project_root: &Path,
        draft: ProposalDraft,
        source_agent_id: Option<&str>,
    ) -> AppResult<ProposalRecord> {
        if let Some(message) = &self.fail_with {
            return Err(AppError::internal(message.clone()));
        }
        let record = new_record(draft, source_agent_id);
        self.proposals.lock().await.push(record.clone());
        Ok(record)
    }

    async fn open_review_modal(&self, proposal: &ProposalRecord) -> AppResult<()> {
        self.reviews.lock().await.push(proposal.id.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::proposal::{ProposalImpact, ProposalTask};

    fn draft(title: &str) -> ProposalDraft {
        ProposalDraft {
            title: title.to_string(),
            why: "Because".to_string(),
            what_changes: vec!["Change one".to_string()],
            impact: ProposalImpact {
                specs: vec!["auth".to_string()],
                files: vec![],
                breaking_changes: true,
            },
            tasks: vec![ProposalTask {
                id: "task-1".to_string(),
                title: "Do it".to_string(),
                description: "Details".to_string(),
                category: "backend".to_string(),
                estimated_hours: 3.0,
                done: false,
            }],
            design: Some("Design notes".to_string()),
        }
    }

    #[test]
    fn test_generate_proposal_id() {
        let id = generate_proposal_id("Add Dark Mode!");
        assert!(id.starts_with("add-dark-mode-"));
        assert_eq!(id.len(), "add-dark-mode-".len() + 8);
        assert!(generate_proposal_id("!!!").starts_with("proposal-"));
        assert_ne!(generate_proposal_id("x"), generate_proposal_id("x"));
    }

    #[test]
    fn test_invalid_ids_rejected() {
        assert!(validate_proposal_id("../escape").is_err());
        assert!(validate_proposal_id("").is_err());
        assert!(validate_proposal_id("ok-id_1").is_ok());
    }

    #[test]
    fn test_render_markdown() {
        let record = new_record(draft("Auth rework"), None);
        let proposal = render_proposal_md(&record);
        assert!(proposal.starts_with("# Proposal: Auth rework"));
        assert!(proposal.contains("- Change one"));
        assert!(proposal.contains("**Specs affected**: auth"));
        assert!(proposal.contains("**Files affected**: None"));
        assert!(proposal.contains("**Breaking changes**: Yes"));

        let tasks = render_tasks_md(&record);
        assert!(tasks.contains("## Task 1: Do it (backend)"));
        assert!(tasks.contains("**Estimated**: 3 hours"));
    }

    #[tokio::test]
    async fn test_file_store_create_and_load() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileProposalStore::new();

        let record = store
            .create_proposal(temp.path(), draft("Auth rework"), Some("agent-1"))
            .await
            .unwrap();
        let dir = temp
            .path()
            .join(".agent-orchestrator/proposals")
            .join(&record.id);
        assert!(dir.join("proposal.md").is_file());
        assert!(dir.join("tasks.md").is_file());
        assert!(dir.join("design.md").is_file());
        assert!(dir.join("metadata.json").is_file());
        assert!(temp
            .path()
            .join(".agent-orchestrator/proposals/index.json")
            .is_file());

        let loaded = store
            .load(temp.path(), ProposalLocation::Proposals, &record.id)
            .await
            .unwrap();
        assert_eq!(loaded, record);
        assert_eq!(loaded.source_agent_id.as_deref(), Some("agent-1"));
    }

    #[tokio::test]
    async fn test_file_store_move_and_list() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileProposalStore::new();
        let first = store
            .create_proposal(temp.path(), draft("First"), None)
            .await
            .unwrap();
        let second = store
            .create_proposal(temp.path(), draft("Second"), None)
            .await
            .unwrap();

        let moved = store
            .move_to(
                temp.path(),
                &first.id,
                ProposalLocation::Proposals,
                ProposalLocation::Changes,
            )
            .await
            .unwrap();
        assert_eq!(moved.location, ProposalLocation::Changes);
        assert!(moved.path.ends_with(&format!("changes/{}", first.id)));
        assert!(store
            .load(temp.path(), ProposalLocation::Proposals, &first.id)
            .await
            .is_err());

        let index = store.list(temp.path()).await.unwrap();
        assert_eq!(index.proposals.len(), 2);
        assert_eq!(index.proposals[0].id, first.id);
        assert!(index.proposals.iter().any(|p| p.id == second.id));

        let proposals_index: ProposalIndex = serde_json::from_str(
            &std::fs::read_to_string(
                temp.path()
                    .join(".agent-orchestrator/proposals/index.json"),
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(proposals_index.proposals.len(), 1);
        assert_eq!(proposals_index.proposals[0].id, second.id);
    }

    #[tokio::test]
    async fn test_file_store_delete() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileProposalStore::new();
        let record = store
            .create_proposal(temp.path(), draft("Gone"), None)
            .await
            .unwrap();

        store
            .delete(temp.path(), ProposalLocation::Proposals, &record.id)
            .await
            .unwrap();
        assert!(store.list(temp.path()).await.unwrap().proposals.is_empty());

        let missing = store
            .delete(temp.path(), ProposalLocation::Proposals, &record.id)
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_memory_store_failure_message() {
        let store = MemoryProposalStore::failing("disk full");
        let err = store
            .create_proposal(Path::new("/work"), draft("x"), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Internal error: disk full");
        assert!(store.proposals().await.is_empty());
    }
}
