//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use commit_assist::error::ProviderError;
use commit_assist::git::{GitRepository, LocalConnector};
use commit_assist::llm::{LlmRouter, Provider, TextProvider};
use commit_assist::{AppState, StatusParser};

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Read a status fixture as a string.
pub fn status_fixture(name: &str) -> String {
    let path = fixtures_dir().join("status").join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository with a committer identity configured.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        let mut config = repo.config().expect("Failed to open repo config");
        config
            .set_str("user.name", "Test User")
            .expect("Failed to set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Failed to set user.email");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn path_str(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    /// Write a file relative to the repository root.
    pub fn write(&self, name: &str, content: &str) {
        std::fs::write(self.dir.path().join(name), content).expect("Failed to write test file");
    }

    /// Add a file to the index.
    pub fn stage(&self, name: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Write, stage and commit a file. Returns the commit OID.
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> Oid {
        self.write(name, content);
        self.stage(name);

        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Message of the commit HEAD points to.
    pub fn head_message(&self) -> String {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map(|c| c.message().unwrap_or_default().to_string())
            .expect("Failed to read HEAD commit")
    }

    pub fn commit_count(&self) -> usize {
        let mut walk = self.repo.revwalk().expect("Failed to create revwalk");
        if walk.push_head().is_err() {
            return 0;
        }
        walk.count()
    }
}

/// Provider returning a fixed answer, or failing when `answer` is `None`.
pub struct CannedProvider {
    pub provider: Provider,
    pub answer: Option<String>,
}

impl CannedProvider {
    pub fn answering(provider: Provider, answer: &str) -> Box<dyn TextProvider> {
        Box::new(Self {
            provider,
            answer: Some(answer.to_string()),
        })
    }

    pub fn failing(provider: Provider) -> Box<dyn TextProvider> {
        Box::new(Self {
            provider,
            answer: None,
        })
    }
}

#[async_trait]
impl TextProvider for CannedProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, ProviderError> {
        self.answer.clone().ok_or(ProviderError::Api {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}

/// App state backed by the in-process git backend and the given providers.
pub fn local_state(providers: Vec<Box<dyn TextProvider>>) -> Arc<AppState> {
    Arc::new(AppState::new(
        GitRepository::new(Arc::new(LocalConnector), StatusParser::default()),
        LlmRouter::new(providers, Duration::from_secs(5)),
    ))
}
