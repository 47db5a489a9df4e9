//! Git publishing.
//!
//! Stages, commits and pushes the project root with libgit2. Each action runs
//! once; nothing is rolled back when a later step fails, so a failed push can
//! leave a local commit behind.

use std::fs;
use std::path::{Path, PathBuf};

use git2::{
    Cred, CredentialType, IndexAddOption, Oid, PushOptions, RemoteCallbacks, Repository,
    RepositoryInitOptions, Signature,
};

use crate::core::{docs, ProjectError, ProjectResult};

/// Commit message used by [`GitPublisher::setup_remote`].
pub const SETUP_COMMIT_MESSAGE: &str = "Initial commit: workflow project setup";

/// Maximum credential callbacks before giving up on authentication.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Publisher settings.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Remote name (usually `origin`)
    pub remote: String,
    /// Branch used when initializing a new repository
    pub branch: String,
    /// Fallback signature name when git has no identity configured
    pub author: String,
    /// Fallback signature email
    pub email: String,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            branch: "main".to_string(),
            author: "flowdeck".to_string(),
            email: "flowdeck@localhost".to_string(),
        }
    }
}

impl PublishOptions {
    /// Options resolved from configuration.
    pub fn from_config(config: &crate::core::Config) -> Self {
        Self {
            remote: config.git.remote.clone(),
            branch: config.git.branch.clone(),
            author: config.author_name(),
            email: config.author_email(),
        }
    }
}

/// What [`GitPublisher::ensure_remote`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteChange {
    /// Remote was registered
    Added,
    /// Remote existed with another URL and was repointed
    Updated,
    /// Remote already pointed at the URL
    Unchanged,
}

/// Result of a publish.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    /// New commit, or `None` when nothing changed since HEAD
    pub commit: Option<Oid>,
    /// Branch that was pushed
    pub branch: String,
    /// Remote registration change
    pub remote_change: RemoteChange,
}

/// Result of preparing a repository for publishing.
#[derive(Debug, Clone)]
pub struct SetupOutcome {
    /// Whether the repository was created
    pub initialized: bool,
    /// Remote registration change
    pub remote_change: RemoteChange,
    /// Whether a `.gitignore` was written
    pub wrote_gitignore: bool,
    /// Initial commit, or `None` when nothing changed since HEAD
    pub commit: Option<Oid>,
}

/// Git publisher for a project root.
pub struct GitPublisher {
    root: PathBuf,
    options: PublishOptions,
}

impl GitPublisher {
    /// Create a publisher for the given working tree.
    pub fn new(root: impl AsRef<Path>, options: PublishOptions) -> Self {
        Self { root: root.as_ref().to_path_buf(), options }
    }

    /// Working tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open the repository at the root, initializing it if absent.
    ///
    /// Returns the repository and whether it was created.
    pub fn ensure_repository(&self) -> ProjectResult<(Repository, bool)> {
        if self.root.join(".git").exists() {
            let repo = Repository::open(&self.root).map_err(failed("open repository"))?;
            return Ok((repo, false));
        }

        fs::create_dir_all(&self.root)?;
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head(&self.options.branch);
        let repo = Repository::init_opts(&self.root, &opts).map_err(failed("init"))?;
        tracing::info!(root = %self.root.display(), branch = %self.options.branch, "initialized repository");
        Ok((repo, true))
    }

    /// Register the remote, or repoint it when its URL differs.
    pub fn ensure_remote(&self, repo: &Repository, url: &str) -> ProjectResult<RemoteChange> {
        let name = &self.options.remote;
        match repo.find_remote(name) {
            Ok(remote) if remote.url() == Some(url) => Ok(RemoteChange::Unchanged),
            Ok(_) => {
                repo.remote_set_url(name, url).map_err(failed("remote set-url"))?;
                tracing::info!(remote = %name, url, "updated remote");
                Ok(RemoteChange::Updated)
            }
            Err(_) => {
                repo.remote(name, url).map_err(failed("remote add"))?;
                tracing::info!(remote = %name, url, "added remote");
                Ok(RemoteChange::Added)
            }
        }
    }

    /// Stage every change in the working tree, deletions included.
    pub fn stage_all(&self, repo: &Repository) -> ProjectResult<()> {
        let mut index = repo.index().map_err(failed("add"))?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None).map_err(failed("add"))?;
        index.update_all(["*"].iter(), None).map_err(failed("add"))?;
        index.write().map_err(failed("add"))?;
        Ok(())
    }

    /// Commit the index on HEAD.
    ///
    /// Returns `None` without committing when the tree matches HEAD.
    pub fn commit(&self, repo: &Repository, message: &str) -> ProjectResult<Option<Oid>> {
        let mut index = repo.index().map_err(failed("commit"))?;
        let tree_id = index.write_tree().map_err(failed("commit"))?;
        let tree = repo.find_tree(tree_id).map_err(failed("commit"))?;

        let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        if parent.as_ref().is_some_and(|p| p.tree_id() == tree_id) {
            tracing::info!("nothing to commit");
            return Ok(None);
        }

        let signature = repo
            .signature()
            .or_else(|_| Signature::now(&self.options.author, &self.options.email))
            .map_err(failed("commit"))?;
        let parents: Vec<_> = parent.iter().collect();
        let oid = repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .map_err(failed("commit"))?;

        tracing::info!(commit = %oid, "created commit");
        Ok(Some(oid))
    }

    /// Push a branch to the configured remote.
    pub fn push(&self, repo: &Repository, branch: &str) -> ProjectResult<()> {
        let mut remote = repo.find_remote(&self.options.remote).map_err(failed("push"))?;
        let config = repo.config().ok();

        let mut attempts = 0;
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username, allowed| {
            attempts += 1;
            if attempts > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str("authentication failed"));
            }
            if allowed.contains(CredentialType::SSH_KEY) {
                return Cred::ssh_key_from_agent(username.unwrap_or("git"));
            }
            if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
                if let Some(config) = &config {
                    return Cred::credential_helper(config, url, username);
                }
            }
            Cred::default()
        });
        callbacks.push_update_reference(|refname, status| match status {
            Some(message) => {
                Err(git2::Error::from_str(&format!("{refname} rejected by remote: {message}")))
            }
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        remote.push(&[refspec.as_str()], Some(&mut push_options)).map_err(failed("push"))?;

        tracing::info!(remote = %self.options.remote, branch, "pushed");
        Ok(())
    }

    /// Stage, commit and push the whole root to `remote_url`.
    pub fn publish(&self, remote_url: &str, message: &str) -> ProjectResult<PublishOutcome> {
        let (repo, _) = self.ensure_repository()?;
        let remote_change = self.ensure_remote(&repo, remote_url)?;

        self.stage_all(&repo)?;
        let commit = self.commit(&repo, message)?;

        let branch = current_branch(&repo).unwrap_or_else(|| self.options.branch.clone());
        self.push(&repo, &branch)?;

        Ok(PublishOutcome { commit, branch, remote_change })
    }

    /// Prepare the root for publishing without pushing.
    ///
    /// Initializes the repository, points the remote at `remote_url`, writes a
    /// default `.gitignore` when none exists and commits everything.
    pub fn setup_remote(&self, remote_url: &str) -> ProjectResult<SetupOutcome> {
        let (repo, initialized) = self.ensure_repository()?;
        let remote_change = self.ensure_remote(&repo, remote_url)?;

        let gitignore = self.root.join(".gitignore");
        let wrote_gitignore = !gitignore.exists();
        if wrote_gitignore {
            fs::write(&gitignore, docs::default_gitignore())?;
        }

        self.stage_all(&repo)?;
        let commit = self.commit(&repo, SETUP_COMMIT_MESSAGE)?;

        Ok(SetupOutcome { initialized, remote_change, wrote_gitignore, commit })
    }
}

/// Commit message for publishing a project.
pub fn sync_commit_message(project: &str, version: &str) -> String {
    format!(
        "feat: Update {project} workflow

- Synced workflow project files
- Updated project metadata
- Version {version}
- Updated documentation"
    )
}

/// Name of the branch HEAD points at, even before the first commit.
pub fn current_branch(repo: &Repository) -> Option<String> {
    if let Ok(head) = repo.head() {
        return if head.is_branch() { head.shorthand().map(String::from) } else { None };
    }

    let head = repo.find_reference("HEAD").ok()?;
    head.symbolic_target().and_then(|t| t.strip_prefix("refs/heads/")).map(String::from)
}

fn failed(action: &'static str) -> impl Fn(git2::Error) -> ProjectError {
    move |e| ProjectError::external(format!("git {action}: {}", e.message()))
}
