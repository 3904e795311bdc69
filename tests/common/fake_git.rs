//! In-memory git double.
//!
//! Remotes live entirely in memory and are keyed by URL. Local repositories are
//! real directories (with a `.git` marker) so the code under test can clear and
//! regenerate files exactly as it does against a real working copy. Commits
//! snapshot the working directory; pushes apply fast-forward rules unless forced.

use async_trait::async_trait;
use sdksync::infrastructure::scm::{PushRequest, ScmError, ScmOperations};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

/// Relative path to file content
pub type Tree = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct FakeCommit {
    pub id: String,
    pub parent: Option<String>,
    pub message: String,
    pub tree: Tree,
}

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeCall {
    pub operation: String,
    pub repo: Option<PathBuf>,
    pub detail: String,
}

#[derive(Debug, Default)]
struct RemoteRepo {
    branches: BTreeMap<String, String>,
    tags: BTreeMap<String, String>,
}

#[derive(Debug)]
struct LocalRepo {
    origin: Option<String>,
    tracking: BTreeMap<String, String>,
    branches: BTreeMap<String, Option<String>>,
    head: String,
    tags: BTreeMap<String, String>,
    upstreams: BTreeSet<String>,
    identity: Option<(String, String)>,
}

impl LocalRepo {
    fn empty() -> Self {
        Self {
            origin: None,
            tracking: BTreeMap::new(),
            branches: BTreeMap::new(),
            head: "master".to_string(),
            tags: BTreeMap::new(),
            upstreams: BTreeSet::new(),
            identity: None,
        }
    }

    fn head_commit(&self) -> Option<String> {
        self.branches.get(&self.head).cloned().flatten()
    }
}

#[derive(Debug, Default)]
struct FakeGitState {
    commits: HashMap<String, FakeCommit>,
    remotes: HashMap<String, RemoteRepo>,
    locals: HashMap<PathBuf, LocalRepo>,
    calls: Vec<FakeCall>,
    failures: Vec<(String, String)>,
    next_commit: u64,
}

impl FakeGitState {
    fn begin(&mut self, operation: &str, repo: Option<&Path>, detail: impl Into<String>) -> Result<(), ScmError> {
        let detail = detail.into();
        let target = repo
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| detail.clone());
        self.calls.push(FakeCall {
            operation: operation.to_string(),
            repo: repo.map(Path::to_path_buf),
            detail: detail.clone(),
        });

        let injected = self
            .failures
            .iter()
            .any(|(op, fragment)| op == operation && target.contains(fragment.as_str()));
        if injected {
            return Err(ScmError::command_failed(
                format!("git {} {}", operation, detail),
                1,
                "injected failure",
            ));
        }
        Ok(())
    }

    fn new_commit(&mut self, parent: Option<String>, message: &str, tree: Tree) -> String {
        self.next_commit += 1;
        let id = format!("{:040x}", self.next_commit);
        self.commits.insert(
            id.clone(),
            FakeCommit {
                id: id.clone(),
                parent,
                message: message.to_string(),
                tree,
            },
        );
        id
    }

    fn tree_of(&self, commit: Option<&String>) -> Tree {
        commit
            .and_then(|id| self.commits.get(id))
            .map(|commit| commit.tree.clone())
            .unwrap_or_default()
    }
}

fn is_ancestor(commits: &HashMap<String, FakeCommit>, ancestor: &str, descendant: &str) -> bool {
    let mut current = Some(descendant.to_string());
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        current = commits.get(&id).and_then(|commit| commit.parent.clone());
    }
    false
}

fn not_a_repository(path: &Path) -> ScmError {
    ScmError::RepositoryNotFound {
        path: path.display().to_string(),
    }
}

fn snapshot(dir: &Path) -> Tree {
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(dir).ok()?;
            let relative = relative.to_string_lossy().replace('\\', "/");
            let content = fs::read(entry.path()).ok()?;
            Some((relative, String::from_utf8_lossy(&content).into_owned()))
        })
        .collect()
}

fn materialize(dir: &Path, tree: &Tree) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name() == ".git" {
            continue;
        }
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }

    for (relative, content) in tree {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct FakeGit {
    state: Mutex<FakeGitState>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeGitState> {
        self.state.lock().unwrap()
    }

    /// Register an empty, reachable remote
    pub fn create_remote(&self, url: &str) {
        self.lock().remotes.entry(url.to_string()).or_default();
    }

    /// Push one commit holding `files` to `branch` of `url`, tagging it with `tags`
    pub fn seed_remote(&self, url: &str, branch: &str, files: &[(&str, &str)], tags: &[&str]) -> String {
        let mut state = self.lock();
        let parent = state
            .remotes
            .get(url)
            .and_then(|remote| remote.branches.get(branch).cloned());
        let tree = files
            .iter()
            .map(|(path, content)| (path.to_string(), content.to_string()))
            .collect();
        let id = state.new_commit(parent, "seed", tree);

        let remote = state.remotes.entry(url.to_string()).or_default();
        remote.branches.insert(branch.to_string(), id.clone());
        for tag in tags {
            remote.tags.insert(tag.to_string(), id.clone());
        }
        id
    }

    /// Fail every `operation` whose repository path (or URL) contains `fragment`
    pub fn fail_on(&self, operation: &str, fragment: &str) {
        self.lock()
            .failures
            .push((operation.to_string(), fragment.to_string()));
    }

    pub fn remote_branch(&self, url: &str, branch: &str) -> Option<String> {
        self.lock()
            .remotes
            .get(url)
            .and_then(|remote| remote.branches.get(branch).cloned())
    }

    pub fn remote_tag(&self, url: &str, tag: &str) -> Option<String> {
        self.lock()
            .remotes
            .get(url)
            .and_then(|remote| remote.tags.get(tag).cloned())
    }

    pub fn remote_tags(&self, url: &str) -> Vec<String> {
        self.lock()
            .remotes
            .get(url)
            .map(|remote| remote.tags.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        is_ancestor(&self.lock().commits, ancestor, descendant)
    }

    pub fn commit(&self, id: &str) -> Option<FakeCommit> {
        self.lock().commits.get(id).cloned()
    }

    pub fn tree(&self, id: &str) -> Tree {
        self.commit(id).map(|commit| commit.tree).unwrap_or_default()
    }

    pub fn upstreams(&self, repo: &Path) -> BTreeSet<String> {
        self.lock()
            .locals
            .get(repo)
            .map(|local| local.upstreams.clone())
            .unwrap_or_default()
    }

    pub fn identity(&self, repo: &Path) -> Option<(String, String)> {
        self.lock().locals.get(repo).and_then(|local| local.identity.clone())
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.lock().calls.clone()
    }

    /// Details of every operation named `operation`, in call order
    pub fn calls_to(&self, operation: &str) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation == operation)
            .map(|call| call.detail.clone())
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

#[async_trait]
impl ScmOperations for FakeGit {
    async fn is_remote_populated(&self, url: &str) -> Result<bool, ScmError> {
        let mut state = self.lock();
        state.begin("ls-remote", None, url)?;
        Ok(state
            .remotes
            .get(url)
            .map(|remote| !remote.branches.is_empty() || !remote.tags.is_empty())
            .unwrap_or(false))
    }

    async fn clone_repository(&self, url: &str, dest_path: &Path) -> Result<(), ScmError> {
        let mut state = self.lock();
        state.begin("clone", Some(dest_path), url)?;

        let remote = state
            .remotes
            .get(url)
            .ok_or_else(|| ScmError::clone_failed(format!("repository '{}' not found", url)))?;
        let default_branch = if remote.branches.contains_key("master") {
            Some("master".to_string())
        } else {
            remote.branches.keys().next().cloned()
        };

        let mut local = LocalRepo::empty();
        local.origin = Some(url.to_string());
        local.tracking = remote.branches.clone();
        local.tags = remote.tags.clone();
        if let Some(branch) = default_branch {
            local.branches.insert(branch.clone(), remote.branches.get(&branch).cloned());
            local.upstreams.insert(branch.clone());
            local.head = branch;
        }

        fs::create_dir_all(dest_path.join(".git"))?;
        let tree = state.tree_of(local.head_commit().as_ref());
        materialize(dest_path, &tree)?;
        state.locals.insert(dest_path.to_path_buf(), local);
        Ok(())
    }

    async fn init_repository(&self, dest_path: &Path) -> Result<(), ScmError> {
        let mut state = self.lock();
        state.begin("init", Some(dest_path), "")?;
        fs::create_dir_all(dest_path.join(".git"))?;
        state.locals.insert(dest_path.to_path_buf(), LocalRepo::empty());
        Ok(())
    }

    async fn add_remote(&self, repo_path: &Path, name: &str, url: &str) -> Result<(), ScmError> {
        let mut state = self.lock();
        state.begin("remote add", Some(repo_path), format!("{} {}", name, url))?;
        let local = state.locals.get_mut(repo_path).ok_or_else(|| not_a_repository(repo_path))?;
        local.origin = Some(url.to_string());
        Ok(())
    }

    async fn configure_identity(&self, repo_path: &Path, name: &str, email: &str) -> Result<(), ScmError> {
        let mut state = self.lock();
        state.begin("config", Some(repo_path), format!("{} <{}>", name, email))?;
        let local = state.locals.get_mut(repo_path).ok_or_else(|| not_a_repository(repo_path))?;
        local.identity = Some((name.to_string(), email.to_string()));
        Ok(())
    }

    async fn remote_branches(&self, repo_path: &Path, remote: &str) -> Result<Vec<String>, ScmError> {
        let mut state = self.lock();
        state.begin("for-each-ref", Some(repo_path), remote)?;
        let local = state.locals.get(repo_path).ok_or_else(|| not_a_repository(repo_path))?;
        Ok(local.tracking.keys().cloned().collect())
    }

    async fn tags(&self, repo_path: &Path) -> Result<Vec<String>, ScmError> {
        let mut state = self.lock();
        state.begin("tag -l", Some(repo_path), "")?;
        let local = state.locals.get(repo_path).ok_or_else(|| not_a_repository(repo_path))?;
        Ok(local.tags.keys().cloned().collect())
    }

    async fn create_branch(&self, repo_path: &Path, name: &str) -> Result<(), ScmError> {
        let mut state = self.lock();
        state.begin("checkout -b", Some(repo_path), name)?;
        let local = state.locals.get_mut(repo_path).ok_or_else(|| not_a_repository(repo_path))?;
        if local.branches.contains_key(name) {
            return Err(ScmError::command_failed(
                format!("git checkout -b {}", name),
                128,
                format!("a branch named '{}' already exists", name),
            ));
        }
        let head = local.head_commit();
        local.branches.insert(name.to_string(), head);
        local.head = name.to_string();
        Ok(())
    }

    async fn checkout(&self, repo_path: &Path, name: &str) -> Result<(), ScmError> {
        let mut state = self.lock();
        state.begin("checkout", Some(repo_path), name)?;
        let local = state.locals.get_mut(repo_path).ok_or_else(|| not_a_repository(repo_path))?;

        if !local.branches.contains_key(name) {
            let tracked = local.tracking.get(name).cloned().ok_or_else(|| {
                ScmError::command_failed(
                    format!("git checkout {}", name),
                    1,
                    format!("pathspec '{}' did not match any file(s) known to git", name),
                )
            })?;
            local.branches.insert(name.to_string(), Some(tracked));
            local.upstreams.insert(name.to_string());
        }
        local.head = name.to_string();

        let head = local.head_commit();
        let tree = state.tree_of(head.as_ref());
        materialize(repo_path, &tree)?;
        Ok(())
    }

    async fn has_changes(&self, repo_path: &Path) -> Result<bool, ScmError> {
        let mut state = self.lock();
        state.begin("status", Some(repo_path), "--porcelain")?;
        let local = state.locals.get(repo_path).ok_or_else(|| not_a_repository(repo_path))?;
        let head = state.tree_of(local.head_commit().as_ref());
        Ok(snapshot(repo_path) != head)
    }

    async fn add_all(&self, repo_path: &Path) -> Result<(), ScmError> {
        let mut state = self.lock();
        state.begin("add", Some(repo_path), "--all .")?;
        if !state.locals.contains_key(repo_path) {
            return Err(not_a_repository(repo_path));
        }
        Ok(())
    }

    async fn commit(&self, repo_path: &Path, message: &str, allow_empty: bool) -> Result<(), ScmError> {
        let mut state = self.lock();
        state.begin("commit", Some(repo_path), message)?;
        let parent = state
            .locals
            .get(repo_path)
            .ok_or_else(|| not_a_repository(repo_path))?
            .head_commit();

        let tree = snapshot(repo_path);
        if !allow_empty && tree == state.tree_of(parent.as_ref()) {
            return Err(ScmError::command_failed(
                "git commit",
                1,
                "nothing to commit, working tree clean",
            ));
        }

        let id = state.new_commit(parent, message, tree);
        let local = state.locals.get_mut(repo_path).ok_or_else(|| not_a_repository(repo_path))?;
        let head = local.head.clone();
        local.branches.insert(head, Some(id));
        Ok(())
    }

    async fn create_tag(&self, repo_path: &Path, name: &str) -> Result<(), ScmError> {
        let mut state = self.lock();
        state.begin("tag", Some(repo_path), name)?;
        let local = state.locals.get_mut(repo_path).ok_or_else(|| not_a_repository(repo_path))?;
        if local.tags.contains_key(name) {
            return Err(ScmError::command_failed(
                format!("git tag {}", name),
                128,
                format!("tag '{}' already exists", name),
            ));
        }
        let head = local.head_commit().ok_or_else(|| {
            ScmError::command_failed(format!("git tag {}", name), 128, "Failed to resolve 'HEAD'")
        })?;
        local.tags.insert(name.to_string(), head);
        Ok(())
    }

    async fn delete_tag(&self, repo_path: &Path, name: &str) -> Result<(), ScmError> {
        let mut state = self.lock();
        state.begin("tag -d", Some(repo_path), name)?;
        let local = state.locals.get_mut(repo_path).ok_or_else(|| not_a_repository(repo_path))?;
        local.tags.remove(name).map(|_| ()).ok_or_else(|| {
            ScmError::command_failed(format!("git tag -d {}", name), 1, format!("tag '{}' not found", name))
        })
    }

    async fn push(&self, repo_path: &Path, request: &PushRequest) -> Result<(), ScmError> {
        let mut state = self.lock();
        state.begin("push", Some(repo_path), request.to_args().join(" "))?;

        let FakeGitState {
            commits,
            remotes,
            locals,
            ..
        } = &mut *state;
        let local = locals.get_mut(repo_path).ok_or_else(|| not_a_repository(repo_path))?;
        let url = local
            .origin
            .clone()
            .ok_or_else(|| ScmError::push_rejected(format!("'{}' does not appear to be a git repository", request.remote)))?;
        let remote = remotes
            .get_mut(&url)
            .ok_or_else(|| ScmError::push_rejected(format!("repository '{}' not found", url)))?;

        if let Some(tag) = request.refspec.strip_prefix("refs/tags/") {
            if request.delete {
                return remote
                    .tags
                    .remove(tag)
                    .map(|_| ())
                    .ok_or_else(|| ScmError::push_rejected(format!("unable to delete '{}': remote ref does not exist", tag)));
            }

            let commit = local
                .tags
                .get(tag)
                .cloned()
                .ok_or_else(|| ScmError::push_rejected(format!("src refspec {} does not match any", tag)))?;
            if let Some(existing) = remote.tags.get(tag) {
                if *existing != commit && !request.force {
                    return Err(ScmError::push_rejected(format!("{} (already exists)", tag)));
                }
            }
            remote.tags.insert(tag.to_string(), commit);
            return Ok(());
        }

        let branch = request.refspec.as_str();
        let commit = local
            .branches
            .get(branch)
            .cloned()
            .flatten()
            .ok_or_else(|| ScmError::push_rejected(format!("src refspec {} does not match any", branch)))?;

        if let Some(current) = remote.branches.get(branch) {
            if !is_ancestor(commits, current, &commit) && !request.force {
                return Err(ScmError::push_rejected(format!("{} -> {} (non-fast-forward)", branch, branch)));
            }
        }

        remote.branches.insert(branch.to_string(), commit.clone());
        local.tracking.insert(branch.to_string(), commit);
        if request.set_upstream {
            local.upstreams.insert(branch.to_string());
        }
        Ok(())
    }

    async fn head_revision(&self, repo_path: &Path) -> Result<String, ScmError> {
        let mut state = self.lock();
        state.begin("rev-parse", Some(repo_path), "HEAD")?;
        let local = state.locals.get(repo_path).ok_or_else(|| not_a_repository(repo_path))?;
        local.head_commit().ok_or_else(|| {
            ScmError::command_failed("git rev-parse HEAD", 128, "ambiguous argument 'HEAD'")
        })
    }
}
