//! Working-directory canonicalization
//!
//! Records carry whatever directory the agent ran in. When that directory is a
//! git worktree the record belongs, logically, to the repository the worktree
//! was created from. `PathResolver` maps raw directories to that repository
//! path and memoizes the answer for the life of the process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::probe::AncestryProbe;

const WORKTREE_MARKER: &str = "/.git/worktrees/";

/// Raw path -> canonical path, shared across datasets and threads.
///
/// Entries are never evicted; the key space is the set of distinct working
/// directories ever seen.
#[derive(Debug, Default)]
pub struct PathCache {
    entries: RwLock<HashMap<String, String>>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, raw: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(raw).cloned()
    }

    /// Insert unless present; returns the value that ends up cached.
    pub fn insert_if_absent(&self, raw: &str, canonical: String) -> String {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.entry(raw.to_string()).or_insert(canonical).clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct PathResolver {
    worktrees_root: PathBuf,
    probe: Arc<dyn AncestryProbe>,
    cache: Arc<PathCache>,
}

impl PathResolver {
    pub fn new(worktrees_root: impl Into<PathBuf>, probe: Arc<dyn AncestryProbe>) -> Self {
        Self::with_cache(worktrees_root, probe, Arc::new(PathCache::new()))
    }

    pub fn with_cache(
        worktrees_root: impl Into<PathBuf>,
        probe: Arc<dyn AncestryProbe>,
        cache: Arc<PathCache>,
    ) -> Self {
        Self {
            worktrees_root: worktrees_root.into(),
            probe,
            cache,
        }
    }

    pub fn worktrees_root(&self) -> &Path {
        &self.worktrees_root
    }

    pub fn cache(&self) -> &Arc<PathCache> {
        &self.cache
    }

    /// Canonical repository path for `raw`. Never fails: anything that cannot be
    /// resolved is its own canonical path.
    pub fn resolve(&self, raw: &str) -> String {
        if let Some(hit) = self.cache.get(raw) {
            return hit;
        }

        let canonical = if self.is_under_worktrees_root(raw) {
            self.probe_parent(raw).unwrap_or_else(|| raw.to_string())
        } else {
            raw.to_string()
        };

        self.cache.insert_if_absent(raw, canonical)
    }

    /// Component-wise prefix check, so `~/worktrees-old` is not under `~/worktrees`.
    pub fn is_under_worktrees_root(&self, raw: &str) -> bool {
        Path::new(raw).starts_with(&self.worktrees_root)
    }

    fn probe_parent(&self, raw: &str) -> Option<String> {
        match self.probe.git_dir(Path::new(raw)) {
            Ok(git_dir) => {
                let parent = worktree_parent(&git_dir);
                tracing::debug!(
                    probe = self.probe.name(),
                    path = raw,
                    git_dir = %git_dir,
                    parent = ?parent,
                    "probed working directory"
                );
                parent.map(str::to_string)
            }
            Err(e) => {
                tracing::debug!(
                    probe = self.probe.name(),
                    path = raw,
                    error = %e,
                    "ancestry probe failed, treating path as canonical"
                );
                None
            }
        }
    }
}

/// `/home/u/repo/.git/worktrees/feat` -> `/home/u/repo`
pub fn worktree_parent(git_dir: &str) -> Option<&str> {
    let pos = git_dir.rfind(WORKTREE_MARKER)?;
    if pos == 0 {
        return None;
    }
    Some(&git_dir[..pos])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::probe::ProbeError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers from a fixed table; paths not in the table fail like a non-repo.
    pub(crate) struct FakeProbe {
        answers: HashMap<String, String>,
        pub(crate) calls: AtomicUsize,
    }

    impl FakeProbe {
        pub(crate) fn new(answers: &[(&str, &str)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl AncestryProbe for FakeProbe {
        fn name(&self) -> &str {
            "fake"
        }

        fn git_dir(&self, working_dir: &Path) -> Result<String, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let key = working_dir.to_string_lossy();
            self.answers
                .get(key.as_ref())
                .cloned()
                .ok_or_else(|| ProbeError::Output("not a git repository".to_string()))
        }
    }

    pub(crate) fn worktree_resolver() -> PathResolver {
        let probe = FakeProbe::new(&[
            (
                "/home/u/.worktrees/repo-feat",
                "/home/u/repo/.git/worktrees/repo-feat",
            ),
            (
                "/home/u/.worktrees/repo-fix",
                "/home/u/repo/.git/worktrees/repo-fix",
            ),
            ("/home/u/.worktrees/standalone", "/home/u/.worktrees/standalone/.git"),
        ]);
        PathResolver::new("/home/u/.worktrees", Arc::new(probe))
    }

    #[test]
    fn test_worktree_parent() {
        assert_eq!(
            worktree_parent("/home/u/repo/.git/worktrees/feat"),
            Some("/home/u/repo")
        );
        assert_eq!(worktree_parent("/home/u/repo/.git"), None);
        assert_eq!(worktree_parent("/.git/worktrees/feat"), None);
        // nested marker: the last occurrence wins
        assert_eq!(
            worktree_parent("/a/.git/worktrees/x/b/.git/worktrees/y"),
            Some("/a/.git/worktrees/x/b")
        );
    }

    #[test]
    fn test_paths_outside_root_are_not_probed() {
        let probe = Arc::new(FakeProbe::new(&[]));
        let resolver = PathResolver::new("/home/u/.worktrees", probe.clone());

        assert_eq!(resolver.resolve("/home/u/repo"), "/home/u/repo");
        assert_eq!(resolver.resolve("/home/u/.worktrees-old/x"), "/home/u/.worktrees-old/x");
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_resolves_worktree_to_parent() {
        let resolver = worktree_resolver();
        assert_eq!(resolver.resolve("/home/u/.worktrees/repo-feat"), "/home/u/repo");
        assert_eq!(resolver.resolve("/home/u/.worktrees/repo-fix"), "/home/u/repo");
    }

    #[test]
    fn test_probe_failure_and_non_worktree_fall_back_to_raw() {
        let resolver = worktree_resolver();
        assert_eq!(
            resolver.resolve("/home/u/.worktrees/unknown"),
            "/home/u/.worktrees/unknown"
        );
        assert_eq!(
            resolver.resolve("/home/u/.worktrees/standalone"),
            "/home/u/.worktrees/standalone"
        );
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let resolver = worktree_resolver();
        for raw in [
            "/home/u/repo",
            "/home/u/.worktrees/repo-feat",
            "/home/u/.worktrees/unknown",
            "relative/path",
            "",
        ] {
            let once = resolver.resolve(raw);
            assert_eq!(resolver.resolve(&once), once, "raw = {raw:?}");
        }
    }

    #[test]
    fn test_results_are_memoized() {
        let probe = Arc::new(FakeProbe::new(&[(
            "/wt/feat",
            "/src/repo/.git/worktrees/feat",
        )]));
        let resolver = PathResolver::new("/wt", probe.clone());

        for _ in 0..3 {
            assert_eq!(resolver.resolve("/wt/feat"), "/src/repo");
            assert_eq!(resolver.resolve("/wt/other"), "/wt/other");
        }
        assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.cache().len(), 2);
    }

    #[test]
    fn test_shared_cache_serves_second_resolver() {
        let probe = Arc::new(FakeProbe::new(&[(
            "/wt/feat",
            "/src/repo/.git/worktrees/feat",
        )]));
        let cache = Arc::new(PathCache::new());
        let hooks = PathResolver::with_cache("/wt", probe.clone(), cache.clone());
        let chats = PathResolver::with_cache("/wt", probe.clone(), cache);

        assert_eq!(hooks.resolve("/wt/feat"), "/src/repo");
        assert_eq!(chats.resolve("/wt/feat"), "/src/repo");
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_resolution_agrees() {
        let resolver = worktree_resolver();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| resolver.resolve("/home/u/.worktrees/repo-feat")))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), "/home/u/repo");
            }
        });
        assert_eq!(resolver.cache().len(), 1);
    }

    #[test]
    fn test_first_insert_wins() {
        let cache = PathCache::new();
        assert_eq!(cache.insert_if_absent("/a", "/x".to_string()), "/x");
        assert_eq!(cache.insert_if_absent("/a", "/y".to_string()), "/x");
        assert_eq!(cache.get("/a").as_deref(), Some("/x"));
        assert!(!cache.is_empty());
    }
}
