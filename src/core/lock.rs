//! core::lock
//!
//! Guard against git's on-disk index lock.
//!
//! # Design
//!
//! Git serializes index mutations through `$GIT_DIR/index.lock`. Before
//! every mutating operation the sync engine waits for that file to be
//! absent, so it never races a git process the user (or an editor, or a
//! background fetcher) already has running. The guard **observes** the
//! lock file; it never creates it. Actual locking stays git's job.
//!
//! # Invariants
//!
//! - An absent lock returns without sleeping.
//! - A present lock is re-checked once per poll interval, forever, until
//!   it disappears or the [`CancelToken`] fires.
//! - Cancellation is reported as its own outcome, never as "lock cleared".
//! - Repository-root discovery is bounded by the filesystem root; outside
//!   a repository it fails with [`LockError::NotARepository`] instead of
//!   walking forever.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::cancel::CancelToken;

/// Default interval between lock polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Errors from lock-guard operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// No ancestor of the starting directory contains a `.git` entry.
    #[error("not a git repository (searched {start} and its parents)", start = .start.display())]
    NotARepository {
        /// The directory the upward walk started from.
        start: PathBuf,
    },

    /// The wait was interrupted through the cancellation token.
    #[error("interrupted while waiting for the git index lock (after {polls} polls)")]
    Cancelled {
        /// Number of occupied polls observed before cancellation.
        polls: u64,
    },

    /// Filesystem error while discovering the repository.
    #[error("cannot inspect repository: {0}")]
    Io(#[from] std::io::Error),
}

/// How a successful wait concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockWait {
    /// The lock file was absent on the first check; no sleep happened.
    Immediate,
    /// The lock file was present and cleared after this many polls.
    Waited {
        /// Number of occupied polls before the lock cleared.
        polls: u64,
    },
}

/// Find the repository root: the nearest ancestor containing a `.git` entry.
///
/// The walk starts at `start` (canonicalized, so relative paths work) and
/// stops at the filesystem root.
///
/// # Errors
///
/// [`LockError::NotARepository`] when the walk exhausts all ancestors.
pub fn find_repo_root(start: &Path) -> Result<PathBuf, LockError> {
    let start = start.canonicalize()?;

    for dir in start.ancestors() {
        if dir.join(".git").exists() {
            return Ok(dir.to_path_buf());
        }
    }

    Err(LockError::NotARepository { start })
}

/// Resolve the git directory for a repository root.
///
/// `.git` is usually a directory; in linked worktrees it is a file of the
/// form `gitdir: <path>` pointing at the real git directory.
fn resolve_git_dir(root: &Path) -> Result<PathBuf, LockError> {
    let dot_git = root.join(".git");

    if dot_git.is_dir() {
        return Ok(dot_git);
    }

    let contents = std::fs::read_to_string(&dot_git)?;
    let target = contents
        .trim()
        .strip_prefix("gitdir:")
        .map(str::trim)
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("malformed gitfile at {}", dot_git.display()),
            )
        })?;

    let target = PathBuf::from(target);
    Ok(if target.is_absolute() {
        target
    } else {
        root.join(target)
    })
}

/// Waits for git's index lock to clear before mutating operations run.
#[derive(Debug, Clone)]
pub struct LockGuard {
    lock_path: PathBuf,
    poll_interval: Duration,
}

impl LockGuard {
    /// Build a guard by discovering the repository containing `start`.
    ///
    /// # Errors
    ///
    /// - [`LockError::NotARepository`] when `start` is outside any repository
    /// - [`LockError::Io`] when the walk or gitfile resolution fails
    pub fn discover(start: &Path) -> Result<Self, LockError> {
        let root = find_repo_root(start)?;
        let git_dir = resolve_git_dir(&root)?;
        Ok(Self::for_git_dir(&git_dir))
    }

    /// Build a guard for an already-known git directory.
    pub fn for_git_dir(git_dir: &Path) -> Self {
        Self {
            lock_path: git_dir.join("index.lock"),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Path of the lock file this guard watches.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Block until the index lock is absent.
    ///
    /// `on_wait` is invoked once per occupied poll with the attempt
    /// counter (1-based); the caller decides how to render progress.
    ///
    /// # Errors
    ///
    /// [`LockError::Cancelled`] when `cancel` fires while the lock is
    /// still held.
    pub fn wait(
        &self,
        cancel: &CancelToken,
        mut on_wait: impl FnMut(u64),
    ) -> Result<LockWait, LockError> {
        let mut polls: u64 = 0;

        loop {
            if !self.lock_path.exists() {
                return Ok(if polls == 0 {
                    LockWait::Immediate
                } else {
                    LockWait::Waited { polls }
                });
            }

            if cancel.is_cancelled() {
                return Err(LockError::Cancelled { polls });
            }

            polls += 1;
            on_wait(polls);
            std::thread::sleep(self.poll_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    /// Poll fast so blocking tests stay quick.
    const TEST_INTERVAL: Duration = Duration::from_millis(20);

    fn repo_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        dir
    }

    mod root_discovery {
        use super::*;

        #[test]
        fn finds_root_at_start() {
            let dir = repo_dir();
            let root = find_repo_root(dir.path()).unwrap();
            assert_eq!(root, dir.path().canonicalize().unwrap());
        }

        #[test]
        fn walks_up_from_nested_directory() {
            let dir = repo_dir();
            let nested = dir.path().join("a/b/c");
            fs::create_dir_all(&nested).unwrap();

            let root = find_repo_root(&nested).unwrap();
            assert_eq!(root, dir.path().canonicalize().unwrap());
        }

        #[test]
        fn outside_a_repository_is_an_error() {
            let dir = TempDir::new().unwrap();
            let result = find_repo_root(dir.path());
            assert!(matches!(result, Err(LockError::NotARepository { .. })));
        }

        #[test]
        fn resolves_worktree_gitfile() {
            let main = repo_dir();
            let worktree = TempDir::new().unwrap();
            let linked_git_dir = main.path().join(".git/worktrees/wt");
            fs::create_dir_all(&linked_git_dir).unwrap();
            fs::write(
                worktree.path().join(".git"),
                format!("gitdir: {}\n", linked_git_dir.display()),
            )
            .unwrap();

            let guard = LockGuard::discover(worktree.path()).unwrap();
            assert_eq!(guard.lock_path(), linked_git_dir.join("index.lock"));
        }
    }

    mod waiting {
        use super::*;

        #[test]
        fn absent_lock_returns_without_sleeping() {
            let dir = repo_dir();
            let guard = LockGuard::discover(dir.path())
                .unwrap()
                .with_poll_interval(Duration::from_secs(30));

            let started = Instant::now();
            let outcome = guard.wait(&CancelToken::new(), |_| {}).unwrap();

            assert_eq!(outcome, LockWait::Immediate);
            assert!(started.elapsed() < Duration::from_secs(1));
        }

        #[test]
        fn blocks_until_lock_clears() {
            let dir = repo_dir();
            let guard = LockGuard::discover(dir.path())
                .unwrap()
                .with_poll_interval(TEST_INTERVAL);

            let lock_path = guard.lock_path().to_path_buf();
            fs::write(&lock_path, "").unwrap();

            let remover = std::thread::spawn(move || {
                std::thread::sleep(TEST_INTERVAL * 3);
                fs::remove_file(&lock_path).unwrap();
            });

            let mut seen = Vec::new();
            let outcome = guard.wait(&CancelToken::new(), |n| seen.push(n)).unwrap();
            remover.join().unwrap();

            match outcome {
                LockWait::Waited { polls } => assert!(polls >= 2, "polled {polls} times"),
                LockWait::Immediate => panic!("expected the guard to block"),
            }
            // Attempt counter increases monotonically from 1.
            assert_eq!(seen.first(), Some(&1));
            assert!(seen.windows(2).all(|w| w[1] == w[0] + 1));
        }

        #[test]
        fn never_returns_success_while_lock_exists() {
            let dir = repo_dir();
            let guard = LockGuard::discover(dir.path())
                .unwrap()
                .with_poll_interval(TEST_INTERVAL);
            fs::write(guard.lock_path(), "").unwrap();

            let cancel = CancelToken::new();
            let canceller = {
                let cancel = cancel.clone();
                std::thread::spawn(move || {
                    std::thread::sleep(TEST_INTERVAL * 3);
                    cancel.cancel();
                })
            };

            let result = guard.wait(&cancel, |_| {});
            canceller.join().unwrap();

            assert!(matches!(result, Err(LockError::Cancelled { .. })));
            assert!(guard.lock_path().exists());
        }

        #[test]
        fn cancellation_reports_poll_count() {
            let dir = repo_dir();
            let guard = LockGuard::discover(dir.path())
                .unwrap()
                .with_poll_interval(Duration::from_millis(1));
            fs::write(guard.lock_path(), "").unwrap();

            let cancel = CancelToken::new();
            let outcome = guard.wait(&cancel, |n| {
                if n >= 3 {
                    cancel.cancel();
                }
            });

            match outcome {
                Err(LockError::Cancelled { polls }) => assert!(polls >= 3),
                other => panic!("expected cancellation, got {other:?}"),
            }
        }
    }
}
