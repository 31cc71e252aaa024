//! Idempotent resource primitives (check + apply pattern).
pub mod backup;
pub mod directory;
pub mod helpers;
pub mod package;
pub mod shell;
pub mod symlink;
pub mod tool;

use anyhow::Result;

/// A change that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Bring the resource into the desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be made (I/O failure, command
    /// failure, conflicting state).
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of a resource.
///
/// # Examples
///
/// ```
/// use envsetup::resources::ResourceState;
///
/// let wrong = ResourceState::Incorrect { current: "points to /elsewhere".into() };
/// assert_ne!(wrong, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// Description of what is there now.
        current: String,
    },
    /// Resource cannot be applied (e.g. a non-empty directory is in the way).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct.
    AlreadyCorrect,
    /// Resource was skipped.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Resources that can determine their own state.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;
}

/// Shared test helpers for resource and task unit tests.
#[cfg(test)]
pub mod test_helpers {
    use crate::exec::{ExecResult, Executor};
    use std::collections::{HashSet, VecDeque};
    use std::sync::Mutex;

    /// A scripted executor.
    ///
    /// Responses are `(success, stdout)` pairs consumed in FIFO order; once
    /// the queue is empty every call fails with `"unexpected call"`. Every
    /// call is recorded as `"program arg1 arg2"`.
    #[derive(Debug)]
    pub struct MockExecutor {
        responses: Mutex<VecDeque<(bool, String)>>,
        which_all: bool,
        available: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl MockExecutor {
        /// A mock with a single successful response.
        #[must_use]
        pub fn ok(stdout: &str) -> Self {
            Self::with_responses(vec![(true, stdout.to_string())])
        }

        /// A mock with a single failed response.
        #[must_use]
        pub fn fail() -> Self {
            Self::with_responses(vec![(false, String::new())])
        }

        /// A mock from an ordered list of `(success, stdout)` pairs.
        #[must_use]
        pub fn with_responses(responses: Vec<(bool, String)>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                which_all: false,
                available: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Make [`Executor::which`] return `result` for every program.
        #[must_use]
        pub fn with_which(mut self, result: bool) -> Self {
            self.which_all = result;
            self
        }

        /// Make [`Executor::which`] return `true` for these programs only.
        #[must_use]
        pub fn with_available(mut self, programs: &[&str]) -> Self {
            self.available = programs.iter().map(ToString::to_string).collect();
            self
        }

        /// All calls made so far.
        #[must_use]
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map_or_else(|_| vec![], |g| g.clone())
        }

        /// Number of calls made so far.
        #[must_use]
        pub fn call_count(&self) -> usize {
            self.calls().len()
        }

        fn next(&self, program: &str, args: &[&str]) -> (bool, String) {
            if let Ok(mut calls) = self.calls.lock() {
                let mut line = program.to_string();
                for arg in args {
                    line.push(' ');
                    line.push_str(arg);
                }
                calls.push(line);
            }
            self.responses.lock().map_or_else(
                |_| (false, "mutex poisoned".to_string()),
                |mut guard| {
                    guard
                        .pop_front()
                        .unwrap_or_else(|| (false, "unexpected call".to_string()))
                },
            )
        }

        fn next_result(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            let (success, stdout) = self.next(program, args);
            if success {
                Ok(ExecResult {
                    stdout,
                    stderr: String::new(),
                    success: true,
                    code: Some(0),
                })
            } else {
                anyhow::bail!("{program} failed (exit 1): {stdout}")
            }
        }
    }

    impl Executor for MockExecutor {
        fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            self.next_result(program, args)
        }

        fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            let (success, stdout) = self.next(program, args);
            Ok(ExecResult {
                stdout,
                stderr: String::new(),
                success,
                code: Some(i32::from(!success)),
            })
        }

        fn which(&self, program: &str) -> bool {
            self.which_all || self.available.contains(program)
        }
    }
}
