//! External build-executor invocation
//!
//! The core's job ends at graph emission; the generic DAG executor
//! performs the actual, incrementally-scheduled compilation. We launch
//! it once per graph file and propagate its exit status verbatim, no
//! retry and no partial-success interpretation.

use crate::error::{BuildError, BuildResult};
use std::path::Path;
use std::process::{Command, ExitStatus};

/// Environment variable overriding the executor binary
pub const EXECUTOR_ENV: &str = "NINJA";
/// Executor binary used when the override is unset
pub const DEFAULT_EXECUTOR: &str = "ninja";

/// Resolve the executor binary name
pub fn executor() -> String {
    std::env::var(EXECUTOR_ENV).unwrap_or_else(|_| DEFAULT_EXECUTOR.to_string())
}

/// Run the executor on a graph file, returning its exit status.
/// Failing to spawn the executor at all is an error; a non-zero exit
/// is reported through the status for the caller to propagate.
pub fn run(graph: &Path) -> BuildResult<ExitStatus> {
    spawn(&executor(), graph, None)
}

/// Run the executor with its working directory set to the build root,
/// so the relative source paths in the graph resolve
pub fn run_from(root: &Path, graph: &Path) -> BuildResult<ExitStatus> {
    spawn(&executor(), graph, Some(root))
}

fn spawn(program: &str, graph: &Path, root: Option<&Path>) -> BuildResult<ExitStatus> {
    let mut command = Command::new(program);
    command.arg("-f").arg(graph);
    if let Some(root) = root {
        command.current_dir(root);
    }

    command.status().map_err(|error| BuildError::ExecutorSpawn {
        executor: program.to_string(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_executor_name() {
        // The override is environment-dependent; only pin the default.
        assert_eq!(DEFAULT_EXECUTOR, "ninja");
        assert_eq!(EXECUTOR_ENV, "NINJA");
    }

    #[test]
    fn test_missing_executor_is_a_spawn_error() {
        let result = spawn(
            "girder-test-no-such-executor",
            Path::new("build/build.ninja"),
            None,
        );

        match result {
            Err(BuildError::ExecutorSpawn { executor, .. }) => {
                assert_eq!(executor, "girder-test-no-such-executor");
            }
            other => panic!("expected ExecutorSpawn, got {other:?}"),
        }
    }
}
