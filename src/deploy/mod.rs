//! Deployment bootstrap: make the project directory a git repository with a
//! default ignore-file and commit whatever is pending.

use crate::utils::error::{CrawlerError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const GITIGNORE_FILE: &str = ".gitignore";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Prepare deployment";

pub const DEFAULT_GITIGNORE: &str = "\
# build output
/target/

# local cache and exports
/data/
*.csv
*.log

# environment
.env
.env.local
.vercel/
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployOutcome {
    pub initialized_repo: bool,
    pub wrote_gitignore: bool,
    pub committed: bool,
}

pub struct DeployPreparer {
    root: PathBuf,
    git_program: String,
    env: Vec<(String, String)>,
    commit_message: String,
}

impl DeployPreparer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            git_program: "git".to_string(),
            env: Vec::new(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }

    pub fn with_git_program(mut self, program: impl Into<String>) -> Self {
        self.git_program = program.into();
        self
    }

    /// Extra environment for every git invocation (e.g. author identity).
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn unavailable(&self) -> CrawlerError {
        CrawlerError::GitUnavailableError {
            program: self.git_program.clone(),
        }
    }

    /// `git --version`, run outside the target directory so a missing
    /// directory is not mistaken for a missing git.
    pub fn check_git(&self) -> Result<String> {
        let output = Command::new(&self.git_program)
            .arg("--version")
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .output()
            .map_err(|_| self.unavailable())?;
        if !output.status.success() {
            return Err(self.unavailable());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn git(&self, args: &[&str]) -> Result<Output> {
        Command::new(&self.git_program)
            .args(args)
            .current_dir(&self.root)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .output()
            .map_err(|e| {
                // a missing working directory also surfaces as NotFound
                if e.kind() == std::io::ErrorKind::NotFound && self.root.exists() {
                    self.unavailable()
                } else {
                    CrawlerError::IoError(e)
                }
            })
    }

    fn git_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.git(args)?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(CrawlerError::GitError {
                message: format!(
                    "git {} exited with {}: {}",
                    args.join(" "),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            })
        }
    }

    /// `git diff --cached --quiet` exits 1 when something is staged.
    fn has_staged_changes(&self) -> Result<bool> {
        let output = self.git(&["diff", "--cached", "--quiet"])?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(CrawlerError::GitError {
                message: format!(
                    "git diff --cached failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }),
        }
    }

    pub fn prepare(&self) -> Result<DeployOutcome> {
        let version = self.check_git()?;
        tracing::info!("🔧 Found {}", version);

        let initialized_repo = !self.root.join(".git").exists();
        if initialized_repo {
            tracing::info!("📁 Initializing git repository in {}", self.root.display());
            self.git_checked(&["init"])?;
        }

        let gitignore = self.root.join(GITIGNORE_FILE);
        let wrote_gitignore = !gitignore.exists();
        if wrote_gitignore {
            std::fs::write(&gitignore, DEFAULT_GITIGNORE)?;
            tracing::info!("📝 Wrote {}", gitignore.display());
        } else {
            tracing::info!("📝 Keeping existing {}", gitignore.display());
        }

        self.git_checked(&["add", "-A"])?;

        let committed = self.has_staged_changes()?;
        if committed {
            self.git_checked(&[
                "-c",
                "commit.gpgsign=false",
                "commit",
                "-q",
                "-m",
                &self.commit_message,
            ])?;
            tracing::info!("✅ Committed pending changes");
        } else {
            tracing::info!("✅ Nothing to commit");
        }

        Ok(DeployOutcome {
            initialized_repo,
            wrote_gitignore,
            committed,
        })
    }
}

pub fn deployment_instructions() -> String {
    [
        "Next steps:",
        "  1. Push this repository to your git host.",
        "  2. Import it in the serverless platform and route every path to the single entry.",
        "  3. Set the environment variable VERCEL_CACHE_DIR=/tmp.",
        "",
        "Limits to keep in mind:",
        "  - Execution time is capped at 10s on the free tier and 60s on paid tiers.",
        "  - Local storage is not durable; the cache does not survive between requests.",
        "  - The first request after idle pays a cold start.",
    ]
    .join("\n")
}
