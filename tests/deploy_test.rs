use anyhow::Result;
use rank_crawler::deploy::{DeployPreparer, DEFAULT_GITIGNORE, GITIGNORE_FILE};
use rank_crawler::CrawlerError;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Isolated identity and config so the host's git setup does not leak in.
fn preparer(dir: &Path) -> DeployPreparer {
    DeployPreparer::new(dir)
        .with_env("GIT_AUTHOR_NAME", "Deploy Test")
        .with_env("GIT_AUTHOR_EMAIL", "deploy@example.com")
        .with_env("GIT_COMMITTER_NAME", "Deploy Test")
        .with_env("GIT_COMMITTER_EMAIL", "deploy@example.com")
        .with_env("GIT_CONFIG_NOSYSTEM", "1")
        .with_env("GIT_CONFIG_GLOBAL", "/dev/null")
}

fn commit_count(dir: &Path) -> usize {
    let output = Command::new("git")
        .args(["rev-list", "--count", "HEAD"])
        .current_dir(dir)
        .output()
        .unwrap();
    if !output.status.success() {
        return 0;
    }
    String::from_utf8_lossy(&output.stdout).trim().parse().unwrap()
}

#[test]
fn test_first_run_initializes_and_commits() -> Result<()> {
    if !git_available() {
        eprintln!("git not installed, skipping");
        return Ok(());
    }
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("main.rs"), "fn main() {}\n")?;

    let outcome = preparer(dir.path()).prepare()?;

    assert!(outcome.initialized_repo);
    assert!(outcome.wrote_gitignore);
    assert!(outcome.committed);
    assert!(dir.path().join(".git").exists());
    assert_eq!(
        std::fs::read_to_string(dir.path().join(GITIGNORE_FILE))?,
        DEFAULT_GITIGNORE
    );
    assert_eq!(commit_count(dir.path()), 1);
    Ok(())
}

#[test]
fn test_second_run_without_changes_does_not_commit() -> Result<()> {
    if !git_available() {
        eprintln!("git not installed, skipping");
        return Ok(());
    }
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("main.rs"), "fn main() {}\n")?;

    preparer(dir.path()).prepare()?;
    let outcome = preparer(dir.path()).prepare()?;

    assert!(!outcome.initialized_repo);
    assert!(!outcome.wrote_gitignore);
    assert!(!outcome.committed);
    assert_eq!(commit_count(dir.path()), 1);
    Ok(())
}

#[test]
fn test_existing_gitignore_is_kept() -> Result<()> {
    if !git_available() {
        eprintln!("git not installed, skipping");
        return Ok(());
    }
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join(GITIGNORE_FILE), "custom/\n")?;

    let outcome = preparer(dir.path()).prepare()?;

    assert!(!outcome.wrote_gitignore);
    assert_eq!(
        std::fs::read_to_string(dir.path().join(GITIGNORE_FILE))?,
        "custom/\n"
    );
    Ok(())
}

#[test]
fn test_pending_changes_make_exactly_one_commit() -> Result<()> {
    if !git_available() {
        eprintln!("git not installed, skipping");
        return Ok(());
    }
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("a.txt"), "one\n")?;
    preparer(dir.path()).prepare()?;

    std::fs::write(dir.path().join("a.txt"), "two\n")?;
    std::fs::write(dir.path().join("b.txt"), "new\n")?;
    let outcome = preparer(dir.path()).prepare()?;

    assert!(outcome.committed);
    assert_eq!(commit_count(dir.path()), 2);

    let status = Command::new("git")
        .args(["status", "--porcelain"])
        .current_dir(dir.path())
        .output()?;
    assert!(String::from_utf8_lossy(&status.stdout).trim().is_empty());
    Ok(())
}

#[test]
fn test_missing_git_fails_without_creating_files() -> Result<()> {
    let dir = TempDir::new()?;

    let err = DeployPreparer::new(dir.path())
        .with_git_program("no-such-git-binary")
        .prepare()
        .unwrap_err();

    assert!(matches!(err, CrawlerError::GitUnavailableError { .. }));
    assert_ne!(err.severity().exit_code(), 0);
    assert!(!dir.path().join(GITIGNORE_FILE).exists());
    assert!(!dir.path().join(".git").exists());
    Ok(())
}
