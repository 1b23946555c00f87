#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
#![cfg(unix)]
//! Integration tests for the deploy engine.
//!
//! These tests drive [`dotconfigs::engine::deploy`] against a real temporary
//! repository and check the filesystem afterwards: the include/exclude
//! contract, cleanup of stale links, idempotence, dry-run purity and the
//! guarantee that files the engine does not own are never touched.

mod common;

use std::fs;
use std::os::unix::fs::symlink;

use common::*;
use dotconfigs::commands::status::{self, EntryStatus};
use dotconfigs::config;
use dotconfigs::engine::{self, DeployOptions, TargetBase};
use dotconfigs::error::{DeployError, EXIT_CONFIG, exit_code_for};
use dotconfigs::logging::Level;

const CLAUDE_HOOKS_WITH_TYPO: &str = r#"{
  "claude": {
    "hooks": {
      "source": "plugins/claude/hooks",
      "target": ".claude/hooks",
      "method": "symlink",
      "include": ["block-destructive.sh", "post-tool-format.py", "nonexistent.sh"]
    }
  }
}"#;

const GIT_HOOKS_ALL_EXCLUDED: &str = r#"{
  "git": {
    "hooks": {
      "source": "plugins/git/hooks",
      "target": ".git/hooks",
      "method": "symlink",
      "include": ["pre-commit"],
      "exclude": ["pre-commit"]
    }
  }
}"#;

// ---------------------------------------------------------------------------
// Include / exclude contract
// ---------------------------------------------------------------------------

/// Listed files are linked; a listed file with no source is skipped with a
/// single warning and does not fail the run.
#[test]
fn include_list_links_present_files_and_skips_missing() {
    let ctx = IntegrationTestContext::new();
    let config = ctx.write_config("project.json", CLAUDE_HOOKS_WITH_TYPO);
    let log = RecordingLog::new();

    let stats = ctx.deploy_project(&config, false, &log).unwrap();

    assert_eq!(stats.created, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.updated, 0);

    let hooks = ctx.project.join(".claude/hooks");
    for name in CLAUDE_HOOKS {
        let link = hooks.join(name);
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(
            dunce::canonicalize(&link).unwrap(),
            ctx.source(&format!("claude/hooks/{name}"))
        );
    }
    assert!(fs::symlink_metadata(hooks.join("nonexistent.sh")).is_err());

    let warnings = log.messages(Level::Warn);
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].starts_with("Source not found, skipping: "));
    assert!(warnings[0].ends_with("nonexistent.sh"));
}

/// Without an include list every regular file in the source is deployed.
#[test]
fn no_include_list_deploys_every_file() {
    let ctx = TestContextBuilder::new()
        .with_plugin_file("git/hooks/commit-msg", "#!/bin/sh\n")
        .build();
    let config = ctx.write_config(
        "project.json",
        r#"{"git": {"hooks": {"source": "plugins/git/hooks", "target": "hooks-out", "method": "copy"}}}"#,
    );

    let stats = ctx.deploy_project(&config, false, &RecordingLog::new()).unwrap();

    assert_eq!(stats.created, 3);
    insta::assert_snapshot!(tree(&ctx.project.join("hooks-out")).join("\n"), @r"
    commit-msg file 10
    pre-commit file 23
    prepare-commit-msg file 31
    ");
}

/// Excluding everything deploys nothing and cleans the directory of links
/// the repository owns, while foreign files stay.
#[test]
fn all_excluded_removes_owned_links_only() {
    let ctx = TestContextBuilder::new()
        .with_project_file(".git/hooks/keep-me.txt", "mine")
        .build();
    let hooks = ctx.project.join(".git/hooks");
    symlink(ctx.source("git/hooks/pre-commit"), hooks.join("old-hook")).unwrap();

    let config = ctx.write_config("project.json", GIT_HOOKS_ALL_EXCLUDED);
    let log = RecordingLog::new();
    let stats = ctx.deploy_project(&config, false, &log).unwrap();

    assert_eq!(stats.created, 0);
    assert_eq!(stats.removed, 1);
    assert!(fs::symlink_metadata(hooks.join("old-hook")).is_err());
    assert_eq!(fs::read_to_string(hooks.join("keep-me.txt")).unwrap(), "mine");
    assert!(log.contains(Level::Info, "Removed stale symlink"));
}

/// A broken symlink in a target directory is removed; one pointing outside
/// the repository is foreign and kept.
#[test]
fn broken_links_are_removed_and_external_links_kept() {
    let ctx = IntegrationTestContext::new();
    let hooks = ctx.project.join(".claude/hooks");
    fs::create_dir_all(&hooks).unwrap();
    symlink(ctx.repo.join("plugins/claude/hooks/gone.sh"), hooks.join("gone.sh")).unwrap();
    let external = ctx.home.join("external.sh");
    fs::write(&external, "x").unwrap();
    symlink(&external, hooks.join("external.sh")).unwrap();

    let config = ctx.write_config("project.json", CLAUDE_HOOKS_WITH_TYPO);
    let stats = ctx.deploy_project(&config, false, &RecordingLog::new()).unwrap();

    assert_eq!(stats.removed, 1);
    assert!(fs::symlink_metadata(hooks.join("gone.sh")).is_err());
    assert_eq!(fs::read_link(hooks.join("external.sh")).unwrap(), external);
}

// ---------------------------------------------------------------------------
// Convergence
// ---------------------------------------------------------------------------

/// A second run over an unchanged tree changes nothing.
#[test]
fn second_run_is_a_no_op() {
    let ctx = IntegrationTestContext::new();
    let config = ctx.write_config("project.json", CLAUDE_HOOKS_WITH_TYPO);

    ctx.deploy_project(&config, false, &RecordingLog::new()).unwrap();
    let before = tree(&ctx.project.join(".claude"));

    let log = RecordingLog::new();
    let stats = ctx.deploy_project(&config, false, &log).unwrap();

    assert_eq!(stats.changes(), 0);
    assert_eq!(stats.unchanged, 2);
    assert_eq!(tree(&ctx.project.join(".claude")), before);
    assert!(!log.contains(Level::Info, "Linked"));
}

/// A regular file sitting where a link belongs is replaced by the link.
#[test]
fn drifted_target_is_replaced() {
    let ctx = TestContextBuilder::new()
        .with_project_file(".claude/hooks/block-destructive.sh", "edited locally")
        .build();
    let config = ctx.write_config("project.json", CLAUDE_HOOKS_WITH_TYPO);

    let stats = ctx.deploy_project(&config, false, &RecordingLog::new()).unwrap();

    assert_eq!(stats.updated, 1);
    assert_eq!(stats.created, 1);
    let link = ctx.project.join(".claude/hooks/block-destructive.sh");
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
}

/// A copied file that differs from its source is overwritten; an identical
/// one is left alone.
#[test]
fn copy_converges_on_source_bytes() {
    let ctx = IntegrationTestContext::new();
    let config = ctx.write_config(
        "global.json",
        r#"{"claude": {"settings": {"source": "plugins/claude/settings.json", "target": "~/.claude/settings.json", "method": "copy"}}}"#,
    );
    let target = ctx.home.join(".claude/settings.json");

    let first = ctx.deploy_home(&config, false, &RecordingLog::new()).unwrap();
    assert_eq!(first.created, 1);
    assert_eq!(fs::read_to_string(&target).unwrap(), "{}\n");

    fs::write(&target, "{\"theme\": \"dark\"}\n").unwrap();
    let second = ctx.deploy_home(&config, false, &RecordingLog::new()).unwrap();
    assert_eq!(second.updated, 1);
    assert_eq!(fs::read_to_string(&target).unwrap(), "{}\n");

    let third = ctx.deploy_home(&config, false, &RecordingLog::new()).unwrap();
    assert_eq!(third.unchanged, 1);
    assert_eq!(third.changes(), 0);
}

// ---------------------------------------------------------------------------
// Shared target directories
// ---------------------------------------------------------------------------

const HOME_SHARED: &str = r#"{
  "git": {
    "config": {"source": "plugins/git/gitconfig", "target": "~/.gitconfig", "method": "symlink"}
  },
  "shell": {
    "rc": {"source": "plugins/shell/rc", "target": "~", "method": "symlink", "include": [".bashrc"]}
  }
}"#;

fn shared_home() -> IntegrationTestContext {
    TestContextBuilder::new()
        .with_plugin_file("git/gitconfig", "[user]\n")
        .with_plugin_file("shell/rc/.bashrc", "export EDITOR=vi\n")
        .with_plugin_file("shell/rc/.profile", "# not deployed\n")
        .build()
}

/// A single-file module and a directory module deploying into the same
/// directory keep each other's links, and a second run changes nothing.
#[test]
fn modules_sharing_a_directory_keep_each_other() {
    let ctx = shared_home();
    let config = ctx.write_config("global.json", HOME_SHARED);

    let first = ctx.deploy_home(&config, false, &RecordingLog::new()).unwrap();
    let second = ctx.deploy_home(&config, false, &RecordingLog::new()).unwrap();

    assert_eq!(first.created, 2);
    assert_eq!(first.removed, 0);
    assert_eq!(second.changes(), 0);
    assert_eq!(second.unchanged, 2);
    assert_eq!(
        dunce::canonicalize(ctx.home.join(".gitconfig")).unwrap(),
        ctx.source("git/gitconfig")
    );
    assert!(!ctx.home.join(".profile").exists());

    let loaded = config::load(&config).unwrap();
    let entries = status::collect(&loaded, &ctx.repo, &TargetBase::Home(ctx.home.clone())).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.status == EntryStatus::Ok), "{entries:?}");
}

/// A group run does not clean up links other plugins deployed alongside it.
#[test]
fn group_run_keeps_other_plugins_links() {
    let ctx = shared_home();
    let config = ctx.write_config("global.json", HOME_SHARED);
    ctx.deploy_home(&config, false, &RecordingLog::new()).unwrap();

    let options = DeployOptions {
        group: Some("shell".to_string()),
        ..DeployOptions::new(TargetBase::Home(ctx.home.clone()))
    };
    let stats = engine::deploy(&config, &ctx.repo, &options, &RecordingLog::new()).unwrap();

    assert_eq!(stats.removed, 0);
    assert_eq!(stats.unchanged, 1);
    assert!(ctx.home.join(".gitconfig").exists());
}

/// When the target directory is itself a link to the source directory, the
/// deploy leaves the repository's own entries alone.
#[test]
fn target_linked_to_source_keeps_repository_files() {
    let ctx = IntegrationTestContext::new();
    let shared = ctx.repo.join("shared.sh");
    fs::write(&shared, "#!/bin/sh\n").unwrap();
    let helper = ctx.source("claude/hooks/helper.sh");
    symlink(&shared, &helper).unwrap();
    fs::create_dir_all(ctx.home.join(".claude")).unwrap();
    symlink(ctx.source("claude/hooks"), ctx.home.join(".claude/hooks")).unwrap();
    let config = ctx.write_config(
        "global.json",
        r#"{"claude": {"hooks": {"source": "plugins/claude/hooks", "target": "~/.claude/hooks",
            "method": "symlink", "include": ["block-destructive.sh"]}}}"#,
    );

    let stats = ctx.deploy_home(&config, false, &RecordingLog::new()).unwrap();

    assert_eq!(stats.unchanged, 1);
    assert_eq!(stats.removed, 0);
    assert!(fs::symlink_metadata(&helper).unwrap().is_symlink());
    assert!(shared.exists());
}

// ---------------------------------------------------------------------------
// Dry run and foreign files
// ---------------------------------------------------------------------------

/// Dry run reports the same counters as a real run but leaves the tree as it
/// was.
#[test]
fn dry_run_changes_nothing() {
    let ctx = TestContextBuilder::new()
        .with_project_file(".git/hooks/keep-me.txt", "mine")
        .build();
    let hooks = ctx.project.join(".git/hooks");
    symlink(ctx.source("git/hooks/pre-commit"), hooks.join("old-hook")).unwrap();
    let config = ctx.write_config("project.json", GIT_HOOKS_ALL_EXCLUDED);
    let before = tree(&ctx.project);

    let log = RecordingLog::new();
    let stats = ctx.deploy_project(&config, true, &log).unwrap();

    assert_eq!(stats.removed, 1);
    assert_eq!(tree(&ctx.project), before);
    assert!(log.contains(Level::Info, "Dry-run mode"));
    assert!(log.contains(Level::DryRun, "Would remove stale symlink"));
}

/// Dry run of a fresh deploy creates no directories.
#[test]
fn dry_run_does_not_create_target_directories() {
    let ctx = IntegrationTestContext::new();
    let config = ctx.write_config("project.json", CLAUDE_HOOKS_WITH_TYPO);

    let log = RecordingLog::new();
    let stats = ctx.deploy_project(&config, true, &log).unwrap();

    assert_eq!(stats.created, 2);
    assert!(!ctx.project.join(".claude").exists());
    let dry = log.messages(Level::DryRun);
    assert_eq!(dry.len(), 3);
    assert!(dry[0].starts_with("Would create directory "));
    assert!(dry[0].ends_with(".claude/hooks"));
}

/// A directory occupying a target path is never replaced.
#[test]
fn directory_at_target_is_left_alone() {
    let ctx = IntegrationTestContext::new();
    let blocker = ctx.project.join(".claude/hooks/block-destructive.sh");
    fs::create_dir_all(&blocker).unwrap();
    fs::write(blocker.join("inner"), "keep").unwrap();
    let config = ctx.write_config("project.json", CLAUDE_HOOKS_WITH_TYPO);

    let log = RecordingLog::new();
    let stats = ctx.deploy_project(&config, false, &log).unwrap();

    assert_eq!(stats.skipped, 2);
    assert_eq!(fs::read_to_string(blocker.join("inner")).unwrap(), "keep");
    assert!(log.contains(Level::Warn, "Path conflict at"));
}

// ---------------------------------------------------------------------------
// Groups and errors
// ---------------------------------------------------------------------------

/// `--group` restricts the run to one plugin.
#[test]
fn group_filter_limits_modules() {
    let ctx = IntegrationTestContext::new();
    let config = ctx.write_config(
        "project.json",
        r#"{
  "claude": {"hooks": {"source": "plugins/claude/hooks", "target": ".claude/hooks", "method": "symlink"}},
  "git": {"hooks": {"source": "plugins/git/hooks", "target": "git-hooks", "method": "symlink"}}
}"#,
    );
    let options = DeployOptions {
        group: Some("git".to_string()),
        ..DeployOptions::new(TargetBase::Project(ctx.project.clone()))
    };

    let log = RecordingLog::new();
    let stats = engine::deploy(&config, &ctx.repo, &options, &log).unwrap();

    assert_eq!(stats.created, 2);
    assert!(ctx.project.join("git-hooks/pre-commit").exists());
    assert!(!ctx.project.join(".claude").exists());
    assert_eq!(
        log.messages(Level::Stage).first().map(String::as_str),
        Some("git/hooks")
    );
}

/// A missing configuration document is a configuration error.
#[test]
fn missing_config_exits_with_config_status() {
    let ctx = IntegrationTestContext::new();
    let err = ctx
        .deploy_project(&ctx.repo.join("nope.json"), false, &RecordingLog::new())
        .unwrap_err();

    assert!(matches!(err, DeployError::ConfigMissing { .. }));
    assert_eq!(exit_code_for(&err.into()), EXIT_CONFIG);
}

/// Malformed JSON is rejected before anything is deployed.
#[test]
fn malformed_config_is_rejected() {
    let ctx = IntegrationTestContext::new();
    let config = ctx.write_config("project.json", "{\"claude\": ");

    let err = ctx
        .deploy_project(&config, false, &RecordingLog::new())
        .unwrap_err();

    assert!(matches!(err, DeployError::ConfigInvalid { .. }));
    assert!(!ctx.project.join(".claude").exists());
}
