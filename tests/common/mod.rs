// Shared helpers for integration tests.
//
// Provides a temporary dotconfigs repository with two plugins, a fake home
// directory and a git-initialised project, plus a fluent builder so each test
// can add sources, manifests and configuration documents without repeating
// filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dotconfigs::engine::{self, DeployOptions, DeployStats, TargetBase};
use dotconfigs::error::DeployError;
use dotconfigs::logging::{Level, Log};

/// Hook scripts shipped by the `claude` plugin fixture.
pub const CLAUDE_HOOKS: &[&str] = &["block-destructive.sh", "post-tool-format.py"];

/// Hook scripts shipped by the `git` plugin fixture.
pub const GIT_HOOKS: &[&str] = &["pre-commit", "prepare-commit-msg"];

/// Write the plugin sources and manifests every test starts from into `repo`.
///
/// Creates:
/// - `plugins/claude/hooks/`        with [`CLAUDE_HOOKS`]
/// - `plugins/claude/settings.json` a single-file source
/// - `plugins/claude/manifest.json` global and project sections
/// - `plugins/git/hooks/`           with [`GIT_HOOKS`]
/// - `plugins/git/manifest.json`    project section only
pub fn setup_plugin_repo(repo: &Path) {
    let claude = repo.join("plugins/claude");
    let git = repo.join("plugins/git");
    std::fs::create_dir_all(claude.join("hooks")).expect("create claude hooks");
    std::fs::create_dir_all(git.join("hooks")).expect("create git hooks");

    for name in CLAUDE_HOOKS {
        std::fs::write(claude.join("hooks").join(name), format!("# {name}\n"))
            .expect("write claude hook");
    }
    for name in GIT_HOOKS {
        std::fs::write(git.join("hooks").join(name), format!("#!/bin/sh\n# {name}\n"))
            .expect("write git hook");
    }
    std::fs::write(claude.join("settings.json"), "{}\n").expect("write settings.json");

    std::fs::write(
        claude.join("manifest.json"),
        r#"{
  "global": {
    "settings": {"source": "plugins/claude/settings.json", "target": "~/.claude/settings.json", "method": "copy"}
  },
  "project": {
    "hooks": {
      "source": "plugins/claude/hooks",
      "target": ".claude/hooks",
      "method": "symlink",
      "include": ["block-destructive.sh", "post-tool-format.py"]
    }
  }
}
"#,
    )
    .expect("write claude manifest");

    std::fs::write(
        git.join("manifest.json"),
        r#"{
  "project": {
    "hooks": {
      "source": "plugins/git/hooks",
      "target": ".git/hooks",
      "method": "symlink",
      "include": ["pre-commit", "prepare-commit-msg"],
      "exclude": []
    }
  }
}
"#,
    )
    .expect("write git manifest");
}

/// An isolated deployment environment backed by a [`tempfile::TempDir`].
///
/// All paths are canonical so they compare equal to what the engine resolves.
pub struct IntegrationTestContext {
    _dir: tempfile::TempDir,
    /// The dotconfigs repository (contains `plugins/`).
    pub repo: PathBuf,
    /// Stand-in home directory for global deploys.
    pub home: PathBuf,
    /// A project directory initialised as a git repository.
    pub project: PathBuf,
}

impl IntegrationTestContext {
    /// Create a new context with both plugin fixtures and an empty home.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let base = dunce::canonicalize(dir.path()).expect("canonicalize temp dir");
        let repo = base.join("dotconfigs");
        let home = base.join("home");
        let project = base.join("project");

        setup_plugin_repo(&repo);
        std::fs::create_dir_all(&home).expect("create home");
        std::fs::create_dir_all(&project).expect("create project");
        git2::Repository::init(&project).expect("git init project");

        Self {
            _dir: dir,
            repo,
            home,
            project,
        }
    }

    /// Write a configuration document under the temp directory and return its path.
    pub fn write_config(&self, name: &str, json: &str) -> PathBuf {
        let path = self.repo.join(".dotconfigs").join(name);
        std::fs::create_dir_all(path.parent().expect("config parent")).expect("create state dir");
        std::fs::write(&path, json).expect("write config");
        path
    }

    /// Deploy `config` into the project directory.
    pub fn deploy_project(
        &self,
        config: &Path,
        dry_run: bool,
        log: &dyn Log,
    ) -> Result<DeployStats, DeployError> {
        let options = DeployOptions {
            dry_run,
            ..DeployOptions::new(TargetBase::Project(self.project.clone()))
        };
        engine::deploy(config, &self.repo, &options, log)
    }

    /// Deploy `config` into the fake home directory.
    pub fn deploy_home(
        &self,
        config: &Path,
        dry_run: bool,
        log: &dyn Log,
    ) -> Result<DeployStats, DeployError> {
        let options = DeployOptions {
            dry_run,
            ..DeployOptions::new(TargetBase::Home(self.home.clone()))
        };
        engine::deploy(config, &self.repo, &options, log)
    }

    /// Source file inside a plugin.
    pub fn source(&self, rel: &str) -> PathBuf {
        self.repo.join("plugins").join(rel)
    }
}

/// Fluent builder for [`IntegrationTestContext`].
///
/// Allows individual tests to customise the repository before the context
/// is finalised without modifying the shared setup.
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context backed by the plugin fixtures.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write `content` to `plugins/<rel>`, creating parent directories.
    pub fn with_plugin_file(self, rel: &str, content: &str) -> Self {
        let path = self.ctx.source(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create plugin file parent");
        }
        std::fs::write(&path, content).expect("write plugin file");
        self
    }

    /// Write `content` to `<project>/<rel>`, creating parent directories.
    pub fn with_project_file(self, rel: &str, content: &str) -> Self {
        let path = self.ctx.project.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create project file parent");
        }
        std::fs::write(&path, content).expect("write project file");
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

/// A [`Log`] that keeps every message in memory for assertions.
#[derive(Debug, Default)]
pub struct RecordingLog {
    entries: Mutex<Vec<(Level, String)>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, msg: &str) {
        self.entries
            .lock()
            .expect("log lock")
            .push((level, msg.to_string()));
    }

    /// All messages recorded at `level`, in order.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .expect("log lock")
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Whether any message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages(level).iter().any(|m| m.contains(needle))
    }
}

impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push(Level::Stage, msg);
    }
    fn info(&self, msg: &str) {
        self.push(Level::Info, msg);
    }
    fn debug(&self, msg: &str) {
        self.push(Level::Debug, msg);
    }
    fn warn(&self, msg: &str) {
        self.push(Level::Warn, msg);
    }
    fn error(&self, msg: &str) {
        self.push(Level::Error, msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push(Level::DryRun, msg);
    }
}

/// Snapshot of every entry under `dir` as `(name, kind)` pairs, sorted.
///
/// `kind` is `link -> <text>`, `file` or `dir`, which is enough to tell
/// whether a run touched anything.
pub fn tree(dir: &Path) -> Vec<String> {
    let mut out = Vec::new();
    walk(dir, dir, &mut out);
    out.sort();
    out
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries {
        let path = entry.expect("dir entry").path();
        let rel = path.strip_prefix(root).expect("under root").display().to_string();
        let meta = std::fs::symlink_metadata(&path).expect("metadata");
        if meta.file_type().is_symlink() {
            let text = std::fs::read_link(&path).expect("read link");
            out.push(format!("{rel} link -> {}", text.display()));
        } else if meta.is_dir() {
            out.push(format!("{rel} dir"));
            walk(root, &path, out);
        } else {
            let bytes = std::fs::read(&path).expect("read file");
            out.push(format!("{rel} file {}", bytes.len()));
        }
    }
}
