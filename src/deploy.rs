//! Hand-off to the external EdgeOne Pages deployment tool.
//!
//! The upload itself is done by a third-party npm package run as a child
//! process. This module decides what to run and how:
//!
//! 1. Resolve [`DeployEnv`] from the environment: project name (falling back
//!    to config) and optional API token. Without a token the tool publishes to
//!    a temporary, unassociated link ([`DeployMode::Anonymous`]).
//! 2. Optionally make sure the package is installed (`npm list`, then
//!    `npm install` when the check fails).
//! 3. Run the deploy command with inherited stdio and the two variables set.
//!
//! Validation results are not consulted here. There is no retry and no
//! timeout: the call blocks until the tool exits, and any failure is fatal.
//!
//! Process execution sits behind [`CommandRunner`] so the flow can be tested
//! without spawning anything.

use crate::config::{DeployConfig, DeployTargetConfig};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, info};

pub const PROJECT_NAME_VAR: &str = "EDGEONE_PAGES_PROJECT_NAME";
pub const API_TOKEN_VAR: &str = "EDGEONE_PAGES_API_TOKEN";

/// Transient copy of the entry page written by single-file deployment.
pub const TEMP_FILE: &str = "temp-deployment.html";

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Entry file not found: {0}")]
    EntryMissing(PathBuf),
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot stage deployment files: {0}")]
    Stage(#[source] io::Error),
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("Installing {package} failed ({status})")]
    InstallFailed { package: String, status: RunStatus },
    #[error("`{command}` failed ({status})")]
    Failed { command: String, status: RunStatus },
}

/// Exit status of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunStatus {
    pub success: bool,
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl RunStatus {
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    pub fn exit(code: i32) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("terminated by signal"),
        }
    }
}

/// A fully described child process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Added on top of the inherited environment.
    pub envs: Vec<(String, String)>,
    /// Discard output instead of inheriting stdio.
    pub quiet: bool,
}

impl CommandSpec {
    fn new(program: &str, args: &[&str], cwd: &Path) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: cwd.to_path_buf(),
            envs: Vec::new(),
            quiet: false,
        }
    }

    /// Command line for messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs child processes to completion.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> io::Result<RunStatus>;
}

/// Spawns real processes and blocks until they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> io::Result<RunStatus> {
        debug!(command = %spec.display(), cwd = %spec.cwd.display(), "spawning");
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(&spec.cwd)
            .envs(spec.envs.iter().map(|(k, v)| (k, v)));
        if spec.quiet {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
        let status = command.status()?;
        Ok(RunStatus {
            success: status.success(),
            code: status.code(),
        })
    }
}

/// Whether the deployment is tied to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    Project,
    Anonymous,
}

/// Deployment identity resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployEnv {
    pub project_name: String,
    pub api_token: Option<String>,
}

impl DeployEnv {
    /// Read both variables from the process environment.
    pub fn from_env(config: &DeployConfig) -> Self {
        Self::from_lookup(config, |key| std::env::var(key).ok())
    }

    /// Resolve with a custom variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(config: &DeployConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            project_name: non_empty(PROJECT_NAME_VAR)
                .unwrap_or_else(|| config.deploy.project_name.clone()),
            api_token: non_empty(API_TOKEN_VAR),
        }
    }

    pub fn mode(&self) -> DeployMode {
        if self.api_token.is_some() {
            DeployMode::Project
        } else {
            DeployMode::Anonymous
        }
    }

    /// Variables passed to the deploy command. The token is only set when present.
    fn vars(&self) -> Vec<(String, String)> {
        let mut vars = vec![(PROJECT_NAME_VAR.to_string(), self.project_name.clone())];
        if let Some(token) = &self.api_token {
            vars.push((API_TOKEN_VAR.to_string(), token.clone()));
        }
        vars
    }
}

/// How the deployment package was made available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    AlreadyInstalled,
    Installed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployOutcome {
    pub mode: DeployMode,
    pub project_name: String,
    pub tool: ToolStatus,
}

/// Path of the entry file, failing if it does not exist.
pub fn require_entry(root: &Path, entry_file: &str) -> Result<PathBuf, DeployError> {
    let path = root.join(entry_file);
    if path.is_file() {
        Ok(path)
    } else {
        Err(DeployError::EntryMissing(path))
    }
}

/// Image files directly in the project root, sorted by name.
pub fn top_level_images(root: &Path) -> io::Result<Vec<String>> {
    let mut images: Vec<String> = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file() && IMAGE_EXTENSIONS.contains(&crate::discovery::extension_of(p).as_str())
        })
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    images.sort();
    Ok(images)
}

/// Make sure the deployment package is available, installing it if needed.
pub fn ensure_tool(
    root: &Path,
    target: &DeployTargetConfig,
    runner: &dyn CommandRunner,
) -> Result<ToolStatus, DeployError> {
    if !target.install_check {
        return Ok(ToolStatus::Skipped);
    }

    let mut check = CommandSpec::new("npm", &["list", &target.package], root);
    check.quiet = true;
    // A check that cannot even spawn is treated like a missing package.
    if matches!(runner.run(&check), Ok(status) if status.success) {
        return Ok(ToolStatus::AlreadyInstalled);
    }

    info!(package = %target.package, "installing deployment tool");
    let install = CommandSpec::new("npm", &["install", &target.package], root);
    let status = runner.run(&install).map_err(|source| DeployError::Spawn {
        command: install.display(),
        source,
    })?;
    if !status.success {
        return Err(DeployError::InstallFailed {
            package: target.package.clone(),
            status,
        });
    }
    Ok(ToolStatus::Installed)
}

/// Build the deploy command for a working directory.
pub fn deploy_command(cwd: &Path, env: &DeployEnv, target: &DeployTargetConfig) -> CommandSpec {
    let (program, args) = target
        .command
        .split_first()
        .map(|(p, a)| (p.clone(), a.to_vec()))
        .unwrap_or_default();
    CommandSpec {
        program,
        args,
        cwd: cwd.to_path_buf(),
        envs: env.vars(),
        quiet: false,
    }
}

fn run_deploy(
    cwd: &Path,
    env: &DeployEnv,
    target: &DeployTargetConfig,
    runner: &dyn CommandRunner,
) -> Result<(), DeployError> {
    let spec = deploy_command(cwd, env, target);
    info!(command = %spec.display(), mode = ?env.mode(), "deploying");
    let status = runner.run(&spec).map_err(|source| DeployError::Spawn {
        command: spec.display(),
        source,
    })?;
    if !status.success {
        return Err(DeployError::Failed {
            command: spec.display(),
            status,
        });
    }
    Ok(())
}

/// Deploy the whole project folder.
pub fn deploy(
    root: &Path,
    config: &DeployConfig,
    env: &DeployEnv,
    runner: &dyn CommandRunner,
) -> Result<DeployOutcome, DeployError> {
    require_entry(root, &config.site.entry_file)?;
    let tool = ensure_tool(root, &config.deploy, runner)?;
    run_deploy(root, env, &config.deploy, runner)?;
    Ok(DeployOutcome {
        mode: env.mode(),
        project_name: env.project_name.clone(),
        tool,
    })
}

/// Deploy only the entry page.
///
/// The page is copied unchanged to [`TEMP_FILE`] in the project root, then staged as
/// `index.html` in a fresh temporary directory where the deploy command runs.
/// Removing [`TEMP_FILE`] is left to the caller via [`cleanup_temp_file`] so it
/// happens on failure too.
pub fn deploy_single(
    root: &Path,
    config: &DeployConfig,
    env: &DeployEnv,
    runner: &dyn CommandRunner,
) -> Result<DeployOutcome, DeployError> {
    let entry = require_entry(root, &config.site.entry_file)?;
    // Byte copy, the page is never decoded.
    let temp = root.join(TEMP_FILE);
    fs::copy(&entry, &temp).map_err(|source| DeployError::Read {
        path: entry.clone(),
        source,
    })?;

    let staging = tempfile::Builder::new()
        .prefix("edgeone-single-")
        .tempdir()
        .map_err(DeployError::Stage)?;
    fs::copy(&temp, staging.path().join("index.html")).map_err(DeployError::Stage)?;

    let tool = ensure_tool(root, &config.deploy, runner)?;
    run_deploy(staging.path(), env, &config.deploy, runner)?;
    Ok(DeployOutcome {
        mode: env.mode(),
        project_name: env.project_name.clone(),
        tool,
    })
}

/// Remove [`TEMP_FILE`] from `root` if present. Returns whether a file was removed.
pub fn cleanup_temp_file(root: &Path) -> io::Result<bool> {
    let path = root.join(TEMP_FILE);
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
