use crate::command::{ExecutableCommand, ExitCode, Streams};
use crate::env::Environment;
use crate::resolver::ResolveError;
use anyhow::Result;
use log::{debug, warn};
use std::ffi::OsStr;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

/// Command that is not a builtin.
pub struct ExternalCommand {
    name: String,
    path: PathBuf,
    args: Vec<String>,
}

impl ExternalCommand {
    /// `name` is what the user typed and becomes `argv[0]`; `path` is what gets run.
    pub fn new(name: String, path: PathBuf, args: Vec<String>) -> Self {
        Self { name, path, args }
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        let mut cmd = std::process::Command::new(&self.path);
        cmd.args(&self.args)
            .env_clear()
            .envs(env.vars.iter())
            .current_dir(&env.current_dir)
            .stdin(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(&self.name);
        }

        debug!("spawning {} {:?}", self.path.display(), self.args);
        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) => {
                writeln!(io.stderr, "{}: {}", self.name, e)?;
                return Ok(126);
            }
        };

        io.stdout.write_all(&output.stdout)?;
        io.stderr.write_all(&output.stderr)?;
        if !output.status.success() {
            writeln!(io.stderr, "{}: {}", self.name, output.status)?;
        }
        match output.status.code() {
            Some(x) => Ok(x),
            None => Ok(terminated_by_signal(output.status)),
        }
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command name the way the shell does.
///
/// Behavior:
/// - Empty name: `None`.
/// - Name containing a path separator (`/bin/sh`, `./run.sh`): checked directly,
///   relative names against `cwd`.
/// - Plain name: every directory in `search_paths` is listed in order and the first
///   entry with exactly that name that is executable by its owner wins. Missing
///   directories are skipped; directories that exist but can't be listed are errors.
pub fn find_command_path(
    search_paths: &OsStr,
    cwd: &Path,
    name: &str,
) -> Result<Option<PathBuf>, ResolveError> {
    if name.is_empty() {
        return Ok(None);
    }

    if name.contains(std::path::MAIN_SEPARATOR) || name.contains('/') {
        let path = cwd.join(name);
        return Ok(is_executable(&path).then_some(path));
    }

    find_in_path(search_paths, cwd, OsStr::new(name))
}

fn find_in_path(
    search_paths: &OsStr,
    cwd: &Path,
    cmd: &OsStr,
) -> Result<Option<PathBuf>, ResolveError> {
    for dir in std::env::split_paths(search_paths) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let dir = cwd.join(dir);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(source) => return Err(ResolveError::ReadDir { dir, source }),
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable entry in {}: {e}", dir.display());
                    continue;
                }
            };
            if entry.file_name() != cmd {
                continue;
            }
            let path = entry.path();
            if is_executable(&path) {
                return Ok(Some(path));
            }
        }
    }
    Ok(None)
}

/// A non-directory whose owner-execute bit is set. Symlinks are followed.
fn is_executable(path: &Path) -> bool {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                warn!("failed to get file info for {}: {e}", path.display());
            }
            return false;
        }
    };
    !meta.is_dir() && has_owner_exec(&meta)
}

#[cfg(unix)]
fn has_owner_exec(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o100 != 0
}

#[cfg(not(unix))]
fn has_owner_exec(meta: &fs::Metadata) -> bool {
    meta.is_file()
}
