//! Maps a command name to the action that should run it.
//!
//! Builtins always win; everything else is looked up in the directories listed in
//! `PATH`, read fresh from the [`Environment`] on every call.

use crate::builtin::Builtin;
use crate::command::{ExitCode, Streams};
use crate::env::Environment;
use crate::external::find_command_path;
use log::debug;
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::PathBuf;

/// Outcome of resolving a command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Builtin(Builtin),
    External(PathBuf),
    NotFound,
}

/// Failures while searching for an external command.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No `PATH` variable at all. The interpreter cannot continue without one.
    #[error("PATH is not set")]
    MissingSearchPath,
    /// A search directory exists but could not be listed.
    #[error("failed to read directory {}: {source}", .dir.display())]
    ReadDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ResolveError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ResolveError::MissingSearchPath)
    }
}

/// Resolve `name`, giving builtins precedence over executables on `PATH`.
pub fn resolve(env: &Environment, name: &str) -> Result<Resolution, ResolveError> {
    if let Some(builtin) = Builtin::from_name(name) {
        debug!("{name} resolved to builtin");
        return Ok(Resolution::Builtin(builtin));
    }
    resolve_external(env, name)
}

/// Resolve `name` against `PATH` only, ignoring builtins.
pub fn resolve_external(env: &Environment, name: &str) -> Result<Resolution, ResolveError> {
    let search_paths = env
        .get_var("PATH")
        .ok_or(ResolveError::MissingSearchPath)?;
    let resolution = match find_command_path(OsStr::new(search_paths), &env.current_dir, name)? {
        Some(path) => Resolution::External(path),
        None => Resolution::NotFound,
    };
    debug!("{name} resolved to {resolution:?}");
    Ok(resolution)
}

/// Print a lookup failure and, when it is fatal, ask the shell to exit with 1.
pub fn report(err: &ResolveError, io: &mut Streams<'_>, env: &mut Environment) -> io::Result<ExitCode> {
    writeln!(io.stderr, "{err}")?;
    if err.is_fatal() {
        env.request_exit(1);
    }
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_with_path(path: Option<&str>) -> Environment {
        let mut vars = HashMap::new();
        if let Some(p) = path {
            vars.insert("PATH".to_string(), p.to_string());
        }
        Environment::with_vars(vars, std::env::temp_dir())
    }

    #[test]
    fn builtins_take_precedence() {
        let env = env_with_path(Some("/bin:/usr/bin"));
        for builtin in Builtin::ALL {
            assert_eq!(
                resolve(&env, builtin.name()).unwrap(),
                Resolution::Builtin(builtin)
            );
        }
    }

    #[test]
    fn builtins_resolve_without_path() {
        let env = env_with_path(None);
        assert_eq!(
            resolve(&env, "cd").unwrap(),
            Resolution::Builtin(Builtin::Cd)
        );
    }

    #[test]
    fn missing_path_is_fatal() {
        let mut env = env_with_path(None);
        let err = resolve(&env, "ls").unwrap_err();
        assert!(matches!(err, ResolveError::MissingSearchPath));

        let (mut out, mut errs) = (Vec::new(), Vec::new());
        let mut io = Streams::new(&mut out, &mut errs);
        assert_eq!(report(&err, &mut io, &mut env).unwrap(), 1);
        assert!(env.should_exit);
        assert_eq!(env.exit_code, 1);
        assert_eq!(String::from_utf8(errs).unwrap(), "PATH is not set\n");
    }

    #[test]
    #[cfg(unix)]
    fn finds_sh_on_path() {
        let env = env_with_path(Some("/nonexistent-dir-for-test:/bin:/usr/bin"));
        match resolve(&env, "sh").unwrap() {
            Resolution::External(path) => assert!(path.ends_with("sh")),
            other => panic!("expected external sh, got {other:?}"),
        }
    }

    #[test]
    fn unknown_command_is_not_found() {
        let env = env_with_path(Some("/nonexistent-dir-for-test"));
        assert_eq!(
            resolve(&env, "nonexistent123").unwrap(),
            Resolution::NotFound
        );
    }

    #[test]
    fn path_changes_are_seen_on_next_lookup() {
        let mut env = env_with_path(Some("/nonexistent-dir-for-test"));
        assert!(resolve(&env, "whatever").is_ok());
        env.remove_var("PATH");
        assert!(matches!(
            resolve(&env, "whatever"),
            Err(ResolveError::MissingSearchPath)
        ));
    }
}
