use crate::command::ExitCode;
use log::warn;
use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::OsString;
use std::path::PathBuf;

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: the variables visible to lookups and to executed commands.
/// - `current_dir`: the working directory for `pwd`, `cd` and spawned children.
/// - `should_exit` / `exit_code`: a termination request raised by `exit` or by a
///   fatal lookup error, checked by the read loop after every line.
///
/// Builtins mutate this context instead of the process state, so a test can run
/// `cd` against its own `Environment` without moving the test harness around.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set to true, indicates that an interactive loop should exit.
    pub should_exit: bool,
    /// Status the process should exit with once `should_exit` is set.
    pub exit_code: ExitCode,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    pub fn new() -> Self {
        let vars = utf8_vars(stdenv::vars_os());
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_vars(vars, current_dir)
    }

    /// Build an isolated environment that shares nothing with the process.
    pub fn with_vars(vars: HashMap<String, String>, current_dir: PathBuf) -> Self {
        Self {
            vars,
            current_dir,
            should_exit: false,
            exit_code: 0,
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Only the captured variables are consulted, so removing `PATH` from
    /// `vars` is observed on the very next lookup.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    pub fn remove_var(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    /// Ask the read loop to stop and exit the process with `code`.
    pub fn request_exit(&mut self, code: ExitCode) {
        self.should_exit = true;
        self.exit_code = code;
    }
}

/// Keep the variables whose name and value are valid UTF-8, warning about the rest.
fn utf8_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> HashMap<String, String> {
    let mut kept = HashMap::new();
    for (key, value) in vars {
        match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => {
                kept.insert(key, value);
            }
            (Ok(key), Err(_)) if key == "PATH" => {
                warn!("ignoring PATH: value is not valid UTF-8, external commands cannot be found")
            }
            (Ok(key), Err(_)) => warn!("ignoring environment variable {key}: value is not valid UTF-8"),
            (Err(key), _) => warn!(
                "ignoring environment variable {}: name is not valid UTF-8",
                key.to_string_lossy()
            ),
        }
    }
    kept
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
