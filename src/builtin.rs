use crate::command::{ExecutableCommand, ExitCode, Streams};
use crate::env::Environment;
use crate::resolver::{self, Resolution};
use anyhow::{Context, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

/// The fixed registry of commands implemented inside the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Exit,
    Echo,
    Type,
    Pwd,
    Cd,
}

impl Builtin {
    /// Every builtin, in dispatch precedence order.
    pub const ALL: [Builtin; 5] = [
        Builtin::Exit,
        Builtin::Echo,
        Builtin::Type,
        Builtin::Pwd,
        Builtin::Cd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Exit => Exit::name(),
            Builtin::Echo => Echo::name(),
            Builtin::Type => Type::name(),
            Builtin::Pwd => Pwd::name(),
            Builtin::Cd => Cd::name(),
        }
    }

    /// Exact match on the parsed command word.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Instantiate the builtin with its arguments (the command word excluded).
    pub fn create(self, args: &[String]) -> Box<dyn ExecutableCommand> {
        match self {
            Builtin::Exit => Box::new(Exit::from_args(args)),
            Builtin::Echo => Box::new(Echo::from_args(args)),
            Builtin::Type => Box::new(Type::from_args(args)),
            Builtin::Pwd => Box::new(Pwd::from_args(args)),
            Builtin::Cd => Box::new(Cd::from_args(args)),
        }
    }
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins run in-process and only touch the [`Environment`] they are handed.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Build the command from its raw arguments. Builtins accept any argument list.
    fn from_args(args: &[String]) -> Self;

    /// Executes the command using provided IO streams and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        match <T as BuiltinCommand>::execute(*self, io, env) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(io.stderr, "{e:#}")?;
                Ok(1)
            }
        }
    }
}

/// Terminate the shell, optionally with an explicit status.
pub struct Exit {
    code: Option<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn from_args(args: &[String]) -> Self {
        // Anything after the first argument is ignored.
        Self {
            code: args.first().cloned(),
        }
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        let code = match self.code {
            None => 0,
            Some(raw) => match raw.parse::<ExitCode>() {
                Ok(code) => code,
                Err(e) => {
                    writeln!(io.stderr, "exit: invalid exit code '{raw}': {e}")?;
                    1
                }
            },
        };
        env.request_exit(code);
        Ok(code)
    }
}

/// Write the arguments to standard output, separated by spaces and followed by a newline.
pub struct Echo {
    args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn from_args(args: &[String]) -> Self {
        Self {
            args: args.to_vec(),
        }
    }

    fn execute(self, io: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode> {
        writeln!(io.stdout, "{}", self.args.join(" "))?;
        Ok(0)
    }
}

/// Describe how each name would be interpreted if used as a command.
pub struct Type {
    names: Vec<String>,
}

impl BuiltinCommand for Type {
    fn name() -> &'static str {
        "type"
    }

    fn from_args(args: &[String]) -> Self {
        Self {
            names: args.to_vec(),
        }
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        let mut status = 0;
        for name in &self.names {
            match resolver::resolve(env, name) {
                Ok(Resolution::Builtin(_)) => writeln!(io.stdout, "{name} is a shell builtin")?,
                Ok(Resolution::External(path)) => {
                    writeln!(io.stdout, "{name} is {}", path.display())?
                }
                Ok(Resolution::NotFound) => {
                    writeln!(io.stderr, "{name}: not found")?;
                    status = 1;
                }
                Err(e) => {
                    status = resolver::report(&e, io, env)?;
                    if e.is_fatal() {
                        break;
                    }
                }
            }
        }
        Ok(status)
    }
}

/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn from_args(_args: &[String]) -> Self {
        Pwd {}
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        writeln!(io.stdout, "{}", env.current_dir.to_string_lossy())?;
        Ok(0)
    }
}

/// Change the current working directory.
///
/// `~`, or no target at all, means the directory named by `HOME`.
pub struct Cd {
    target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_args(args: &[String]) -> Self {
        Self {
            target: args.first().cloned(),
        }
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        let (shown, new_dir) = match self.target.as_deref() {
            None | Some("~") => {
                let home = env.get_var("HOME").context("cd: HOME not set")?;
                let shown = self.target.clone().unwrap_or_else(|| home.to_string());
                (shown, PathBuf::from(home))
            }
            Some(t) => (t.to_string(), normalize(&env.current_dir.join(t))),
        };

        match fs::metadata(&new_dir) {
            Ok(meta) if meta.is_dir() => {
                if let Err(reason) = check_searchable(&new_dir) {
                    writeln!(io.stderr, "cd: {shown}: {reason}")?;
                    return Ok(1);
                }
                env.current_dir = new_dir;
                Ok(0)
            }
            Ok(_) => {
                writeln!(io.stderr, "cd: {shown}: Not a directory")?;
                Ok(1)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                writeln!(io.stderr, "cd: {shown}: No such file or directory")?;
                Ok(1)
            }
            Err(e) => Err(e).with_context(|| format!("cd: {shown}")),
        }
    }
}

/// A real `chdir` also needs search permission on the target, which `metadata` doesn't check.
#[cfg(unix)]
fn check_searchable(dir: &Path) -> Result<(), &'static str> {
    use nix::unistd::{AccessFlags, access};
    access(dir, AccessFlags::X_OK).map_err(|errno| errno.desc())
}

#[cfg(not(unix))]
fn check_searchable(_dir: &Path) -> Result<(), &'static str> {
    Ok(())
}

/// Lexically resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
