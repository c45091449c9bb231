use crate::env::Environment;
use crate::lexer;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// One parsed input line: the command word and its arguments, fully unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub executable: String,
    pub arguments: Vec<String>,
}

impl Command {
    /// Tokenize `line` and split off the first token as the executable.
    ///
    /// Returns `None` when the line holds no tokens at all.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = lexer::tokenize(line).into_iter();
        let executable = tokens.next()?;
        Some(Self {
            executable,
            arguments: tokens.collect(),
        })
    }
}

/// Output sinks a command writes to.
///
/// The interpreter owns neither stream, so callers can pass the real process
/// streams or in-memory buffers.
pub struct Streams<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
}

impl<'a> Streams<'a> {
    pub fn new(stdout: &'a mut dyn Write, stderr: &'a mut dyn Write) -> Self {
        Self { stdout, stderr }
    }
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command.
    fn execute(self: Box<Self>, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode>;
}
