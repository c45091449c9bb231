//! A tiny interactive shell.
//!
//! One line is read, split into arguments with POSIX-like quoting (see [`lexer`]),
//! the first word is resolved to a builtin or to an executable on `PATH`
//! (see [`resolver`]), and the command runs against an explicit [`Environment`].
//!
//! The main entry point is [`Interpreter`]. It writes to caller-supplied [`Streams`]
//! and reports `exit` as a request instead of terminating the process, so the whole
//! pipeline can be driven from tests with in-memory buffers.

mod builtin;
pub mod command;
pub mod env;
mod external;
mod interpreter;
pub mod lexer;
pub mod resolver;

pub use builtin::Builtin;
pub use command::{Command, ExitCode, Streams};
pub use env::Environment;
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Interpreter, NOT_FOUND};
