use crate::command::{Command, ExecutableCommand, ExitCode, Streams};
use crate::env::Environment;
use crate::external::ExternalCommand;
use crate::resolver::{self, Resolution};
use log::debug;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, IsTerminal, Write};

/// Status reported for a command name that resolves to nothing.
pub const NOT_FOUND: ExitCode = 127;

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter owns an [`Environment`] and runs one line at a time against it.
/// Output goes to whatever [`Streams`] the caller provides, and a pending `exit` is
/// reported through [`Interpreter::exit_request`] rather than by ending the process.
///
/// Example
/// ```
/// use tiny_shell::{Interpreter, Streams};
/// let mut sh = Interpreter::default();
/// let (mut out, mut err) = (Vec::new(), Vec::new());
/// let code = sh
///     .execute("echo hello 'big   world'", &mut Streams::new(&mut out, &mut err))
///     .unwrap();
/// assert_eq!(code, 0);
/// assert_eq!(out, b"hello big   world\n");
/// ```
pub struct Interpreter {
    env: Environment,
}

impl Interpreter {
    /// Create an interpreter around an explicit environment.
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// The status the process should exit with, once `exit` or a fatal error ran.
    pub fn exit_request(&self) -> Option<ExitCode> {
        self.env.should_exit.then_some(self.env.exit_code)
    }

    /// Tokenize and run one input line.
    ///
    /// A trailing newline is stripped first. Blank lines do nothing and report 0.
    pub fn execute(&mut self, line: &str, io: &mut Streams<'_>) -> anyhow::Result<ExitCode> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        match Command::parse(line) {
            Some(command) => self.dispatch(command, io),
            None => Ok(0),
        }
    }

    /// Run an already parsed command.
    pub fn dispatch(&mut self, command: Command, io: &mut Streams<'_>) -> anyhow::Result<ExitCode> {
        let resolution = match resolver::resolve(&self.env, &command.executable) {
            Ok(resolution) => resolution,
            Err(e) => return Ok(resolver::report(&e, io, &mut self.env)?),
        };

        let cmd: Box<dyn ExecutableCommand> = match resolution {
            Resolution::Builtin(builtin) => builtin.create(&command.arguments),
            Resolution::External(path) => Box::new(ExternalCommand::new(
                command.executable,
                path,
                command.arguments,
            )),
            Resolution::NotFound => {
                writeln!(io.stdout, "{}: command not found", command.executable)?;
                return Ok(NOT_FOUND);
            }
        };

        let code = cmd.execute(io, &mut self.env)?;
        debug!("command finished with status {code}");
        Ok(code)
    }

    /// Read-eval-print loop over the terminal.
    ///
    /// Returns the status the process should exit with: the `exit` code, 0 on
    /// end of input, 1 when reading input fails. The prompt is written even when
    /// input is piped.
    pub fn repl(&mut self, prompt: &str) -> rustyline::Result<ExitCode> {
        let mut rl = DefaultEditor::new()?;
        let stdout = io::stdout();
        let stderr = io::stderr();
        // rustyline only draws the prompt when it is editing a terminal (or for a
        // dumb TERM), so piped input gets it written here and hidden from rustyline.
        let piped = !io::stdin().is_terminal();
        let editor_prompt = if piped { "" } else { prompt };

        loop {
            if piped {
                let mut out = stdout.lock();
                out.write_all(prompt.as_bytes())?;
                out.flush()?;
            }
            match rl.readline(editor_prompt) {
                Ok(line) => {
                    let (mut out, mut err) = (stdout.lock(), stderr.lock());
                    let mut io = Streams::new(&mut out, &mut err);
                    if let Err(e) = self.execute(&line, &mut io) {
                        let _ = writeln!(io.stderr, "{e:#}");
                    }
                    let _ = io.stdout.flush();
                    if let Some(code) = self.exit_request() {
                        return Ok(code);
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(0),
                Err(err) => {
                    eprintln!("Error reading input: {err}");
                    return Ok(1);
                }
            }
        }
    }
}

impl Default for Interpreter {
    /// An interpreter over a snapshot of the current process environment.
    fn default() -> Self {
        Self::new(Environment::new())
    }
}
