use std::io::Write;
use std::process::{Command, Output, Stdio};

fn shell() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tiny_shell"));
    cmd.env("PATH", "/nonexistent-dir-for-test")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

fn feed(mut cmd: Command, input: &[u8]) -> Output {
    let mut child = cmd.spawn().expect("spawn shell");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input)
        .expect("write input");
    child.wait_with_output().expect("wait for shell")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn exit_code_becomes_process_status() {
    let output = feed(shell(), b"echo hi\nexit 7\necho never\n");
    assert_eq!(output.status.code(), Some(7));
    assert_eq!(stdout(&output), "$ hi\n$ ");
}

#[test]
fn end_of_input_exits_cleanly() {
    let output = feed(shell(), b"echo hi\n");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "$ hi\n$ ");
    assert!(stderr(&output).is_empty(), "{}", stderr(&output));
}

#[test]
fn custom_prompt_is_printed_before_every_line() {
    let mut cmd = shell();
    cmd.args(["--prompt", "> "]);
    let output = feed(cmd, b"echo a\necho b\n");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "> a\n> b\n> ");
}

#[test]
fn unreadable_input_exits_with_one() {
    let output = feed(shell(), b"echo \xff\xfe\n");
    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).starts_with("Error reading input"),
        "{}",
        stderr(&output)
    );
    assert_eq!(stderr(&output).lines().count(), 1);
}

#[test]
fn single_command_sets_status() {
    let mut cmd = shell();
    cmd.args(["-c", "exit 3"]);
    let output = feed(cmd, b"");
    assert_eq!(output.status.code(), Some(3));

    let mut cmd = shell();
    cmd.args(["-c", "exit abc"]);
    let output = feed(cmd, b"");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("abc"));
}

#[test]
fn single_command_not_found_goes_to_stdout() {
    let mut cmd = shell();
    cmd.args(["-c", "nonexistent123 arg"]);
    let output = feed(cmd, b"");
    assert_eq!(output.status.code(), Some(127));
    assert_eq!(stdout(&output), "nonexistent123: command not found\n");
    assert!(stderr(&output).is_empty());
}

#[test]
fn single_command_echo_keeps_quoting() {
    let mut cmd = shell();
    cmd.args(["-c", "echo 'a  b' \"c\\\"d\""]);
    let output = feed(cmd, b"");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "a  b c\"d\n");
}

#[test]
fn missing_path_is_fatal() {
    let mut cmd = shell();
    cmd.env_remove("PATH");
    let output = feed(cmd, b"ls\necho after\n");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "$ ");
    assert_eq!(stderr(&output), "PATH is not set\n");
}
