use flush::executor::{Continuation, Executor};
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;

fn setup_test_env() -> TempDir {
    TempDir::new().unwrap()
}

fn quiet_executor() -> Executor {
    Executor::with_output(Box::new(io::sink()), Box::new(io::sink()))
}

#[test]
fn test_stdout_redirect() {
    let temp_dir = setup_test_env();
    let output_file = temp_dir.path().join("output.txt");

    let mut executor = quiet_executor();
    let result = executor.execute_line(&format!("echo hello > {}", output_file.display()));

    assert_eq!(result, Continuation::Continue);
    assert_eq!(fs::read_to_string(&output_file).unwrap(), "hello\n");
}

#[test]
fn test_stdout_redirect_truncates() {
    let temp_dir = setup_test_env();
    let output_file = temp_dir.path().join("output.txt");
    fs::write(&output_file, "a much longer line that must disappear\n").unwrap();

    let mut executor = quiet_executor();
    executor.execute_line(&format!("echo new > {}", output_file.display()));

    assert_eq!(fs::read_to_string(&output_file).unwrap(), "new\n");
}

#[test]
fn test_created_file_is_not_executable() {
    let temp_dir = setup_test_env();
    let output_file = temp_dir.path().join("fresh.txt");

    let mut executor = quiet_executor();
    executor.execute_line(&format!("true > {}", output_file.display()));

    let mode = fs::metadata(&output_file).unwrap().permissions().mode();
    assert_eq!(mode & 0o600, 0o600);
    assert_eq!(mode & 0o111, 0);
}

#[test]
fn test_stdin_redirect() {
    let temp_dir = setup_test_env();
    let input_file = temp_dir.path().join("input.txt");
    let output_file = temp_dir.path().join("output.txt");
    fs::write(&input_file, "one\ntwo\nthree\n").unwrap();

    let mut executor = quiet_executor();
    executor.execute_line(&format!(
        "wc -l < {} > {}",
        input_file.display(),
        output_file.display()
    ));

    assert_eq!(fs::read_to_string(&output_file).unwrap().trim(), "3");
}

#[test]
fn test_missing_input_skips_output_file() {
    let temp_dir = setup_test_env();
    let input_file = temp_dir.path().join("missing.txt");
    let output_file = temp_dir.path().join("output.txt");

    let mut executor = quiet_executor();
    executor.execute_line(&format!(
        "cat < {} > {}",
        input_file.display(),
        output_file.display()
    ));

    assert!(!output_file.exists(), "input is opened before output");
}

#[test]
fn test_attached_marker_is_an_argument() {
    let temp_dir = setup_test_env();
    let output_file = temp_dir.path().join("output.txt");

    let mut executor = quiet_executor();
    executor.execute_line(&format!("echo a>b > {}", output_file.display()));

    assert_eq!(fs::read_to_string(&output_file).unwrap(), "a>b\n");
    assert!(!temp_dir.path().join("b").exists());
}

#[test]
fn test_redirection_on_builtin_is_ignored() {
    let temp_dir = setup_test_env();
    let output_file = temp_dir.path().join("jobs.txt");

    let mut executor = quiet_executor();
    let result = executor.execute_line(&format!("jobs > {}", output_file.display()));

    assert_eq!(result, Continuation::ContinueAfterBuiltin);
    assert!(!output_file.exists());
}

#[test]
fn test_unwritable_output_target() {
    let temp_dir = setup_test_env();
    let output_file = temp_dir.path().join("no-such-dir").join("out.txt");

    let mut executor = quiet_executor();
    assert_eq!(
        executor.execute_line(&format!("echo hi > {}", output_file.display())),
        Continuation::Continue
    );
    assert!(!output_file.exists());
}
