use std::fs;
use std::process::Command;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn framelabel_bin() -> &'static str {
    env!("CARGO_BIN_EXE_framelabel")
}

#[test]
fn no_arguments_prints_usage_and_exits_1() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = Command::new(framelabel_bin())
        .current_dir(dir.path())
        .output()
        .expect("run framelabel");
    assert_eq!(output.status.code(), Some(1));
    let combined = combined_output(&output);
    assert!(combined.contains("Usage"), "{combined}");
    let leftovers = fs::read_dir(dir.path()).expect("read dir").count();
    assert_eq!(leftovers, 0);
}

#[test]
fn single_argument_prints_usage_and_creates_no_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let video = dir.path().join("clip.mp4");
    fs::write(&video, b"stub").expect("write video");
    let output = Command::new(framelabel_bin())
        .arg(&video)
        .current_dir(dir.path())
        .output()
        .expect("run framelabel");
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("OUTPUT_TABLE_PATH"));
    let entries: Vec<_> = fs::read_dir(dir.path())
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("clip.mp4")]);
}

#[test]
fn help_describes_the_tool() {
    let output = Command::new(framelabel_bin())
        .arg("--help")
        .output()
        .expect("run framelabel --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("VIDEO_PATH"));
    assert!(combined.contains("--buffer-capacity"));
}

#[test]
fn missing_video_fails_before_touching_the_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table = dir.path().join("labels.csv");
    let output = Command::new(framelabel_bin())
        .arg(dir.path().join("missing.mp4"))
        .arg(&table)
        .env("FRAMELABEL_NO_LOGS", "true")
        .output()
        .expect("run framelabel");
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("does not exist"));
    assert!(!table.exists());
}
