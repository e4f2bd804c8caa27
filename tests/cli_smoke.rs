use std::path::PathBuf;

fn paracoord_exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_paracoord")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "paracoord.exe"
            } else {
                "paracoord"
            });
            p
        })
}

#[test]
fn cli_writes_gif_for_each_run() {
    let dir = PathBuf::from("target").join("cli_smoke");
    let _ = std::fs::remove_dir_all(&dir);
    let input = dir.join("in");
    let media = dir.join("media");
    std::fs::create_dir_all(&input).unwrap();

    let body = "# Function=f1\n# Scalarizer=s1\n# k=1\n# n=2\n# Rmin=0\n# Rmax=10\n\
                1\t9\t1\n5\t5\t2\n9\t1\t3\n";
    for g in [0, 10] {
        std::fs::write(input.join(format!("run1_gen{g}.pos")), body).unwrap();
    }

    let status = std::process::Command::new(paracoord_exe())
        .args(["--input-dir"])
        .arg(&input)
        .args(["--media-dir"])
        .arg(&media)
        .args(["-d", "1", "-s", "1"])
        .status()
        .unwrap();

    assert!(status.success());
    let gif = media.join("gifs").join("run1.gif");
    assert!(std::fs::metadata(&gif).unwrap().len() > 0);
}

#[test]
fn cli_fails_without_input_files() {
    let dir = PathBuf::from("target").join("cli_smoke_empty");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let output = std::process::Command::new(paracoord_exe())
        .args(["--input-dir"])
        .arg(&dir)
        .args(["--media-dir"])
        .arg(dir.join("media"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("discovery error"));
}

#[test]
fn cli_unparsable_duration_and_stepping_fall_back_to_defaults() {
    let dir = PathBuf::from("target").join("cli_smoke_fallback");
    let _ = std::fs::remove_dir_all(&dir);
    let input = dir.join("in");
    std::fs::create_dir_all(&input).unwrap();
    let body = "# Function=f1\n# Scalarizer=s1\n# k=1\n# n=2\n# Rmin=0\n# Rmax=10\n1\t9\t1\n";
    std::fs::write(input.join("run1_gen0.pos"), body).unwrap();

    let output = std::process::Command::new(paracoord_exe())
        .arg("--input-dir")
        .arg(&input)
        .arg("--media-dir")
        .arg(dir.join("media"))
        .args(["-d", "abc", "-s", "2.5"])
        .output()
        .unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");
    assert!(stderr.contains("provided duration 'abc' is not valid"));
    assert!(stderr.contains("provided stepping value '2.5' is not valid"));
    assert!(dir.join("media").join("gifs").join("run1.gif").exists());
}

#[test]
fn cli_help_explains_interrupt_behaviour() {
    let output = std::process::Command::new(paracoord_exe())
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ctrl+C stops immediately"));
}
