use std::path::PathBuf;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_posterframe")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "posterframe.exe"
            } else {
                "posterframe"
            });
            p
        })
}

#[test]
fn cli_generate_dry_run_writes_placeholders() {
    let dir = PathBuf::from("target").join("cli_smoke").join("generate");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let manifest_path = dir.join("page.json");
    let out_dir = dir.join("out");
    let manifest = serde_json::json!({
        "sections": [
            {"id": "gaming", "videos": [{"id": "v1", "src": "clip.mp4"}]},
            {"id": "social-media", "heading": "Reels", "videos": [{"id": "v2"}]}
        ]
    });
    std::fs::write(&manifest_path, serde_json::to_vec(&manifest).unwrap()).unwrap();

    let manifest_arg = manifest_path.to_string_lossy().to_string();
    let out_arg = out_dir.to_string_lossy().to_string();
    let output = std::process::Command::new(exe())
        .args(["generate", "--in", manifest_arg.as_str(), "--out-dir"])
        .arg(out_arg.as_str())
        .args(["--dry-run", "--format", "png"])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(out_dir.join("v1.png").exists());
    assert!(out_dir.join("v2.png").exists());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["placeholders"], serde_json::json!(["v1", "v2"]));

    let index: serde_json::Value =
        serde_json::from_slice(&std::fs::read(out_dir.join("posters.json")).unwrap()).unwrap();
    assert_eq!(index[0]["origin"]["category"], "gaming");
    assert_eq!(index[1]["origin"]["category"], "social");
}

#[test]
fn cli_placeholder_writes_image() {
    let dir = PathBuf::from("target").join("cli_smoke").join("placeholder");
    std::fs::create_dir_all(&dir).unwrap();
    let out_path = dir.join("music.jpg");
    let _ = std::fs::remove_file(&out_path);

    let out_arg = out_path.to_string_lossy().to_string();
    let status = std::process::Command::new(exe())
        .args(["placeholder", "--category", "music-videos", "--out"])
        .arg(out_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    let bytes = std::fs::read(&out_path).unwrap();
    assert_eq!(&bytes[..2], &[0xff, 0xd8]);
}

#[test]
fn cli_embed_rejects_bad_id() {
    let ok = std::process::Command::new(exe())
        .args(["embed", "--id", "abc_123"])
        .output()
        .unwrap();
    assert!(ok.status.success());
    assert!(String::from_utf8_lossy(&ok.stdout).contains("youtube.com/embed/abc_123"));

    let bad = std::process::Command::new(exe())
        .args(["embed", "--id", "a/b"])
        .status()
        .unwrap();
    assert!(!bad.success());
}
