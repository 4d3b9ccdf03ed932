use std::process::Command;

use tempfile::TempDir;

fn doppelshade() -> Command {
    Command::new(env!("CARGO_BIN_EXE_doppelshade"))
}

#[test]
fn list_effects_json_reports_the_catalogue() {
    let output = doppelshade()
        .args(["list-effects", "--json"])
        .output()
        .expect("failed to run doppelshade list-effects");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 10);

    let defaults: Vec<_> = entries
        .iter()
        .filter(|entry| entry["default"] == serde_json::Value::Bool(true))
        .collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0]["token"], "liquid-metal");
}

#[test]
fn render_writes_png_at_device_resolution() {
    let root = TempDir::new().unwrap();
    let output_path = root.path().join("frame.png");

    let status = doppelshade()
        .args(["render", "--effect", "pulse-grid", "--size", "8x6"])
        .args(["--time", "0.5", "--dpr", "2"])
        .arg("--output")
        .arg(&output_path)
        .status()
        .expect("failed to run doppelshade render");
    assert!(status.success());

    let image = image::open(&output_path).unwrap();
    assert_eq!((image.width(), image.height()), (16, 12));
}

#[test]
fn render_unknown_effect_uses_default() {
    let root = TempDir::new().unwrap();
    let unknown = root.path().join("unknown.png");
    let fallback = root.path().join("fallback.png");

    for (effect, path) in [("sparkles", &unknown), ("liquid-metal", &fallback)] {
        let status = doppelshade()
            .args(["render", "--effect", effect, "--size", "6x6", "--time", "1"])
            .arg("--output")
            .arg(path)
            .status()
            .expect("failed to run doppelshade render");
        assert!(status.success());
    }

    let unknown = image::open(&unknown).unwrap().to_rgba8();
    let fallback = image::open(&fallback).unwrap().to_rgba8();
    assert_eq!(unknown, fallback);
}

#[test]
fn render_rejects_bad_size() {
    let root = TempDir::new().unwrap();
    let status = doppelshade()
        .args(["render", "--effect", "pulse-grid", "--size", "0x4"])
        .arg("--output")
        .arg(root.path().join("never.png"))
        .status()
        .expect("failed to run doppelshade render");
    assert!(!status.success());
}

#[test]
fn render_rejects_out_of_range_time() {
    let root = TempDir::new().unwrap();
    let output = doppelshade()
        .args(["render", "--effect", "pulse-grid", "--size", "4x4"])
        .args(["--time", "1e20"])
        .arg("--output")
        .arg(root.path().join("never.png"))
        .output()
        .expect("failed to run doppelshade render");
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("--time"), "{stderr}");
    assert!(!stderr.contains("panicked"), "{stderr}");
    assert!(!root.path().join("never.png").exists());
}

#[test]
fn render_rejects_oversized_frames() {
    let root = TempDir::new().unwrap();
    for dpr in ["1e12", "5000"] {
        let output = doppelshade()
            .args(["render", "--effect", "pulse-grid", "--size", "4x4"])
            .args(["--dpr", dpr])
            .arg("--output")
            .arg(root.path().join("never.png"))
            .output()
            .expect("failed to run doppelshade render");
        assert_eq!(output.status.code(), Some(1), "dpr {dpr}");

        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("exceeds"), "dpr {dpr}: {stderr}");
        assert!(!stderr.contains("panicked"), "dpr {dpr}: {stderr}");
    }
    assert!(!root.path().join("never.png").exists());
}

#[test]
fn where_honours_config_override() {
    let root = TempDir::new().unwrap();
    let output = doppelshade()
        .env("DOPPELSHADE_CONFIG_DIR", root.path())
        .arg("where")
        .output()
        .expect("failed to run doppelshade where");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let expected = root.path().join("stage.toml");
    assert!(stdout.contains(&expected.display().to_string()));
    assert!(stdout.contains("(missing)"));
}
