use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

use image::{Rgba, RgbaImage};

const VIEWS: [&str; 3] = ["upper", "front", "lower"];

fn run(args: &[String]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_autoanno"))
        .args(args)
        .output()
        .unwrap()
}

fn make_inputs(dir: &Path) -> Vec<PathBuf> {
    VIEWS
        .iter()
        .map(|v| {
            let p = dir.join(format!("in_{v}.png"));
            RgbaImage::from_pixel(400, 300, Rgba([50, 50, 50, 255]))
                .save(&p)
                .unwrap();
            p
        })
        .collect()
}

fn make_args(inputs: &[PathBuf], outputs: &[PathBuf]) -> Vec<String> {
    let mut args = vec![];
    for (v, p) in VIEWS.iter().zip(inputs) {
        args.push(format!("--in_{v}"));
        args.push(p.to_string_lossy().to_string());
    }
    for (v, p) in VIEWS.iter().zip(outputs) {
        args.push(format!("--out_{v}"));
        args.push(p.to_string_lossy().to_string());
    }
    args
}

#[test]
fn test_cli_success() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = make_inputs(dir.path());
    let outputs = VIEWS
        .iter()
        .map(|v| dir.path().join(format!("out_{v}.png")))
        .collect::<Vec<_>>();
    let out = run(&make_args(&inputs, &outputs));
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 3);
    for (line, p) in stdout.lines().zip(&outputs) {
        assert_eq!(line, format!("Annotated {}", p.display()));
        assert_eq!(image::open(p).unwrap().into_rgba8().dimensions(), (400, 300));
    }
    // same seed per view, hence same output as the library call
    let expected = dir.path().join("expected_front.png");
    annolib::annotate(&inputs[1], &expected, 2).unwrap();
    assert_eq!(
        std::fs::read(&expected).unwrap(),
        std::fs::read(&outputs[1]).unwrap()
    );
}

#[test]
fn test_cli_missing_flag() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = make_inputs(dir.path());
    let outputs = VIEWS
        .iter()
        .map(|v| dir.path().join(format!("out_{v}.png")))
        .collect::<Vec<_>>();
    let mut args = make_args(&inputs, &outputs);
    args.truncate(args.len() - 2);
    let out = run(&args);
    assert!(!out.status.success());
    assert!(outputs.iter().all(|p| !p.exists()));
}

#[test]
fn test_cli_aborts_on_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut inputs = make_inputs(dir.path());
    inputs[1] = dir.path().join("missing_front.png");
    let outputs = VIEWS
        .iter()
        .map(|v| dir.path().join(format!("out_{v}.png")))
        .collect::<Vec<_>>();
    let out = run(&make_args(&inputs, &outputs));
    assert!(!out.status.success());
    assert!(outputs[0].exists());
    assert!(!outputs[1].exists());
    assert!(!outputs[2].exists());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("missing_front.png"));
}
