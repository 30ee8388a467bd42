use std::process::Command;

fn git_cmd(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
}

fn main() {
    let git_hash = git_cmd(&["rev-parse", "HEAD"]).unwrap_or_default();
    let is_dirty = git_cmd(&["diff"]).map(|o| !o.is_empty()) == Some(true);
    println!("cargo:rustc-env=GIT_HASH={git_hash}");
    println!("cargo:rustc-env=GIT_DIRTY={is_dirty}");
}
