use std::process::Command;

// Stamp the git revision into `campfin --version`.
fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let repo_root = format!("{manifest_dir}/..");

    let describe = Command::new("git")
        .args(["-C", &repo_root, "describe", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty());

    println!(
        "cargo:rustc-env=CAMPFIN_BUILD_SHA={}",
        describe.as_deref().unwrap_or("unknown")
    );
    println!("cargo:rerun-if-changed={repo_root}/.git/HEAD");
}
