fn main() {
    // Stamp the binary so `framecast --version` identifies the build
    println!(
        "cargo:rustc-env=FRAMECAST_BUILD_DATE={}",
        chrono::Utc::now().format("%Y-%m-%d")
    );

    let hash = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=FRAMECAST_GIT_HASH={hash}");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
