use std::process::Command;

// Records the compiler identifier so entries can report the toolchain
// the binary was built with.
fn main() {
    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .and_then(|s| s.split_whitespace().nth(1).map(str::to_string))
        .map(|v| format!("rustc {}", v))
        .unwrap_or_else(|| "rustc unknown".to_string());

    println!("cargo:rustc-env=LOG_SHIPPER_RUSTC_VERSION={}", version);
    println!("cargo:rerun-if-env-changed=RUSTC");
}
