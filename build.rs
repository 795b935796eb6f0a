use std::path::PathBuf;

#[path = "build/lockfile.rs"]
mod lockfile;

fn main() {
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=build/lockfile.rs");

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let manifest_dir = PathBuf::from(manifest_dir);

    match lockfile::resolve_version(&manifest_dir) {
        Some((version, lock_path)) => {
            match lock_path {
                Some(path) => println!("cargo:rerun-if-changed={}", path.display()),
                None => println!(
                    "cargo:warning=no Cargo.lock pins {}, reporting the manifest requirement",
                    lockfile::CRATE_NAME
                ),
            }
            println!("cargo:rustc-env=CANDLE_CORE_VERSION={}", version);
        }
        None => {
            println!("cargo:warning=could not resolve the {} version", lockfile::CRATE_NAME);
            println!("cargo:rustc-env=CANDLE_CORE_VERSION=unknown");
        }
    }
}
