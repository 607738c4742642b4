use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=MAPSHELF_MANIFEST_HINT");

    let hint = env::var("MAPSHELF_MANIFEST_HINT").ok();

    if let Some(raw_hint) = hint {
        let candidate = PathBuf::from(raw_hint);
        let canonical = candidate.canonicalize().unwrap_or(candidate);

        println!("cargo:rustc-env=MAPSHELF_MANIFEST_HINT={}", canonical.display());
    }
}
