use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn main() {
    // The build time changes whenever the generator itself is rebuilt.
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let pinned = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|epoch| epoch.trim().parse::<i64>().ok());
    let secs = pinned.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as i64)
            .unwrap_or(0)
    });
    println!("cargo:rustc-env=SQLGEN_BUILD_TIME={secs}");
}
