use embed_manifest::manifest::DpiAwareness;
use embed_manifest::{embed_manifest, new_manifest};
use std::env;

fn main() {
    if env::var_os("CARGO_CFG_WINDOWS").is_some() {
        let manifest = new_manifest("critiq").dpi_awareness(DpiAwareness::PerMonitorV2);
        embed_manifest(manifest).expect("unable to embed manifest file");
    }
    println!("cargo:rerun-if-changed=build.rs");
}
