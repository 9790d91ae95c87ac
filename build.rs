use std::env;

fn main() {
    if let Err(e) = try_main() {
        eprintln!("Error configuring osrm-bridge build: {e}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    // Version string exported by osrm_bridge_version()
    let version = env::var("CARGO_PKG_VERSION")?;
    println!("cargo:rustc-env=OSRM_BRIDGE_VERSION={version}");

    #[cfg(feature = "native")]
    build_native_shim()?;

    #[cfg(feature = "c-bindings")]
    generate_header()?;

    println!("cargo:rerun-if-changed=cpp/");
    println!("cargo:rerun-if-changed=src/ffi.rs");
    println!("cargo:rerun-if-changed=src/logging.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");

    Ok(())
}

/// Compile the C++ shim and link it against an installed libosrm.
///
/// Headers and libraries are looked up under `OSRM_INCLUDE_DIR` and
/// `OSRM_LIB_DIR` (default `/usr/local/include` and `/usr/local/lib`).
#[cfg(feature = "native")]
fn build_native_shim() -> Result<(), Box<dyn std::error::Error>> {
    use std::path::PathBuf;

    let include_dir =
        PathBuf::from(env::var("OSRM_INCLUDE_DIR").unwrap_or_else(|_| "/usr/local/include".into()));
    let lib_dir = env::var("OSRM_LIB_DIR").unwrap_or_else(|_| "/usr/local/lib".into());

    cc::Build::new()
        .cpp(true)
        .file("cpp/osrm_shim.cpp")
        .flag("-std=c++17")
        .flag_if_supported("-Wno-array-bounds")
        .flag_if_supported("-Wno-uninitialized")
        .include(&include_dir)
        .include(include_dir.join("osrm"))
        .compile("osrm_shim");

    println!("cargo:rustc-link-search=native={lib_dir}");
    for lib in [
        "osrm",
        "boost_thread",
        "boost_filesystem",
        "boost_iostreams",
        "tbb",
        "z",
        "bz2",
        "stdc++",
    ] {
        println!("cargo:rustc-link-lib=dylib={lib}");
    }
    println!("cargo:rerun-if-env-changed=OSRM_INCLUDE_DIR");
    println!("cargo:rerun-if-env-changed=OSRM_LIB_DIR");

    Ok(())
}

#[cfg(feature = "c-bindings")]
fn generate_header() -> Result<(), Box<dyn std::error::Error>> {
    use std::path::PathBuf;

    let crate_dir = env::var("CARGO_MANIFEST_DIR")?;
    let include_dir = PathBuf::from(&crate_dir).join("include");
    std::fs::create_dir_all(&include_dir)?;
    let out_path = include_dir.join("osrm_bridge.h");

    let config = cbindgen::Config::from_file(PathBuf::from(&crate_dir).join("cbindgen.toml"))?;

    cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_language(cbindgen::Language::C)
        .with_config(config)
        .generate()?
        .write_to_file(&out_path);

    println!("cargo:rerun-if-changed=cbindgen.toml");

    Ok(())
}
