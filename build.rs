use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let protoc = match env::var_os("PROTOC") {
        Some(path) => PathBuf::from(path),
        None => protoc_bin_vendored::protoc_bin_path()?,
    };
    // prost-build 0.12 locates protoc via the PROTOC environment variable.
    // SAFETY: build scripts are single-threaded at this point.
    unsafe { env::set_var("PROTOC", &protoc) };
    let prost_config = prost_build::Config::new();

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    tonic_build::configure()
        .file_descriptor_set_path(out_dir.join("user_service_descriptor.bin"))
        .compile_with_config(prost_config, &["proto/user_service.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/user_service.proto");
    Ok(())
}
