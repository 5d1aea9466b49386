use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_root = PathBuf::from("../proto");

    println!("cargo:rerun-if-changed=../proto/calc/v1/");

    // Compile calc service protos (client-side)
    tonic_build::configure()
        .build_server(false) // No server code in service-core
        .build_client(true) // Build clients for calling calc-service
        .compile_protos(&["../proto/calc/v1/calc.proto"], &[&proto_root])?;

    Ok(())
}
