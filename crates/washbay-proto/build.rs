//! Build script for washbay-proto
//!
//! Compiles protobuf definitions using tonic-build.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_root = "../../proto";

    let protos = [
        "washbay/v1/common.proto",
        "washbay/v1/health.proto",
        "washbay/v1/user.proto",
        "washbay/v1/vendor.proto",
        "washbay/v1/booking.proto",
        "washbay/v1/wallet.proto",
    ];

    let proto_paths: Vec<_> = protos
        .iter()
        .map(|p| format!("{}/{}", proto_root, p))
        .collect();

    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&proto_paths, &[proto_root.to_string()])?;

    Ok(())
}
