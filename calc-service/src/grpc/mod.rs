//! gRPC module for calc-service.

mod service;

pub use service::CalcServiceImpl;

/// Generated protobuf code.
pub mod proto {
    tonic::include_proto!("calc.v1");

    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("calc_descriptor");
}
