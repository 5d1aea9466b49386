//! Calc Service - increments a signed 64-bit integer over gRPC.

pub mod config;
pub mod grpc;
pub mod services;
pub mod startup;
