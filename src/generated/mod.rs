//! Vendored protobuf/tonic output for the gNMI service definition.
//!
//! Regenerate with `tonic-build` against the upstream `gnmi.proto` and
//! `gnmi_ext.proto` when bumping the protocol revision; the files are checked
//! in so that building the crate does not require `protoc`.

pub mod gnmi;
pub mod gnmi_ext;
