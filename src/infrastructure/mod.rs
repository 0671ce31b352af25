pub mod persistence;
pub mod rpc;
