pub mod endpoints;
pub mod rpc;
#[cfg(feature = "rest")]
pub mod server;
pub mod upstream;
