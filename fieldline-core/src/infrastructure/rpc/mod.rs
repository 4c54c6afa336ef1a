//! JSON-RPC 2.0 framing shared by the endpoint server and the transports.

pub mod server;
pub mod types;

pub use server::RpcDispatcher;
pub use types::{RpcError, RpcErrorData, RpcRequest, RpcResponse};
