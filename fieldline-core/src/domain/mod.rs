pub mod types;

pub use types::{
    ConnectionState, ContentBlock, IntegrationStatus, ParseFailure, PeerId, PeerStatus,
    Provenance, ToolDescriptor, ToolResult, UnknownPeer,
};
