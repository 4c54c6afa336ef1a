pub mod aggregator;
pub mod cancel;
pub mod client;
pub mod endpoint;
pub mod fallback;
pub mod transport;
