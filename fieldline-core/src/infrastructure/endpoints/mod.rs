//! Concrete tool endpoints, one per business integration.

pub mod accounting;
pub mod email;
pub mod messaging;
pub mod period;
pub mod scheduling;

pub use accounting::AccountingEndpoint;
pub use email::EmailEndpoint;
pub use messaging::MessagingEndpoint;
pub use scheduling::SchedulingEndpoint;

use crate::application::endpoint::ToolEndpoint;
use crate::domain::PeerId;
use serde_json::Value;
use std::sync::Arc;

/// Builds the endpoint for `peer` with credentials from the environment.
pub fn from_env(peer: PeerId) -> Arc<dyn ToolEndpoint> {
    match peer {
        PeerId::Scheduling => Arc::new(SchedulingEndpoint::from_env()),
        PeerId::Accounting => Arc::new(AccountingEndpoint::from_env()),
        PeerId::Email => Arc::new(EmailEndpoint::from_env()),
        PeerId::Messaging => Arc::new(MessagingEndpoint::from_env()),
    }
}

/// The substitute payload an endpoint would serve for `tool`, tagged mock.
pub fn mock_payload(peer: PeerId, tool: &str, arguments: &Value, reason: &str) -> Value {
    match peer {
        PeerId::Scheduling => scheduling::mock::payload(tool, arguments),
        PeerId::Accounting => accounting::mock::payload(tool, arguments, reason),
        PeerId::Email => email::mock::payload(tool, arguments, reason),
        PeerId::Messaging => messaging::mock::payload(tool, arguments, reason, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Provenance;
    use serde_json::json;

    #[test]
    fn every_catalog_tool_has_a_tagged_mock() {
        for peer in PeerId::ALL {
            let endpoint = from_env(peer);
            for tool in endpoint.tools() {
                let payload = mock_payload(peer, &tool.name, &json!({}), "offline");
                assert_eq!(
                    Provenance::detect(&payload),
                    Provenance::Mock,
                    "{peer}/{}",
                    tool.name
                );
            }
        }
    }
}
