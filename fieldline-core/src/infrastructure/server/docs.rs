use super::dto::{
    ContextRequest, ErrorResponse, RefreshResponse, SendEmailRequest, SendResponse,
    SendSmsRequest, StatusResponse, ToolListResponse,
};
use super::routes;
use crate::application::aggregator::{
    BusinessContext, CallerContext, ChatMessage, FieldSource, Intent, SourceFlags,
};
use crate::application::client::{Communications, DisconnectReport, InitSummary, ToolOutcome};
use crate::domain::{ConnectionState, PeerId, PeerStatus, Provenance, ToolDescriptor};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::integrations::status_handler,
        routes::integrations::refresh_handler,
        routes::tools::list_handler,
        routes::tools::invoke_handler,
        routes::context::context_handler,
        routes::context::send_email_handler,
        routes::context::send_sms_handler
    ),
    components(
        schemas(
            StatusResponse,
            RefreshResponse,
            ToolListResponse,
            ContextRequest,
            SendEmailRequest,
            SendSmsRequest,
            SendResponse,
            ErrorResponse,
            InitSummary,
            DisconnectReport,
            ToolOutcome,
            ToolDescriptor,
            PeerId,
            PeerStatus,
            ConnectionState,
            Provenance,
            BusinessContext,
            CallerContext,
            ChatMessage,
            Communications,
            FieldSource,
            SourceFlags,
            Intent
        )
    ),
    tags(
        (name = "integrations", description = "Connection state of the business integrations"),
        (name = "tools", description = "Tool catalogs and invocation with mock fallback"),
        (name = "context", description = "Cross-system business snapshot"),
        (name = "actions", description = "Outbound email and SMS")
    )
)]
pub(super) struct ApiDoc;
