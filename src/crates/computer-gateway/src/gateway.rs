//! The gateway entry point.
//!
//! [`ComputerGateway`] owns the call client for one remote session and turns
//! each submitted [`ActionRequest`] into its daemon choreography.

use crate::action::{Action, ActionKind, ActionRequest};
use crate::async_utils::time::{Clock, Sleeper, SystemClock, TokioSleeper};
use crate::client::{endpoints, DaemonTransport, HttpTransport, RemoteCallClient};
use crate::config::{DisplayConfig, GatewayConfig, ValidateConfig};
use crate::error::{GatewayError, Result, ValidationError};
use crate::logging::timed;
use crate::pointer::PointerDispatcher;
use crate::result::{self, ToolResult};
use crate::scroll::ScrollChoreographer;
use crate::tool::ToolDefinition;
use crate::validation::validate;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Drives one remote desktop session.
///
/// Actions must be issued one at a time; the gateway does no locking of
/// its own.
pub struct ComputerGateway {
    config: GatewayConfig,
    client: RemoteCallClient,
    clock: Arc<dyn Clock>,
}

impl ComputerGateway {
    /// Build a gateway that talks HTTP and sleeps on the tokio timer.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::from_config(&config)?;

        Ok(Self::with_parts(
            config,
            Arc::new(transport),
            Arc::new(TokioSleeper),
            Arc::new(SystemClock::new()),
        ))
    }

    /// Build a gateway from explicit parts.
    ///
    /// The configuration is taken as-is; call [`ValidateConfig::validate`]
    /// first if it came from an untrusted source.
    pub fn with_parts(
        config: GatewayConfig,
        transport: Arc<dyn DaemonTransport>,
        sleeper: Arc<dyn Sleeper>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let client = RemoteCallClient::new(
            transport,
            config.retry.clone(),
            sleeper,
            config.request_timeout(),
        );

        Self {
            config,
            client,
            clock,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.config.display
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn client(&self) -> &RemoteCallClient {
        &self.client
    }

    pub fn tool_definition(&self) -> ToolDefinition {
        ToolDefinition::for_display(&self.config.display)
    }

    /// Execute one action.
    ///
    /// Invalid parameters are an `Err`; every failure after validation is
    /// reported through [`ToolResult::error`].
    pub async fn execute(
        &self,
        request: ActionRequest,
    ) -> std::result::Result<ToolResult, ValidationError> {
        match self.try_execute(request).await {
            Ok(result) => Ok(result),
            Err(GatewayError::Validation(e)) => Err(e),
            Err(e) => {
                tracing::warn!(code = e.error_code(), error = %e, "Action failed");
                Ok(ToolResult::from_error(&e))
            }
        }
    }

    /// Execute one action, surfacing operational failures as typed errors.
    pub async fn try_execute(&self, request: ActionRequest) -> Result<ToolResult> {
        let action = validate(&request)?;
        let kind = action.kind();
        let span = tracing::info_span!("action", request_id = %Uuid::new_v4(), kind = %kind);

        timed(kind.as_str(), self.clock.as_ref(), self.perform(action))
            .instrument(span)
            .await
    }

    async fn perform(&self, action: Action) -> Result<ToolResult> {
        let pointer = PointerDispatcher::new(&self.client, self.config.timing.settle_delay());

        match action {
            Action::Wait { duration } => {
                self.client.sleeper().sleep(duration.as_duration()).await;
                Ok(ToolResult::success(format!("waited {} seconds", duration)))
            }

            Action::Screenshot => {
                let response = self.client.get(endpoints::SCREENSHOT).await?;
                result::from_screenshot_response(&response)
            }

            Action::CursorPosition => {
                let response = pointer.forward(ActionKind::CursorPosition, None, None).await?;
                result::from_cursor_response(&response)
            }

            Action::Scroll { options, at } => {
                let response =
                    ScrollChoreographer::new(&self.client, &self.config.timing, &self.config.display)
                        .run(&options, at)
                        .await?;
                Ok(result::from_status_response(&response))
            }

            Action::Click {
                button,
                at,
                modifiers,
            } => {
                let response = pointer.click(button, at, modifiers.as_deref()).await?;
                Ok(result::from_status_response(&response))
            }

            Action::Key { text } => {
                let response = pointer.forward(ActionKind::Key, Some(&text), None).await?;
                Ok(result::from_status_response(&response))
            }

            Action::Type { text } => {
                let response = pointer.forward(ActionKind::Type, Some(&text), None).await?;
                Ok(result::from_status_response(&response))
            }

            Action::MouseMove { to } => {
                let response = pointer.forward(ActionKind::MouseMove, None, Some(to)).await?;
                Ok(result::from_status_response(&response))
            }

            Action::LeftClickDrag { to } => {
                let response = pointer
                    .forward(ActionKind::LeftClickDrag, None, Some(to))
                    .await?;
                Ok(result::from_status_response(&response))
            }
        }
    }
}

impl std::fmt::Debug for ComputerGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputerGateway")
            .field("config", &self.config)
            .field("client", &self.client)
            .finish()
    }
}
