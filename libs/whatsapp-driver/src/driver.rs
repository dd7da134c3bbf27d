use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::answer;
use crate::config::WhatsAppConfig;
use crate::dispatch::Dispatcher;
use crate::error::DriverError;
use crate::inbound;
use crate::outbound;
use crate::transport::{ReqwestTransport, Transport, TransportResponse};
use crate::types::{Answer, IncomingMessage, OutgoingMessage, User};
use crate::webhook::WebhookRequest;

/// Narrow interface the host chat framework drives.
///
/// The host picks a driver per webhook with [`MessagingDriver::matches_request`],
/// reads [`MessagingDriver::messages`] to match conversation state, asks for the
/// structured answer only when evaluating a choice, and sends replies through
/// the compile/send pair.
#[async_trait]
pub trait MessagingDriver: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_configured(&self) -> bool;

    fn matches_request(&self, request: &WebhookRequest) -> bool;

    fn messages<'r>(&self, request: &'r WebhookRequest) -> &'r [IncomingMessage];

    fn user(&self, message: &IncomingMessage) -> User;

    fn conversation_answer(&self, message: &IncomingMessage) -> Answer;

    fn build_service_payload(
        &self,
        message: &OutgoingMessage,
        matching: &IncomingMessage,
        additional: Option<&Value>,
    ) -> Result<Value, DriverError>;

    async fn send_payload(&self, payload: &Value) -> Result<TransportResponse, DriverError>;

    async fn send_request(
        &self,
        endpoint: &str,
        parameters: &Value,
        matching: &IncomingMessage,
    ) -> Result<TransportResponse, DriverError>;
}

pub struct WhatsAppDriver<T = ReqwestTransport> {
    dispatcher: Dispatcher<T>,
}

impl WhatsAppDriver<ReqwestTransport> {
    pub fn from_config(config: WhatsAppConfig) -> Self {
        Self::new(Arc::new(config), ReqwestTransport::default())
    }
}

impl<T> WhatsAppDriver<T>
where
    T: Transport,
{
    pub const NAME: &'static str = "Whatsapp";

    pub fn new(config: Arc<WhatsAppConfig>, transport: T) -> Self {
        Self {
            dispatcher: Dispatcher::new(config, transport),
        }
    }

    pub fn config(&self) -> &WhatsAppConfig {
        self.dispatcher.config()
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    pub fn load_payload(&self, body: &[u8]) -> WebhookRequest {
        WebhookRequest::from_body(body)
    }

    /// Compiles `message` for the sender of `matching` and sends it.
    pub async fn reply(
        &self,
        message: &OutgoingMessage,
        matching: &IncomingMessage,
        additional: Option<&Value>,
    ) -> Result<TransportResponse, DriverError> {
        let payload = outbound::build_service_payload(message, matching, additional)?;
        self.dispatcher.send_payload(&payload).await
    }
}

#[async_trait]
impl<T> MessagingDriver for WhatsAppDriver<T>
where
    T: Transport,
{
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_configured(&self) -> bool {
        self.config().is_configured()
    }

    fn matches_request(&self, request: &WebhookRequest) -> bool {
        request.matches_request()
    }

    fn messages<'r>(&self, request: &'r WebhookRequest) -> &'r [IncomingMessage] {
        request.messages()
    }

    fn user(&self, message: &IncomingMessage) -> User {
        inbound::user(message)
    }

    fn conversation_answer(&self, message: &IncomingMessage) -> Answer {
        answer::resolve(message)
    }

    fn build_service_payload(
        &self,
        message: &OutgoingMessage,
        matching: &IncomingMessage,
        additional: Option<&Value>,
    ) -> Result<Value, DriverError> {
        outbound::build_service_payload(message, matching, additional)
    }

    async fn send_payload(&self, payload: &Value) -> Result<TransportResponse, DriverError> {
        self.dispatcher.send_payload(payload).await
    }

    async fn send_request(
        &self,
        endpoint: &str,
        parameters: &Value,
        matching: &IncomingMessage,
    ) -> Result<TransportResponse, DriverError> {
        self.dispatcher
            .send_request(endpoint, parameters, matching)
            .await
    }
}
