//! WhatsApp Cloud API driver for the Greentic messaging runtime.
//!
//! Inbound, a webhook body is normalised into a [`WebhookRequest`] whose single
//! event is classified into an [`IncomingMessage`]; the structured [`Answer`]
//! (button or list reply ids) is resolved on demand. Outbound, an
//! [`OutgoingMessage`] is compiled into the `/messages` request body and handed
//! to the [`Dispatcher`], which either passes failed responses through or turns
//! them into a diagnosable [`ConnectionError`].
//!
//! ```
//! use gsm_whatsapp_driver::{Action, IncomingMessage, Question, build_service_payload};
//! use serde_json::json;
//!
//! let matching = IncomingMessage::new("hi", "1555", "1555", json!({}));
//! let question = Question::new("Continue?").add_action(Action::button("Yes", "yes"));
//! let payload = build_service_payload(&question.into(), &matching, None).unwrap();
//! assert_eq!(payload["type"], "interactive");
//! assert_eq!(payload["interactive"]["action"]["buttons"][0]["reply"]["id"], "yes");
//! ```

pub mod answer;
pub mod config;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod inbound;
pub mod json;
pub mod outbound;
pub mod transport;
pub mod types;
pub mod webhook;

mod telemetry;

pub use config::WhatsAppConfig;
pub use dispatch::Dispatcher;
pub use driver::{MessagingDriver, WhatsAppDriver};
pub use error::{ConnectionError, DriverError};
pub use outbound::build_service_payload;
pub use transport::{
    ReqwestTransport, Transport, TransportError, TransportRequest, TransportResponse,
};
pub use types::{
    Action, ActionKind, Answer, Attachment, AttachmentKind, ButtonTemplate, IncomingMessage,
    OutgoingMessage, Question, SelectOption, Template, User,
};
pub use webhook::WebhookRequest;
