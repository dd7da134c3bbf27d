//! Compiles outgoing messages into Cloud API `/messages` request bodies.

use serde_json::{Map, Value, json};

use crate::error::DriverError;
use crate::json::merge_recursive;
use crate::telemetry;
use crate::types::{
    Action, ActionKind, AttachmentKind, IncomingMessage, OutgoingMessage, Question, Template,
};
use crate::webhook::MESSAGING_PRODUCT;

/// Reply buttons the Cloud API accepts on a single interactive message.
pub const MAX_BUTTONS: usize = 3;

/// Builds the request body for `message`, addressed to the reply target of
/// `matching`.
///
/// `additional` is merged into the base `{messaging_product, to}` object before
/// the type-specific fields are written, so those fields always win.
pub fn build_service_payload(
    message: &OutgoingMessage,
    matching: &IncomingMessage,
    additional: Option<&Value>,
) -> Result<Value, DriverError> {
    let recipient = matching.reply_target();
    let span = telemetry::compile_span(recipient, message.kind());
    let _guard = span.enter();

    let mut params = Map::new();
    params.insert("messaging_product".into(), json!(MESSAGING_PRODUCT));
    params.insert("to".into(), json!(recipient));
    if let Some(Value::Object(extra)) = additional {
        merge_recursive(&mut params, extra);
    }

    match message {
        OutgoingMessage::Question(question) => compile_question(&mut params, question)?,
        OutgoingMessage::Template(Template::Button(template)) => {
            params.insert("type".into(), json!("interactive"));
            params.insert(
                "interactive".into(),
                json!({
                    "type": "button",
                    "body": { "text": template.text },
                    "action": { "buttons": template.buttons },
                }),
            );
        }
        OutgoingMessage::Template(template) => {
            tracing::debug!(kind = template.kind(), "template kind sent as plain text");
            set_text(&mut params, template.text());
        }
        OutgoingMessage::Attachment { attachment, .. }
            if attachment.kind == AttachmentKind::Image =>
        {
            params.insert("type".into(), json!("image"));
            params.insert("image".into(), json!({ "link": attachment.url }));
        }
        OutgoingMessage::Attachment { text, .. } | OutgoingMessage::Text(text) => {
            set_text(&mut params, text);
        }
    }

    if let Some(kind) = params.get("type").and_then(Value::as_str) {
        telemetry::record_compiled(kind);
    }
    Ok(Value::Object(params))
}

fn set_text(params: &mut Map<String, Value>, text: &str) {
    params.insert("text".into(), json!({ "body": text }));
    params.insert("type".into(), json!("text"));
}

// A select menu in first position replaces any button payload built before it.
fn compile_question(params: &mut Map<String, Value>, question: &Question) -> Result<(), DriverError> {
    set_text(params, &question.text);

    let buttons = actions_to_buttons(&question.actions);
    if buttons.len() > MAX_BUTTONS {
        return Err(DriverError::TooManyButtons(buttons.len()));
    }
    if !buttons.is_empty() {
        params.insert("type".into(), json!("interactive"));
        params.insert(
            "interactive".into(),
            json!({
                "type": "button",
                "body": { "text": question.text },
                "action": { "buttons": buttons },
            }),
        );
    }

    if let Some(action) = actions_to_interactive_list(&question.actions) {
        params.insert("type".into(), json!("interactive"));
        params.insert(
            "interactive".into(),
            json!({
                "type": "list",
                "body": { "text": question.text },
                "action": action,
            }),
        );
    }

    Ok(())
}

fn actions_to_buttons(actions: &[Action]) -> Vec<Value> {
    actions
        .iter()
        .filter(|action| action.kind == ActionKind::Button)
        .map(|action| {
            json!({
                "type": "reply",
                "reply": { "id": action.value, "title": action.text },
            })
        })
        .collect()
}

fn actions_to_interactive_list(actions: &[Action]) -> Option<Value> {
    let action = actions.first().filter(|action| action.kind == ActionKind::Select)?;
    let rows: Vec<Value> = action
        .options
        .iter()
        .map(|option| json!({ "id": option.value, "title": option.text }))
        .collect();
    Some(json!({
        "sections": [{ "title": action.text, "rows": rows }],
        "button": action.text,
    }))
}
