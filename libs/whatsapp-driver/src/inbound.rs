use serde_json::Value;
use tracing::debug;

use crate::json::Node;
use crate::telemetry;
use crate::types::{IncomingMessage, User};

/// Maps a webhook event to a normalised message.
///
/// Returns `None` for event types the driver does not understand (status
/// callbacks, reactions, ...). Known types never fail: absent fields become
/// empty text so the conversation layer still sees the message.
pub fn classify(event: &Value, payload: &Value) -> Option<IncomingMessage> {
    let event = Node::new(event);
    let event_type = event.get("type").as_str().unwrap_or_default();

    let text = match event_type {
        "text" => event.path(&["text", "body"]).text_or_empty(),
        "image" => event.path(&["image", "caption"]).text_or_empty(),
        "document" => event.path(&["document", "caption"]).text_or_empty(),
        "location" => event.path(&["location", "name"]).text_or_empty(),
        "button" | "interactive" => interactive_text(event),
        _ => {
            debug!(event_type, "ignoring unsupported whatsapp event");
            return None;
        }
    };

    debug!(event_type, "classified whatsapp event");
    telemetry::record_inbound(event_type);

    let from = event.get("from").text_or_empty();
    Some(IncomingMessage::new(text, from.clone(), from, payload.clone()))
}

fn interactive_text(event: Node<'_>) -> String {
    let interactive = event.get("interactive");
    let button_reply = interactive.get("button_reply");
    if button_reply.is_present() {
        return button_reply.get("title").text_or_empty();
    }
    let list_reply = interactive.get("list_reply");
    if list_reply.is_present() {
        return list_reply.get("title").text_or_empty();
    }
    event.path(&["button", "text"]).text_or_empty()
}

/// Builds the sender profile from the first entry of the payload's `contacts`.
pub fn user(message: &IncomingMessage) -> User {
    let contact = Node::new(message.payload()).get("contacts").at(0);
    let wa_id = contact.get("wa_id").text_or_empty();
    User {
        id: wa_id.clone(),
        first_name: contact.path(&["profile", "name"]).text_or_empty(),
        last_name: None,
        username: wa_id,
        info: contact.value().clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify_event(event: Value) -> Option<IncomingMessage> {
        let payload = json!({ "messaging_product": "whatsapp", "messages": [event.clone()] });
        classify(&event, &payload)
    }

    #[test]
    fn text_event_uses_body_and_sender() {
        let msg = classify_event(json!({ "type": "text", "from": "1555", "text": { "body": "hi" } }))
            .expect("message");
        assert_eq!(msg.text(), "hi");
        assert_eq!(msg.sender(), "1555");
        assert_eq!(msg.recipient(), "1555");
        assert_eq!(msg.payload()["messaging_product"], "whatsapp");
    }

    #[test]
    fn media_captions_default_to_empty() {
        let image = classify_event(json!({ "type": "image", "from": "1", "image": { "id": "m1" } }))
            .expect("image");
        assert_eq!(image.text(), "");
        let image = classify_event(json!({
            "type": "image", "from": "1", "image": { "caption": "look" }
        }))
        .expect("image");
        assert_eq!(image.text(), "look");
        let doc = classify_event(json!({ "type": "document", "from": "1" })).expect("document");
        assert_eq!(doc.text(), "");
        let doc = classify_event(json!({
            "type": "document", "from": "1", "document": { "caption": "invoice.pdf" }
        }))
        .expect("document");
        assert_eq!(doc.text(), "invoice.pdf");
    }

    #[test]
    fn location_uses_name() {
        let msg = classify_event(json!({
            "type": "location",
            "from": "1",
            "location": { "latitude": 1.0, "longitude": 2.0, "name": "Office" }
        }))
        .expect("location");
        assert_eq!(msg.text(), "Office");
        let unnamed = classify_event(json!({ "type": "location", "from": "1", "location": {} }))
            .expect("location");
        assert_eq!(unnamed.text(), "");
    }

    #[test]
    fn interactive_replies_use_title() {
        let button = classify_event(json!({
            "type": "interactive",
            "from": "1",
            "interactive": { "type": "button_reply", "button_reply": { "id": "yes", "title": "Yes" } }
        }))
        .expect("button reply");
        assert_eq!(button.text(), "Yes");

        let list = classify_event(json!({
            "type": "interactive",
            "from": "1",
            "interactive": { "type": "list_reply", "list_reply": { "id": "a", "title": "Option A" } }
        }))
        .expect("list reply");
        assert_eq!(list.text(), "Option A");
    }

    #[test]
    fn reply_title_precedence() {
        let mut event = json!({
            "type": "interactive",
            "from": "1",
            "interactive": {
                "button_reply": { "id": "yes", "title": "From button" },
                "list_reply": { "id": "a", "title": "From list" }
            },
            "button": { "text": "From template" }
        });
        assert_eq!(classify_event(event.clone()).expect("all").text(), "From button");

        event["interactive"]
            .as_object_mut()
            .expect("interactive")
            .remove("button_reply");
        assert_eq!(classify_event(event.clone()).expect("list").text(), "From list");

        event["interactive"]
            .as_object_mut()
            .expect("interactive")
            .remove("list_reply");
        assert_eq!(classify_event(event.clone()).expect("template").text(), "From template");

        event["type"] = json!("button");
        assert_eq!(classify_event(event).expect("button type").text(), "From template");
    }

    #[test]
    fn template_button_uses_button_text() {
        let msg = classify_event(json!({
            "type": "button",
            "from": "1",
            "button": { "text": "Stop promotions", "payload": "stop" }
        }))
        .expect("button");
        assert_eq!(msg.text(), "Stop promotions");

        let empty = classify_event(json!({ "type": "interactive", "from": "1" })).expect("interactive");
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn unknown_types_yield_nothing() {
        assert!(classify_event(json!({ "type": "reaction", "from": "1" })).is_none());
        assert!(classify(&json!({}), &json!({})).is_none());
    }

    #[test]
    fn user_reads_first_contact() {
        let payload = json!({
            "contacts": [{ "wa_id": "1555", "profile": { "name": "Ada" } }],
            "messages": []
        });
        let msg = IncomingMessage::new("hi", "1555", "1555", payload);
        let user = user(&msg);
        assert_eq!(user.id, "1555");
        assert_eq!(user.username, "1555");
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.last_name, None);
        assert_eq!(user.info["profile"]["name"], "Ada");
    }

    #[test]
    fn user_without_contacts_is_empty() {
        let msg = IncomingMessage::new("hi", "1555", "1555", json!({}));
        let user = user(&msg);
        assert_eq!(user.id, "");
        assert_eq!(user.first_name, "");
        assert!(user.info.is_null());
    }
}
