use crate::json::Node;
use crate::types::{Answer, IncomingMessage};

/// Resolves the conversation answer for a message.
///
/// The answer text is always the message text. When the first message in the
/// payload is an interactive button or list reply, the reply id becomes the
/// answer value and the answer is flagged as an interactive reply.
pub fn resolve(message: &IncomingMessage) -> Answer {
    let answer = Answer::new(message.clone());
    let first = Node::new(message.payload()).get("messages").at(0);
    if first.get("type").as_str() != Some("interactive") {
        return answer;
    }

    let interactive = first.get("interactive");
    match interactive.get("type").as_str() {
        Some(reply @ ("button_reply" | "list_reply")) => {
            answer.with_reply(interactive.path(&[reply, "id"]).text())
        }
        _ => answer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn message_with(first: Value) -> IncomingMessage {
        IncomingMessage::new("Yes", "1555", "1555", json!({ "messages": [first] }))
    }

    #[test]
    fn plain_text_has_no_value() {
        let msg = message_with(json!({ "type": "text", "text": { "body": "Yes" } }));
        let answer = resolve(&msg);
        assert_eq!(answer.text(), "Yes");
        assert_eq!(answer.value(), None);
        assert!(!answer.is_interactive_reply());
        assert_eq!(answer.message(), &msg);
    }

    #[test]
    fn button_reply_sets_value() {
        let msg = message_with(json!({
            "type": "interactive",
            "interactive": { "type": "button_reply", "button_reply": { "id": "confirm", "title": "Yes" } }
        }));
        let answer = resolve(&msg);
        assert_eq!(answer.text(), "Yes");
        assert_eq!(answer.value(), Some("confirm"));
        assert!(answer.is_interactive_reply());
    }

    #[test]
    fn list_reply_sets_value() {
        let msg = message_with(json!({
            "type": "interactive",
            "interactive": { "type": "list_reply", "list_reply": { "id": "row-2", "title": "B" } }
        }));
        let answer = resolve(&msg);
        assert_eq!(answer.value(), Some("row-2"));
        assert!(answer.is_interactive_reply());
    }

    #[test]
    fn other_interactive_subtypes_are_ignored() {
        let msg = message_with(json!({
            "type": "interactive",
            "interactive": { "type": "nfm_reply", "nfm_reply": { "response_json": "{}" } }
        }));
        let answer = resolve(&msg);
        assert_eq!(answer.value(), None);
        assert!(!answer.is_interactive_reply());
    }

    #[test]
    fn empty_payload_is_plain_answer() {
        let msg = IncomingMessage::new("hello", "1", "1", json!({}));
        let answer = resolve(&msg);
        assert_eq!(answer.text(), "hello");
        assert!(!answer.is_interactive_reply());
    }
}
