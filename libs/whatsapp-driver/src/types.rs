use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Inbound message normalised from a webhook event.
///
/// `payload` keeps the webhook `value` object the message was extracted from so
/// that later stages (answer resolution, user lookup) can reach the raw fields.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IncomingMessage {
    text: String,
    sender: String,
    recipient: String,
    payload: Value,
}

impl IncomingMessage {
    pub fn new(
        text: impl Into<String>,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            text: text.into(),
            sender: sender.into(),
            recipient: recipient.into(),
            payload,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Address replies go to: the recipient, or the sender when no recipient is set.
    pub fn reply_target(&self) -> &str {
        if self.recipient.is_empty() {
            &self.sender
        } else {
            &self.recipient
        }
    }
}

/// Conversation answer derived from an [`IncomingMessage`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Answer {
    text: String,
    value: Option<String>,
    interactive_reply: bool,
    message: IncomingMessage,
}

impl Answer {
    pub fn new(message: IncomingMessage) -> Self {
        Self {
            text: message.text().to_string(),
            value: None,
            interactive_reply: false,
            message,
        }
    }

    pub(crate) fn with_reply(mut self, value: Option<String>) -> Self {
        self.value = value;
        self.interactive_reply = true;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Identifier of the chosen button or list row, if the user picked one.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_interactive_reply(&self) -> bool {
        self.interactive_reply
    }

    pub fn message(&self) -> &IncomingMessage {
        &self.message
    }
}

/// Sender profile taken from the webhook `contacts` list.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: String,
    pub info: Value,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Button,
    Select,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SelectOption {
    pub text: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}

/// A question action: a reply button or a select menu.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub text: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

impl Action {
    pub fn button(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Button,
            text: text.into(),
            value: value.into(),
            options: Vec::new(),
        }
    }

    pub fn select(text: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self {
            kind: ActionKind::Select,
            text: text.into(),
            value: String::new(),
            options,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Question {
    pub text: String,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            actions: Vec::new(),
        }
    }

    pub fn add_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn add_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }
}

/// Interactive button message whose buttons are already in provider shape.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ButtonTemplate {
    pub text: String,
    pub buttons: Vec<Value>,
}

impl ButtonTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn add_button(mut self, button: Value) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn add_reply(self, id: impl Into<String>, title: impl Into<String>) -> Self {
        let (id, title) = (id.into(), title.into());
        self.add_button(json!({
            "type": "reply",
            "reply": { "id": id, "title": title }
        }))
    }
}

/// Provider templates. Only [`Template::Button`] has a dedicated wire shape; the
/// other kinds are sent as their text.
#[derive(Clone, Debug, PartialEq)]
pub enum Template {
    Button(ButtonTemplate),
    Generic(String),
    List(String),
    Receipt(String),
    Media(String),
    OpenGraph(String),
}

impl Template {
    pub fn kind(&self) -> &'static str {
        match self {
            Template::Button(_) => "button",
            Template::Generic(_) => "generic",
            Template::List(_) => "list",
            Template::Receipt(_) => "receipt",
            Template::Media(_) => "media",
            Template::OpenGraph(_) => "open_graph",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Template::Button(template) => &template.text,
            Template::Generic(text)
            | Template::List(text)
            | Template::Receipt(text)
            | Template::Media(text)
            | Template::OpenGraph(text) => text,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttachmentKind {
    Image,
    Video,
    Audio,
    File,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub url: String,
}

impl Attachment {
    pub fn new(kind: AttachmentKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::new(AttachmentKind::Image, url)
    }
}

/// Everything the driver knows how to send.
#[derive(Clone, Debug, PartialEq)]
pub enum OutgoingMessage {
    Text(String),
    Question(Question),
    Template(Template),
    Attachment {
        text: String,
        attachment: Attachment,
    },
}

impl OutgoingMessage {
    pub fn text(&self) -> &str {
        match self {
            OutgoingMessage::Text(text) => text,
            OutgoingMessage::Question(question) => &question.text,
            OutgoingMessage::Template(template) => template.text(),
            OutgoingMessage::Attachment { text, .. } => text,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OutgoingMessage::Text(_) => "text",
            OutgoingMessage::Question(_) => "question",
            OutgoingMessage::Template(_) => "template",
            OutgoingMessage::Attachment { .. } => "attachment",
        }
    }
}

impl From<&str> for OutgoingMessage {
    fn from(text: &str) -> Self {
        OutgoingMessage::Text(text.to_string())
    }
}

impl From<String> for OutgoingMessage {
    fn from(text: String) -> Self {
        OutgoingMessage::Text(text)
    }
}

impl From<Question> for OutgoingMessage {
    fn from(question: Question) -> Self {
        OutgoingMessage::Question(question)
    }
}

impl From<Template> for OutgoingMessage {
    fn from(template: Template) -> Self {
        OutgoingMessage::Template(template)
    }
}

impl From<ButtonTemplate> for OutgoingMessage {
    fn from(template: ButtonTemplate) -> Self {
        OutgoingMessage::Template(Template::Button(template))
    }
}
