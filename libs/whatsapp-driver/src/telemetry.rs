use metrics::counter;
use tracing::Span;

const INBOUND_COUNTER: &str = "whatsapp_inbound_messages_total";
const COMPILED_COUNTER: &str = "whatsapp_payloads_compiled_total";
const DISPATCH_COUNTER: &str = "whatsapp_dispatch_total";
const DISPATCH_ERRORS: &str = "whatsapp_dispatch_errors_total";

pub fn record_inbound(event_type: &str) {
    counter!(INBOUND_COUNTER, "type" => event_type.to_string()).increment(1);
}

pub fn record_compiled(payload_type: &str) {
    counter!(COMPILED_COUNTER, "type" => payload_type.to_string()).increment(1);
}

pub fn record_dispatch(status: u16) {
    counter!(DISPATCH_COUNTER, "status" => status.to_string()).increment(1);
}

pub fn record_dispatch_error(kind: &'static str) {
    counter!(DISPATCH_ERRORS, "kind" => kind).increment(1);
}

pub fn compile_span(recipient: &str, kind: &str) -> Span {
    tracing::debug_span!("whatsapp.compile", recipient = %recipient, kind = %kind)
}

pub fn dispatch_span(url: &str, strict: bool) -> Span {
    tracing::info_span!("whatsapp.dispatch", url = %url, strict)
}
