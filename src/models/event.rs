use serde_json::Value;

pub const UNKNOWN_EVENT: &str = "Unknown Event";
pub const UNKNOWN_RESOURCE: &str = "Unknown Resource";
pub const NO_DETAILS: &str = "No additional information provided.";

/// The handful of fields pulled out of an inbound Tableau event for display.
///
/// Tableau payloads are not validated against a schema. Anything absent,
/// `null` or blank is replaced by a placeholder so the notification still goes out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSummary {
    pub event_type: String,
    pub resource_name: String,
    pub text: String,
}

impl EventSummary {
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            event_type: first_field(payload, &["event_type", "event"])
                .unwrap_or_else(|| UNKNOWN_EVENT.to_string()),
            resource_name: first_field(payload, &["resource_name"])
                .unwrap_or_else(|| UNKNOWN_RESOURCE.to_string()),
            text: first_field(payload, &["text"]).unwrap_or_else(|| NO_DETAILS.to_string()),
        }
    }

    /// One-line summary, e.g. `WorkbookCreated - Sales Dashboard`.
    pub fn headline(&self) -> String {
        format!("{} - {}", self.event_type, self.resource_name)
    }
}

fn first_field(payload: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match payload.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}
