/**
 * MODELS - Wire format of the computers status endpoint
 *
 * ROLE: Typed view of one poll of `GET /api/get_computers_status`.
 * The endpoint answers `{"computers": [...]}` with one record per computer;
 * display values are opaque text for the console, compared by equality only.
 *
 * KEYS: row and cell keys (`row-{id}`, `remaining-{id}`...) are derived here so
 * the reconciler, the renderer and the view agree on a single naming.
 */

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Stable computer identifier. The endpoint sends numbers today, strings are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ComputerId(String);

impl ComputerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComputerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ComputerId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ComputerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for ComputerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Unsigned(u64),
            Signed(i64),
            Text(String),
        }

        let id = match RawId::deserialize(deserializer)? {
            RawId::Unsigned(n) => n.to_string(),
            RawId::Signed(n) => n.to_string(),
            RawId::Text(s) => s.trim().to_string(),
        };
        if id.is_empty() {
            return Err(D::Error::custom("empty computer id"));
        }
        Ok(Self(id))
    }
}

/// Presentation tag sent alongside the status label (CSS class on the status cell).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(into = "String")]
pub enum StatusClass {
    Online,
    Busy,
    Offline,
    Maintenance,
    /// Tag outside the known set, rendered verbatim
    Other(String),
    #[default]
    None,
}

impl StatusClass {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "" => StatusClass::None,
            "status-online" => StatusClass::Online,
            "status-busy" => StatusClass::Busy,
            "status-offline" => StatusClass::Offline,
            "status-maintenance" => StatusClass::Maintenance,
            other => StatusClass::Other(other.to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            StatusClass::Online => "status-online",
            StatusClass::Busy => "status-busy",
            StatusClass::Offline => "status-offline",
            StatusClass::Maintenance => "status-maintenance",
            StatusClass::Other(tag) => tag,
            StatusClass::None => "",
        }
    }
}

impl From<StatusClass> for String {
    fn from(class: StatusClass) -> Self {
        class.as_tag().to_string()
    }
}

/// Displayable text columns of the computers table, in cell order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    DisplayName,
    Client,
    Session,
    SessionStart,
    SessionEnd,
    RemainingTime,
    SoftwareVersion,
}

impl Field {
    pub const COUNT: usize = 7;

    pub const ALL: [Field; Field::COUNT] = [
        Field::DisplayName,
        Field::Client,
        Field::Session,
        Field::SessionStart,
        Field::SessionEnd,
        Field::RemainingTime,
        Field::SoftwareVersion,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Prefix of the per-computer cell key
    pub fn key_prefix(self) -> &'static str {
        match self {
            Field::DisplayName => "name",
            Field::Client => "client",
            Field::Session => "session",
            Field::SessionStart => "start",
            Field::SessionEnd => "end",
            Field::RemainingTime => "remaining",
            Field::SoftwareVersion => "version",
        }
    }

    pub fn cell_key(self, id: &ComputerId) -> String {
        format!("{}-{}", self.key_prefix(), id)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_prefix())
    }
}

pub fn row_key(id: &ComputerId) -> String {
    format!("row-{id}")
}

pub fn status_cell_key(id: &ComputerId) -> String {
    format!("status-{id}")
}

/// One computer's instantaneous state as reported by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputerStatus {
    pub id: ComputerId,
    #[serde(rename = "name_to_display", default, deserialize_with = "display_text")]
    pub display_name: String,
    #[serde(default, deserialize_with = "display_text")]
    pub client: String,
    #[serde(default, deserialize_with = "display_text")]
    pub session: String,
    #[serde(rename = "start", default, deserialize_with = "display_text")]
    pub session_start: String,
    #[serde(rename = "end", default, deserialize_with = "display_text")]
    pub session_end: String,
    #[serde(rename = "remaining", default, deserialize_with = "display_text")]
    pub remaining_time: String,
    #[serde(rename = "version", default, deserialize_with = "display_text")]
    pub software_version: String,
    #[serde(default, deserialize_with = "display_text")]
    pub status: String,
    #[serde(default, deserialize_with = "status_class")]
    pub status_class: StatusClass,
}

impl ComputerStatus {
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::DisplayName => &self.display_name,
            Field::Client => &self.client,
            Field::Session => &self.session,
            Field::SessionStart => &self.session_start,
            Field::SessionEnd => &self.session_end,
            Field::RemainingTime => &self.remaining_time,
            Field::SoftwareVersion => &self.software_version,
        }
    }
}

// null / number / bool are all shown as text; objects and arrays are not display values
fn display_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected display text, got {other}"))),
    }
}

fn status_class<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StatusClass, D::Error> {
    display_text(deserializer).map(|tag| StatusClass::from_tag(&tag))
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    computers: Vec<ComputerStatus>,
}

/// Records returned by one poll, in endpoint order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    computers: Vec<ComputerStatus>,
}

impl StatusSnapshot {
    pub fn new(computers: Vec<ComputerStatus>) -> Self {
        Self { computers }
    }

    /// Parse an endpoint body. A body without a `computers` array is malformed.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let payload: StatusPayload = serde_json::from_slice(body)?;
        Ok(Self::new(payload.computers))
    }

    pub fn computers(&self) -> &[ComputerStatus] {
        &self.computers
    }

    pub fn len(&self) -> usize {
        self.computers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.computers.is_empty()
    }
}

impl FromIterator<ComputerStatus> for StatusSnapshot {
    fn from_iter<I: IntoIterator<Item = ComputerStatus>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint_payload() {
        let body = br#"{
            "computers": [
                {"id": 7, "name_to_display": "PC-07", "client": "ivan", "session": "Hourly",
                 "start": "12:00", "end": "14:00", "remaining": "10:00", "version": "1.4.2",
                 "status": "Active", "status_class": "status-online"},
                {"id": "8", "name_to_display": "PC-08", "status": "Free", "status_class": "status-offline"}
            ],
            "generated_at": "ignored"
        }"#;

        let snapshot = StatusSnapshot::from_json(body).unwrap();
        assert_eq!(snapshot.len(), 2);

        let first = &snapshot.computers()[0];
        assert_eq!(first.id, ComputerId::from(7));
        assert_eq!(first.field(Field::RemainingTime), "10:00");
        assert_eq!(first.status_class, StatusClass::Online);

        let second = &snapshot.computers()[1];
        assert_eq!(second.id.as_str(), "8");
        assert_eq!(second.client, "");
        assert_eq!(second.status_class, StatusClass::Offline);
    }

    #[test]
    fn test_display_values_are_normalized_to_text() {
        let body = br#"{"computers": [
            {"id": 1, "client": null, "remaining": 600, "version": true, "status_class": "vip-glow"}
        ]}"#;

        let snapshot = StatusSnapshot::from_json(body).unwrap();
        let pc = &snapshot.computers()[0];
        assert_eq!(pc.client, "");
        assert_eq!(pc.remaining_time, "600");
        assert_eq!(pc.software_version, "true");
        assert_eq!(pc.status_class, StatusClass::Other("vip-glow".into()));
        assert_eq!(pc.status_class.as_tag(), "vip-glow");
    }

    #[test]
    fn test_malformed_payloads_are_rejected() {
        assert!(StatusSnapshot::from_json(b"{}").is_err());
        assert!(StatusSnapshot::from_json(br#"{"computers": null}"#).is_err());
        assert!(StatusSnapshot::from_json(br#"{"computers": {"id": 1}}"#).is_err());
        assert!(StatusSnapshot::from_json(br#"{"computers": [{"name_to_display": "no id"}]}"#).is_err());
        assert!(StatusSnapshot::from_json(br#"{"computers": [{"id": ""}]}"#).is_err());
        assert!(StatusSnapshot::from_json(br#"{"computers": [{"id": 1, "client": {"x": 1}}]}"#).is_err());
        assert!(StatusSnapshot::from_json(b"<html>502</html>").is_err());
    }

    #[test]
    fn test_empty_snapshot_is_valid() {
        let snapshot = StatusSnapshot::from_json(br#"{"computers": []}"#).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_keys() {
        let id = ComputerId::from(12);
        assert_eq!(row_key(&id), "row-12");
        assert_eq!(status_cell_key(&id), "status-12");
        assert_eq!(Field::DisplayName.cell_key(&id), "name-12");
        assert_eq!(Field::SessionStart.cell_key(&id), "start-12");
        assert_eq!(Field::SoftwareVersion.cell_key(&id), "version-12");
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let pc = ComputerStatus {
            id: ComputerId::from(3),
            display_name: "PC-03".into(),
            client: String::new(),
            session: String::new(),
            session_start: String::new(),
            session_end: String::new(),
            remaining_time: "05:00".into(),
            software_version: String::new(),
            status: "Busy".into(),
            status_class: StatusClass::Busy,
        };
        let json = serde_json::to_value(&pc).unwrap();
        assert_eq!(json["id"], "3");
        assert_eq!(json["name_to_display"], "PC-03");
        assert_eq!(json["remaining"], "05:00");
        assert_eq!(json["status_class"], "status-busy");

        let back: ComputerStatus = serde_json::from_value(json).unwrap();
        assert_eq!(back, pc);
    }
}
