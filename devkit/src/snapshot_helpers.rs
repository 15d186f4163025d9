/*!
Builders for status snapshots

Produce records and `{"computers": [...]}` payloads shaped like the rental
backend's answer (numeric ids, `name_to_display`, `remaining`...).
*/

use cafedesk_status::{ComputerId, ComputerStatus, StatusClass, StatusSnapshot};
use serde_json::Value;

/// Free computer with a default name, ready to be customized
pub fn computer(id: u64) -> ComputerBuilder {
    ComputerBuilder::new(id)
}

#[derive(Debug, Clone)]
pub struct ComputerBuilder {
    record: ComputerStatus,
}

impl ComputerBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            record: ComputerStatus {
                id: ComputerId::from(id),
                display_name: format!("PC-{id:02}"),
                client: String::new(),
                session: String::new(),
                session_start: String::new(),
                session_end: String::new(),
                remaining_time: String::new(),
                software_version: "1.0.0".into(),
                status: "Free".into(),
                status_class: StatusClass::Offline,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.record.display_name = name.into();
        self
    }

    pub fn client(mut self, client: &str) -> Self {
        self.record.client = client.into();
        self
    }

    /// Running session: tariff name, start and end times
    pub fn session(mut self, session: &str, start: &str, end: &str) -> Self {
        self.record.session = session.into();
        self.record.session_start = start.into();
        self.record.session_end = end.into();
        self
    }

    pub fn remaining(mut self, remaining: &str) -> Self {
        self.record.remaining_time = remaining.into();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.record.software_version = version.into();
        self
    }

    pub fn status(mut self, label: &str, class: StatusClass) -> Self {
        self.record.status = label.into();
        self.record.status_class = class;
        self
    }

    /// Busy computer with a client in session
    pub fn active(self, client: &str, remaining: &str) -> Self {
        self.client(client)
            .session("Hourly", "12:00", "14:00")
            .remaining(remaining)
            .status("Active", StatusClass::Online)
    }

    pub fn build(self) -> ComputerStatus {
        self.record
    }
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    computers: Vec<ComputerStatus>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, computer: ComputerBuilder) -> Self {
        self.computers.push(computer.build());
        self
    }

    pub fn build(&self) -> StatusSnapshot {
        StatusSnapshot::new(self.computers.clone())
    }

    /// Endpoint payload; numeric ids are sent as JSON numbers like the backend does
    pub fn to_json(&self) -> Value {
        let computers: Vec<Value> = self
            .computers
            .iter()
            .map(|record| {
                let mut json = serde_json::to_value(record).unwrap_or(Value::Null);
                if let Ok(n) = record.id.as_str().parse::<u64>() {
                    json["id"] = Value::from(n);
                }
                json
            })
            .collect();
        serde_json::json!({ "computers": computers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_matches_endpoint_shape() {
        let snapshot = SnapshotBuilder::new()
            .with(computer(1).active("ivan", "10:00"))
            .with(computer(2));

        let json = snapshot.to_json();
        assert_eq!(json["computers"][0]["id"], 1);
        assert_eq!(json["computers"][0]["name_to_display"], "PC-01");
        assert_eq!(json["computers"][0]["remaining"], "10:00");
        assert_eq!(json["computers"][0]["status_class"], "status-online");
        assert_eq!(json["computers"][1]["status"], "Free");

        let body = serde_json::to_vec(&json).unwrap();
        let parsed = StatusSnapshot::from_json(&body).unwrap();
        assert_eq!(parsed, snapshot.build());
    }
}
