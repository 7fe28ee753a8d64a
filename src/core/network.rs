use crate::game::item::EntityId;
use log::{debug, warn};
use serde::Serialize;
use std::io::Write;

/// Payload of one pickup decision, sent once and never retried.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PickupRequest {
    pub targets: Vec<EntityId>,
    pub automatic: bool,
}

/// Outgoing side of the pickup protocol. The server decides what actually
/// gets picked up; the core only names the entities.
pub trait PickupSink {
    fn send(&mut self, request: PickupRequest);
}

/// Wraps `targets` into a request and hands it to `sink`. Returns false and
/// sends nothing when there is nothing to pick up.
pub fn send_pickup(sink: &mut dyn PickupSink, targets: Vec<EntityId>, automatic: bool) -> bool {
    if targets.is_empty() {
        return false;
    }
    debug!(
        "Pickup request: {} target(s), automatic={automatic}",
        targets.len()
    );
    sink.send(PickupRequest { targets, automatic });
    true
}

/// Keeps every request in memory, for tests and headless hosts.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub requests: Vec<PickupRequest>,
}

impl PickupSink for RecordingSink {
    fn send(&mut self, request: PickupRequest) {
        self.requests.push(request);
    }
}

/// Writes each request as one JSON object per line.
pub struct JsonLineSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLineSink<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PickupSink for JsonLineSink<W> {
    fn send(&mut self, request: PickupRequest) {
        let result = serde_json::to_writer(&mut self.out, &request)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            warn!("Failed to write pickup request: {e}");
        }
    }
}
