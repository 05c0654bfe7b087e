//! Outbound change events.
//!
//! The engine announces successful mutations through an [`EventPublisher`].
//! Consumers (client notification, audit feeds) subscribe outside the core;
//! a failed publish is logged by the engine and never fails the operation.

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::models::{PunchRecord, RawAttendanceRecord, WorkDayId};

/// Default capacity of a [`BroadcastPublisher`] channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// A change announced by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "topic", content = "payload")]
pub enum AttendanceEvent {
    /// A decoded punch was classified and stored.
    #[serde(rename = "CREATE_ATTENDANCELOG")]
    PunchRecorded(PunchRecord),

    /// Raw attendance was generated for a work day.
    #[serde(rename = "CREATE_WORKDAY")]
    WorkDayGenerated {
        /// The generated work day.
        work_day_id: WorkDayId,
        /// Number of records written.
        records: usize,
    },

    /// A raw attendance record was edited.
    #[serde(rename = "UPDATE_RAWATTENDANCE")]
    RawAttendanceUpdated(RawAttendanceRecord),
}

impl AttendanceEvent {
    /// Returns the stable topic name of the event.
    ///
    /// ```
    /// use attendance_engine::events::AttendanceEvent;
    ///
    /// let event = AttendanceEvent::WorkDayGenerated { work_day_id: 7, records: 3 };
    /// assert_eq!(event.topic(), "CREATE_WORKDAY");
    /// ```
    pub fn topic(&self) -> &'static str {
        match self {
            AttendanceEvent::PunchRecorded(_) => "CREATE_ATTENDANCELOG",
            AttendanceEvent::WorkDayGenerated { .. } => "CREATE_WORKDAY",
            AttendanceEvent::RawAttendanceUpdated(_) => "UPDATE_RAWATTENDANCE",
        }
    }
}

/// Error returned by a publisher that could not hand an event off.
#[derive(Debug, Error)]
#[error("Failed to publish {topic}: {message}")]
pub struct PublishError {
    /// Topic of the event that was dropped.
    pub topic: &'static str,
    /// What went wrong.
    pub message: String,
}

/// Sink for [`AttendanceEvent`]s.
pub trait EventPublisher: Send + Sync {
    /// Publishes an event, returning how many consumers received it.
    fn publish(&self, event: AttendanceEvent) -> Result<usize, PublishError>;
}

/// Publisher backed by a tokio broadcast channel.
///
/// Events sent while nobody is subscribed are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<AttendanceEvent>,
}

impl BroadcastPublisher {
    /// Creates a publisher whose channel buffers `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<AttendanceEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventPublisher for BroadcastPublisher {
    fn publish(&self, event: AttendanceEvent) -> Result<usize, PublishError> {
        // An error here only means there are no receivers.
        Ok(self.sender.send(event).unwrap_or(0))
    }
}

/// Publisher that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPublisher;

impl EventPublisher for NullPublisher {
    fn publish(&self, _event: AttendanceEvent) -> Result<usize, PublishError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_delivers_to_subscribers() {
        let publisher = BroadcastPublisher::new(4);
        let mut receiver = publisher.subscribe();

        let event = AttendanceEvent::WorkDayGenerated {
            work_day_id: 1,
            records: 2,
        };
        assert_eq!(publisher.publish(event.clone()).unwrap(), 1);
        assert_eq!(receiver.recv().await.unwrap(), event);
    }

    #[test]
    fn test_broadcast_without_subscribers_is_not_an_error() {
        let publisher = BroadcastPublisher::default();
        let event = AttendanceEvent::WorkDayGenerated {
            work_day_id: 1,
            records: 0,
        };
        assert_eq!(publisher.publish(event).unwrap(), 0);
    }

    #[test]
    fn test_event_serializes_with_topic() {
        let event = AttendanceEvent::WorkDayGenerated {
            work_day_id: 9,
            records: 4,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["topic"], "CREATE_WORKDAY");
        assert_eq!(json["payload"]["work_day_id"], 9);
    }
}
