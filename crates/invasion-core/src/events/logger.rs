//! Event Logger
//!
//! Append-only JSONL event logging.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use invasion_events::{generate_event_id, Event, EventKind};
use tracing::warn;

/// Writes one `Event` per line to a JSONL file
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    next_event_id: u64,
}

impl EventLogger {
    /// Create a new event logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            next_event_id: 1,
        })
    }

    /// Create a logger that discards events
    pub fn null() -> Self {
        Self {
            writer: None,
            next_event_id: 1,
        }
    }

    /// Generate the next event ID
    pub fn next_id(&mut self) -> String {
        let id = generate_event_id(self.next_event_id);
        self.next_event_id += 1;
        id
    }

    /// Assigns the next id to `kind` and logs it.
    pub fn record(&mut self, tick: u64, kind: EventKind) -> std::io::Result<()> {
        let event = Event::new(self.next_id(), tick, kind);
        self.log(&event)
    }

    /// Log an event to the file
    pub fn log(&mut self, event: &Event) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "failed to flush event log");
        }
    }
}

/// Event kinds collected during a tick, stamped and logged at its end
#[derive(Debug, Default)]
pub struct PendingEvents {
    events: Vec<EventKind>,
}

impl PendingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: EventKind) {
        self.events.push(kind);
    }

    pub fn drain(&mut self) -> Vec<EventKind> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invasion_events::{AlienRef, EventType};
    use std::io::BufRead;

    fn landing() -> EventKind {
        EventKind::Landing {
            alien: AlienRef::new(0, "zukam0"),
            city_id: 2,
            city: "Qu-ux".to_string(),
        }
    }

    #[test]
    fn test_event_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        let mut logger = EventLogger::new(&path).unwrap();
        logger.record(0, landing()).unwrap();
        logger
            .record(
                1,
                EventKind::Movement {
                    alien: AlienRef::new(0, "zukam0"),
                    from: 2,
                    to: 0,
                },
            )
            .unwrap();
        logger.flush().unwrap();

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        let first = Event::from_json(&lines[0]).unwrap();
        assert_eq!(first.event_id, "evt_00000001");
        assert_eq!(first.event_type(), EventType::Landing);

        let second = Event::from_json(&lines[1]).unwrap();
        assert_eq!(second.event_id, "evt_00000002");
        assert_eq!(second.tick, 1);
        assert!(matches!(
            second.kind,
            EventKind::Movement { from: 2, to: 0, .. }
        ));
    }

    #[test]
    fn test_drop_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        {
            let mut logger = EventLogger::new(&path).unwrap();
            logger.record(0, landing()).unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_null_logger() {
        let mut logger = EventLogger::null();

        logger.record(0, landing()).unwrap();
        logger.flush().unwrap();
        // discarded events still consume ids
        assert_eq!(logger.next_id(), "evt_00000002");
    }

    #[test]
    fn test_event_id_generation() {
        let mut logger = EventLogger::null();

        assert_eq!(logger.next_id(), "evt_00000001");
        assert_eq!(logger.next_id(), "evt_00000002");
        assert_eq!(logger.next_id(), "evt_00000003");
    }

    #[test]
    fn test_pending_events() {
        let mut pending = PendingEvents::new();
        assert!(pending.is_empty());

        pending.push(landing());
        assert_eq!(pending.len(), 1);

        let drained = pending.drain();
        assert_eq!(drained.len(), 1);
        assert!(pending.is_empty());
    }
}
