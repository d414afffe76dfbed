use std::io::Write;

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{Sender, TrySendError};
use serde::{Deserialize, Serialize};

use crate::types::{GestureEvent, GestureKind};

/// Receives confirmed gestures for transmission and display.
pub trait GestureSink: Send + 'static {
    fn publish(&mut self, event: &GestureEvent) -> Result<()>;
}

impl GestureSink for Sender<GestureEvent> {
    fn publish(&mut self, event: &GestureEvent) -> Result<()> {
        match self.try_send(*event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(anyhow!("event queue full, dropped {}", event.gesture)),
            Err(TrySendError::Disconnected(_)) => Err(anyhow!("event receiver disconnected")),
        }
    }
}

/// Messages exchanged with the signaling relay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum SignalMessage {
    /// Sent when the local user performs a gesture.
    Gesture { gesture: GestureKind },
    /// Relayed to us when the remote peer performs one.
    GestureReceived { gesture: GestureKind },
}

impl SignalMessage {
    pub fn parse(line: &str) -> Result<Self> {
        serde_json::from_str(line.trim()).with_context(|| format!("bad signal message: {line}"))
    }

    pub fn indicator_text(&self) -> String {
        match self {
            SignalMessage::Gesture { gesture } => gesture.indicator_text(),
            SignalMessage::GestureReceived { gesture } => {
                format!("Received: {}", gesture.indicator_text())
            }
        }
    }
}

/// Writes outgoing `gesture` messages as JSON lines.
pub struct SignalSink<W> {
    writer: W,
}

impl<W: Write + Send + 'static> SignalSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send + 'static> GestureSink for SignalSink<W> {
    fn publish(&mut self, event: &GestureEvent) -> Result<()> {
        let message = SignalMessage::Gesture {
            gesture: event.gesture,
        };
        serde_json::to_writer(&mut self.writer, &message).context("failed to encode signal")?;
        self.writer.write_all(b"\n")?;
        self.writer.flush().context("failed to flush signal output")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn event(gesture: GestureKind) -> GestureEvent {
        GestureEvent {
            gesture,
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn signal_sink_writes_json_lines() {
        let mut sink = SignalSink::new(Vec::new());
        sink.publish(&event(GestureKind::ThumbsUp)).unwrap();
        sink.publish(&event(GestureKind::Rock)).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "{\"event\":\"gesture\",\"gesture\":\"thumbs-up\"}\n{\"event\":\"gesture\",\"gesture\":\"rock\"}\n"
        );
    }

    #[test]
    fn parses_received_gestures() {
        let msg = SignalMessage::parse(r#"{"event":"gesture-received","gesture":"ok"}"#).unwrap();
        assert_eq!(
            msg,
            SignalMessage::GestureReceived {
                gesture: GestureKind::Ok
            }
        );
        assert_eq!(msg.indicator_text(), "Received: 👌 OK");
        assert!(SignalMessage::parse(r#"{"event":"gesture","gesture":"shrug"}"#).is_err());
    }

    #[test]
    fn channel_sink_reports_disconnect() {
        let (mut tx, rx) = crossbeam_channel::bounded(1);
        tx.publish(&event(GestureKind::Wave)).unwrap();
        assert!(tx.publish(&event(GestureKind::Stop)).is_err());
        assert_eq!(rx.recv().unwrap().gesture, GestureKind::Wave);
        drop(rx);
        assert!(tx.publish(&event(GestureKind::Stop)).is_err());
    }
}
