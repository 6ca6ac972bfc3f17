//! Control channel between an external console and the frame loop.
//!
//! The channel holds a single topic. Posting never waits: a topic posted
//! while another is still pending is refused, and the frame loop checks
//! for a topic without suspending.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

/// Topics the channel holds at once.
pub const CONTROL_CAPACITY: usize = 1;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlTopic {
    /// Connectivity check; the loop ignores it
    Test,
    /// Toggle the visual flag
    Poke,
    /// Ask the loop to terminate
    Stop,
}

impl ControlTopic {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Poke => "poke",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for ControlTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown control topic {0:?}")]
pub struct ParseTopicError(pub String);

impl FromStr for ControlTopic {
    type Err = ParseTopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" => Ok(Self::Test),
            "poke" => Ok(Self::Poke),
            "stop" => Ok(Self::Stop),
            _ => Err(ParseTopicError(s.trim().to_string())),
        }
    }
}

/// What happened to a posted topic.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PostOutcome {
    Accepted,
    /// A topic is already pending
    Busy,
    /// The frame loop is gone
    Closed,
}

/// Posting half, held by consoles. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ControlSender {
    tx: mpsc::Sender<ControlTopic>,
}

impl ControlSender {
    pub fn post(&self, topic: ControlTopic) -> PostOutcome {
        match self.tx.try_send(topic) {
            Ok(()) => PostOutcome::Accepted,
            Err(TrySendError::Full(_)) => PostOutcome::Busy,
            Err(TrySendError::Closed(_)) => PostOutcome::Closed,
        }
    }

    /// Parses one console line, posts it and returns the reply line: the
    /// topic itself when accepted, `busy`, `closed` or `unknown`.
    pub fn respond(&self, line: &str) -> String {
        match line.parse::<ControlTopic>() {
            Ok(topic) => match self.post(topic) {
                PostOutcome::Accepted => topic.to_string(),
                PostOutcome::Busy => "busy".to_string(),
                PostOutcome::Closed => "closed".to_string(),
            },
            Err(_) => "unknown".to_string(),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Polling half, held by the frame loop.
#[derive(Debug)]
pub struct ControlReceiver {
    rx: mpsc::Receiver<ControlTopic>,
}

impl ControlReceiver {
    /// The pending topic, if any. Never waits.
    pub fn poll(&mut self) -> Option<ControlTopic> {
        match self.rx.try_recv() {
            Ok(topic) => Some(topic),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

#[must_use]
pub fn control_channel() -> (ControlSender, ControlReceiver) {
    let (tx, rx) = mpsc::channel(CONTROL_CAPACITY);
    (ControlSender { tx }, ControlReceiver { rx })
}
