use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Agent,
}

/// One utterance kept by history extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub(crate) fn from_utterance(speaker: Speaker, text: Option<&str>) -> Option<Self> {
        let text = text.filter(|t| !t.trim().is_empty())?;
        Some(Self {
            speaker,
            text: text.to_string(),
        })
    }
}

/// A tracker event, tagged by its `event` field (`"user"`, `"bot"`, `"action"`, `"slot"`).
///
/// Unknown kinds deserialize to [`Event::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    User {
        #[serde(default)]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<f64>,
    },
    Bot {
        #[serde(default)]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<f64>,
    },
    Action {
        #[serde(default)]
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<f64>,
    },
    Slot {
        name: String,
        #[serde(default)]
        value: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<f64>,
    },
    #[serde(other)]
    Other,
}

impl Event {
    pub fn user(text: impl Into<String>) -> Self {
        Event::User {
            text: Some(text.into()),
            timestamp: None,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Event::Bot {
            text: Some(text.into()),
            timestamp: None,
        }
    }

    pub fn action(name: impl Into<String>) -> Self {
        Event::Action {
            name: name.into(),
            timestamp: None,
        }
    }

    pub fn slot(name: impl Into<String>, value: serde_json::Value) -> Self {
        Event::Slot {
            name: name.into(),
            value,
            timestamp: None,
        }
    }

    /// Returns `true` for user and agent utterances.
    pub fn is_utterance(&self) -> bool {
        matches!(self, Event::User { .. } | Event::Bot { .. })
    }
}

/// Chronological event log of one conversation.
///
/// Deserializes from a tracker dump (`{"sender_id": ..., "events": [...]}`); fields
/// other than `events` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    events: Vec<Event>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl FromIterator<Event> for Transcript {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::from_events(iter.into_iter().collect())
    }
}
