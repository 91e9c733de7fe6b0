//! Conversation event log and history extraction.
//!
//! The event log is owned by the dialogue-state tracker; this module only reads it.
//! Event kinds form a closed enum: anything that is not a user or agent utterance
//! is ignored, including kinds this crate does not know about.

pub mod types;

#[cfg(test)]
mod tests;

pub use types::{Event, Speaker, Transcript, Turn};

/// Returns the user and agent turns of `transcript`, in chronological order.
///
/// Utterances with missing or blank text are skipped.
pub fn extract_turns(transcript: &Transcript) -> Vec<Turn> {
    transcript
        .events()
        .iter()
        .filter_map(|event| match event {
            Event::User { text, .. } => Turn::from_utterance(Speaker::User, text.as_deref()),
            Event::Bot { text, .. } => Turn::from_utterance(Speaker::Agent, text.as_deref()),
            Event::Action { .. } | Event::Slot { .. } | Event::Other => None,
        })
        .collect()
}

/// Plain-text dialogue history: the text of every extracted turn, oldest first.
pub fn extract_history(transcript: &Transcript) -> Vec<String> {
    extract_turns(transcript)
        .into_iter()
        .map(|turn| turn.text)
        .collect()
}
