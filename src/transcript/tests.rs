use super::*;
use serde_json::json;

fn sample_transcript() -> Transcript {
    Transcript::new()
        .with_event(Event::action("action_listen"))
        .with_event(Event::user("hi"))
        .with_event(Event::action("utter_greet"))
        .with_event(Event::bot("hello"))
        .with_event(Event::slot("name", json!("Ada")))
        .with_event(Event::user("I need help"))
}

#[test]
fn test_extract_history_example_scenario() {
    let transcript = Transcript::from_events(vec![
        Event::user("hi"),
        Event::bot("hello"),
        Event::user("I need help"),
    ]);

    assert_eq!(
        extract_history(&transcript),
        vec!["hi".to_string(), "hello".to_string(), "I need help".to_string()]
    );
}

#[test]
fn test_extract_history_skips_non_utterances() {
    let transcript = sample_transcript();
    let history = extract_history(&transcript);

    assert_eq!(history, vec!["hi", "hello", "I need help"]);
    assert!(history.len() <= transcript.len());
}

#[test]
fn test_extract_turns_records_speaker() {
    let turns = extract_turns(&sample_transcript());

    let speakers: Vec<Speaker> = turns.iter().map(|t| t.speaker).collect();
    assert_eq!(speakers, vec![Speaker::User, Speaker::Agent, Speaker::User]);
}

#[test]
fn test_extract_history_skips_missing_and_blank_text() {
    let transcript = Transcript::from_events(vec![
        Event::User {
            text: None,
            timestamp: None,
        },
        Event::bot(""),
        Event::user("   "),
        Event::bot("still here"),
    ]);

    assert_eq!(extract_history(&transcript), vec!["still here"]);
}

#[test]
fn test_extract_history_empty_is_valid() {
    assert!(extract_history(&Transcript::new()).is_empty());

    let only_actions: Transcript = [Event::action("action_listen"), Event::action("utter_x")]
        .into_iter()
        .collect();
    assert!(extract_history(&only_actions).is_empty());
}

#[test]
fn test_extract_history_does_not_mutate_source() {
    let transcript = sample_transcript();
    let before = transcript.clone();

    let _ = extract_history(&transcript);

    assert_eq!(transcript, before);
}

#[test]
fn test_deserialize_tracker_dump() {
    let dump = json!({
        "sender_id": "default",
        "latest_message": {"text": "I need help"},
        "events": [
            {"event": "action", "name": "action_session_start", "timestamp": 1.0},
            {"event": "session_started", "timestamp": 1.1},
            {"event": "user", "text": "hi", "parse_data": {"intent": {"name": "greet"}}},
            {"event": "bot", "text": "hello", "data": {}},
            {"event": "slot", "name": "topic", "value": null},
            {"event": "followup", "name": "action_x"},
            {"event": "user", "text": "I need help"}
        ]
    });

    let transcript: Transcript = serde_json::from_value(dump).unwrap();

    assert_eq!(transcript.len(), 7);
    assert_eq!(transcript.events()[1], Event::Other);
    assert_eq!(transcript.events()[5], Event::Other);
    assert_eq!(extract_history(&transcript), vec!["hi", "hello", "I need help"]);
}

#[test]
fn test_deserialize_null_text() {
    let transcript: Transcript = serde_json::from_value(json!({
        "events": [{"event": "bot", "text": null}, {"event": "user", "text": "ok"}]
    }))
    .unwrap();

    assert_eq!(extract_history(&transcript), vec!["ok"]);
}

#[test]
fn test_missing_events_field_is_empty_transcript() {
    let transcript: Transcript = serde_json::from_value(json!({"sender_id": "x"})).unwrap();
    assert!(transcript.is_empty());
}

#[test]
fn test_event_is_utterance() {
    assert!(Event::user("a").is_utterance());
    assert!(Event::bot("b").is_utterance());
    assert!(!Event::action("c").is_utterance());
    assert!(!Event::Other.is_utterance());
}
