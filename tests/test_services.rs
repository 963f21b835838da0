use std::fs;
use std::time::Duration;

use career_quest::error::{ServiceError, SessionError};
use career_quest::question::{Effects, QuestionCategory, QuestionId};
use career_quest::services::*;

mod common;
use common::{session, SharedBuffer};

#[test]
fn blank_sessions_are_rejected() {
    assert!(matches!(SessionId::parse(None), Err(SessionError::Missing)));
    assert!(matches!(SessionId::parse(Some("   ")), Err(SessionError::Missing)));
    let id = SessionId::parse(Some(" abc ")).expect("non-blank");
    assert_eq!(id.as_str(), "abc");
}

#[test]
fn missing_session_names_the_prerequisite() {
    let message = SessionError::Missing.to_string();
    assert!(message.contains("emotion check-in"));
}

fn submission() -> AnswerSubmission {
    let mut effects = Effects::new();
    effects.insert("stress".to_string(), serde_json::json!(-2));
    AnswerSubmission {
        session_id: session(),
        game_type: QuestionCategory::Emotional,
        question_id: Some(QuestionId("7".to_string())),
        question_text: "How do you handle stress?".to_string(),
        selected_option: 0,
        option_text: "Take breaks".to_string(),
        option_effects: effects,
    }
}

#[test]
fn submission_uses_the_wire_field_names() {
    let value = serde_json::to_value(submission()).expect("serialise");
    assert_eq!(
        value,
        serde_json::json!({
            "sessionId": "session-1",
            "gameType": "emotional",
            "questionId": "7",
            "questionText": "How do you handle stress?",
            "selectedOption": 0,
            "optionText": "Take breaks",
            "optionEffects": { "stress": -2 }
        })
    );
}

#[test]
fn answer_log_writes_one_json_line_per_submission() {
    let buffer = SharedBuffer::default();
    let (mut sink, worker) = spawn_answer_log(buffer.clone());
    sink.submit(submission());
    sink.submit(submission());
    drop(sink);
    worker.join().expect("worker exits once the sink is dropped");

    let text = buffer.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
    assert_eq!(first["selectedOption"], 0);
}

#[test]
fn sink_survives_a_dead_worker() {
    let (tx, rx) = std::sync::mpsc::channel();
    drop(rx);
    let mut sink = ChannelAnswerSink::new(tx);
    // Logged, not propagated.
    sink.submit(submission());
}

#[test]
fn question_dir_reads_the_category_file() {
    let root = std::env::temp_dir().join(format!("career-quest-{}", std::process::id()));
    fs::create_dir_all(&root).expect("temp dir");
    fs::write(
        root.join("reasoning.json"),
        r#"{"questions":[
            {"id":1,"question":"A?","answers":["x","y"],"correct":0},
            {"id":2,"question":"B?","answers":["x","y"],"correct":1},
            {"id":3,"question":"C?","answers":["x","y"],"correct":1}
        ]}"#,
    )
    .expect("write fixture");

    let source = QuestionDir { root: root.clone() };
    let request = QuestionRequest {
        category: QuestionCategory::Reasoning,
        count: 2,
        session: None,
    };
    let questions = source.fetch(&request).expect("readable");
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[1].prompt, "B?");

    let missing = QuestionRequest {
        category: QuestionCategory::Academic,
        ..request.clone()
    };
    assert!(matches!(source.fetch(&missing), Err(ServiceError::Io(_))));

    let rx = fetch_in_background(source, request);
    let fetched = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("worker replies")
        .expect("readable");
    assert_eq!(fetched.len(), 2);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn recommendation_requests_go_down_the_channel() {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut recommendations = ChannelRecommendations::new(tx);
    recommendations.request(&session());
    assert_eq!(rx.try_recv().expect("queued"), session());
}

#[test]
fn hud_slot_keeps_the_latest_frame() {
    let slot = HudSlot::default();
    let mut sink = slot.clone();
    let frame = HudFrame {
        score: 150,
        health_percent: 40,
        ..HudFrame::default()
    };
    sink.update(&frame);
    assert_eq!(slot.latest(), frame);
}
