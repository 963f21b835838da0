use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::rstest;

use career_quest::error::QuestionError;
use career_quest::question::*;

mod common;
use common::seeded_rng;

const MIXED_PAYLOAD: &str = r#"{
  "questions": [
    {
      "id": 7,
      "question": "How do you handle stress?",
      "options": [
        { "text": "Take breaks", "effects": { "stress": -2 } },
        { "text": "Push through" }
      ]
    },
    {
      "id": "acad-1",
      "question": "What is 12 x 12?",
      "answers": ["124", "144"],
      "correct": 1
    }
  ]
}"#;

#[test]
fn payload_keeps_server_order() {
    let questions = parse_payload(MIXED_PAYLOAD).expect("valid payload");
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].prompt, "How do you handle stress?");
    assert_eq!(questions[1].prompt, "What is 12 x 12?");
}

#[test]
fn numeric_ids_become_strings() {
    let questions = parse_payload(MIXED_PAYLOAD).expect("valid payload");
    assert_eq!(questions[0].id, Some(QuestionId("7".to_string())));
    assert_eq!(questions[1].id, Some(QuestionId("acad-1".to_string())));
}

#[test]
fn option_objects_and_plain_answers_normalise_alike() {
    let questions = parse_payload(MIXED_PAYLOAD).expect("valid payload");
    let first = &questions[0];
    assert_eq!(first.options[0].effects.get("stress"), Some(&serde_json::json!(-2)));
    assert!(first.options[1].effects.is_empty());
    assert_eq!(first.correct, None);

    let second = &questions[1];
    assert_eq!(second.options[1].text, "144");
    assert!(second.options[1].effects.is_empty());
    assert_eq!(second.correct, Some(1));
}

#[test]
fn question_without_options_is_rejected() {
    let err = parse_payload(r#"{"questions":[{"question":"Empty?"}]}"#).unwrap_err();
    assert!(matches!(err, QuestionError::NoOptions { .. }));
}

#[test]
fn out_of_range_correct_index_is_rejected() {
    let err = parse_payload(r#"{"questions":[{"question":"Q","answers":["a","b"],"correct":2}]}"#)
        .unwrap_err();
    assert!(matches!(err, QuestionError::CorrectOutOfRange { index: 2, len: 2, .. }));
}

#[test]
fn garbage_is_a_decode_error() {
    assert!(matches!(parse_payload("[]"), Err(QuestionError::Decode(_))));
}

#[rstest]
#[case(QuestionCategory::Emotional, "emotional")]
#[case(QuestionCategory::Reasoning, "reasoning")]
#[case(QuestionCategory::Academic, "academic")]
fn placeholder_is_playable(#[case] category: QuestionCategory, #[case] name: &str) {
    let q = Question::placeholder(category);
    assert_eq!(category.to_string(), name);
    assert_eq!(q.options.len(), 4);
    assert_eq!(q.correct, Some(0));
}

// ── Presentation ──────────────────────────────────────────────────────────────

#[test]
fn shuffle_is_a_permutation() {
    let mut rng = seeded_rng();
    for _ in 0..20 {
        let p = Presentation::shuffled(4, &mut rng);
        let seen: HashSet<usize> = p.order().iter().copied().collect();
        assert_eq!(seen, (0..4).collect());
    }
}

#[test]
fn displayed_option_maps_back_to_its_canonical_index() {
    let mut rng = seeded_rng();
    let question = Question::placeholder(QuestionCategory::Academic);
    let p = Presentation::shuffled(question.options.len(), &mut rng);
    for (display, option) in p.displayed(&question).enumerate() {
        let canonical = p.canonical(display).expect("in range");
        assert_eq!(&question.options[canonical], option);
    }
    assert_eq!(p.canonical(4), None);
}

#[test]
fn every_shuffle_order_round_trips() {
    let question = Question::placeholder(QuestionCategory::Academic);
    let mut orders: HashSet<Vec<usize>> = HashSet::new();
    for seed in 0..500 {
        let mut rng = StdRng::seed_from_u64(seed);
        let p = Presentation::shuffled(question.options.len(), &mut rng);
        for (display, option) in p.displayed(&question).enumerate() {
            let canonical = p.canonical(display).expect("in range");
            assert_eq!(p.order()[display], canonical);
            assert_eq!(&question.options[canonical], option);
        }
        orders.insert(p.order().to_vec());
    }
    // All 4! orders turn up.
    assert_eq!(orders.len(), 24);
}

#[test]
fn identity_presentation_keeps_order() {
    let p = Presentation::identity(3);
    assert_eq!(p.order(), &[0, 1, 2]);
    assert_eq!(p.len(), 3);
    assert!(!p.is_empty());
}
