/// Question model and the boundary adapter for question-bank payloads.
///
/// The question bank answers with `{ "questions": [...] }` where each entry
/// carries either an `options` list of `{text, effects}` records or an
/// `answers` list of bare strings, and an optional `correct` index. Both
/// shapes are normalised into [`Question`] here so the quiz controller only
/// ever sees one form.
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::QuestionError;

/// Opaque per-option weights forwarded untouched to the scoring service.
pub type Effects = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Emotional,
    Reasoning,
    Academic,
}

impl QuestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Emotional => "emotional",
            QuestionCategory::Reasoning => "reasoning",
            QuestionCategory::Academic => "academic",
        }
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnswerOption {
    pub text: String,
    pub effects: Effects,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Question {
    pub id: Option<QuestionId>,
    pub prompt: String,
    /// Options in canonical (server) order.
    pub options: Vec<AnswerOption>,
    /// Only graded categories carry one.
    pub correct: Option<usize>,
}

impl Question {
    /// The single built-in question used when the bank cannot be reached.
    pub fn placeholder(category: QuestionCategory) -> Question {
        let (prompt, answers): (&str, [&str; 4]) = match category {
            QuestionCategory::Emotional => (
                "How do you handle stress?",
                ["Take breaks", "Push through", "Avoid it", "Seek help"],
            ),
            QuestionCategory::Reasoning => (
                "What's the logical next step?",
                ["Option A", "Option B", "Option C", "Option D"],
            ),
            QuestionCategory::Academic => (
                "What is the capital of France?",
                ["Paris", "London", "Berlin", "Madrid"],
            ),
        };
        Question {
            id: None,
            prompt: prompt.to_string(),
            options: answers
                .iter()
                .map(|text| AnswerOption {
                    text: text.to_string(),
                    effects: Effects::new(),
                })
                .collect(),
            correct: Some(0),
        }
    }
}

// ── Display shuffling ────────────────────────────────────────────────────────

/// One on-screen presentation of a question.
///
/// `order[display] == canonical`: the option drawn at button `display` is
/// option `canonical` of the question. Submissions always use the canonical
/// index.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    order: Vec<usize>,
}

impl Presentation {
    /// Fisher-Yates shuffle of the option indices.
    pub fn shuffled(option_count: usize, rng: &mut impl Rng) -> Presentation {
        let mut order: Vec<usize> = (0..option_count).collect();
        order.shuffle(rng);
        Presentation { order }
    }

    pub fn identity(option_count: usize) -> Presentation {
        Presentation {
            order: (0..option_count).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn canonical(&self, display_index: usize) -> Option<usize> {
        self.order.get(display_index).copied()
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Options in the order they are drawn.
    pub fn displayed<'q>(&'q self, question: &'q Question) -> impl Iterator<Item = &'q AnswerOption> + 'q {
        self.order.iter().filter_map(|&i| question.options.get(i))
    }
}

// ── Payload adapter ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Envelope {
    questions: Vec<RawQuestion>,
}

#[derive(Deserialize)]
struct RawQuestion {
    id: Option<Value>,
    question: String,
    options: Option<Vec<RawOption>>,
    answers: Option<Vec<RawOption>>,
    correct: Option<usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Detailed {
        text: String,
        #[serde(default)]
        effects: Effects,
    },
    Plain(String),
}

impl From<RawOption> for AnswerOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Detailed { text, effects } => AnswerOption { text, effects },
            RawOption::Plain(text) => AnswerOption {
                text,
                effects: Effects::new(),
            },
        }
    }
}

impl TryFrom<RawQuestion> for Question {
    type Error = QuestionError;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        let options: Vec<AnswerOption> = raw
            .options
            .or(raw.answers)
            .unwrap_or_default()
            .into_iter()
            .map(AnswerOption::from)
            .collect();
        if options.is_empty() {
            return Err(QuestionError::NoOptions {
                prompt: raw.question,
            });
        }
        if let Some(index) = raw.correct {
            if index >= options.len() {
                return Err(QuestionError::CorrectOutOfRange {
                    prompt: raw.question,
                    index,
                    len: options.len(),
                });
            }
        }
        let id = match raw.id {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(QuestionId(s)),
            Some(other) => Some(QuestionId(other.to_string())),
        };
        Ok(Question {
            id,
            prompt: raw.question,
            options,
            correct: raw.correct,
        })
    }
}

/// Decode a question-bank response body, keeping server order.
pub fn parse_payload(json: &str) -> Result<Vec<Question>, QuestionError> {
    let envelope: Envelope = serde_json::from_str(json)?;
    envelope
        .questions
        .into_iter()
        .map(Question::try_from)
        .collect()
}
