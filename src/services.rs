/// Narrow interfaces to the collaborators outside the simulation, plus the
/// implementations the terminal demo uses.
///
/// None of these calls may stall a tick. Question fetches run on a worker
/// thread and are polled; answer submissions and recommendation requests
/// are pushed onto channels and forgotten.
use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{info, warn};
use serde::Serialize;

use crate::entities::GameStatus;
use crate::error::{ServiceError, SessionError};
use crate::question::{parse_payload, Effects, Question, QuestionCategory, QuestionId};

// ── Session ──────────────────────────────────────────────────────────────────

/// Opaque token threading one learner through all three mini-games.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Accept a raw token from the URL / storage, rejecting blanks.
    pub fn parse(raw: Option<&str>) -> Result<SessionId, SessionError> {
        match raw.map(str::trim) {
            Some(token) if !token.is_empty() => Ok(SessionId(token.to_string())),
            _ => Err(SessionError::Missing),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Question source ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct QuestionRequest {
    pub category: QuestionCategory,
    pub count: usize,
    pub session: Option<SessionId>,
}

pub trait QuestionSource: Send {
    /// Ordered questions for the request. May block; callers run it off the
    /// tick thread.
    fn fetch(&self, request: &QuestionRequest) -> Result<Vec<Question>, ServiceError>;
}

/// Reads `<root>/<category>.json` in the question-bank envelope format.
#[derive(Clone, Debug)]
pub struct QuestionDir {
    pub root: PathBuf,
}

impl QuestionSource for QuestionDir {
    fn fetch(&self, request: &QuestionRequest) -> Result<Vec<Question>, ServiceError> {
        let path = self.root.join(format!("{}.json", request.category));
        let body = fs::read_to_string(&path)?;
        let mut questions = parse_payload(&body)?;
        questions.truncate(request.count);
        Ok(questions)
    }
}

/// Pending result of a background fetch.
pub type QuestionReply = Receiver<Result<Vec<Question>, ServiceError>>;

/// Run `source.fetch` on a worker thread and hand back the receiving end.
pub fn fetch_in_background<S>(source: S, request: QuestionRequest) -> QuestionReply
where
    S: QuestionSource + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = source.fetch(&request);
        // The game may have been closed before the fetch finished.
        let _ = tx.send(result);
    });
    rx
}

// ── Answer sink ──────────────────────────────────────────────────────────────

/// One resolved question, in the answer-submission wire shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub session_id: SessionId,
    pub game_type: QuestionCategory,
    pub question_id: Option<QuestionId>,
    pub question_text: String,
    /// Canonical option index, never the shuffled display index.
    pub selected_option: usize,
    pub option_text: String,
    pub option_effects: Effects,
}

pub trait AnswerSink {
    /// Fire-and-forget. Implementations log failures and never block.
    fn submit(&mut self, submission: AnswerSubmission);
}

/// Forwards submissions over a channel.
#[derive(Clone, Debug)]
pub struct ChannelAnswerSink {
    tx: Sender<AnswerSubmission>,
}

impl ChannelAnswerSink {
    pub fn new(tx: Sender<AnswerSubmission>) -> ChannelAnswerSink {
        ChannelAnswerSink { tx }
    }
}

impl AnswerSink for ChannelAnswerSink {
    fn submit(&mut self, submission: AnswerSubmission) {
        if self.tx.send(submission).is_err() {
            warn!("failed to save answer: {}", ServiceError::Disconnected("answer"));
        }
    }
}

/// Start a worker that writes each submission as one JSON line.
pub fn spawn_answer_log<W>(mut writer: W) -> (ChannelAnswerSink, JoinHandle<()>)
where
    W: Write + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<AnswerSubmission>();
    let handle = thread::spawn(move || {
        for submission in rx {
            let line = match serde_json::to_string(&submission) {
                Ok(line) => line,
                Err(err) => {
                    warn!("failed to encode answer: {}", err);
                    continue;
                }
            };
            if let Err(err) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
                warn!("failed to save answer: {}", err);
            }
        }
    });
    (ChannelAnswerSink::new(tx), handle)
}

// ── Recommendation source ────────────────────────────────────────────────────

pub trait RecommendationSource {
    /// Ask for the session's career recommendation. Fire-and-forget.
    fn request(&mut self, session: &SessionId);
}

#[derive(Clone, Debug)]
pub struct ChannelRecommendations {
    tx: Sender<SessionId>,
}

impl ChannelRecommendations {
    pub fn new(tx: Sender<SessionId>) -> ChannelRecommendations {
        ChannelRecommendations { tx }
    }
}

impl RecommendationSource for ChannelRecommendations {
    fn request(&mut self, session: &SessionId) {
        info!("requesting career recommendation for session {}", session);
        if self.tx.send(session.clone()).is_err() {
            warn!("failed to request recommendation: {}", ServiceError::Disconnected("recommendation"));
        }
    }
}

// ── HUD sink ─────────────────────────────────────────────────────────────────

/// What the HUD shows, pushed once per tick.
#[derive(Clone, Debug, PartialEq)]
pub struct HudFrame {
    pub score: u32,
    pub health_percent: u8,
    pub questions_answered: usize,
    pub questions_total: usize,
    /// Seconds left on a timed question.
    pub countdown: Option<u32>,
    pub status: GameStatus,
}

impl Default for HudFrame {
    fn default() -> Self {
        HudFrame {
            score: 0,
            health_percent: 100,
            questions_answered: 0,
            questions_total: 0,
            countdown: None,
            status: GameStatus::Running,
        }
    }
}

pub trait HudSink {
    fn update(&mut self, frame: &HudFrame);
}

/// Keeps the latest frame where the renderer can read it.
#[derive(Clone, Debug, Default)]
pub struct HudSlot(Rc<RefCell<HudFrame>>);

impl HudSlot {
    pub fn latest(&self) -> HudFrame {
        self.0.borrow().clone()
    }
}

impl HudSink for HudSlot {
    fn update(&mut self, frame: &HudFrame) {
        *self.0.borrow_mut() = frame.clone();
    }
}

// ── Bundle ───────────────────────────────────────────────────────────────────

/// The outbound collaborators one simulation talks to.
pub struct Services {
    pub answers: Box<dyn AnswerSink>,
    pub recommendations: Box<dyn RecommendationSource>,
    pub hud: Box<dyn HudSink>,
}
