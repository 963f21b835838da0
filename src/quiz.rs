/// Quiz interrupt controller.
///
/// ```text
///   Idle ──timer / kill trigger──▶ Triggering ──question ready──▶ Active
///    ▲                                 │ list exhausted              │ answer or timeout
///    └──────────── delay ◀── Resolving ◀┘─────────────────────────────┘
/// ```
///
/// Questions are taken strictly in list order. Only the on-screen option
/// order is shuffled; the permutation is kept so the submitted index is the
/// canonical one. Exhausting the list leaves the controller in `Idle` for
/// the rest of the run.
use std::sync::mpsc::TryRecvError;

use log::{debug, info, warn};
use rand::Rng;

use crate::entities::{Player, SimEvent};
use crate::error::ServiceError;
use crate::profile::{QuizSpec, Scoring};
use crate::question::{AnswerOption, Presentation, Question, QuestionCategory};
use crate::services::{AnswerSink, AnswerSubmission, QuestionReply, SessionId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizPhase {
    Idle,
    Triggering,
    Active,
    Resolving,
}

// ── Question deck ────────────────────────────────────────────────────────────

/// The pre-fetched question list, possibly still in flight.
pub enum QuestionDeck {
    Pending(QuestionReply),
    Ready(Vec<Question>),
}

impl QuestionDeck {
    /// Collect a finished fetch. Failures fall back to one placeholder so the
    /// mini-game stays playable.
    pub fn poll(&mut self, category: QuestionCategory) {
        let QuestionDeck::Pending(rx) = self else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(ServiceError::Disconnected("question")),
        };
        *self = QuestionDeck::Ready(settle(result, category));
    }

    /// Block until the fetch has finished. Used by runs that must not depend
    /// on how fast the worker thread is scheduled.
    pub fn wait(&mut self, category: QuestionCategory) {
        let QuestionDeck::Pending(rx) = self else {
            return;
        };
        let result = rx
            .recv()
            .unwrap_or_else(|_| Err(ServiceError::Disconnected("question")));
        *self = QuestionDeck::Ready(settle(result, category));
    }

    /// `None` while the fetch is still running.
    pub fn questions(&self) -> Option<&[Question]> {
        match self {
            QuestionDeck::Pending(_) => None,
            QuestionDeck::Ready(questions) => Some(questions),
        }
    }
}

fn settle(result: Result<Vec<Question>, ServiceError>, category: QuestionCategory) -> Vec<Question> {
    match result {
        Ok(questions) => {
            info!("loaded {} {} questions", questions.len(), category);
            questions
        }
        Err(err) => {
            warn!("failed to load questions: {}", err);
            vec![Question::placeholder(category)]
        }
    }
}

// ── Countdown ────────────────────────────────────────────────────────────────

/// Whole-second countdown driven by tick deltas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Countdown {
    remaining: u32,
    carry: f32,
}

impl Countdown {
    pub fn start(seconds: u32) -> Countdown {
        Countdown {
            remaining: seconds,
            carry: 0.0,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Returns true on the tick the countdown reaches zero.
    pub fn tick(&mut self, delta: f32) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.carry += delta;
        while self.carry >= 1.0 && self.remaining > 0 {
            self.carry -= 1.0;
            self.remaining -= 1;
        }
        self.remaining == 0
    }
}

// ── Controller ───────────────────────────────────────────────────────────────

/// The question currently on screen.
#[derive(Clone, Debug)]
pub struct ActiveQuestion {
    /// Position in the list; also the number of questions answered before it.
    pub number: usize,
    pub question: Question,
    pub presentation: Presentation,
    pub countdown: Option<Countdown>,
}

impl ActiveQuestion {
    pub fn displayed_options(&self) -> impl Iterator<Item = &AnswerOption> + '_ {
        self.presentation.displayed(&self.question)
    }
}

/// How one answer was scored.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub number: usize,
    pub canonical: usize,
    pub forced: bool,
    /// `None` when the question has no right answer.
    pub correct: Option<bool>,
}

enum State {
    Idle,
    Triggering,
    Active(ActiveQuestion),
    Resolving { number: usize, remaining: f32 },
}

pub struct QuizController {
    spec: QuizSpec,
    session: SessionId,
    deck: QuestionDeck,
    state: State,
    /// Seconds since the last question closed (or the run started).
    timer: f32,
    kills_since_question: u32,
    answered: usize,
}

impl QuizController {
    pub fn new(spec: QuizSpec, session: SessionId, deck: QuestionDeck) -> QuizController {
        QuizController {
            spec,
            session,
            deck,
            state: State::Idle,
            timer: 0.0,
            kills_since_question: 0,
            answered: 0,
        }
    }

    pub fn phase(&self) -> QuizPhase {
        match self.state {
            State::Idle => QuizPhase::Idle,
            State::Triggering => QuizPhase::Triggering,
            State::Active(_) => QuizPhase::Active,
            State::Resolving { .. } => QuizPhase::Resolving,
        }
    }

    pub fn answered(&self) -> usize {
        self.answered
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn current(&self) -> Option<&ActiveQuestion> {
        match &self.state {
            State::Active(active) => Some(active),
            _ => None,
        }
    }

    pub fn countdown(&self) -> Option<u32> {
        self.current()
            .and_then(|active| active.countdown)
            .map(|c| c.remaining())
    }

    /// How many questions this run will ask, once the list is known.
    pub fn total(&self) -> Option<usize> {
        let len = self.deck.questions()?.len();
        Some(self.spec.question_limit.map_or(len, |limit| limit.min(len)))
    }

    /// True once every question this run will ask has been answered.
    pub fn is_exhausted(&self) -> bool {
        self.total().is_some_and(|total| self.answered >= total)
    }

    /// Block until the question list is in hand.
    pub fn wait_for_questions(&mut self) {
        self.deck.wait(self.spec.category);
    }

    /// A question is requested, on screen, or showing its feedback.
    pub fn question_active(&self) -> bool {
        !matches!(self.state, State::Idle)
    }

    /// Whether combat must be suspended this tick.
    pub fn pauses_combat(&self) -> bool {
        self.spec.pause_combat && matches!(self.state, State::Active(_) | State::Resolving { .. })
    }

    /// Advance timers and transitions by one tick.
    ///
    /// `kills` is the number of hostiles destroyed by player fire this tick.
    pub fn advance(
        &mut self,
        delta: f32,
        kills: u32,
        player: &mut Player,
        sink: &mut dyn AnswerSink,
        rng: &mut impl Rng,
        events: &mut Vec<SimEvent>,
    ) {
        self.deck.poll(self.spec.category);

        match self.phase() {
            QuizPhase::Idle => {
                self.timer += delta;
                self.kills_since_question += kills;
                let kill_due = self
                    .spec
                    .kill_trigger
                    .is_some_and(|every| self.kills_since_question >= every);
                if kill_due {
                    self.kills_since_question = 0;
                    self.request_question(rng, events);
                } else if self.timer > self.spec.trigger_interval && self.request_question(rng, events) {
                    self.timer = 0.0;
                }
            }
            QuizPhase::Triggering => self.present_next(rng, events),
            QuizPhase::Active => {
                let expired = match &mut self.state {
                    State::Active(active) => active.countdown.as_mut().is_some_and(|c| c.tick(delta)),
                    _ => false,
                };
                let option_count = self.current().map_or(0, |active| active.presentation.len());
                if expired && option_count > 0 {
                    let display_index = rng.gen_range(0..option_count);
                    debug!("answer timed out, picking option {}", display_index);
                    self.resolve(display_index, true, player, sink, events);
                }
            }
            QuizPhase::Resolving => {
                let closed = match &mut self.state {
                    State::Resolving { number, remaining } => {
                        *remaining -= delta;
                        (*remaining <= 0.0).then_some(*number)
                    }
                    _ => None,
                };
                if let Some(number) = closed {
                    self.state = State::Idle;
                    self.timer = 0.0;
                    debug!("question {} closed, resuming", number + 1);
                    events.push(SimEvent::QuestionClosed { number });
                }
            }
        }
    }

    /// The "show next question" action. A no-op unless idle with questions
    /// left; returns whether a question was requested.
    pub fn request_question(&mut self, rng: &mut impl Rng, events: &mut Vec<SimEvent>) -> bool {
        if !matches!(self.state, State::Idle) || self.is_exhausted() {
            return false;
        }
        self.state = State::Triggering;
        self.present_next(rng, events);
        true
    }

    /// Triggering → Active once the list is available, or back to Idle if
    /// it turned out to be exhausted.
    fn present_next(&mut self, rng: &mut impl Rng, events: &mut Vec<SimEvent>) {
        let Some(questions) = self.deck.questions() else {
            return;
        };
        if self.is_exhausted() {
            self.state = State::Idle;
            return;
        }
        let Some(question) = questions.get(self.answered).cloned() else {
            self.state = State::Idle;
            return;
        };
        let number = self.answered;
        let presentation = Presentation::shuffled(question.options.len(), rng);
        info!(
            "showing {} question {}/{}",
            self.spec.category,
            number + 1,
            self.total().unwrap_or(0)
        );
        events.push(SimEvent::QuestionShown {
            number,
            display_order: presentation.order().to_vec(),
        });
        self.state = State::Active(ActiveQuestion {
            number,
            question,
            presentation,
            countdown: self.spec.answer_timeout.map(Countdown::start),
        });
    }

    /// The learner clicked the option drawn at `display_index`.
    pub fn select(
        &mut self,
        display_index: usize,
        player: &mut Player,
        sink: &mut dyn AnswerSink,
        events: &mut Vec<SimEvent>,
    ) -> Option<Resolution> {
        self.resolve(display_index, false, player, sink, events)
    }

    fn resolve(
        &mut self,
        display_index: usize,
        forced: bool,
        player: &mut Player,
        sink: &mut dyn AnswerSink,
        events: &mut Vec<SimEvent>,
    ) -> Option<Resolution> {
        let State::Active(active) = &self.state else {
            return None;
        };
        let canonical = active.presentation.canonical(display_index)?;
        let option = active.question.options.get(canonical)?;
        let number = active.number;

        sink.submit(AnswerSubmission {
            session_id: self.session.clone(),
            game_type: self.spec.category,
            question_id: active.question.id.clone(),
            question_text: active.question.prompt.clone(),
            selected_option: canonical,
            option_text: option.text.clone(),
            option_effects: option.effects.clone(),
        });

        let correct = active.question.correct.map(|c| c == canonical);
        apply_scoring(&self.spec.scoring, correct, player);
        info!(
            "answered question {} with option {}{}",
            number + 1,
            canonical,
            if forced { " (timed out)" } else { "" }
        );

        self.answered += 1;
        self.state = State::Resolving {
            number,
            remaining: self.spec.resolve_delay,
        };
        events.push(SimEvent::AnswerResolved {
            number,
            canonical,
            forced,
            correct,
        });
        Some(Resolution {
            number,
            canonical,
            forced,
            correct,
        })
    }
}

fn apply_scoring(scoring: &Scoring, correct: Option<bool>, player: &mut Player) {
    match *scoring {
        Scoring::Preference { points } => player.score += points,
        Scoring::Graded {
            points,
            health_bonus,
            health_penalty,
        } => {
            if correct.unwrap_or(true) {
                player.score += points;
                player.health.heal(health_bonus);
            } else {
                player.health.damage(health_penalty);
            }
        }
    }
}
