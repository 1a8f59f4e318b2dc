//! The game-session state machine: story streaming, quiz progression, leveling, hints.
//!
//! The controller is driven by an outside adapter calling its transition methods and
//! renders nothing itself; front ends follow along through [`SessionEvent`]s.

use std::{sync::Arc, time::Duration};

use futures::StreamExt;
use shared::{
    domain::{GameMode, Genre, OptionKey},
    error::ApiError,
    protocol::{QuizQuestionPayload, RecordGameRequest},
};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    api::GameApi,
    error::{ClientError, ErrorKind, LogicError, SessionError},
    events::SessionEvent,
    session::{Mode, QuestSummary, Question, Session},
    timer::{
        reading_time_seconds, schedule_ticks, ReadingTimer, TickHandle, TimerStatus, TimerTick,
        TICK_PERIOD,
    },
};

pub const HOME_REDIRECT_DELAY: Duration = Duration::from_secs(3);
pub const SKIP_LEVEL_HINT_COST: u32 = 2;
const EVENT_CHANNEL_CAPACITY: usize = 4096;
const RETRY_NOTICE: &str = "Start a new quest to try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    StoryLoading,
    StoryReady,
    Quizzing,
    Results,
    Terminated,
}

/// Values the game page hands over once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    pub genre: Genre,
    pub game_mode: GameMode,
    pub current_level: u32,
    pub max_level: u32,
    pub hints: u32,
}

impl PageConfig {
    pub fn mode(&self) -> Mode {
        match self.game_mode {
            GameMode::Classic => Mode::Classic,
            GameMode::Levels => Mode::Leveled {
                current_level: self.current_level.max(1),
                max_level: self.max_level,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestOutcome {
    LevelUp {
        message: String,
        new_level: u32,
        hints: u32,
        /// The new level is the configured maximum; further level-ups are no-ops.
        top_level: bool,
        summary: QuestSummary,
    },
    LevelFailed {
        message: String,
        skip_available: bool,
        summary: QuestSummary,
    },
    QuestComplete {
        summary: QuestSummary,
    },
}

impl QuestOutcome {
    pub fn summary(&self) -> QuestSummary {
        match self {
            Self::LevelUp { summary, .. }
            | Self::LevelFailed { summary, .. }
            | Self::QuestComplete { summary } => *summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub correct_key: OptionKey,
    pub is_last: bool,
}

pub struct SessionController {
    api: Arc<dyn GameApi>,
    genre: Genre,
    mode: Mode,
    session: Session,
    phase: Phase,
    story: String,
    generation: u64,
    next_timer_id: u64,
    reading_timer: Option<ReadingTimer>,
    tick_handle: Option<TickHandle>,
    tick_tx: mpsc::UnboundedSender<TimerTick>,
    tick_rx: Option<mpsc::UnboundedReceiver<TimerTick>>,
    outcome: Option<QuestOutcome>,
    background: Vec<JoinHandle<()>>,
    redirect: Option<JoinHandle<()>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new(api: Arc<dyn GameApi>, config: PageConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        Self {
            api,
            mode: config.mode(),
            genre: config.genre,
            session: Session::new(config.hints),
            phase: Phase::Idle,
            story: String::new(),
            generation: 0,
            next_timer_id: 0,
            reading_timer: None,
            tick_handle: None,
            tick_tx,
            tick_rx: Some(tick_rx),
            outcome: None,
            background: Vec::new(),
            redirect: None,
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Hands the reading-timer tick stream to the event adapter; available once.
    pub fn take_timer_ticks(&mut self) -> Option<mpsc::UnboundedReceiver<TimerTick>> {
        self.tick_rx.take()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn genre(&self) -> &Genre {
        &self.genre
    }

    pub fn story(&self) -> &str {
        &self.story
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.current_question()
    }

    pub fn reading_timer(&self) -> Option<&ReadingTimer> {
        self.reading_timer.as_ref()
    }

    pub fn outcome(&self) -> Option<&QuestOutcome> {
        self.outcome.as_ref()
    }

    pub fn hint_count(&self) -> u32 {
        self.session.hint_count()
    }

    pub fn skip_level_available(&self) -> bool {
        self.mode.is_leveled()
            && self.phase == Phase::Results
            && matches!(self.outcome, Some(QuestOutcome::LevelFailed { .. }))
            && self.session.hint_count() >= SKIP_LEVEL_HINT_COST
    }

    /// Streams a fresh story, then fetches its quiz.
    pub async fn load_new_quest(&mut self) -> Result<(), SessionError> {
        let generation = self.begin_quest()?;
        info!(generation, genre = %self.genre, "loading new quest");

        let mut story = match self.api.stream_story().await {
            Ok(story) => story,
            Err(err) => return Err(self.story_failed(generation, err)),
        };
        while let Some(chunk) = story.next().await {
            match chunk {
                Ok(text) => {
                    self.apply_story_chunk(generation, &text);
                }
                Err(err) => return Err(self.story_failed(generation, err)),
            }
        }

        self.finish_story(generation).await
    }

    /// Resets the tallies and opens a new quest generation; older loads become stale.
    pub fn begin_quest(&mut self) -> Result<u64, SessionError> {
        if self.phase == Phase::Terminated {
            return Err(self.reject(LogicError::Terminated));
        }
        self.stop_reading_timer();
        self.generation += 1;
        self.session.reset();
        self.story.clear();
        self.outcome = None;
        self.set_phase(Phase::StoryLoading);
        self.emit(SessionEvent::StoryReset);
        Ok(self.generation)
    }

    /// Appends streamed text; returns false when the chunk belongs to a superseded load.
    pub fn apply_story_chunk(&mut self, generation: u64, chunk: &str) -> bool {
        if generation != self.generation || self.phase != Phase::StoryLoading {
            debug!(
                generation,
                current = self.generation,
                "dropping story chunk from stale quest load"
            );
            return false;
        }
        self.story.push_str(chunk);
        self.emit(SessionEvent::StoryChunk(chunk.to_string()));
        true
    }

    pub async fn finish_story(&mut self, generation: u64) -> Result<(), SessionError> {
        if generation != self.generation || self.phase != Phase::StoryLoading {
            debug!(generation, "ignoring completion of stale quest load");
            return Ok(());
        }

        let word_count = self.story.split_whitespace().count();
        self.emit(SessionEvent::StoryComplete { word_count });

        let result = self.api.generate_quiz(&self.story).await;
        if generation != self.generation {
            return Ok(());
        }
        let questions = match result {
            Ok(payloads) => build_questions(payloads),
            Err(err) => return Err(self.quiz_unavailable(err)),
        };
        if questions.is_empty() {
            return Err(self.quiz_unavailable(
                ApiError::rejected("No quiz questions could be generated for this story.").into(),
            ));
        }

        let question_count = questions.len();
        self.session.load_questions(questions);
        self.set_phase(Phase::StoryReady);
        self.emit(SessionEvent::QuizReady { question_count });

        if let Mode::Leveled { current_level, .. } = self.mode {
            self.start_reading_timer(word_count, current_level);
        }
        Ok(())
    }

    pub fn start_quiz(&mut self) -> Result<(), SessionError> {
        self.guard_phase(Phase::StoryReady)?;
        if self.session.questions().is_empty() {
            return Err(self.reject(LogicError::NoQuestions));
        }
        self.stop_reading_timer();
        self.set_phase(Phase::Quizzing);
        self.show_current_question();
        Ok(())
    }

    pub fn skip_story(&mut self) -> Result<(), SessionError> {
        self.start_quiz()
    }

    pub fn select_answer(&mut self, key: &OptionKey) -> Result<AnswerFeedback, SessionError> {
        self.record_selection(key, false)
    }

    /// Moves to the next question, or into results after the last one.
    pub async fn advance(&mut self) -> Result<Option<QuestOutcome>, SessionError> {
        self.guard_phase(Phase::Quizzing)?;
        let complete = self.session.advance().map_err(|err| self.reject(err))?;
        if complete {
            return self.compute_results().await.map(Some);
        }
        self.show_current_question();
        Ok(None)
    }

    pub async fn compute_results(&mut self) -> Result<QuestOutcome, SessionError> {
        self.guard_phase(Phase::Quizzing)?;
        if !self.session.is_complete() {
            return Err(self.reject(LogicError::NotAnswered));
        }
        self.set_phase(Phase::Results);

        let summary = self.session.summary();
        let played_level = self.mode.current_level();
        let outcome = match self.mode {
            Mode::Classic => QuestOutcome::QuestComplete { summary },
            Mode::Leveled {
                current_level,
                max_level,
            } => match self.api.check_level_up().await {
                Ok(reply) if reply.leveled_up => {
                    let requested = reply.new_level.unwrap_or(current_level + 1);
                    let hints = reply.new_hints.unwrap_or(self.session.hint_count());
                    let new_level = self.apply_level(requested);
                    self.apply_hints(hints);
                    info!(from = current_level, to = new_level, max_level, "level up");
                    QuestOutcome::LevelUp {
                        message: reply.message,
                        new_level,
                        hints,
                        top_level: new_level >= max_level,
                        summary,
                    }
                }
                Ok(reply) => {
                    let message = if reply.message.is_empty() {
                        "Not enough correct answers to advance.".to_string()
                    } else {
                        reply.message
                    };
                    QuestOutcome::LevelFailed {
                        message,
                        skip_available: self.session.hint_count() >= SKIP_LEVEL_HINT_COST,
                        summary,
                    }
                }
                Err(err) => {
                    warn!(%err, "level check failed; showing plain quest summary");
                    QuestOutcome::QuestComplete { summary }
                }
            },
        };

        self.outcome = Some(outcome.clone());
        self.emit(SessionEvent::Outcome(outcome.clone()));
        self.spawn_record(summary, played_level);
        Ok(outcome)
    }

    /// Spends a hint to answer the current question correctly.
    pub async fn use_hint(&mut self) -> Result<AnswerFeedback, SessionError> {
        self.guard_phase(Phase::Quizzing)?;
        if self.session.current_question().is_none() {
            return Err(self.reject(LogicError::NoCurrentQuestion));
        }
        if self.session.is_current_answered() {
            return Err(self.reject(LogicError::AlreadyAnswered));
        }
        if self.session.hint_count() == 0 {
            debug!("hint requested with an empty balance");
            return Err(LogicError::NoHints.into());
        }

        let remaining = match self.api.use_hint().await {
            Ok(remaining) => remaining,
            Err(err) => {
                let err = SessionError::Hint(err);
                self.report(&err);
                return Err(err);
            }
        };
        self.apply_hints(remaining);

        let key = self
            .session
            .current_question()
            .map(|question| question.correct_key().clone())
            .ok_or(LogicError::NoCurrentQuestion)?;
        self.record_selection(&key, true)
    }

    /// Trades hints for the next level after a failed one, then starts the next quest.
    pub async fn skip_level(&mut self) -> Result<(), SessionError> {
        if !self.mode.is_leveled() {
            return Err(self.reject(LogicError::NotLeveled));
        }
        self.guard_phase(Phase::Results)?;
        if !matches!(self.outcome, Some(QuestOutcome::LevelFailed { .. })) {
            return Err(self.reject(LogicError::SkipUnavailable));
        }
        let available = self.session.hint_count();
        if available < SKIP_LEVEL_HINT_COST {
            return Err(self.reject(LogicError::NotEnoughHints {
                required: SKIP_LEVEL_HINT_COST,
                available,
            }));
        }

        let reply = match self.api.skip_level().await {
            Ok(reply) => reply,
            Err(err) => {
                let err = SessionError::SkipLevel(err);
                self.report(&err);
                return Err(err);
            }
        };
        if let Some(hints) = reply.hints_remaining {
            self.apply_hints(hints);
        }
        if let Some(level) = reply.new_level {
            self.apply_level(level);
        }
        if !reply.message.is_empty() {
            self.emit(SessionEvent::Notice(reply.message));
        }

        self.load_new_quest().await
    }

    pub fn on_timer_tick(&mut self, tick: TimerTick) -> Result<(), SessionError> {
        if self.phase != Phase::StoryReady {
            debug!(timer_id = tick.timer_id, phase = ?self.phase, "tick outside reading phase");
            return Ok(());
        }
        let Some(timer) = self.reading_timer.as_mut() else {
            return Ok(());
        };
        if timer.id() != tick.timer_id {
            debug!(timer_id = tick.timer_id, live = timer.id(), "stale reading timer tick");
            return Ok(());
        }

        match timer.tick() {
            TimerStatus::Running(remaining_seconds) => {
                self.emit(SessionEvent::ReadingTimerTick { remaining_seconds });
                Ok(())
            }
            TimerStatus::Expired => {
                self.emit(SessionEvent::ReadingTimerTick {
                    remaining_seconds: 0,
                });
                info!("reading time is up; starting quiz");
                self.start_quiz()
            }
        }
    }

    /// Waits for outstanding answer submissions and game recordings.
    pub async fn flush_background(&mut self) {
        for handle in self.background.drain(..) {
            if let Err(err) = handle.await {
                warn!(%err, "background request task ended abnormally");
            }
        }
    }

    fn record_selection(
        &mut self,
        key: &OptionKey,
        via_hint: bool,
    ) -> Result<AnswerFeedback, SessionError> {
        self.guard_phase(Phase::Quizzing)?;
        let correct = self
            .session
            .record_answer(key)
            .map_err(|err| self.reject(err))?;
        let correct_key = self
            .session
            .current_question()
            .map(|question| question.correct_key().clone())
            .ok_or(LogicError::NoCurrentQuestion)?;
        let is_last = self.session.is_last_question();

        self.emit(SessionEvent::AnswerRecorded {
            key: key.clone(),
            correct,
            correct_key: correct_key.clone(),
            score: self.session.score(),
            total_answered: self.session.total_answered(),
            via_hint,
        });
        self.spawn_submit(correct);

        Ok(AnswerFeedback {
            correct,
            correct_key,
            is_last,
        })
    }

    fn spawn_submit(&mut self, is_correct: bool) {
        let api = Arc::clone(&self.api);
        self.track(tokio::spawn(async move {
            if let Err(err) = api.submit_answer(is_correct).await {
                warn!(%err, is_correct, "answer submission failed");
            }
        }));
    }

    fn spawn_record(&mut self, summary: QuestSummary, level: Option<u32>) {
        let record = RecordGameRequest {
            genre: self.genre.clone(),
            game_mode: if self.mode.is_leveled() {
                GameMode::Levels
            } else {
                GameMode::Classic
            },
            score: summary.score,
            total_questions: summary.total,
            level,
        };
        let api = Arc::clone(&self.api);
        self.track(tokio::spawn(async move {
            if let Err(err) = api.record_game(record).await {
                warn!(%err, "recording the finished game failed");
            }
        }));
    }

    fn track(&mut self, handle: JoinHandle<()>) {
        self.background.retain(|handle| !handle.is_finished());
        self.background.push(handle);
    }

    fn story_failed(&mut self, generation: u64, err: ClientError) -> SessionError {
        let err = SessionError::StoryGeneration(err);
        if generation != self.generation {
            return err;
        }
        self.report(&err);
        if err.kind() == ErrorKind::Validation {
            warn!(%err, "story request rejected; leaving for the start page");
            self.set_phase(Phase::Terminated);
            self.schedule_redirect();
        } else {
            warn!(%err, "story stream failed");
            self.set_phase(Phase::Idle);
            self.emit(SessionEvent::Notice(RETRY_NOTICE.to_string()));
        }
        err
    }

    fn quiz_unavailable(&mut self, err: ClientError) -> SessionError {
        warn!(%err, "quiz generation failed");
        self.session.load_questions(Vec::new());
        self.set_phase(Phase::StoryReady);
        let err = SessionError::QuizGeneration(err);
        self.report(&err);
        self.emit(SessionEvent::Notice(RETRY_NOTICE.to_string()));
        err
    }

    fn schedule_redirect(&mut self) {
        if let Some(previous) = self.redirect.take() {
            previous.abort();
        }
        let events = self.events.clone();
        self.redirect = Some(tokio::spawn(async move {
            tokio::time::sleep(HOME_REDIRECT_DELAY).await;
            let _ = events.send(SessionEvent::NavigateHome);
        }));
    }

    fn start_reading_timer(&mut self, word_count: usize, level: u32) {
        self.stop_reading_timer();
        self.next_timer_id += 1;
        let total_seconds = reading_time_seconds(word_count, level);
        self.reading_timer = Some(ReadingTimer::new(self.next_timer_id, total_seconds));
        self.tick_handle = Some(schedule_ticks(
            self.next_timer_id,
            TICK_PERIOD,
            self.tick_tx.clone(),
        ));
        debug!(word_count, level, total_seconds, "reading timer started");
        self.emit(SessionEvent::ReadingTimerStarted { total_seconds });
    }

    fn stop_reading_timer(&mut self) {
        if let Some(handle) = self.tick_handle.take() {
            handle.cancel();
        }
        if self.reading_timer.take().is_some() {
            self.emit(SessionEvent::ReadingTimerStopped);
        }
    }

    fn show_current_question(&self) {
        if let Some(question) = self.session.current_question() {
            self.emit(SessionEvent::QuestionShown {
                index: self.session.current_index(),
                total: self.session.questions().len(),
                question: question.clone(),
            });
        }
    }

    fn apply_hints(&mut self, hints: u32) {
        self.session.set_hint_count(hints);
        self.emit(SessionEvent::HintsChanged(hints));
    }

    /// Adopts a server-reported level, held within `1..=max_level`.
    fn apply_level(&mut self, level: u32) -> u32 {
        let Mode::Leveled {
            current_level,
            max_level,
        } = &mut self.mode
        else {
            return level;
        };
        let level = level.min(*max_level).max(1);
        *current_level = level;
        let max_level = *max_level;
        self.emit(SessionEvent::LevelChanged { level, max_level });
        level
    }

    fn guard_phase(&self, expected: Phase) -> Result<(), SessionError> {
        if self.phase == expected {
            return Ok(());
        }
        Err(self.reject(LogicError::WrongPhase {
            expected,
            actual: self.phase,
        }))
    }

    fn reject(&self, err: LogicError) -> SessionError {
        let err = SessionError::Logic(err);
        self.report(&err);
        err
    }

    fn report(&self, err: &SessionError) {
        self.emit(SessionEvent::Error {
            kind: err.kind(),
            message: err.user_message(),
        });
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            info!(from = ?self.phase, to = ?phase, "session phase changed");
            self.phase = phase;
            self.emit(SessionEvent::PhaseChanged(phase));
        }
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(redirect) = self.redirect.take() {
            redirect.abort();
        }
    }
}

fn build_questions(payloads: Vec<QuizQuestionPayload>) -> Vec<Question> {
    payloads
        .into_iter()
        .filter_map(|payload| match Question::try_from(payload) {
            Ok(question) => Some(question),
            Err(err) => {
                warn!(%err, "dropping malformed quiz question");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
