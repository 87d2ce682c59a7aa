use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::engine::countdown::{CountdownHandle, CountdownTick};
use crate::engine::{badges, evaluator, scoring};
use crate::session::picker;
use crate::session::result::LevelResult;
use crate::session::state::{Phase, SessionSettings, SessionState, WrongAnswer};
use crate::store::kv::KeyValueStore;
use crate::store::progress::ProgressStore;
use crate::store::schema::{Checkpoint, PersistedProgress};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no level is waiting for an answer")]
    NoActiveLevel,
    #[error("the challenge pool is empty")]
    EmptyPool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick from a cancelled or superseded countdown.
    Stale,
    Running { remaining: u32 },
    /// The deadline passed. The countdown has halted; call `time_out`.
    Expired,
}

#[derive(Clone, Debug)]
pub struct SessionSummary {
    pub score: u32,
    pub levels_played: u32,
    pub wrong_answers: Vec<WrongAnswer>,
    /// Merged progress, or `None` if the final checkpoint failed to save.
    pub progress: Option<PersistedProgress>,
}

/// One play session. Owns its state, its countdown handle and the progress
/// store; every mutation goes through the transition methods below.
pub struct GameSession<S> {
    catalog: Arc<Catalog>,
    progress: ProgressStore<S>,
    state: SessionState,
    countdown: Option<CountdownHandle>,
    next_countdown_id: u64,
    /// Levels already added to the persisted total by earlier checkpoints.
    levels_flushed: u32,
    tick_interval: Duration,
    rng: SmallRng,
}

impl<S: KeyValueStore> GameSession<S> {
    pub fn new(catalog: Arc<Catalog>, progress: ProgressStore<S>, settings: SessionSettings) -> Self {
        Self::with_rng(catalog, progress, settings, SmallRng::from_entropy())
    }

    pub fn with_rng(
        catalog: Arc<Catalog>,
        progress: ProgressStore<S>,
        settings: SessionSettings,
        rng: SmallRng,
    ) -> Self {
        let persisted = progress.load();
        let time_limit = catalog.time_limit(settings.tier);
        tracing::info!(
            tier = settings.tier.as_str(),
            mode = settings.mode.as_str(),
            accent = %settings.accent,
            speed = settings.speed,
            "session started"
        );
        Self {
            state: SessionState::new(settings, time_limit, &persisted),
            catalog,
            progress,
            countdown: None,
            next_countdown_id: 0,
            levels_flushed: 0,
            tick_interval: TICK_INTERVAL,
            rng,
        }
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Owned copy of the live state, for callers that outlive the session.
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn time_limit(&self) -> u32 {
        self.catalog.time_limit(self.state.settings.tier)
    }

    pub fn high_score(&self) -> u32 {
        self.progress.high_score()
    }

    /// Begin the next level with a challenge not yet used since the last
    /// pool reset.
    pub fn start_new_level(&mut self) -> Result<&str, SessionError> {
        self.stop_timer();

        let settings = &self.state.settings;
        let pool = self.catalog.pool(settings.tier, settings.mode);
        let pick = picker::pick(pool, &mut self.state.used_challenges, &mut self.rng)
            .ok_or(SessionError::EmptyPool)?;
        if pick.pool_reset {
            tracing::debug!("challenge pool exhausted, starting over");
        }

        self.state.level += 1;
        self.state.current_challenge = Some(pick.challenge.to_string());
        self.state.time_remaining = self.time_limit();
        self.state.completion_time = None;
        self.state.is_playing = false;
        self.state.phase = Phase::LevelActive;

        tracing::debug!(level = self.state.level, "level started");
        Ok(pick.challenge)
    }

    /// Arm the countdown once the first playback of a level has finished.
    /// Later playbacks (replays) leave the running countdown alone.
    pub fn playback_finished<F>(&mut self, sink: F) -> Option<u64>
    where
        F: FnMut(CountdownTick) -> bool + Send + 'static,
    {
        if self.state.is_playing {
            return None;
        }
        self.start_timer(sink)
    }

    /// Start a fresh countdown for the active level, cancelling any live one.
    /// Returns the countdown id the ticks will carry, or `None` when there is
    /// no active level or its time has already run out.
    pub fn start_timer<F>(&mut self, sink: F) -> Option<u64>
    where
        F: FnMut(CountdownTick) -> bool + Send + 'static,
    {
        if self.state.phase != Phase::LevelActive || self.state.time_remaining == 0 {
            return None;
        }
        self.stop_timer();

        self.next_countdown_id += 1;
        let id = self.next_countdown_id;
        self.countdown = Some(CountdownHandle::start(
            id,
            self.state.time_remaining,
            self.tick_interval,
            sink,
        ));
        self.state.is_playing = true;
        tracing::debug!(countdown = id, remaining = self.state.time_remaining, "countdown started");
        Some(id)
    }

    pub fn stop_timer(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.cancel();
        }
    }

    /// Apply one tick. Only ticks from the live countdown count.
    pub fn on_tick(&mut self, tick: CountdownTick) -> TickOutcome {
        let live = self.countdown.as_ref().is_some_and(|h| h.id() == tick.id);
        if !live || self.state.phase != Phase::LevelActive {
            return TickOutcome::Stale;
        }

        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        if self.state.time_remaining == 0 {
            self.stop_timer();
            tracing::debug!(level = self.state.level, "countdown expired");
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                remaining: self.state.time_remaining,
            }
        }
    }

    pub fn submit_answer(&mut self, answer: &str) -> Result<LevelResult, SessionError> {
        self.evaluate(answer, false)
    }

    /// The incorrect path with no answer, marked as a timeout.
    pub fn time_out(&mut self) -> Result<LevelResult, SessionError> {
        self.evaluate("", true)
    }

    fn evaluate(&mut self, answer: &str, timed_out: bool) -> Result<LevelResult, SessionError> {
        if self.state.phase != Phase::LevelActive {
            return Err(SessionError::NoActiveLevel);
        }
        let expected = self
            .state
            .current_challenge
            .clone()
            .ok_or(SessionError::NoActiveLevel)?;
        self.stop_timer();

        let time_limit = self.time_limit();
        let state = &mut self.state;
        let completion_time = time_limit.saturating_sub(state.time_remaining);
        state.completion_time = Some(completion_time);

        let is_correct = !timed_out && evaluator::is_correct(answer, &expected);
        let award = scoring::award(is_correct, state.time_remaining, time_limit);

        if is_correct {
            state.score += award.points;
            state.streak += 1;
        } else {
            state.streak = 0;
            state.wrong_answers.push(WrongAnswer {
                challenge: expected.clone(),
                submitted: answer.to_string(),
                tier: state.settings.tier,
                mode: state.settings.mode,
                timed_out,
            });
        }

        let new_badges = badges::newly_unlocked(state.streak, state.level, &state.earned_badges);
        state.earned_badges.extend(new_badges.iter().copied());
        state.phase = Phase::Evaluated;

        tracing::info!(
            level = state.level,
            correct = is_correct,
            timed_out,
            points = award.points,
            streak = state.streak,
            score = state.score,
            "level evaluated"
        );

        Ok(LevelResult {
            is_correct,
            points: award.points,
            bonus_points: award.bonus_points,
            correct_answer: expected,
            user_answer: answer.to_string(),
            new_badges,
            streak: state.streak,
            score: state.score,
            timed_out,
            completion_time,
        })
    }

    /// Checkpoint into durable progress. Safe to call any number of times:
    /// only levels started since the previous checkpoint are added.
    pub fn save_progress(&mut self) -> Result<PersistedProgress> {
        let new_levels = self.state.level.saturating_sub(self.levels_flushed);
        let merged = self.progress.save(&Checkpoint {
            new_levels,
            score: self.state.score,
            earned_badges: &self.state.earned_badges,
        })?;
        self.levels_flushed = self.state.level;
        self.state.levels_completed = merged.levels_completed;
        self.state.earned_badges.extend(merged.earned_badges.iter().copied());
        Ok(merged)
    }

    /// End the session: stop the countdown, checkpoint, and hand the store
    /// back so the next session can be seeded from it.
    pub fn quit(mut self) -> (SessionSummary, ProgressStore<S>) {
        self.stop_timer();
        let progress = match self.save_progress() {
            Ok(progress) => Some(progress),
            Err(err) => {
                tracing::error!(%err, "failed to save progress on quit");
                None
            }
        };

        let GameSession {
            state, progress: store, ..
        } = self;
        tracing::info!(score = state.score, levels = state.level, "session ended");
        let summary = SessionSummary {
            score: state.score,
            levels_played: state.level,
            wrong_answers: state.wrong_answers,
            progress,
        };
        (summary, store)
    }
}
