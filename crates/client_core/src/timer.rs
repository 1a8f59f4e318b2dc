//! Reading countdown for leveled quests and the cancellable task that drives it.

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval_at, Instant},
};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);
pub const MIN_READING_SECONDS: u32 = 20;
const BASE_WORDS_PER_MINUTE: u32 = 200;
const WORDS_PER_MINUTE_PER_LEVEL: u32 = 10;
const MAX_WORDS_PER_MINUTE: u32 = 400;

/// Seconds allowed to read a story; later levels assume a faster reader.
pub fn reading_time_seconds(word_count: usize, level: u32) -> u32 {
    let wpm = (BASE_WORDS_PER_MINUTE
        + WORDS_PER_MINUTE_PER_LEVEL.saturating_mul(level.saturating_sub(1)))
    .min(MAX_WORDS_PER_MINUTE);
    let words = u32::try_from(word_count).unwrap_or(u32::MAX);
    let seconds = words.saturating_mul(60).div_ceil(wpm);
    seconds.max(MIN_READING_SECONDS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub timer_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Running(u32),
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingTimer {
    id: u64,
    total_seconds: u32,
    remaining_seconds: u32,
}

impl ReadingTimer {
    pub fn new(id: u64, total_seconds: u32) -> Self {
        Self {
            id,
            total_seconds,
            remaining_seconds: total_seconds,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn tick(&mut self) -> TimerStatus {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            TimerStatus::Expired
        } else {
            TimerStatus::Running(self.remaining_seconds)
        }
    }
}

/// Owns the periodic tick task; cancelling or dropping it stops further ticks.
#[derive(Debug)]
pub struct TickHandle {
    timer_id: u64,
    task: JoinHandle<()>,
}

impl TickHandle {
    pub fn timer_id(&self) -> u64 {
        self.timer_id
    }

    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn schedule_ticks(
    timer_id: u64,
    period: Duration,
    tx: mpsc::UnboundedSender<TimerTick>,
) -> TickHandle {
    let task = tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        loop {
            interval.tick().await;
            if tx.send(TimerTick { timer_id }).is_err() {
                break;
            }
        }
    });
    TickHandle { timer_id, task }
}

#[cfg(test)]
#[path = "tests/timer_tests.rs"]
mod tests;
