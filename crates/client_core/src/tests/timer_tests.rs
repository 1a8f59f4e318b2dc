use super::*;

#[test]
fn short_stories_get_the_minimum_reading_time() {
    assert_eq!(reading_time_seconds(0, 1), MIN_READING_SECONDS);
    assert_eq!(reading_time_seconds(40, 1), MIN_READING_SECONDS);
}

#[test]
fn reading_time_shrinks_with_level_until_the_speed_cap() {
    // 150 words at 200 wpm is 45 s; at level 11 (300 wpm) it is 30 s.
    assert_eq!(reading_time_seconds(150, 1), 45);
    assert_eq!(reading_time_seconds(150, 11), 30);
    assert_eq!(reading_time_seconds(600, 50), 90);
    assert_eq!(reading_time_seconds(600, 100), 90);
}

#[test]
fn timer_counts_down_to_expiry() {
    let mut timer = ReadingTimer::new(7, 3);
    assert_eq!(timer.tick(), TimerStatus::Running(2));
    assert_eq!(timer.tick(), TimerStatus::Running(1));
    assert_eq!(timer.tick(), TimerStatus::Expired);
    assert_eq!(timer.remaining_seconds(), 0);
    assert_eq!(timer.tick(), TimerStatus::Expired);
    assert_eq!(timer.total_seconds(), 3);
}

#[tokio::test(start_paused = true)]
async fn cancelled_schedule_stops_ticking() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = schedule_ticks(3, TICK_PERIOD, tx);
    assert_eq!(handle.timer_id(), 3);

    assert_eq!(rx.recv().await, Some(TimerTick { timer_id: 3 }));
    assert_eq!(rx.recv().await, Some(TimerTick { timer_id: 3 }));

    handle.cancel();
    // The aborted task drops its sender, closing the channel.
    assert_eq!(rx.recv().await, None);
}
