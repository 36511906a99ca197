use super::*;

#[test]
fn never_placed_is_ready() {
    let cooldown = Cooldown::new(10_000, 0);
    assert!(cooldown.is_ready(now_ms()));
}

#[test]
fn boundary_at_exact_duration() {
    let cooldown = Cooldown::new(10_000, 0);
    assert_eq!(cooldown.check(9_999), Err(CooldownError { remaining_ms: 1 }));
    assert_eq!(cooldown.check(10_000), Ok(()));
    assert_eq!(cooldown.check(10_001), Ok(()));
}

#[test]
fn record_restarts_the_window() {
    let mut cooldown = Cooldown::new(10_000, 0);
    cooldown.record(50_000);
    assert_eq!(cooldown.last_placement_ms(), 50_000);
    assert_eq!(cooldown.remaining_ms(50_000), 10_000);
    assert!(!cooldown.is_ready(59_999));
    assert!(cooldown.is_ready(60_000));
}

#[test]
fn clock_moving_backwards_keeps_gate_closed() {
    let cooldown = Cooldown::new(10_000, 100_000);
    assert_eq!(cooldown.remaining_ms(95_000), 15_000);
}

#[test]
fn extreme_timestamps_do_not_overflow() {
    let cooldown = Cooldown::new(u64::MAX, i64::MAX);
    assert_eq!(cooldown.remaining_ms(i64::MIN), u64::MAX);
}

#[test]
fn message_rounds_seconds_up() {
    let cooldown = Cooldown::new(10_000, 0);
    assert_eq!(cooldown.message(0), "You can place a pixel in 10 seconds");
    assert_eq!(cooldown.message(9_001), "You can place a pixel in 1 seconds");
    assert_eq!(cooldown.message(1), "You can place a pixel in 10 seconds");
    assert_eq!(cooldown.message(10_000), "You can place a pixel now");
}

#[test]
fn error_display_mentions_remaining_time() {
    let err = CooldownError { remaining_ms: 1 };
    assert_eq!(err.to_string(), "you can't place a pixel yet, 1 ms left");
}

#[test]
fn observe_keeps_the_later_placement() {
    let mut cooldown = Cooldown::new(10_000, 50_000);
    cooldown.observe(40_000);
    assert_eq!(cooldown.last_placement_ms(), 50_000);
    cooldown.observe(55_000);
    assert_eq!(cooldown.remaining_ms(60_000), 5_000);
}
