use super::*;

#[test]
fn system_clock_returns_nonzero() {
    let clock = SystemClock;
    assert!(clock.epoch_ms() > 0);
}

#[test]
fn fake_clock_starts_at_given_value() {
    let clock = FakeClock::new(1_000);
    assert_eq!(clock.epoch_ms(), 1_000);
}

#[test]
fn fake_clock_advances_by_millis() {
    let clock = FakeClock::new(1_000);
    clock.advance_ms(500);
    assert_eq!(clock.epoch_ms(), 1_500);
}

#[test]
fn fake_clock_advances_by_seconds() {
    let clock = FakeClock::new(0);
    clock.advance_secs(2.5);
    assert_eq!(clock.epoch_ms(), 2_500);
}

#[test]
fn fake_clock_epoch_secs_matches_millis() {
    let clock = FakeClock::new(3_000);
    assert_eq!(clock.epoch_secs(), 3.0);
}

#[test]
fn fake_clock_set_ms_overrides_value() {
    let clock = FakeClock::new(10);
    clock.set_ms(999);
    assert_eq!(clock.epoch_ms(), 999);
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let clock = FakeClock::new(0);
    let clone = clock.clone();
    clock.advance_ms(100);
    assert_eq!(clone.epoch_ms(), 100);
}
