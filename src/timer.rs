//! The chip timers. Both count down at 60 hertz, but the clock is
//! owned by the host, which calls [`Timer::tick`] through
//! [`ChipSet::tick_timers`](crate::chip8::ChipSet::tick_timers).

/// Gets notified whenever a timer switches between zero and non zero.
/// The sound timer uses this to tell an audio driver when to start
/// and stop the tone.
#[cfg_attr(test, mockall::automock)]
pub trait TimerCallback {
    /// `active` is true if the timer just left zero, false if it
    /// just reached zero.
    fn handle(&mut self, active: bool);
}

/// A callback that ignores all transitions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCallback;

impl TimerCallback for NoCallback {
    fn handle(&mut self, _active: bool) {}
}

/// An eight bit countdown that stops at zero.
#[derive(Debug)]
pub struct Timer<S: TimerCallback = NoCallback> {
    value: u8,
    /// notified on every zero / non zero transition
    callback: S,
}

impl Timer<NoCallback> {
    pub fn new(value: u8) -> Self {
        Timer::with_callback(value, NoCallback)
    }
}

impl<S: TimerCallback> Timer<S> {
    /// Will create a new timer, that reports its transitions to the callback.
    pub fn with_callback(value: u8, callback: S) -> Self {
        Self { value, callback }
    }

    /// Reports a transition to the callback if the timer starts or stops.
    pub fn set_value(&mut self, value: u8) {
        let was_active = self.is_active();
        self.value = value;
        if was_active != self.is_active() {
            self.callback.handle(self.is_active());
        }
    }

    pub fn get_value(&self) -> u8 {
        self.value
    }

    /// Checks if the timer is still counting down.
    pub fn is_active(&self) -> bool {
        self.value > 0
    }

    /// Counts down by one, a timer at zero stays at zero.
    pub fn tick(&mut self) {
        if self.value == 0 {
            return;
        }
        self.value -= 1;
        if self.value == 0 {
            self.callback.handle(false);
        }
    }

    pub fn callback(&self) -> &S {
        &self.callback
    }

    pub fn callback_mut(&mut self) -> &mut S {
        &mut self.callback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::timer;
    use mockall::{predicate::eq, Sequence};

    #[test]
    fn test_timer() {
        let mut timer = Timer::new(timer::HERTZ as u8);
        for _ in 0..timer::HERTZ {
            assert!(timer.is_active());
            timer.tick();
        }
        assert_eq!(timer.get_value(), 0);

        // stays at zero
        timer.tick();
        assert_eq!(timer.get_value(), 0);
    }

    #[test]
    fn test_timer_callback_transitions() {
        let mut seq = Sequence::new();
        let mut callback = MockTimerCallback::new();
        callback
            .expect_handle()
            .with(eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        callback
            .expect_handle()
            .with(eq(false))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let mut timer = Timer::with_callback(0, callback);
        timer.set_value(2);
        // no transition, still running
        timer.set_value(3);
        timer.tick();
        timer.tick();
        timer.tick();
        // already at zero
        timer.tick();
        assert_eq!(timer.get_value(), 0);
    }

    #[test]
    fn test_timer_set_to_zero_reports_stop() {
        let mut callback = MockTimerCallback::new();
        callback
            .expect_handle()
            .with(eq(false))
            .times(1)
            .return_const(());

        let mut timer = Timer::with_callback(5, callback);
        timer.set_value(0);
        assert!(!timer.is_active());
    }
}
