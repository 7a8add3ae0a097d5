use std::time::Duration;

use crate::animation::{AnimationDriver, AnimationEvent, AnimationKey, AnimationRequest, Easing};

struct Countup {
    handle: AnimationKey,
    target: u64,
}

/// Credit balance with an animated count-up for wins.
pub struct CreditBalance {
    /// Settled balance
    balance: u64,
    /// What the display currently shows; trails `balance` during a count-up
    displayed: f64,
    /// Credits per second
    rate: f64,
    countup: Option<Countup>,
}

impl CreditBalance {
    pub fn new(rate: f64) -> CreditBalance {
        CreditBalance { balance: 0, displayed: 0., rate, countup: None }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn displayed(&self) -> f64 {
        self.displayed
    }

    pub fn is_counting(&self) -> bool {
        self.countup.is_some()
    }

    pub fn display(&self) -> String {
        format!("Credits: {:.2}", self.displayed)
    }

    /// Starts counting up by `win`. The count-up lasts `win / rate` seconds. A
    /// count-up already running is settled first. Returns None when nothing is
    /// animated: a zero win, or a duration too long to represent, which is
    /// credited immediately.
    pub fn add(&mut self, win: u32, driver: &mut dyn AnimationDriver) -> Option<AnimationKey> {
        self.settle(driver);
        if win == 0 {
            return None;
        }
        let target = self.balance + win as u64;
        let duration = match Duration::try_from_secs_f64(win as f64 / self.rate) {
            Ok(duration) => duration,
            Err(e) => {
                log::warn!("Cannot count up {} at {} credits/s ({}); crediting at once", win, self.rate, e);
                self.commit(target);
                return None;
            }
        };
        let handle = driver.animate(AnimationRequest {
            from: self.balance as f64,
            to: target as f64,
            duration,
            easing: Easing::Power3Out,
        });
        log::debug!("Counting up {} -> {}", self.balance, target);
        self.countup = Some(Countup { handle, target });
        Some(handle)
    }

    /// Jumps straight to the end of a running count-up.
    pub fn settle(&mut self, driver: &mut dyn AnimationDriver) {
        if let Some(countup) = self.countup.take() {
            driver.cancel(countup.handle);
            self.commit(countup.target);
        }
    }

    /// Feeds a driver callback. Returns the new balance once the count-up
    /// completes; events for other animations are ignored.
    pub fn handle(&mut self, event: AnimationEvent) -> Option<u64> {
        let countup = self.countup.as_ref()?;
        if countup.handle != event.handle() {
            return None;
        }
        match event {
            AnimationEvent::Update { value, .. } => {
                self.displayed = value;
                None
            }
            AnimationEvent::Complete { .. } => {
                let target = countup.target;
                self.countup = None;
                self.commit(target);
                log::info!("Balance now {}", self.balance);
                Some(self.balance)
            }
        }
    }

    fn commit(&mut self, balance: u64) {
        self.balance = balance;
        self.displayed = balance as f64;
    }
}
