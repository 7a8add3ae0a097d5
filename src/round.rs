use crossbeam::channel::Receiver;
use rand::Rng;

use crate::{
    animation::{AnimationDriver, AnimationEvent},
    balance::CreditBalance,
    cheats::CheatPanel,
    error::{Result, WheelError},
    params::Params,
    sound::{Sound, SoundBoard},
    wheel::{SpinOutcome, Wheel, WheelEvent},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPhase {
    /// Waiting for the player to spin
    Ready,
    Spinning,
    /// Prize is being added to the balance
    CountingUp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    Pending,
    Finished { won: u32, balance: u64 },
}

/// One play cycle: spin, count the prize into the balance, reset the wheel.
/// Cheats can only be changed between rounds.
pub struct Round<R: Rng> {
    wheel: Wheel<R>,
    wheel_events: Receiver<WheelEvent>,
    balance: CreditBalance,
    cheats: CheatPanel,
    phase: RoundPhase,
    won: u32,
}

impl<R: Rng> Round<R> {
    pub fn new(params: &Params, rng: R) -> Result<Round<R>> {
        let (wheel, wheel_events) = Wheel::new(params, rng)?;
        let cheats = CheatPanel::new(wheel.table());
        Ok(Round {
            wheel,
            wheel_events,
            balance: CreditBalance::new(params.countup_rate),
            cheats,
            phase: RoundPhase::Ready,
            won: 0,
        })
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn wheel(&self) -> &Wheel<R> {
        &self.wheel
    }

    pub fn balance(&self) -> &CreditBalance {
        &self.balance
    }

    pub fn cheats(&self) -> &CheatPanel {
        &self.cheats
    }

    pub fn cheats_mut(&mut self) -> &mut CheatPanel {
        &mut self.cheats
    }

    /// Spins the wheel using the cheat panel's selection.
    pub fn start(&mut self, driver: &mut dyn AnimationDriver) -> Result<SpinOutcome> {
        if self.phase != RoundPhase::Ready {
            log::warn!("Round already in progress ({:?})", self.phase);
            return Err(WheelError::Busy);
        }
        self.cheats.set_enabled(false);
        match self.wheel.spin(self.cheats.selection(), driver) {
            Ok(outcome) => {
                self.phase = RoundPhase::Spinning;
                Ok(outcome)
            }
            Err(e) => {
                self.cheats.set_enabled(true);
                Err(e)
            }
        }
    }

    /// Routes a driver callback to the wheel or the balance and reacts to
    /// whatever they report.
    pub fn handle(
        &mut self,
        event: AnimationEvent,
        driver: &mut dyn AnimationDriver,
        sounds: &mut dyn SoundBoard,
    ) -> RoundStatus {
        if self.wheel.handle(event) {
            let events: Vec<WheelEvent> = self.wheel_events.try_iter().collect();
            for wheel_event in events {
                match wheel_event {
                    WheelEvent::Tick { sound, .. } => sounds.play(sound, false),
                    WheelEvent::Landed { sound } => sounds.play(sound, false),
                    WheelEvent::Resolved { value, .. } => {
                        self.won = value;
                        self.phase = RoundPhase::CountingUp;
                        sounds.play(Sound::Countup, true);
                        if self.balance.add(value, driver).is_none() {
                            return self.finish(driver, sounds);
                        }
                    }
                }
            }
            return RoundStatus::Pending;
        }
        if self.balance.handle(event).is_some() {
            return self.finish(driver, sounds);
        }
        RoundStatus::Pending
    }

    fn finish(&mut self, driver: &mut dyn AnimationDriver, sounds: &mut dyn SoundBoard) -> RoundStatus {
        sounds.stop(Sound::Countup);
        sounds.play(Sound::Landing, false);
        self.wheel.reset(driver);
        self.cheats.set_enabled(true);
        self.phase = RoundPhase::Ready;
        log::info!("Round over: won {}, balance {}", self.won, self.balance.balance());
        RoundStatus::Finished { won: self.won, balance: self.balance.balance() }
    }
}
