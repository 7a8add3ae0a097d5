use std::{f64::consts::TAU, fmt::Display, str::FromStr, time::Duration};

use crossbeam::channel::{self, Receiver, Sender};
use rand::Rng;

use crate::{
    animation::{AnimationDriver, AnimationEvent, AnimationKey, AnimationRequest, Easing},
    draw::{uniform_index, WeightedDraw},
    error::{Result, WheelError},
    params::Params,
    segment::{Segment, SegmentTable},
    sound::Sound,
};

/// How the winning segment of a spin is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SpinMode {
    /// Weighted draw over segment weightings
    #[default]
    Weighted,
    /// Uniform over segments, ignoring weightings
    Uniform,
    /// Always land on this segment id
    Forced(usize),
}

impl FromStr for SpinMode {
    type Err = WheelError;

    fn from_str(s: &str) -> Result<SpinMode> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weighted" => Ok(SpinMode::Weighted),
            "random" | "uniform" => Ok(SpinMode::Uniform),
            other => other
                .parse::<usize>()
                .map(SpinMode::Forced)
                .map_err(|_| WheelError::InvalidCheat(s.to_string())),
        }
    }
}

impl Display for SpinMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpinMode::Weighted => write!(f, "weighted"),
            SpinMode::Uniform => write!(f, "random"),
            SpinMode::Forced(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpinState {
    Idle,
    Spinning,
    Resolved,
}

/// Result of one spin, alive from the spin request until reset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinOutcome {
    pub segment: Segment,
    /// Final wheel rotation in radians, jitter included
    pub target_rotation: f64,
    /// Signed jitter in radians, |jitter| <= max variance
    pub jitter: f64,
}

/// Notifications from the wheel to the enclosing screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WheelEvent {
    /// The segment under the pointer changed.
    Tick { segment: usize, sound: Sound },
    /// The wheel came to rest.
    Landed { sound: Sound },
    /// The spin is over and `value` was won.
    Resolved { segment: usize, value: u32 },
}

/// The prize wheel: picks a winner, asks the animation driver to turn the
/// wheel onto it, and reports segment changes and the result.
///
/// Rotations are kept in radians; degrees only appear at the segment lookup.
pub struct Wheel<R: Rng> {
    table: SegmentTable,
    draw: WeightedDraw,

    full_rotations: u32,
    max_variance_deg: f64,
    spin_duration: Duration,

    rng: R,

    state: SpinState,
    /// Current wheel rotation (radians)
    rotation: f64,
    /// Rotation at the previous frame, for boundary detection
    previous_rotation: f64,
    outcome: Option<SpinOutcome>,
    /// The one animation this wheel owns, if running
    animation: Option<AnimationKey>,

    events: Sender<WheelEvent>,
}

impl<R: Rng> Wheel<R> {
    /// Builds the wheel from `params`. Notifications arrive on the returned
    /// receiver.
    pub fn new(params: &Params, rng: R) -> Result<(Wheel<R>, Receiver<WheelEvent>)> {
        params.validate()?;
        let table = SegmentTable::new(&params.prizes, params.segment_count)?;
        let draw = WeightedDraw::new(&table.weights())?;
        let (tx, rx) = channel::unbounded();
        let wheel = Wheel {
            table,
            draw,
            full_rotations: params.full_rotations,
            max_variance_deg: params.max_variance_deg,
            spin_duration: params.spin_duration,
            rng,
            state: SpinState::Idle,
            rotation: 0.,
            previous_rotation: 0.,
            outcome: None,
            animation: None,
            events: tx,
        };
        Ok((wheel, rx))
    }

    pub fn table(&self) -> &SegmentTable {
        &self.table
    }

    pub fn state(&self) -> SpinState {
        self.state
    }

    /// Current rotation in radians.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn outcome(&self) -> Option<&SpinOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Segment under the pointer right now.
    pub fn current_segment(&self) -> usize {
        self.table.segment_at(self.rotation.to_degrees())
    }

    /// Starts a spin. Only valid from idle: a running spin is `Busy`, a
    /// resolved one must be reset first.
    pub fn spin(&mut self, mode: SpinMode, driver: &mut dyn AnimationDriver) -> Result<SpinOutcome> {
        match self.state {
            SpinState::Idle => {}
            SpinState::Spinning => {
                log::warn!("Spin requested while spinning; rejecting");
                return Err(WheelError::Busy);
            }
            SpinState::Resolved => {
                log::warn!("Spin requested before reset; rejecting");
                return Err(WheelError::AwaitingReset);
            }
        }

        let segment = *self.resolve_segment(mode)?;

        // Never leave a second writer on the rotation
        if let Some(handle) = self.animation.take() {
            driver.cancel(handle);
        }
        self.rotation = 0.;
        self.previous_rotation = 0.;

        let turns = segment.angle + self.full_rotations as f64 * 360.;
        let sign = if self.rng.gen_bool(0.5) { 1. } else { -1. };
        let jitter = (sign * self.rng.gen::<f64>() * self.max_variance_deg).to_radians();
        let target_rotation = turns.to_radians() + jitter;

        let outcome = SpinOutcome { segment, target_rotation, jitter };
        let handle = driver.animate(AnimationRequest {
            from: 0.,
            to: target_rotation,
            duration: self.spin_duration,
            easing: Easing::CircInOut,
        });
        log::info!(
            "Spinning ({}) to segment {} (value {}), target {:.4} rad, jitter {:.2} deg",
            mode,
            segment.id,
            segment.value,
            target_rotation,
            jitter.to_degrees()
        );

        self.animation = Some(handle);
        self.outcome = Some(outcome);
        self.state = SpinState::Spinning;
        Ok(outcome)
    }

    fn resolve_segment(&mut self, mode: SpinMode) -> Result<&Segment> {
        let id = match mode {
            SpinMode::Weighted => self.draw.sample(&mut self.rng),
            SpinMode::Uniform => uniform_index(self.table.len(), &mut self.rng)?,
            SpinMode::Forced(id) => id,
        };
        self.table.get(id)
    }

    /// Feeds a driver callback to the wheel. Returns false if the event
    /// belongs to an animation this wheel no longer owns.
    pub fn handle(&mut self, event: AnimationEvent) -> bool {
        if self.animation != Some(event.handle()) {
            log::debug!("Ignoring event for stale animation {:?}", event.handle());
            return false;
        }
        match event {
            AnimationEvent::Update { value, .. } => self.check_next_segment(value),
            AnimationEvent::Complete { .. } => self.complete_spin(),
        }
        true
    }

    fn check_next_segment(&mut self, rotation: f64) {
        self.rotation = rotation;
        let segment = self.table.segment_at(rotation.to_degrees());
        if segment != self.table.segment_at(self.previous_rotation.to_degrees()) {
            log::trace!("Pointer crossed into segment {}", segment);
            self.emit(WheelEvent::Tick { segment, sound: Sound::Click });
        }
        self.previous_rotation = rotation;
    }

    fn complete_spin(&mut self) {
        self.animation = None;
        let Some(outcome) = self.outcome else {
            log::warn!("Animation completed without a spin outcome");
            self.state = SpinState::Idle;
            return;
        };
        // Keep the rotation bounded across spins
        self.rotation = outcome.target_rotation.rem_euclid(TAU);
        self.previous_rotation = self.rotation;
        self.state = SpinState::Resolved;

        log::info!("Landed on segment {}; won {}", outcome.segment.id, outcome.segment.value);
        self.emit(WheelEvent::Landed { sound: Sound::Landing });
        self.emit(WheelEvent::Resolved { segment: outcome.segment.id, value: outcome.segment.value });
    }

    /// Returns to idle from any state, cancelling a running animation.
    pub fn reset(&mut self, driver: &mut dyn AnimationDriver) {
        if let Some(handle) = self.animation.take() {
            log::debug!("Reset during spin; cancelling animation {:?}", handle);
            driver.cancel(handle);
        }
        self.outcome = None;
        self.rotation = 0.;
        self.previous_rotation = 0.;
        self.state = SpinState::Idle;
    }

    fn emit(&self, event: WheelEvent) {
        if self.events.send(event).is_err() {
            log::debug!("No listener for {:?}", event);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::SmallRng, SeedableRng};
    use slotmap::SlotMap;

    use super::*;
    use crate::{animation::FrameDriver, params::DEFAULT_PARAMS};

    const FRAME: Duration = Duration::from_millis(16);

    fn wheel(seed: u64) -> (Wheel<SmallRng>, Receiver<WheelEvent>) {
        Wheel::new(&DEFAULT_PARAMS, SmallRng::seed_from_u64(seed)).unwrap()
    }

    fn run(wheel: &mut Wheel<SmallRng>, driver: &mut FrameDriver) {
        while !driver.is_idle() {
            for event in driver.step(FRAME) {
                wheel.handle(event);
            }
        }
    }

    #[test]
    fn forced_spin_lands_on_segment() {
        let (mut wheel, rx) = wheel(1);
        let mut driver = FrameDriver::new();
        let outcome = wheel.spin(SpinMode::Forced(4), &mut driver).unwrap();
        assert_eq!(outcome.segment.value, 2000);

        let full = DEFAULT_PARAMS.full_rotations as f64 * 360.;
        let expected = (-180. + full).to_radians() + outcome.jitter;
        assert!((outcome.target_rotation - expected).abs() < 1e-12);
        assert!(outcome.jitter.abs() <= DEFAULT_PARAMS.max_variance_deg.to_radians());

        run(&mut wheel, &mut driver);
        assert_eq!(wheel.state(), SpinState::Resolved);
        assert_eq!(wheel.current_segment(), 4);
        assert!(wheel.rotation() >= 0. && wheel.rotation() < TAU);

        let events: Vec<_> = rx.try_iter().collect();
        let resolved: Vec<_> = events.iter().filter(|e| matches!(e, WheelEvent::Resolved { .. })).collect();
        assert_eq!(resolved, vec![&WheelEvent::Resolved { segment: 4, value: 2000 }]);
        assert!(matches!(events[events.len() - 2], WheelEvent::Landed { sound: Sound::Landing }));
    }

    #[test]
    fn rejects_spin_while_spinning_or_resolved() {
        let (mut wheel, _rx) = wheel(2);
        let mut driver = FrameDriver::new();
        wheel.spin(SpinMode::Weighted, &mut driver).unwrap();
        assert_eq!(wheel.spin(SpinMode::Weighted, &mut driver), Err(WheelError::Busy));
        assert_eq!(driver.active(), 1);

        run(&mut wheel, &mut driver);
        assert_eq!(wheel.spin(SpinMode::Uniform, &mut driver), Err(WheelError::AwaitingReset));

        wheel.reset(&mut driver);
        assert!(wheel.spin(SpinMode::Uniform, &mut driver).is_ok());
    }

    #[test]
    fn unknown_forced_segment_leaves_wheel_idle() {
        let (mut wheel, _rx) = wheel(3);
        let mut driver = FrameDriver::new();
        assert_eq!(
            wheel.spin(SpinMode::Forced(8), &mut driver),
            Err(WheelError::UnknownSegment { id: 8, count: 8 })
        );
        assert_eq!(wheel.state(), SpinState::Idle);
        assert!(driver.is_idle());
    }

    /// Hands out keys and remembers the last request, so a test can feed the
    /// wheel its own rotation values.
    #[derive(Default)]
    struct Recorder {
        requests: SlotMap<AnimationKey, AnimationRequest>,
        last: Option<AnimationKey>,
    }

    impl AnimationDriver for Recorder {
        fn animate(&mut self, request: AnimationRequest) -> AnimationKey {
            let key = self.requests.insert(request);
            self.last = Some(key);
            key
        }

        fn cancel(&mut self, handle: AnimationKey) {
            self.requests.remove(handle);
        }
    }

    #[test]
    fn ticks_once_per_segment_change() {
        let (mut wheel, rx) = wheel(4);
        let mut driver = Recorder::default();
        let outcome = wheel.spin(SpinMode::Forced(2), &mut driver).unwrap();
        let handle = driver.last.unwrap();
        assert_eq!(driver.requests[handle].to, outcome.target_rotation);

        // Sweep 0 -> target linearly, well under one segment per update
        let target_deg = outcome.target_rotation.to_degrees();
        let steps = (target_deg / 0.37).ceil() as usize;
        for i in 1..=steps {
            let deg = target_deg * i as f64 / steps as f64;
            wheel.handle(AnimationEvent::Update { handle, value: deg.to_radians() });
        }
        wheel.handle(AnimationEvent::Complete { handle });

        // Boundaries sit at 22.5 + 45k degrees; 5 turns to segment 2 is 1710
        // deg give or take 20 deg of jitter
        let crossings = ((target_deg - 22.5) / 45.).ceil() as usize;
        assert_eq!(crossings, 38);

        let ticks: Vec<usize> = rx
            .try_iter()
            .filter_map(|e| match e {
                WheelEvent::Tick { segment, .. } => Some(segment),
                _ => None,
            })
            .collect();
        assert_eq!(ticks.len(), crossings);
        // The pointer walks backwards through the ids: 7, 6, ... 0, 7, ...
        for (i, &segment) in ticks.iter().enumerate() {
            assert_eq!(segment, (8 - (i + 1) % 8) % 8);
        }
        assert_eq!(ticks.last(), Some(&2));
        assert_eq!(wheel.state(), SpinState::Resolved);
    }

    #[test]
    fn reset_restores_initial_state() {
        let (mut wheel, _rx) = wheel(5);
        let mut driver = FrameDriver::new();
        wheel.spin(SpinMode::Weighted, &mut driver).unwrap();
        run(&mut wheel, &mut driver);

        for _ in 0..2 {
            wheel.reset(&mut driver);
            assert_eq!(wheel.state(), SpinState::Idle);
            assert_eq!(wheel.rotation(), 0.);
            assert!(wheel.outcome().is_none());
            assert!(!wheel.is_animating());
        }
    }

    #[test]
    fn reset_mid_spin_silences_old_animation() {
        let (mut wheel, rx) = wheel(6);
        let mut driver = FrameDriver::new();
        wheel.spin(SpinMode::Forced(1), &mut driver).unwrap();
        let stale = driver.step(FRAME);
        wheel.reset(&mut driver);
        assert!(driver.is_idle());

        // Late callbacks from the cancelled animation are dropped
        for event in stale {
            assert!(!wheel.handle(event));
        }
        wheel.spin(SpinMode::Forced(3), &mut driver).unwrap();
        run(&mut wheel, &mut driver);
        let resolved: Vec<_> = rx.try_iter().filter(|e| matches!(e, WheelEvent::Resolved { .. })).collect();
        assert_eq!(resolved, vec![WheelEvent::Resolved { segment: 3, value: 400 }]);
    }

    #[test]
    fn parses_spin_modes() {
        assert_eq!("weighted".parse::<SpinMode>(), Ok(SpinMode::Weighted));
        assert_eq!("Random".parse::<SpinMode>(), Ok(SpinMode::Uniform));
        assert_eq!("4".parse::<SpinMode>(), Ok(SpinMode::Forced(4)));
        assert!(matches!("jackpot".parse::<SpinMode>(), Err(WheelError::InvalidCheat(_))));
    }
}
