use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
  /// Handle to one running animation. Keys are never reused, so a handle to a
  /// cancelled or finished animation cannot alias a newer one.
  pub struct AnimationKey;
}

/// Easing curves used by the game.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Easing {
  Linear,
  /// Slow start, fast middle, slow stop (wheel spin)
  CircInOut,
  /// Fast start, long tail (balance count-up)
  Power3Out,
}

impl Easing {
  /// Maps progress in [0, 1] to eased progress in [0, 1].
  pub fn apply(&self, t: f64) -> f64 {
    let t = t.clamp(0., 1.);
    match self {
      Easing::Linear => t,
      Easing::CircInOut => {
        if t < 0.5 {
          (1. - (1. - (2. * t).powi(2)).sqrt()) / 2.
        } else {
          ((1. - (2. - 2. * t).powi(2)).sqrt() + 1.) / 2.
        }
      }
      Easing::Power3Out => 1. - (1. - t).powi(3),
    }
  }
}

/// "Animate a value from `from` to `to` over `duration`."
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationRequest {
  pub from: f64,
  pub to: f64,
  pub duration: Duration,
  pub easing: Easing,
}

/// Callbacks from a driver back to whoever commissioned the animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimationEvent {
  /// New instantaneous value, once per frame.
  Update { handle: AnimationKey, value: f64 },
  /// Sent once, after the final update.
  Complete { handle: AnimationKey },
}

impl AnimationEvent {
  pub fn handle(&self) -> AnimationKey {
    match *self {
      AnimationEvent::Update { handle, .. } => handle,
      AnimationEvent::Complete { handle } => handle,
    }
  }
}

/// Host-side animation engine. The wheel only starts and cancels animations;
/// the host forwards the resulting [`AnimationEvent`]s back to it.
pub trait AnimationDriver {
  fn animate(&mut self, request: AnimationRequest) -> AnimationKey;
  /// Stops an animation. No further events are produced for it. Cancelling an
  /// unknown or finished handle is a no-op.
  fn cancel(&mut self, handle: AnimationKey);
}

struct Tween {
  request: AnimationRequest,
  elapsed: Duration,
}

/// Fixed-step driver for headless hosts: every call to [`FrameDriver::step`]
/// is one frame.
#[derive(Default)]
pub struct FrameDriver {
  tweens: SlotMap<AnimationKey, Tween>,
}

impl FrameDriver {
  pub fn new() -> FrameDriver {
    FrameDriver { tweens: SlotMap::with_key() }
  }

  /// Number of live animations.
  pub fn active(&self) -> usize {
    self.tweens.len()
  }

  pub fn is_idle(&self) -> bool {
    self.tweens.is_empty()
  }

  /// Advances every live animation by `dt`, returning an update per animation
  /// and a completion for each one that reached its end. The last update of a
  /// finished animation carries exactly its target value.
  pub fn step(&mut self, dt: Duration) -> Vec<AnimationEvent> {
    let mut events = Vec::with_capacity(self.tweens.len());
    let mut finished = Vec::new();
    for (handle, tween) in self.tweens.iter_mut() {
      tween.elapsed += dt;
      let req = &tween.request;
      let progress = if req.duration.is_zero() {
        1.
      } else {
        (tween.elapsed.as_secs_f64() / req.duration.as_secs_f64()).min(1.)
      };
      let value = if progress >= 1. {
        req.to
      } else {
        req.from + (req.to - req.from) * req.easing.apply(progress)
      };
      log::trace!("Animation {:?} at {:.3} -> {}", handle, progress, value);
      events.push(AnimationEvent::Update { handle, value });
      if progress >= 1. {
        finished.push(handle);
      }
    }
    for handle in finished {
      self.tweens.remove(handle);
      events.push(AnimationEvent::Complete { handle });
    }
    events
  }
}

impl AnimationDriver for FrameDriver {
  fn animate(&mut self, request: AnimationRequest) -> AnimationKey {
    let handle = self.tweens.insert(Tween { request, elapsed: Duration::ZERO });
    log::debug!("Started animation {:?}: {:?}", handle, request);
    handle
  }

  fn cancel(&mut self, handle: AnimationKey) {
    if self.tweens.remove(handle).is_some() {
      log::debug!("Cancelled animation {:?}", handle);
    }
  }
}
