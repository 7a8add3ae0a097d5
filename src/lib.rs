pub mod animation;
pub mod balance;
pub mod cheats;
pub mod draw;
pub mod error;
pub mod params;
pub mod round;
pub mod segment;
pub mod sound;
pub mod wheel;

pub use error::{Result, WheelError};
pub use params::{Params, DEFAULT_PARAMS};
pub use wheel::{SpinMode, SpinOutcome, SpinState, Wheel, WheelEvent};
