use std::fmt::Display;
use std::time::Duration;

use lazy_static::lazy_static;

use crate::error::{Result, WheelError};

lazy_static! {
  pub static ref DEFAULT_PARAMS: Params = Params {
    // Wedges on the wheel
    segment_count: 8,
    // (value, weighting) per wedge, in wheel order
    prizes: vec![
      (5000, 4.),
      (200, 100.),
      (1000, 20.),
      (400, 50.),
      (2000, 10.),
      (200, 100.),
      (1000, 20.),
      (400, 50.),
    ],

    // Whole turns added on top of the winning angle
    full_rotations: 5,
    // Must stay below half a segment (22.5 deg for 8) to land inside the winner
    max_variance_deg: 20.,
    spin_duration: Duration::from_millis(5_000),

    // Credits per second for the balance count-up
    countup_rate: 200.,
  };
}

/// Wheel configuration, supplied by the caller and never hardcoded in the
/// wheel itself.
#[derive(Clone, Debug, PartialEq)]
pub struct Params {
    /// Number of segments (wedges) on the wheel
    pub segment_count: usize,
    /// Ordered (prize value, weighting) pairs, one per segment
    pub prizes: Vec<(u32, f64)>,

    /// Extra whole turns per spin
    pub full_rotations: u32,
    /// Maximum jitter either side of the segment centre, in degrees
    pub max_variance_deg: f64,
    /// Duration of the spin animation
    pub spin_duration: Duration,

    /// How fast the balance counts up, in credits per second
    pub countup_rate: f64,
}

impl Params {
    /// Checks the scalar parameters. The prize table itself is validated when
    /// the segment table is built.
    pub fn validate(&self) -> Result<()> {
        if self.segment_count == 0 {
            return Err(WheelError::EmptyTable);
        }
        if !self.max_variance_deg.is_finite() || self.max_variance_deg < 0. {
            return Err(WheelError::InvalidParams(format!(
                "max_variance_deg must be a non-negative number, got {}",
                self.max_variance_deg
            )));
        }
        if !self.countup_rate.is_finite() || self.countup_rate <= 0. {
            return Err(WheelError::InvalidParams(format!(
                "countup_rate must be positive, got {}",
                self.countup_rate
            )));
        }
        // Jitter must keep the wheel inside the winning segment
        let half_segment = 180. / self.segment_count as f64;
        if self.max_variance_deg >= half_segment {
            return Err(WheelError::InvalidParams(format!(
                "max_variance_deg {} must stay below half a segment ({})",
                self.max_variance_deg, half_segment
            )));
        }
        let largest = self.prizes.iter().map(|&(v, _)| v).max().unwrap_or(0);
        if Duration::try_from_secs_f64(largest as f64 / self.countup_rate).is_err() {
            return Err(WheelError::InvalidParams(format!(
                "countup_rate {} is too slow to count up a prize of {}",
                self.countup_rate, largest
            )));
        }
        Ok(())
    }

    pub fn values(&self) -> Vec<u32> {
        self.prizes.iter().map(|&(v, _)| v).collect()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.prizes.iter().map(|&(_, w)| w).collect()
    }
}

impl Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===== Prize Wheel Parameters =====")?;
        writeln!(f, "\t - segment_count (wedges): {}", self.segment_count)?;
        for (i, (value, weight)) in self.prizes.iter().enumerate() {
            writeln!(f, "\t - segment {}: value {}, weighting {}", i, value, weight)?;
        }
        writeln!(
            f,
            "\t - full_rotations (whole turns per spin): {}",
            self.full_rotations
        )?;
        writeln!(
            f,
            "\t - max_variance_deg (landing jitter): {}",
            self.max_variance_deg
        )?;
        writeln!(
            f,
            "\t - spin_duration (animation length): {:?}",
            self.spin_duration
        )?;
        writeln!(f, "\t - countup_rate (credits/s): {}", self.countup_rate)
    }
}
