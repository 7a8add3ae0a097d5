use std::fmt::Display;

use crate::error::{Result, WheelError};

/// One wedge of the wheel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
  /// Position in the table, 0-based.
  pub id: usize,
  /// Prize paid out when the wheel stops here.
  pub value: u32,
  /// Relative probability mass for the weighted draw.
  pub weighting: f64,
  /// Fixed offset on the wheel in degrees, -(id * 360/N). Negative so that
  /// rotating the wheel forward by -angle brings this wedge to the pointer.
  pub angle: f64,
}

impl Display for Segment {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Segment({}, {}, {}, {})", self.id, self.value, self.weighting, self.angle)
  }
}

/// The wheel's segments, fixed after construction.
#[derive(Clone, Debug)]
pub struct SegmentTable {
  segments: Vec<Segment>,
  /// Arc covered by each segment, in degrees
  width: f64,
}

impl SegmentTable {
  /// Builds one segment per (value, weighting) pair, preserving input order.
  pub fn new(prizes: &[(u32, f64)], segment_count: usize) -> Result<SegmentTable> {
    if segment_count == 0 {
      return Err(WheelError::EmptyTable);
    }
    if prizes.len() != segment_count {
      return Err(WheelError::SegmentCountMismatch { expected: segment_count, found: prizes.len() });
    }

    let width = 360. / segment_count as f64;
    let mut segments = Vec::with_capacity(segment_count);
    for (id, &(value, weighting)) in prizes.iter().enumerate() {
      if !weighting.is_finite() || weighting <= 0. {
        return Err(WheelError::InvalidWeight { index: id, weight: weighting });
      }
      segments.push(Segment { id, value, weighting, angle: -(id as f64 * width) });
    }
    log::debug!("Built {} segments of {} degrees", segment_count, width);
    Ok(SegmentTable { segments, width })
  }

  pub fn segments(&self) -> &[Segment] {
    &self.segments
  }

  pub fn get(&self, id: usize) -> Result<&Segment> {
    self.segments.get(id).ok_or(WheelError::UnknownSegment { id, count: self.segments.len() })
  }

  pub fn len(&self) -> usize {
    self.segments.len()
  }

  pub fn is_empty(&self) -> bool {
    self.segments.is_empty()
  }

  /// Arc per segment, in degrees.
  pub fn segment_width(&self) -> f64 {
    self.width
  }

  pub fn values(&self) -> Vec<u32> {
    self.segments.iter().map(|s| s.value).collect()
  }

  pub fn weights(&self) -> Vec<f64> {
    self.segments.iter().map(|s| s.weighting).collect()
  }

  /// Returns the id of the segment under the pointer for a wheel rotation in
  /// degrees. Any real input is accepted; non-finite input maps to 0.
  ///
  /// Rotating the wheel by `d` brings the wedge centred at `-d` under the
  /// pointer. Each segment owns the half-open arc [centre - w/2, centre + w/2)
  /// in pointer space, so the lookup wraps cleanly at 0/360.
  pub fn segment_at(&self, degrees: f64) -> usize {
    let offset = pos_mod(self.width / 2. - degrees);
    // NaN casts to 0
    (offset / self.width) as usize % self.segments.len()
  }
}

/// Reduces an angle in degrees to [0, 360).
pub fn pos_mod(degrees: f64) -> f64 {
  let d = degrees.rem_euclid(360.);
  // rem_euclid can round up to exactly 360 for tiny negative inputs
  if d >= 360. {
    0.
  } else {
    d
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn table() -> SegmentTable {
    let prizes = [
      (5000, 4.),
      (200, 100.),
      (1000, 20.),
      (400, 50.),
      (2000, 10.),
      (200, 100.),
      (1000, 20.),
      (400, 50.),
    ];
    SegmentTable::new(&prizes, 8).unwrap()
  }

  #[test]
  fn builds_evenly_spaced_segments() {
    for n in 1..=24 {
      let prizes = vec![(100, 1.); n];
      let t = SegmentTable::new(&prizes, n).unwrap();
      assert_eq!(t.len(), n);
      let width = 360. / n as f64;
      for (i, s) in t.segments().iter().enumerate() {
        assert_eq!(s.id, i);
        assert!((s.angle + i as f64 * width).abs() < 1e-9);
      }
      // Arcs add up to the full circle
      let span: f64 = t.segments().windows(2).map(|w| (w[1].angle - w[0].angle).abs()).sum::<f64>() + width;
      assert!((span - 360.).abs() < 1e-9);
    }
  }

  #[test]
  fn rejects_mismatched_prize_list() {
    let prizes = [(1, 1.), (2, 1.)];
    assert_eq!(
      SegmentTable::new(&prizes, 3).unwrap_err(),
      WheelError::SegmentCountMismatch { expected: 3, found: 2 }
    );
    assert_eq!(SegmentTable::new(&[], 0).unwrap_err(), WheelError::EmptyTable);
    assert_eq!(
      SegmentTable::new(&[(1, 1.), (2, 0.)], 2).unwrap_err(),
      WheelError::InvalidWeight { index: 1, weight: 0. }
    );
  }

  #[test]
  fn segment_angle_maps_back_to_itself() {
    let t = table();
    for s in t.segments() {
      assert_eq!(t.segment_at(s.angle), s.id);
      assert_eq!(t.segment_at(s.angle + 5. * 360.), s.id);
      // Anywhere strictly inside the arc
      assert_eq!(t.segment_at(s.angle + 22.), s.id);
      assert_eq!(t.segment_at(s.angle - 22.), s.id);
    }
  }

  #[test]
  fn lookup_is_total_and_circular() {
    let t = table();
    // Boundaries fall on x.5 degrees; these samples stay 0.05 clear of them
    for m in 0..5_700 {
      let d = -1999.95 + 0.7 * m as f64;
      let id = t.segment_at(d);
      assert!(id < t.len());
      for k in -3..=3 {
        assert_eq!(t.segment_at(d + 360. * k as f64), id, "rotation {} turn {}", d, k);
      }
    }
    assert_eq!(t.segment_at(f64::NAN), 0);
    assert_eq!(t.segment_at(f64::INFINITY), 0);
  }

  #[test]
  fn wrap_boundary_is_half_open() {
    let t = table();
    // Rotation 22.5 sits exactly on the 0/7 boundary and belongs to 0
    assert_eq!(t.segment_at(22.5), 0);
    assert_eq!(t.segment_at(22.6), 7);
    assert_eq!(t.segment_at(22.4), 0);
    assert_eq!(t.segment_at(-22.4), 0);
    assert_eq!(t.segment_at(-22.5), 1);
    assert_eq!(t.segment_at(360.), 0);
    assert_eq!(t.segment_at(-1e-12), 0);
  }

  #[test]
  fn pos_mod_stays_in_range() {
    assert_eq!(pos_mod(-90.), 270.);
    assert_eq!(pos_mod(720.), 0.);
    assert!(pos_mod(-1e-20) < 360.);
  }
}
