use crate::{
    error::{Result, WheelError},
    segment::SegmentTable,
    wheel::SpinMode,
};

const RANDOM_LABEL: &str = "Random";
const WEIGHTED_LABEL: &str = "Weighted";

/// Developer panel for forcing spin outcomes.
#[derive(Debug, Clone)]
pub struct CheatPanel {
    /// Segment values, for labels and id validation
    values: Vec<u32>,
    selection: SpinMode,
    open: bool,
    enabled: bool,
}

impl CheatPanel {
    /// A closed, enabled panel defaulting to the weighted draw.
    pub fn new(table: &SegmentTable) -> CheatPanel {
        CheatPanel { values: table.values(), selection: SpinMode::Weighted, open: false, enabled: true }
    }

    pub fn selection(&self) -> SpinMode {
        self.selection
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn select(&mut self, mode: SpinMode) -> Result<()> {
        if !self.enabled {
            return Err(WheelError::CheatsDisabled);
        }
        if let SpinMode::Forced(id) = mode {
            if id >= self.values.len() {
                return Err(WheelError::UnknownSegment { id, count: self.values.len() });
            }
        }
        log::debug!("Cheat set to {}", mode);
        self.selection = mode;
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<bool> {
        if !self.enabled {
            return Err(WheelError::CheatsDisabled);
        }
        self.open = !self.open;
        Ok(self.open)
    }

    /// Disabling also closes the popup. The selection is kept.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled && self.open {
            self.open = false;
        }
        self.enabled = enabled;
    }

    pub fn label(&self) -> String {
        self.label_for(self.selection)
    }

    fn label_for(&self, mode: SpinMode) -> String {
        match mode {
            SpinMode::Uniform => RANDOM_LABEL.to_string(),
            SpinMode::Weighted => WEIGHTED_LABEL.to_string(),
            SpinMode::Forced(id) => self.values[id].to_string(),
        }
    }

    /// Every selectable cheat in panel order: one per segment, then Random,
    /// then Weighted.
    pub fn options(&self) -> Vec<(SpinMode, String)> {
        (0..self.values.len())
            .map(SpinMode::Forced)
            .chain([SpinMode::Uniform, SpinMode::Weighted])
            .map(|mode| (mode, self.label_for(mode)))
            .collect()
    }
}
