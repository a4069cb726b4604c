//! Band crossing detection with sticky notification latches.
//!
//! A latch stays set while the price lingers at or past a threshold so repeated
//! samples do not spam the chat. It re-arms when the price comes back inside
//! the band, or when the opposite threshold fires.

use token_monitor_core::PriceBand;

/// A threshold crossing worth notifying about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    ReachedLow,
    ReachedHigh,
}

/// Per-symbol tracker state. In-memory only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackerState {
    pub last_price: Option<f64>,
    pub low_notified: bool,
    pub high_notified: bool,
}

/// Threshold tracker for a single symbol.
#[derive(Debug, Clone)]
pub struct ThresholdTracker {
    band: PriceBand,
    state: TrackerState,
}

impl ThresholdTracker {
    pub fn new(band: PriceBand) -> Self {
        Self {
            band,
            state: TrackerState::default(),
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Clear both latches. The last price is kept.
    pub fn reset_latches(&mut self) {
        self.state.low_notified = false;
        self.state.high_notified = false;
    }

    /// Replace the band. Returns true (and resets the latches) if it changed.
    pub fn set_band(&mut self, band: PriceBand) -> bool {
        if band == self.band {
            return false;
        }
        self.band = band;
        self.reset_latches();
        true
    }

    /// Evaluate a new price sample.
    pub fn observe(&mut self, price: f64) -> Option<Crossing> {
        let low = self.band.low();
        let high = self.band.high();
        let last = self.state.last_price;
        let mut crossing = None;

        if price <= low {
            // Fresh crossing, or a repeat only if the previous sample was above low
            if !self.state.low_notified || last.is_some_and(|p| p > low) {
                self.state.low_notified = true;
                self.state.high_notified = false;
                crossing = Some(Crossing::ReachedLow);
            }
        } else if price >= high {
            if !self.state.high_notified || last.is_some_and(|p| p < high) {
                self.state.high_notified = true;
                self.state.low_notified = false;
                crossing = Some(Crossing::ReachedHigh);
            }
        } else if let Some(last) = last {
            // Back inside the band: re-arm the latch for the side we came from
            if last <= low {
                self.state.low_notified = false;
            } else if last >= high {
                self.state.high_notified = false;
            }
        }

        self.state.last_price = Some(price);
        crossing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn band(low: f64, high: f64) -> PriceBand {
        PriceBand::new(low, high).unwrap()
    }

    fn fire_indices(tracker: &mut ThresholdTracker, prices: &[f64]) -> Vec<(usize, Crossing)> {
        prices
            .iter()
            .enumerate()
            .filter_map(|(i, &p)| tracker.observe(p).map(|c| (i, c)))
            .collect()
    }

    #[test]
    fn test_fires_only_on_fresh_crossings() {
        let (low, high) = (10.0, 20.0);
        let mid = 15.0;
        let mut tracker = ThresholdTracker::new(band(low, high));

        let fired = fire_indices(
            &mut tracker,
            &[high + 1.0, high + 1.0, mid, low - 1.0, low - 1.0, mid, high + 1.0],
        );

        assert_eq!(
            fired,
            vec![
                (0, Crossing::ReachedHigh),
                (3, Crossing::ReachedLow),
                (6, Crossing::ReachedHigh),
            ]
        );
    }

    #[test]
    fn test_kori_scenario() {
        let mut tracker = ThresholdTracker::new(band(0.00237, 0.00355));

        assert_eq!(tracker.observe(0.00400), Some(Crossing::ReachedHigh));
        for _ in 0..3 {
            assert_eq!(tracker.observe(0.00400), None);
        }
        // High latch was set; the drop resets it and fires low
        assert_eq!(tracker.observe(0.00200), Some(Crossing::ReachedLow));
        let state = tracker.state();
        assert!(state.low_notified);
        assert!(!state.high_notified);
        assert_eq!(state.last_price, Some(0.00200));
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let mut tracker = ThresholdTracker::new(band(1.0, 2.0));
        assert_eq!(tracker.observe(2.0), Some(Crossing::ReachedHigh));
        assert_eq!(tracker.observe(1.0), Some(Crossing::ReachedLow));
        assert_eq!(tracker.observe(1.0), None);
    }

    #[test]
    fn test_entering_band_never_notifies() {
        let mut tracker = ThresholdTracker::new(band(1.0, 2.0));
        assert_eq!(tracker.observe(1.5), None);
        assert_eq!(tracker.observe(1.2), None);
        assert_eq!(tracker.state().last_price, Some(1.2));
    }

    #[test]
    fn test_band_reentry_rearms_latch() {
        let mut tracker = ThresholdTracker::new(band(1.0, 2.0));
        assert_eq!(tracker.observe(0.5), Some(Crossing::ReachedLow));
        assert_eq!(tracker.observe(1.5), None);
        assert!(!tracker.state().low_notified);
        assert_eq!(tracker.observe(0.9), Some(Crossing::ReachedLow));
    }

    #[test]
    fn test_opposite_side_clears_latch() {
        let mut tracker = ThresholdTracker::new(band(1.0, 2.0));
        assert_eq!(tracker.observe(0.5), Some(Crossing::ReachedLow));
        assert_eq!(tracker.observe(3.0), Some(Crossing::ReachedHigh));
        assert!(!tracker.state().low_notified);
        assert_eq!(tracker.observe(0.5), Some(Crossing::ReachedLow));
    }

    #[test]
    fn test_set_band_resets_latches() {
        let mut tracker = ThresholdTracker::new(band(1.0, 2.0));
        assert_eq!(tracker.observe(3.0), Some(Crossing::ReachedHigh));
        assert_eq!(tracker.observe(3.0), None);

        // Same band keeps latches
        assert!(!tracker.set_band(band(1.0, 2.0)));
        assert_eq!(tracker.observe(3.0), None);

        assert!(tracker.set_band(band(1.0, 2.5)));
        assert_eq!(tracker.state().last_price, Some(3.0));
        assert_eq!(tracker.observe(3.0), Some(Crossing::ReachedHigh));
    }

    #[test]
    fn test_reset_latches() {
        let mut tracker = ThresholdTracker::new(band(1.0, 2.0));
        tracker.observe(0.1);
        tracker.reset_latches();
        assert_eq!(
            tracker.state(),
            TrackerState {
                last_price: Some(0.1),
                low_notified: false,
                high_notified: false,
            }
        );
        assert_eq!(tracker.observe(0.1), Some(Crossing::ReachedLow));
    }
}
