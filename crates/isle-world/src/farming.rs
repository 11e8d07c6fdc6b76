//! Farm plot state tracking: planting, growth timers, and harvest readiness.
//!
//! The island has a fixed number of plots. Each plot is empty or holds a
//! [`CropGrowth`] that records what was planted, by whom, and on which day it
//! ripens. Ripening is deterministic: the daily [`FarmPlots::update`] turns a
//! growing plot ready exactly when the current day reaches its ready day.

use isle_types::{AgentName, CropRecord, ItemId, PlotState, PlotView};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;

// ---------------------------------------------------------------------------
// CropGrowth
// ---------------------------------------------------------------------------

/// Growth state of the crop on a single plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropGrowth {
    /// The crop planted.
    pub crop: ItemId,
    /// The agent that planted it.
    pub owner: AgentName,
    /// The day the crop was planted.
    pub plant_day: u64,
    /// The day at which the crop becomes ready.
    pub ready_day: u64,
    /// Units produced by the harvest.
    pub yield_quantity: u32,
    /// Set by the daily update once `ready_day` is reached.
    pub ready: bool,
}

impl CropGrowth {
    /// Plant `crop` on `day`.
    ///
    /// Returns `None` on arithmetic overflow.
    pub fn plant(crop: &CropRecord, owner: AgentName, day: u64) -> Option<Self> {
        let ready_day = day.checked_add(crop.growth_duration_days)?;
        Some(Self {
            crop: crop.id.clone(),
            owner,
            plant_day: day,
            ready_day,
            yield_quantity: crop.yield_quantity,
            ready: false,
        })
    }

    /// Check whether the crop is mature on `day`.
    pub const fn is_mature(&self, day: u64) -> bool {
        day >= self.ready_day
    }

    /// Lifecycle state of the plot holding this crop.
    pub const fn state(&self) -> PlotState {
        if self.ready {
            PlotState::Ready
        } else {
            PlotState::Growing
        }
    }
}

// ---------------------------------------------------------------------------
// FarmPlots
// ---------------------------------------------------------------------------

/// Fixed-capacity set of farm plots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmPlots {
    plots: Vec<Option<CropGrowth>>,
}

impl FarmPlots {
    /// Create `capacity` empty plots.
    pub fn new(capacity: usize) -> Self {
        Self {
            plots: vec![None; capacity],
        }
    }

    /// Number of plots.
    pub fn len(&self) -> usize {
        self.plots.len()
    }

    /// Whether the farm has no plots at all.
    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    /// Crop on a plot, `None` when the plot is empty.
    pub fn get(&self, index: usize) -> Result<Option<&CropGrowth>, WorldError> {
        self.plots
            .get(index)
            .map(Option::as_ref)
            .ok_or(WorldError::PlotNotFound(index))
    }

    /// Lifecycle state of a plot.
    pub fn state(&self, index: usize) -> Result<PlotState, WorldError> {
        Ok(self
            .get(index)?
            .map_or(PlotState::Empty, CropGrowth::state))
    }

    /// Number of plots holding a crop.
    pub fn occupied_count(&self) -> usize {
        self.plots.iter().filter(|p| p.is_some()).count()
    }

    /// Plant a crop on an empty plot, returning its ready day.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PlotNotFound`] for a bad index,
    /// [`WorldError::PlotOccupied`] if the plot is not empty, and
    /// [`WorldError::ArithmeticOverflow`] if the ready day overflows.
    pub fn plant(
        &mut self,
        index: usize,
        crop: &CropRecord,
        day: u64,
        owner: AgentName,
    ) -> Result<u64, WorldError> {
        let plot = self
            .plots
            .get_mut(index)
            .ok_or(WorldError::PlotNotFound(index))?;
        if plot.is_some() {
            return Err(WorldError::PlotOccupied(index));
        }
        let growth = CropGrowth::plant(crop, owner, day)
            .ok_or_else(|| WorldError::overflow("crop ready day"))?;
        let ready_day = growth.ready_day;
        *plot = Some(growth);
        Ok(ready_day)
    }

    /// Mark every growing plot whose ready day has arrived as ready.
    ///
    /// Returns the indexes that ripened during this call.
    pub fn update(&mut self, day: u64) -> Vec<usize> {
        let mut ripened = Vec::new();
        for (index, plot) in self.plots.iter_mut().enumerate() {
            let Some(growth) = plot else {
                continue;
            };
            if !growth.ready && growth.is_mature(day) {
                growth.ready = true;
                ripened.push(index);
            }
        }
        if !ripened.is_empty() {
            debug!(day, count = ripened.len(), "crops ripened");
        }
        ripened
    }

    /// Harvest a ready plot, leaving it empty.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PlotNotFound`] for a bad index and
    /// [`WorldError::NotReady`] unless the plot is ready. The plot is left
    /// untouched on error.
    pub fn harvest(&mut self, index: usize) -> Result<CropGrowth, WorldError> {
        let plot = self
            .plots
            .get_mut(index)
            .ok_or(WorldError::PlotNotFound(index))?;
        match plot.take() {
            Some(growth) if growth.ready => Ok(growth),
            other => {
                *plot = other;
                Err(WorldError::NotReady(index))
            }
        }
    }

    /// Serializable copies of every plot.
    pub fn views(&self) -> Vec<PlotView> {
        self.plots
            .iter()
            .enumerate()
            .map(|(index, plot)| PlotView {
                index,
                state: plot.as_ref().map_or(PlotState::Empty, CropGrowth::state),
                crop: plot.as_ref().map(|g| g.crop.clone()),
                owner: plot.as_ref().map(|g| g.owner.clone()),
                plant_day: plot.as_ref().map(|g| g.plant_day),
                ready_day: plot.as_ref().map(|g| g.ready_day),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tomato() -> CropRecord {
        CropRecord {
            id: ItemId::from("Tomato"),
            growth_duration_days: 4,
            sell_price: 35,
            seed_cost: 20,
            yield_quantity: 3,
            friendship_value: Some(2),
        }
    }

    fn owner() -> AgentName {
        AgentName::from("Audie")
    }

    #[test]
    fn crop_growth_plant_and_mature() {
        let growth = CropGrowth::plant(&tomato(), owner(), 10).unwrap();
        assert_eq!(growth.ready_day, 14);
        assert!(!growth.is_mature(13));
        assert!(growth.is_mature(14));
        assert_eq!(growth.state(), PlotState::Growing);
    }

    #[test]
    fn crop_growth_overflow() {
        assert!(CropGrowth::plant(&tomato(), owner(), u64::MAX).is_none());
    }

    #[test]
    fn ripening_boundary() {
        let mut farm = FarmPlots::new(2);
        assert_eq!(farm.plant(1, &tomato(), 3, owner()), Ok(7));
        assert!(farm.update(6).is_empty());
        assert_eq!(farm.state(1), Ok(PlotState::Growing));
        assert_eq!(farm.update(7), vec![1]);
        assert_eq!(farm.state(1), Ok(PlotState::Ready));
        assert!(farm.update(8).is_empty());
    }

    #[test]
    fn early_harvest_leaves_plot_unchanged() {
        let mut farm = FarmPlots::new(1);
        farm.plant(0, &tomato(), 0, owner()).unwrap();
        let before = farm.clone();
        assert_eq!(farm.harvest(0), Err(WorldError::NotReady(0)));
        assert_eq!(farm, before);
    }

    #[test]
    fn harvest_empties_the_plot() {
        let mut farm = FarmPlots::new(1);
        farm.plant(0, &tomato(), 0, owner()).unwrap();
        farm.update(4);
        let growth = farm.harvest(0).unwrap();
        assert_eq!(growth.crop, ItemId::from("Tomato"));
        assert_eq!(growth.yield_quantity, 3);
        assert_eq!(farm.state(0), Ok(PlotState::Empty));
        assert_eq!(farm.harvest(0), Err(WorldError::NotReady(0)));
    }

    #[test]
    fn occupied_and_missing_plots() {
        let mut farm = FarmPlots::new(1);
        farm.plant(0, &tomato(), 0, owner()).unwrap();
        assert_eq!(
            farm.plant(0, &tomato(), 1, owner()),
            Err(WorldError::PlotOccupied(0))
        );
        assert_eq!(
            farm.plant(5, &tomato(), 1, owner()),
            Err(WorldError::PlotNotFound(5))
        );
        assert_eq!(farm.occupied_count(), 1);
    }

    #[test]
    fn views_report_state() {
        let mut farm = FarmPlots::new(2);
        farm.plant(0, &tomato(), 2, owner()).unwrap();
        let views = farm.views();
        assert_eq!(views.len(), 2);
        assert_eq!(views.first().map(|v| v.ready_day), Some(Some(6)));
        assert_eq!(views.get(1).map(|v| v.state), Some(PlotState::Empty));
    }
}
