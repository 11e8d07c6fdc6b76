//! Daily-rotating task board.
//!
//! The board holds a fixed number of task slots. At every refresh, slots
//! whose task is completed or has reached its expiry day receive a new
//! instance drawn from the catalog templates; the other slots are kept with
//! their progress. Selection is deterministic and favours variety: a
//! template that is already on the board (kept, outgoing, or drawn earlier in
//! the same refresh) is skipped while any other template remains.

use std::collections::BTreeSet;

use isle_types::{TaskTemplate, TaskView, TemplateId};
use tracing::debug;

use crate::error::WorldError;

// ---------------------------------------------------------------------------
// TaskInstance
// ---------------------------------------------------------------------------

/// One active objective on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInstance {
    template: TemplateId,
    description: String,
    target_quantity: u32,
    progress: u32,
    assigned_day: u64,
    expires_on_day: u64,
    miles_reward: u32,
}

impl TaskInstance {
    /// Issue a fresh instance of `template` on `day`.
    pub fn issue(template: &TaskTemplate, day: u64) -> Self {
        Self {
            template: template.id.clone(),
            description: template.description.clone(),
            target_quantity: template.target_quantity,
            progress: 0,
            assigned_day: day,
            expires_on_day: day.saturating_add(template.duration_days.max(1)),
            miles_reward: template.miles_reward,
        }
    }

    /// Template the task was drawn from.
    pub const fn template(&self) -> &TemplateId {
        &self.template
    }

    /// Progress so far.
    pub const fn progress(&self) -> u32 {
        self.progress
    }

    /// Target quantity.
    pub const fn target_quantity(&self) -> u32 {
        self.target_quantity
    }

    /// Day the task was issued.
    pub const fn assigned_day(&self) -> u64 {
        self.assigned_day
    }

    /// First day on which the task is replaced.
    pub const fn expires_on_day(&self) -> u64 {
        self.expires_on_day
    }

    /// Miles paid to the agent that completes the task.
    pub const fn miles_reward(&self) -> u32 {
        self.miles_reward
    }

    /// Whether progress has reached the target.
    pub const fn is_completed(&self) -> bool {
        self.progress >= self.target_quantity
    }

    /// Whether the task should be replaced at a refresh on `day`.
    pub const fn is_stale(&self, day: u64) -> bool {
        self.is_completed() || day >= self.expires_on_day
    }

    fn view(&self, index: usize) -> TaskView {
        TaskView {
            index,
            template: self.template.clone(),
            description: self.description.clone(),
            progress: self.progress,
            target: self.target_quantity,
            completed: self.is_completed(),
            assigned_day: self.assigned_day,
            expires_on_day: self.expires_on_day,
            miles_reward: self.miles_reward,
        }
    }
}

// ---------------------------------------------------------------------------
// TaskBoard
// ---------------------------------------------------------------------------

/// Fixed-size set of active tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBoard {
    slot_count: usize,
    slots: Vec<TaskInstance>,
}

impl TaskBoard {
    /// Create an empty board with `slot_count` slots. The first
    /// [`TaskBoard::refresh`] fills every slot.
    pub const fn new(slot_count: usize) -> Self {
        Self {
            slot_count,
            slots: Vec::new(),
        }
    }

    /// Configured number of slots.
    pub const fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Active tasks in slot order.
    pub fn slots(&self) -> &[TaskInstance] {
        &self.slots
    }

    /// Look up a slot.
    pub fn get(&self, index: usize) -> Result<&TaskInstance, WorldError> {
        self.slots.get(index).ok_or(WorldError::TaskNotFound(index))
    }

    /// Replace completed or expired slots and fill empty ones.
    ///
    /// Returns the indexes of the slots that received a new instance. With
    /// an empty template list nothing can be drawn and the board is left
    /// unchanged.
    pub fn refresh(&mut self, day: u64, templates: &[TaskTemplate]) -> Vec<usize> {
        if templates.is_empty() {
            return Vec::new();
        }

        let mut kept: BTreeSet<TemplateId> = BTreeSet::new();
        let mut outgoing: BTreeSet<TemplateId> = BTreeSet::new();
        for slot in &self.slots {
            if slot.is_stale(day) {
                outgoing.insert(slot.template.clone());
            } else {
                kept.insert(slot.template.clone());
            }
        }

        let mut drawn: BTreeSet<TemplateId> = BTreeSet::new();
        let mut replaced = Vec::new();

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if !slot.is_stale(day) {
                continue;
            }
            if let Some(template) = select(templates, &kept, &outgoing, &drawn) {
                drawn.insert(template.id.clone());
                *slot = TaskInstance::issue(template, day);
                replaced.push(index);
            }
        }

        while self.slots.len() < self.slot_count {
            let Some(template) = select(templates, &kept, &outgoing, &drawn) else {
                break;
            };
            drawn.insert(template.id.clone());
            replaced.push(self.slots.len());
            self.slots.push(TaskInstance::issue(template, day));
        }
        self.slots.truncate(self.slot_count);

        debug!(day, replaced = replaced.len(), "task board refreshed");
        replaced
    }

    /// Add `delta` units of progress to a task, capped at its target.
    ///
    /// Returns `true` exactly when this call completed the task.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::TaskNotFound`] for a bad index and
    /// [`WorldError::TaskAlreadyCompleted`] if the task is already done.
    pub fn record_progress(&mut self, index: usize, delta: u32) -> Result<bool, WorldError> {
        let task = self
            .slots
            .get_mut(index)
            .ok_or(WorldError::TaskNotFound(index))?;
        if task.is_completed() {
            return Err(WorldError::TaskAlreadyCompleted(index));
        }
        task.progress = task
            .progress
            .saturating_add(delta)
            .min(task.target_quantity);
        Ok(task.is_completed())
    }

    /// Serializable copies of every slot.
    pub fn views(&self) -> Vec<TaskView> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, task)| task.view(index))
            .collect()
    }
}

/// Pick the next template: first one not on the board at all, then an
/// outgoing one not drawn in this refresh, then any not drawn yet, then the
/// very first template. Templates held by kept slots come last.
fn select<'a>(
    templates: &'a [TaskTemplate],
    kept: &BTreeSet<TemplateId>,
    outgoing: &BTreeSet<TemplateId>,
    drawn: &BTreeSet<TemplateId>,
) -> Option<&'a TaskTemplate> {
    templates
        .iter()
        .find(|t| !kept.contains(&t.id) && !outgoing.contains(&t.id) && !drawn.contains(&t.id))
        .or_else(|| {
            templates
                .iter()
                .find(|t| !kept.contains(&t.id) && !drawn.contains(&t.id))
        })
        .or_else(|| templates.iter().find(|t| !drawn.contains(&t.id)))
        .or_else(|| templates.first())
}
