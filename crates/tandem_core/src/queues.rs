//! The two FIFO waiting lines in front of the shared server.
//!
//! A customer stays in its stage's queue while it is served; the head of each
//! queue is the customer in service (or, at stage 2, the preempted one).

use std::collections::VecDeque;
use std::fmt;

use bevy_ecs::prelude::{Entity, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    One,
    Two,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::One => write!(f, "stage 1"),
            Stage::Two => write!(f, "stage 2"),
        }
    }
}

#[derive(Debug, Default, Resource)]
pub struct ServiceQueues {
    stage_one: VecDeque<Entity>,
    stage_two: VecDeque<Entity>,
}

impl ServiceQueues {
    fn line(&self, stage: Stage) -> &VecDeque<Entity> {
        match stage {
            Stage::One => &self.stage_one,
            Stage::Two => &self.stage_two,
        }
    }

    fn line_mut(&mut self, stage: Stage) -> &mut VecDeque<Entity> {
        match stage {
            Stage::One => &mut self.stage_one,
            Stage::Two => &mut self.stage_two,
        }
    }

    pub fn push(&mut self, stage: Stage, customer: Entity) {
        self.line_mut(stage).push_back(customer);
    }

    pub fn head(&self, stage: Stage) -> Option<Entity> {
        self.line(stage).front().copied()
    }

    pub fn pop(&mut self, stage: Stage) -> Option<Entity> {
        self.line_mut(stage).pop_front()
    }

    pub fn len(&self, stage: Stage) -> usize {
        self.line(stage).len()
    }

    pub fn is_empty(&self, stage: Stage) -> bool {
        self.line(stage).is_empty()
    }

    pub fn total(&self) -> usize {
        self.stage_one.len() + self.stage_two.len()
    }

    pub fn waiting_stage_one(&self) -> usize {
        self.stage_one.len().saturating_sub(1)
    }

    pub fn present_stage_one(&self) -> usize {
        self.stage_one.len()
    }

    /// While stage 1 has work the stage-2 head is preempted, so it counts as waiting.
    pub fn waiting_stage_two(&self) -> usize {
        if self.stage_one.is_empty() {
            self.stage_two.len().saturating_sub(1)
        } else {
            self.stage_two.len()
        }
    }

    pub fn present_stage_two(&self) -> usize {
        self.stage_two.len()
    }

    pub fn lengths(&self) -> QueueLengths {
        QueueLengths {
            waiting_one: self.waiting_stage_one(),
            present_one: self.present_stage_one(),
            waiting_two: self.waiting_stage_two(),
            present_two: self.present_stage_two(),
        }
    }
}

/// Instantaneous queue lengths, the integrands of the occupancy integrals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueLengths {
    pub waiting_one: usize,
    pub present_one: usize,
    pub waiting_two: usize,
    pub present_two: usize,
}
