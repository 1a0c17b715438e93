// Progressive reveal: grows the number of materialised graves a batch at a
// time so a large record list never costs one long frame.
//
// Driven by frame ticks, not wall-clock time. The only reset trigger is a
// change of list identity (generation) or length.

use bevy_ecs::prelude::*;

pub const INITIAL_BATCH: usize = 30;
pub const BATCH_SIZE: usize = 8;
pub const TICKS_PER_BATCH: u64 = 10;

/// Identity of a record list as seen by the scene: bumped generation on
/// every replacement, plus its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListKey {
    pub generation: u64,
    pub len: usize,
}

/// `Complete` is entered at the first batch boundary that finds nothing
/// left to reveal. A reset counts as a boundary, so a list that fits in the
/// initial batch is complete at once, while a longer list needs one more
/// interval after its last batch lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Growing,
    /// Terminal until the next reset.
    Complete,
}

#[derive(Resource, Debug, Clone)]
pub struct RevealScheduler {
    pub initial_batch: usize,
    pub batch_size: usize,
    pub ticks_per_batch: u64,

    key: Option<ListKey>,
    total: usize,
    visible: usize,
    ticks: u64,
    phase: RevealPhase,
}

impl RevealScheduler {
    pub fn new() -> Self {
        Self::with_batches(INITIAL_BATCH, BATCH_SIZE, TICKS_PER_BATCH)
    }

    pub fn with_batches(initial_batch: usize, batch_size: usize, ticks_per_batch: u64) -> Self {
        Self {
            initial_batch,
            batch_size,
            ticks_per_batch: ticks_per_batch.max(1),
            key: None,
            total: 0,
            visible: 0,
            ticks: 0,
            phase: RevealPhase::Complete,
        }
    }

    /// Point the scheduler at `key`. Resets only when identity or length
    /// differs from the list it is already revealing. Returns true on reset.
    pub fn sync(&mut self, key: ListKey) -> bool {
        if self.key == Some(key) {
            return false;
        }
        self.key = Some(key);
        self.total = key.len;
        self.visible = self.initial_batch.min(key.len);
        self.ticks = 0;
        // Reset is a batch boundary: settle now if nothing is left.
        self.phase = if self.visible == self.total {
            RevealPhase::Complete
        } else {
            RevealPhase::Growing
        };
        log::debug!(
            "reveal reset: generation {} showing {}/{}",
            key.generation, self.visible, self.total
        );
        true
    }

    /// Advance one frame. Every `ticks_per_batch` ticks either reveal the
    /// next batch or, when nothing is left, settle into `Complete`.
    pub fn tick(&mut self) -> usize {
        if self.phase == RevealPhase::Complete {
            return self.visible;
        }

        self.ticks += 1;
        if self.ticks % self.ticks_per_batch == 0 {
            if self.visible < self.total {
                self.visible = (self.visible + self.batch_size).min(self.total);
                log::debug!("reveal: {}/{} at tick {}", self.visible, self.total, self.ticks);
            } else {
                self.phase = RevealPhase::Complete;
            }
        }
        self.visible
    }

    pub fn visible_count(&self) -> usize { self.visible }
    pub fn total(&self) -> usize { self.total }
    pub fn phase(&self) -> RevealPhase { self.phase }
    #[cfg(test)]
    pub fn ticks(&self) -> u64 { self.ticks }

    #[cfg(test)]
    pub fn is_complete(&self) -> bool {
        self.phase == RevealPhase::Complete
    }
}

impl Default for RevealScheduler {
    fn default() -> Self {
        Self::new()
    }
}
