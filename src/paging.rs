use rand::Rng;

use crate::memory::FrameTable;

/// Virtual page number, already shifted by the driver (address >> 12).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Page(pub usize);

/// Physical frame number, an index into the frame table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Pfn(pub usize);

/// What got evicted: the page that was resident in the chosen frame and
/// whether it had been written since it was loaded (a dirty victim costs a
/// disk write downstream).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Victim {
    pub page: Page,
    pub was_modified: bool,
}

/// Picks a resident page to evict when no frame is free, and installs the
/// incoming page in its place via [`FrameTable::replace_page`]. Returns the
/// winning frame so the caller can mark it written without a second lookup.
///
/// Only called on a full table, so every frame is resident at selection time.
pub trait ReplacementPolicy {
    fn select_victim(&mut self, frame_table: &mut FrameTable, incoming: Page) -> (Pfn, Victim);
}

pub struct Random;
impl ReplacementPolicy for Random {
    fn select_victim(&mut self, frame_table: &mut FrameTable, incoming: Page) -> (Pfn, Victim) {
        let mut rng = rand::rng();
        let pfn = Pfn(rng.random_range(..frame_table.len()));
        let victim = frame_table.replace_page(pfn, incoming);
        (pfn, victim)
    }
}

pub struct Fifo;
impl ReplacementPolicy for Fifo {
    fn select_victim(&mut self, frame_table: &mut FrameTable, incoming: Page) -> (Pfn, Victim) {
        // Oldest insertion wins, independent of any hits since. Strict `<`
        // keeps the lowest index on equal stamps.
        let mut chosen = 0;
        for (idx, frame) in frame_table.frames.iter().enumerate().skip(1) {
            if frame.inserted_at < frame_table.frames[chosen].inserted_at {
                chosen = idx;
            }
        }
        let pfn = Pfn(chosen);
        let victim = frame_table.replace_page(pfn, incoming);
        (pfn, victim)
    }
}

pub struct Lru;
impl ReplacementPolicy for Lru {
    fn select_victim(&mut self, frame_table: &mut FrameTable, incoming: Page) -> (Pfn, Victim) {
        // Smallest access stamp is the least recently touched, where touches
        // include both hits and installs. Ties break to the lowest index.
        let mut chosen = 0;
        for (idx, frame) in frame_table.frames.iter().enumerate().skip(1) {
            if frame.last_access < frame_table.frames[chosen].last_access {
                chosen = idx;
            }
        }
        let pfn = Pfn(chosen);
        let victim = frame_table.replace_page(pfn, incoming);
        (pfn, victim)
    }
}

/// Second chance. The hand only moves forward and wraps mod the frame count;
/// every visited frame's bit is cleared exactly once before the hand can come
/// back around, so a full scan takes at most 2 * num_frames steps.
pub struct Clock {
    hand: usize,
}
impl Clock {
    pub fn new() -> Self {
        Self { hand: 0 }
    }

    fn advance(&mut self, frame_count: usize) {
        self.hand += 1;
        if self.hand == frame_count {
            self.hand = 0;
        }
    }
}
impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
impl ReplacementPolicy for Clock {
    fn select_victim(&mut self, frame_table: &mut FrameTable, incoming: Page) -> (Pfn, Victim) {
        loop {
            let frame = &mut frame_table.frames[self.hand];
            if frame.referenced {
                frame.referenced = false;
                self.advance(frame_table.len());
            } else {
                let pfn = Pfn(self.hand);
                let victim = frame_table.replace_page(pfn, incoming);
                self.advance(frame_table.len());
                return (pfn, victim);
            }
        }
    }
}
