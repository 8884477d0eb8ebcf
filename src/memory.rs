use crate::paging::{Page, Pfn, ReplacementPolicy, Victim};

/// One physical frame slot. A free frame holds no page and never reports
/// itself modified; a resident frame carries the bookkeeping the policies
/// read: access stamp for LRU, insertion stamp for FIFO, reference bit for
/// Clock.
pub struct Frame {
    pub page: Option<Page>,
    pub modified: bool,
    pub last_access: u64,
    pub inserted_at: u64,
    pub referenced: bool,
}
impl Frame {
    fn new() -> Self {
        Self {
            page: None,
            modified: false,
            last_access: 0,
            inserted_at: 0,
            referenced: false,
        }
    }

    pub fn is_free(&self) -> bool {
        self.page.is_none()
    }
}

/// Fixed pool of frames plus the shared access counter. The counter only
/// moves forward and its values are used for relative ordering, never as
/// wall-clock time. At most one frame holds a given page at any time.
pub struct FrameTable {
    pub frames: Vec<Frame>,
    access_counter: u64,
}
impl FrameTable {
    pub fn new(num_frames: usize) -> Self {
        assert!(num_frames >= 1, "frame count must be at least 1");
        let mut frames = Vec::with_capacity(num_frames);
        for _ in 0..num_frames {
            frames.push(Frame::new());
        }
        Self {
            frames,
            access_counter: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Residency check. A find is a touch: the frame's access stamp and
    /// reference bit are updated, which is what LRU and Clock depend on.
    pub fn lookup(&mut self, page: Page) -> Option<Pfn> {
        let idx = self.frames.iter().position(|f| f.page == Some(page))?;
        let stamp = self.tick();
        let frame = &mut self.frames[idx];
        frame.last_access = stamp;
        frame.referenced = true;
        Some(Pfn(idx))
    }

    /// Loads `page` into the lowest-indexed free frame. `None` means the
    /// table is full and a victim has to be selected; that is the normal
    /// signal, not a failure.
    pub fn allocate_free(&mut self, page: Page) -> Option<Pfn> {
        let idx = self.frames.iter().position(Frame::is_free)?;
        self.fill(idx, page);
        Some(Pfn(idx))
    }

    /// Substitutes `page` for whatever is resident in `pfn` and reports what
    /// was evicted. The winning frame is re-stamped for the incoming page
    /// and gets its reference bit so it survives the next Clock sweep.
    pub fn replace_page(&mut self, pfn: Pfn, page: Page) -> Victim {
        let frame = &self.frames[pfn.0];
        let victim = Victim {
            page: frame.page.expect("victim frame must be resident"),
            was_modified: frame.modified,
        };
        self.fill(pfn.0, page);
        self.frames[pfn.0].referenced = true;
        victim
    }

    /// Marks the resident page dirty. The index must come from the resolve
    /// that just placed or found the page; calling it on a free frame is a
    /// bug in the caller.
    pub fn mark_written(&mut self, pfn: Pfn) {
        let frame = &mut self.frames[pfn.0];
        assert!(!frame.is_free(), "mark_written on a free frame");
        frame.modified = true;
    }

    fn fill(&mut self, idx: usize, page: Page) {
        let stamp = self.tick();
        let frame = &mut self.frames[idx];
        frame.page = Some(page);
        frame.modified = false;
        frame.last_access = stamp;
        frame.inserted_at = stamp;
        // A freshly loaded page earns its reference bit on the first hit,
        // not on the load.
        frame.referenced = false;
    }

    fn tick(&mut self) -> u64 {
        let stamp = self.access_counter;
        self.access_counter += 1;
        stamp
    }
}

/// Outcome of resolving one memory reference.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Hit,
    /// Page fault: the page had to be loaded. `evicted` is `None` when a
    /// free frame absorbed it, otherwise it names the victim.
    Fault { evicted: Option<Victim> },
}

/// Orchestrates lookup, allocation and eviction for one simulation run. Owns
/// its frame table and policy outright, so independent runs never share
/// state.
pub struct MemoryManager<P: ReplacementPolicy> {
    frame_table: FrameTable,
    policy: P,
}
impl<P: ReplacementPolicy> MemoryManager<P> {
    pub fn new(num_frames: usize, policy: P) -> Self {
        Self {
            frame_table: FrameTable::new(num_frames),
            policy,
        }
    }

    /// Resolves one reference: hit, fault into a free frame, or fault with
    /// eviction. A write marks the resolved frame dirty whichever path was
    /// taken.
    pub fn resolve(&mut self, page: Page, is_write: bool) -> Outcome {
        let (pfn, outcome) = match self.frame_table.lookup(page) {
            Some(pfn) => (pfn, Outcome::Hit),
            None => match self.frame_table.allocate_free(page) {
                Some(pfn) => (pfn, Outcome::Fault { evicted: None }),
                None => {
                    let (pfn, victim) = self.policy.select_victim(&mut self.frame_table, page);
                    (pfn, Outcome::Fault { evicted: Some(victim) })
                }
            },
        };
        if is_write {
            self.frame_table.mark_written(pfn);
        }
        outcome
    }

    pub fn frame_table(&self) -> &FrameTable {
        &self.frame_table
    }
}
