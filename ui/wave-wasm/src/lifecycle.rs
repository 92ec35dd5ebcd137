//! Page lifecycle bookkeeping for the live feed.

/// What a `pagehide` means for the live feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnHide {
    /// Back/forward cache: the page may be shown again, keep the filter.
    Pause,
    /// The page is going away: remove the filter.
    TearDown,
}

impl OnHide {
    /// `persisted` is `PageTransitionEvent.persisted`.
    pub fn for_page(persisted: bool) -> Self {
        if persisted {
            OnHide::Pause
        } else {
            OnHide::TearDown
        }
    }
}

/// Tracks the single poll loop. Each started loop gets a ticket and keeps
/// running only while that ticket is current, so a loop still asleep when
/// the page is hidden and shown again exits instead of running twice.
#[derive(Debug, Default)]
pub struct PollLoop {
    generation: u64,
    running: bool,
}

impl PollLoop {
    pub fn start(&mut self) -> Option<u64> {
        if self.running {
            return None;
        }
        self.running = true;
        self.generation += 1;
        Some(self.generation)
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.generation += 1;
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.running && self.generation == ticket
    }
}
