use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering}
    },
    time::Duration
};

use auto_impl::auto_impl;
use cl_structure::Timestamp;

#[auto_impl(&, &mut, Box, Arc)]
pub trait Clock {
    /// Time of the block being executed.
    fn block_time(&self) -> Timestamp;
}

/// Clock moved by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self { nanos: Arc::new(AtomicU64::new(start.as_nanos())) }
    }

    pub fn set(&self, time: Timestamp) {
        self.nanos.store(time.as_nanos(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |nanos| Some(nanos.saturating_add(by)))
            .ok();
    }
}

impl Clock for ManualClock {
    fn block_time(&self) -> Timestamp {
        Timestamp::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}
