//! Process-wide protocol counters.
//! Cheap relaxed atomics; the server logs a [`snapshot`] when it shuts down.
use std::sync::atomic::{AtomicU64, Ordering};

static LINES_ACKED: AtomicU64 = AtomicU64::new(0);
static LINES_NACKED_GRAMMAR: AtomicU64 = AtomicU64::new(0);
static LINES_NACKED_DISPATCH: AtomicU64 = AtomicU64::new(0);
static LINES_EMPTY: AtomicU64 = AtomicU64::new(0);
static OVERFLOWS: AtomicU64 = AtomicU64::new(0);
static ERASES: AtomicU64 = AtomicU64::new(0);

pub fn inc_ack() {
    LINES_ACKED.fetch_add(1, Ordering::Relaxed);
}

/// `grammar` separates parse failures from dispatch rejections.
pub fn inc_nack(grammar: bool) {
    if grammar {
        LINES_NACKED_GRAMMAR.fetch_add(1, Ordering::Relaxed);
    } else {
        LINES_NACKED_DISPATCH.fetch_add(1, Ordering::Relaxed);
    }
}

pub fn inc_empty() {
    LINES_EMPTY.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_overflow() {
    OVERFLOWS.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_erase() {
    ERASES.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub acked: u64,
    pub nacked_grammar: u64,
    pub nacked_dispatch: u64,
    pub empty: u64,
    pub overflows: u64,
    pub erases: u64,
}

impl Snapshot {
    pub fn lines(&self) -> u64 {
        self.acked + self.nacked_grammar + self.nacked_dispatch + self.empty
    }
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        acked: LINES_ACKED.load(Ordering::Relaxed),
        nacked_grammar: LINES_NACKED_GRAMMAR.load(Ordering::Relaxed),
        nacked_dispatch: LINES_NACKED_DISPATCH.load(Ordering::Relaxed),
        empty: LINES_EMPTY.load(Ordering::Relaxed),
        overflows: OVERFLOWS.load(Ordering::Relaxed),
        erases: ERASES.load(Ordering::Relaxed),
    }
}
