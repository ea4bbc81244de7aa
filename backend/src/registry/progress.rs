use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Backfill completion flag plus a 0-100 progress figure.
#[derive(Debug, Default)]
pub struct BackfillProgress {
    complete: AtomicBool,
    percent: AtomicU8,
}

impl BackfillProgress {
    /// `done` of `total` instruments processed.
    pub fn set(&self, done: usize, total: usize) {
        let pct = if total == 0 {
            100
        } else {
            (done.min(total) * 100 / total) as u8
        };
        self.percent.store(pct, Ordering::Release);
    }

    pub fn mark_complete(&self) {
        self.percent.store(100, Ordering::Release);
        self.complete.store(true, Ordering::Release);
    }

    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    pub fn percent(&self) -> u8 {
        self.percent.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progresses_then_completes() {
        let p = BackfillProgress::default();
        assert!(!p.is_complete());
        assert_eq!(p.percent(), 0);

        p.set(1, 3);
        assert_eq!(p.percent(), 33);
        p.set(5, 3);
        assert_eq!(p.percent(), 100);
        assert!(!p.is_complete());

        p.mark_complete();
        assert!(p.is_complete());
    }
}
