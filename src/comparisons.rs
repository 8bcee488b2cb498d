//! Allocation strategy comparison: intrusive free list vs linear scan.
//!
//! The scan variant finds a vacant slot by walking the pool from index 0,
//! which is how the structure is often first written. Kept here as a
//! correctness cross-check and as `#[ignore]`d latency measurements
//! (`cargo test --release -- --ignored --nocapture`).

#[cfg(test)]
mod scan_alloc {
    use hdrhistogram::Histogram;
    use std::time::Instant;

    use crate::{ListError, SlotList};

    const WARMUP: u64 = 10_000;
    const ITERATIONS: u64 = 100_000;

    // ============================================================
    // Linear-Scan Baseline Implementation
    // ============================================================

    const NONE: usize = usize::MAX;

    struct ScanEntry {
        value: i64,
        next: usize,
        used: bool,
    }

    /// Same list semantics, but allocation scans the pool for the first
    /// unused slot instead of popping a free chain. O(capacity) per
    /// insert regardless of list length.
    struct ScanList {
        entries: Vec<ScanEntry>,
        head: usize,
    }

    impl ScanList {
        fn with_capacity(capacity: usize) -> Self {
            Self {
                entries: (0..capacity)
                    .map(|_| ScanEntry {
                        value: 0,
                        next: NONE,
                        used: false,
                    })
                    .collect(),
                head: NONE,
            }
        }

        fn find_free_position(&self) -> Option<usize> {
            self.entries.iter().position(|e| !e.used)
        }

        fn push_front(&mut self, value: i64) -> Result<usize, ListError> {
            let slot = self
                .find_free_position()
                .ok_or(ListError::OutOfCapacity(self.entries.len()))?;

            self.entries[slot] = ScanEntry {
                value,
                next: self.head,
                used: true,
            };
            self.head = slot;
            Ok(slot)
        }

        fn push_back(&mut self, value: i64) -> Result<usize, ListError> {
            let slot = self
                .find_free_position()
                .ok_or(ListError::OutOfCapacity(self.entries.len()))?;

            self.entries[slot] = ScanEntry {
                value,
                next: NONE,
                used: true,
            };

            if self.head == NONE {
                self.head = slot;
            } else {
                let mut cur = self.head;
                while self.entries[cur].next != NONE {
                    cur = self.entries[cur].next;
                }
                self.entries[cur].next = slot;
            }
            Ok(slot)
        }

        fn remove(&mut self, value: i64) -> Result<usize, ListError> {
            let mut prev = NONE;
            let mut cur = self.head;

            while cur != NONE {
                if self.entries[cur].value == value {
                    let follow = self.entries[cur].next;
                    if prev == NONE {
                        self.head = follow;
                    } else {
                        self.entries[prev].next = follow;
                    }
                    self.entries[cur].used = false;
                    self.entries[cur].next = NONE;
                    return Ok(cur);
                }
                prev = cur;
                cur = self.entries[cur].next;
            }

            Err(ListError::ValueNotFound)
        }

        fn values(&self) -> Vec<i64> {
            let mut out = Vec::new();
            let mut cur = self.head;
            while cur != NONE {
                out.push(self.entries[cur].value);
                cur = self.entries[cur].next;
            }
            out
        }
    }

    fn print_histogram(name: &str, hist: &Histogram<u64>) {
        println!("\n=== {} ===", name);
        println!("  count:  {}", hist.len());
        println!("  min:    {} ns", hist.min());
        println!("  max:    {} ns", hist.max());
        println!("  mean:   {:.1} ns", hist.mean());
        println!("  stddev: {:.1} ns", hist.stdev());
        println!("  p50:    {} ns", hist.value_at_quantile(0.50));
        println!("  p90:    {} ns", hist.value_at_quantile(0.90));
        println!("  p99:    {} ns", hist.value_at_quantile(0.99));
        println!("  p99.9:  {} ns", hist.value_at_quantile(0.999));
    }

    // ============================================================
    // Correctness Cross-Check
    // ============================================================

    #[test]
    fn scan_and_free_list_agree_on_traversal() {
        let mut free_list: SlotList<i64> = SlotList::with_capacity(256);
        let mut scan = ScanList::with_capacity(256);

        // Deterministic mixed workload, net +2 slots per 5 steps
        for i in 0..500i64 {
            match i % 5 {
                0 | 1 => {
                    free_list.push_back(i).unwrap();
                    scan.push_back(i).unwrap();
                }
                2 => {
                    free_list.push_front(i).unwrap();
                    scan.push_front(i).unwrap();
                }
                3 => {
                    let target = i - 3;
                    assert_eq!(
                        free_list.remove(&target).is_ok(),
                        scan.remove(target).is_ok()
                    );
                }
                _ => {
                    assert_eq!(
                        free_list.remove(&(i + 1000)).err(),
                        scan.remove(i + 1000).err()
                    );
                }
            }
        }

        let free_list_values: Vec<i64> = free_list
            .iter()
            .map(|entry| entry.map(|(_, v)| *v))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(free_list_values, scan.values());
    }

    // ============================================================
    // Latency Tests
    // ============================================================

    /// Worst case for the scan variant: pool nearly full, vacancy near
    /// the end.
    #[test]
    #[ignore]
    fn hdr_alloc_latency_nearly_full() {
        const CAPACITY: usize = 1024;

        let mut free_list: SlotList<i64> = SlotList::with_capacity(CAPACITY);
        let mut scan = ScanList::with_capacity(CAPACITY);

        for i in 0..(CAPACITY as i64 - 1) {
            free_list.push_front(i).unwrap();
            scan.push_front(i).unwrap();
        }

        let mut free_hist = Histogram::<u64>::new(3).unwrap();
        let mut scan_hist = Histogram::<u64>::new(3).unwrap();

        for i in 0..WARMUP + ITERATIONS {
            let v = i as i64 + 1_000_000;

            let start = Instant::now();
            free_list.push_front(v).unwrap();
            let elapsed = start.elapsed().as_nanos() as u64;
            free_list.remove(&v).unwrap();

            if i >= WARMUP {
                free_hist.record(elapsed).unwrap();
            }

            let start = Instant::now();
            scan.push_front(v).unwrap();
            let elapsed = start.elapsed().as_nanos() as u64;
            scan.remove(v).unwrap();

            if i >= WARMUP {
                scan_hist.record(elapsed).unwrap();
            }
        }

        print_histogram("Free-List Alloc (1023/1024 full)", &free_hist);
        print_histogram("Linear-Scan Alloc (1023/1024 full)", &scan_hist);
    }

    #[test]
    #[ignore]
    fn hdr_churn_latency() {
        const CAPACITY: usize = 1024;

        let mut free_list: SlotList<i64> = SlotList::with_capacity(CAPACITY);
        let mut scan = ScanList::with_capacity(CAPACITY);

        // Half-full steady state
        for i in 0..(CAPACITY as i64 / 2) {
            free_list.push_front(i).unwrap();
            scan.push_front(i).unwrap();
        }

        let mut free_hist = Histogram::<u64>::new(3).unwrap();
        let mut scan_hist = Histogram::<u64>::new(3).unwrap();

        for i in 0..WARMUP + ITERATIONS {
            let v = i as i64 + 1_000_000;

            let start = Instant::now();
            free_list.push_front(v).unwrap();
            free_list.remove(&v).unwrap();
            let elapsed = start.elapsed().as_nanos() as u64;

            if i >= WARMUP {
                free_hist.record(elapsed).unwrap();
            }

            let start = Instant::now();
            scan.push_front(v).unwrap();
            scan.remove(v).unwrap();
            let elapsed = start.elapsed().as_nanos() as u64;

            if i >= WARMUP {
                scan_hist.record(elapsed).unwrap();
            }
        }

        print_histogram("Free-List Churn (half full)", &free_hist);
        print_histogram("Linear-Scan Churn (half full)", &scan_hist);
    }
}
