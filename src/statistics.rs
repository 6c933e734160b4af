//! Collector statistics and their human-readable rendering: a plain struct
//! of counters plus a small `Display` wrapper for byte sizes.

struct FormattedSize {
    size: usize,
}

impl std::fmt::Display for FormattedSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let ksize = self.size as f64 / 1024.0;
        if ksize < 1.0 {
            return write!(f, "{}B", self.size);
        }
        let msize = ksize / 1024.0;
        if msize < 1.0 {
            return write!(f, "{:.1}K", ksize);
        }
        let gsize = msize / 1024.0;
        if gsize < 1.0 {
            write!(f, "{:.1}M", msize)
        } else {
            write!(f, "{:.1}G", gsize)
        }
    }
}

fn formatted_size(size: usize) -> FormattedSize {
    FormattedSize { size }
}

/// Snapshot of collector bookkeeping, readable at any quiescent moment.
#[derive(Clone, Copy, Debug, Default)]
pub struct CollectorStatistics {
    pub bytes_allocated: usize,
    pub next_gc: usize,
    pub slots_in_use: usize,
    pub slots_capacity: usize,
    pub min_address: usize,
    pub max_address: usize,
    pub total_collections: usize,
    pub total_bytes_freed: usize,
}

impl std::fmt::Display for CollectorStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Collector statistics:")?;
        writeln!(
            f,
            "  Bytes allocated: {} (next GC at {})",
            formatted_size(self.bytes_allocated),
            formatted_size(self.next_gc)
        )?;
        writeln!(
            f,
            "  Slots in use: {} of {} capacity",
            self.slots_in_use, self.slots_capacity
        )?;
        writeln!(
            f,
            "  Managed address range: [{:#x}, {:#x}]",
            self.min_address, self.max_address
        )?;
        writeln!(f, "  Collections run: {}", self.total_collections)?;
        writeln!(
            f,
            "  Total bytes freed: {}",
            formatted_size(self.total_bytes_freed)
        )
    }
}
