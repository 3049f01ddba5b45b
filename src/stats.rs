//! Occupancy statistics for a built grid index.

use serde::{Deserialize, Serialize};

/// Summary of how records were distributed over the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Records owned by the index.
    pub records: usize,
    /// Records placed in at least one bucket.
    pub placed_records: usize,
    /// Total bucket entries across all cells.
    pub entries: usize,
    /// Cells holding at least one entry.
    pub occupied_cells: usize,
    pub total_cells: usize,
}

impl IndexStats {
    /// Records that landed in no bucket (empty or degenerate geometry).
    pub fn unplaced_records(&self) -> usize {
        self.records - self.placed_records
    }

    /// Average number of cells each placed record spans.
    pub fn entries_per_record(&self) -> f64 {
        if self.placed_records == 0 {
            0.0
        } else {
            self.entries as f64 / self.placed_records as f64
        }
    }

    /// Fraction of cells holding at least one entry.
    pub fn occupancy(&self) -> f64 {
        if self.total_cells == 0 {
            0.0
        } else {
            self.occupied_cells as f64 / self.total_cells as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_ratios() {
        let stats = IndexStats {
            records: 5,
            placed_records: 4,
            entries: 10,
            occupied_cells: 25,
            total_cells: 100,
        };
        assert_eq!(stats.unplaced_records(), 1);
        assert_eq!(stats.entries_per_record(), 2.5);
        assert_eq!(stats.occupancy(), 0.25);
    }

    #[test]
    fn test_stats_default_is_empty() {
        let stats = IndexStats::default();
        assert_eq!(stats.entries_per_record(), 0.0);
        assert_eq!(stats.occupancy(), 0.0);
    }
}
