use anyhow::bail;

use crate::data::{BenchmarkRecord, Implementation};

/// Speedup and efficiency for one parallel configuration, relative to the
/// serial baseline of the same sequence length.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRecord {
    pub seq_length: u64,
    pub thread_count: u32,
    pub execution_time_ms: f64,
    pub speedup: f64,
    pub efficiency: f64,
}

/// Derived metrics, ordered by (seq_length, thread_count) ascending.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    rows: Vec<DerivedRecord>,
}

/// Derives speedup and efficiency for every parallel configuration.
///
/// Each sequence length must have exactly one serial record to serve as the
/// baseline; zero or several is an error. A sequence length whose only record
/// is the baseline simply contributes no rows.
pub fn derive(records: &[BenchmarkRecord]) -> anyhow::Result<DerivedTable> {
    let mut seq_lengths: Vec<u64> = records.iter().map(|r| r.seq_length).collect();
    seq_lengths.sort_unstable();
    seq_lengths.dedup();

    let mut rows = Vec::new();
    for seq in seq_lengths {
        let baselines: Vec<&BenchmarkRecord> = records
            .iter()
            .filter(|r| r.seq_length == seq && r.implementation_type == Implementation::Serial)
            .collect();

        let baseline = match baselines.as_slice() {
            [] => bail!("no serial baseline for seq_length {seq}"),
            [one] => one.execution_time_ms,
            _ => bail!(
                "ambiguous baseline: {} serial records for seq_length {seq}",
                baselines.len()
            ),
        };

        let mut parallel: Vec<&BenchmarkRecord> = records
            .iter()
            .filter(|r| r.seq_length == seq && r.implementation_type == Implementation::Parallel)
            .collect();
        parallel.sort_by_key(|r| r.thread_count);

        for r in parallel {
            let speedup = baseline / r.execution_time_ms;
            rows.push(DerivedRecord {
                seq_length: seq,
                thread_count: r.thread_count,
                execution_time_ms: r.execution_time_ms,
                speedup,
                efficiency: speedup / r.thread_count as f64 * 100.0,
            });
        }
    }

    Ok(DerivedTable { rows })
}

impl DerivedTable {
    pub fn rows(&self) -> &[DerivedRecord] {
        &self.rows
    }

    /// Distinct sequence lengths, ascending.
    pub fn seq_lengths(&self) -> Vec<u64> {
        let mut v: Vec<u64> = self.rows.iter().map(|r| r.seq_length).collect();
        v.dedup();
        v
    }

    /// Distinct thread counts across all sequence lengths, ascending.
    pub fn thread_counts(&self) -> Vec<u32> {
        let mut v: Vec<u32> = self.rows.iter().map(|r| r.thread_count).collect();
        v.sort_unstable();
        v.dedup();
        v
    }

    /// Rows for one sequence length, thread count ascending.
    pub fn rows_for(&self, seq_length: u64) -> impl Iterator<Item = &DerivedRecord> {
        self.rows.iter().filter(move |r| r.seq_length == seq_length)
    }

    pub fn speedup_at(&self, seq_length: u64, thread_count: u32) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.seq_length == seq_length && r.thread_count == thread_count)
            .map(|r| r.speedup)
    }

    pub fn time_at(&self, seq_length: u64, thread_count: u32) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.seq_length == seq_length && r.thread_count == thread_count)
            .map(|r| r.execution_time_ms)
    }

    /// Row with the highest speedup for a sequence length; the first
    /// occurrence in table order wins ties.
    pub fn max_speedup_row(&self, seq_length: u64) -> Option<&DerivedRecord> {
        let mut best: Option<&DerivedRecord> = None;
        for r in self.rows_for(seq_length) {
            match best {
                Some(b) if r.speedup <= b.speedup => {}
                _ => best = Some(r),
            }
        }
        best
    }

    /// Mean speedup and mean efficiency over all sequence lengths measured at
    /// one thread count.
    pub fn means_at(&self, thread_count: u32) -> Option<(f64, f64)> {
        let rows: Vec<&DerivedRecord> = self
            .rows
            .iter()
            .filter(|r| r.thread_count == thread_count)
            .collect();
        if rows.is_empty() {
            return None;
        }
        let n = rows.len() as f64;
        let speedup = rows.iter().map(|r| r.speedup).sum::<f64>() / n;
        let efficiency = rows.iter().map(|r| r.efficiency).sum::<f64>() / n;
        Some((speedup, efficiency))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::Implementation::{Parallel, Serial};

    fn record(
        seq_length: u64,
        implementation_type: Implementation,
        thread_count: u32,
        execution_time_ms: f64,
    ) -> BenchmarkRecord {
        BenchmarkRecord {
            seq_length,
            implementation_type,
            thread_count,
            execution_time_ms,
        }
    }

    #[test]
    fn speedup_and_efficiency() {
        let records = vec![
            record(1000, Serial, 1, 1000.0),
            record(1000, Parallel, 4, 300.0),
        ];
        let table = derive(&records).unwrap();

        assert_eq!(table.rows().len(), 1);
        let row = &table.rows()[0];
        assert!((row.speedup - 1000.0 / 300.0).abs() < 1e-12);
        assert!((row.efficiency - 1000.0 / 300.0 / 4.0 * 100.0).abs() < 1e-12);
        assert!((row.efficiency - 83.333333333).abs() < 1e-6);
    }

    #[test]
    fn rows_sorted_by_seq_then_threads() {
        let records = vec![
            record(2000, Parallel, 16, 100.0),
            record(2000, Serial, 1, 800.0),
            record(1000, Parallel, 4, 300.0),
            record(2000, Parallel, 2, 500.0),
            record(1000, Serial, 1, 1000.0),
            record(1000, Parallel, 2, 600.0),
        ];
        let table = derive(&records).unwrap();

        let order: Vec<(u64, u32)> = table
            .rows()
            .iter()
            .map(|r| (r.seq_length, r.thread_count))
            .collect();
        assert_eq!(order, vec![(1000, 2), (1000, 4), (2000, 2), (2000, 16)]);

        assert_eq!(table.seq_lengths(), vec![1000, 2000]);
        assert_eq!(table.thread_counts(), vec![2, 4, 16]);
    }

    #[test]
    fn missing_baseline_is_fatal() {
        let records = vec![record(1000, Parallel, 4, 300.0)];
        let err = derive(&records).unwrap_err();
        assert!(err.to_string().contains("no serial baseline"));
    }

    #[test]
    fn duplicate_baseline_is_fatal() {
        let records = vec![
            record(1000, Serial, 1, 1000.0),
            record(1000, Serial, 1, 990.0),
            record(1000, Parallel, 4, 300.0),
        ];
        let err = derive(&records).unwrap_err();
        assert!(err.to_string().contains("ambiguous baseline"));
    }

    #[test]
    fn baseline_without_parallel_rows_is_silent() {
        let records = vec![
            record(500, Serial, 1, 100.0),
            record(1000, Serial, 1, 1000.0),
            record(1000, Parallel, 2, 600.0),
        ];
        let table = derive(&records).unwrap();
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.rows()[0].seq_length, 1000);
    }

    #[test]
    fn derivation_is_idempotent() {
        let records = vec![
            record(1000, Serial, 1, 1000.0),
            record(1000, Parallel, 2, 600.0),
            record(1000, Parallel, 4, 300.0),
        ];
        assert_eq!(derive(&records).unwrap(), derive(&records).unwrap());
    }

    #[test]
    fn max_speedup_ties_break_by_first_occurrence() {
        let records = vec![
            record(1000, Serial, 1, 1000.0),
            record(1000, Parallel, 2, 250.0),
            record(1000, Parallel, 4, 250.0),
            record(1000, Parallel, 8, 500.0),
            record(1000, Parallel, 16, 500.0),
        ];
        let table = derive(&records).unwrap();
        let best = table.max_speedup_row(1000).unwrap();
        assert_eq!(best.thread_count, 2);
        assert_eq!(best.speedup, 4.0);
    }

    #[test]
    fn means_over_seq_lengths() {
        let records = vec![
            record(1000, Serial, 1, 1000.0),
            record(1000, Parallel, 4, 500.0),
            record(2000, Serial, 1, 1200.0),
            record(2000, Parallel, 4, 300.0),
        ];
        let table = derive(&records).unwrap();

        let (speedup, efficiency) = table.means_at(4).unwrap();
        assert!((speedup - 3.0).abs() < 1e-12);
        assert!((efficiency - 75.0).abs() < 1e-12);
        assert_eq!(table.means_at(8), None);
    }
}
