use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Implementation {
    Serial,
    Parallel,
}

/// One measured configuration, as recorded by the benchmark run.
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkRecord {
    pub seq_length: u64,
    pub implementation_type: Implementation,
    pub thread_count: u32,
    pub execution_time_ms: f64,
}

/// Loads the results table. Malformed rows, non-positive values, and serial
/// rows recorded with more than one thread are all fatal.
pub fn load_records(path: &Path) -> anyhow::Result<Vec<BenchmarkRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open results file {}", path.display()))?;

    let records: Vec<BenchmarkRecord> = reader
        .deserialize()
        .collect::<Result<_, _>>()
        .with_context(|| format!("malformed row in {}", path.display()))?;

    if records.is_empty() {
        bail!("results file {} contains no rows", path.display());
    }

    validate(&records)?;

    Ok(records)
}

fn validate(records: &[BenchmarkRecord]) -> anyhow::Result<()> {
    for r in records {
        if r.seq_length == 0 || r.thread_count == 0 {
            bail!("invalid record: {r:?}");
        }
        if r.execution_time_ms.is_nan() || r.execution_time_ms <= 0.0 {
            bail!("non-positive execution time in record: {r:?}");
        }
        if r.implementation_type == Implementation::Serial && r.thread_count != 1 {
            bail!("serial record with thread_count != 1: {r:?}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_csv() {
        let csv = "seq_length,implementation_type,thread_count,execution_time_ms\n\
                   1000,Serial,1,1200.5\n\
                   1000,Parallel,4,350.0\n";
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let records: Vec<BenchmarkRecord> =
            reader.deserialize().collect::<Result<_, _>>().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].implementation_type, Implementation::Serial);
        assert_eq!(records[0].thread_count, 1);
        assert_eq!(records[1].implementation_type, Implementation::Parallel);
        assert_eq!(records[1].execution_time_ms, 350.0);
    }

    #[test]
    fn serial_rows_must_be_single_threaded() {
        let record = |implementation_type, thread_count, execution_time_ms| BenchmarkRecord {
            seq_length: 1000,
            implementation_type,
            thread_count,
            execution_time_ms,
        };

        let good = vec![
            record(Implementation::Serial, 1, 1000.0),
            record(Implementation::Parallel, 4, 300.0),
        ];
        assert!(validate(&good).is_ok());

        let bad = vec![record(Implementation::Serial, 4, 1000.0)];
        let err = validate(&bad).unwrap_err();
        assert!(err.to_string().contains("thread_count != 1"));
    }

    #[test]
    fn rejects_non_positive_times() {
        let bad = vec![BenchmarkRecord {
            seq_length: 1000,
            implementation_type: Implementation::Parallel,
            thread_count: 4,
            execution_time_ms: 0.0,
        }];
        assert!(validate(&bad).is_err());
    }

    #[test]
    fn rejects_unknown_implementation() {
        let csv = "seq_length,implementation_type,thread_count,execution_time_ms\n\
                   1000,Threaded,4,350.0\n";
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let records: Result<Vec<BenchmarkRecord>, _> = reader.deserialize().collect();
        assert!(records.is_err());
    }
}
