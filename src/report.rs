use anyhow::Context;

use crate::metrics::DerivedTable;

/// Fixed comparison pair reported at the end of the summary.
const COMPARE_THREADS: (u32, u32) = (8, 16);

pub fn improvement_percent(base: f64, other: f64) -> f64 {
    (other - base) / base * 100.0
}

/// Prints the full console summary. Fails if a sequence length lacks one of
/// the rows the 8-vs-16 comparison needs.
pub fn print_summary(table: &DerivedTable) -> anyhow::Result<()> {
    println!();
    println!("=== Performance Summary ===");

    println!();
    println!("Maximum speedups achieved:");
    for seq in table.seq_lengths() {
        // Every seq_length in the table has at least one row by construction.
        let best = table
            .max_speedup_row(seq)
            .with_context(|| format!("no derived rows for seq_length {seq}"))?;
        println!(
            "seq_length={seq}: {:.2}x on {} threads ({:.1}% efficiency)",
            best.speedup, best.thread_count, best.efficiency
        );
    }

    println!();
    println!("=== Thread Scaling Analysis ===");
    for threads in table.thread_counts() {
        let (speedup, efficiency) = table
            .means_at(threads)
            .with_context(|| format!("no rows for thread count {threads}"))?;
        println!(
            "{threads} threads: Avg speedup = {speedup:.2}x, Avg efficiency = {efficiency:.1}%"
        );
    }

    let (low, high) = COMPARE_THREADS;
    println!();
    println!("=== Comparison: {low} vs {high} Threads ===");
    for seq in table.seq_lengths() {
        let s_low = table
            .speedup_at(seq, low)
            .with_context(|| format!("no {low}-thread record for seq_length {seq}"))?;
        let s_high = table
            .speedup_at(seq, high)
            .with_context(|| format!("no {high}-thread record for seq_length {seq}"))?;
        println!(
            "seq_length={seq}: {low}T={s_low:.2}x -> {high}T={s_high:.2}x ({:+.1}%)",
            improvement_percent(s_low, s_high)
        );
    }

    Ok(())
}
