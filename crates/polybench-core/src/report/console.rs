use crate::engine::CollectionReport;
use crate::model::{ScheduleEntry, StatRow};

pub fn render_schedule(schedule: &[ScheduleEntry]) -> String {
    let mut s = String::new();
    s.push_str(&format!("{:>12}  {:>7}\n", "degree", "repeats"));
    for e in schedule {
        s.push_str(&format!("{:>12}  {:>7}\n", e.degree, e.repeat_count));
    }
    let total: u64 = schedule.iter().map(|e| e.repeat_count as u64).sum();
    s.push_str(&format!(
        "{} degrees, {} trials in total\n",
        schedule.len(),
        total
    ));
    s
}

pub fn print_schedule(schedule: &[ScheduleEntry]) {
    eprint!("{}", render_schedule(schedule));
}

pub fn print_collection_summary(report: &CollectionReport) {
    eprintln!(
        "\nCollected {}/{} trials in {:.1}s -> {}",
        report.recorded,
        report.attempted,
        report.duration_ms as f64 / 1000.0,
        report.raw_path.display()
    );
    if report.invalid > 0 {
        eprintln!("⚠️  {} sample(s) failed the correctness check", report.invalid);
    }
    if report.degree_mismatches > 0 {
        eprintln!(
            "⚠️  {} sample(s) reported a different degree than requested",
            report.degree_mismatches
        );
    }
    if !report.failures.is_empty() {
        eprintln!("❌ {} trial(s) failed:", report.failures.len());
        for f in &report.failures {
            eprintln!(
                "    degree {:>8} run {:>3}  [{}] {}",
                f.degree, f.repetition, f.kind, f.message
            );
        }
    }
}

pub fn render_stats_table(rows: &[StatRow]) -> String {
    let mut s = format!(
        "{:>10} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>9}\n",
        "degree", "scalar_min", "scalar_mean", "scalar_std", "avx_min", "avx_mean", "avx_std", "speedup"
    );
    if rows.is_empty() {
        s.push_str("(no valid samples)\n");
        return s;
    }
    for r in rows {
        s.push_str(&format!(
            "{:>10} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>9.3}\n",
            r.degree,
            r.scalar_time_min,
            r.scalar_time_mean,
            r.scalar_time_std,
            r.avx_time_min,
            r.avx_time_mean,
            r.avx_time_std,
            r.speedup
        ));
    }
    s
}

pub fn print_stats_table(rows: &[StatRow]) {
    eprint!("\n{}", render_stats_table(rows));
}
