//! Shared output helpers for CLI commands.

use std::collections::HashMap;
use std::path::Path;

use console::style;

use cunli::scrapers::rate_limiter::DomainStats;
use cunli::scrapers::CrawlStats;
use cunli::services::ReconcileReport;

/// Print the crawl summary, with request totals per host.
pub fn print_crawl_summary(
    stats: &CrawlStats,
    requests: &HashMap<String, DomainStats>,
    output: &Path,
) {
    println!(
        "{} Harvested {} villages from {} counties",
        style("✓").green(),
        stats.rows,
        stats.counties
    );
    println!("  Expanded nodes: {}", stats.expanded);
    let mut hosts: Vec<_> = requests.iter().collect();
    hosts.sort_by(|a, b| a.0.cmp(b.0));
    for (host, domain) in hosts {
        println!(
            "  Requests to {}: {} ({:?} apart)",
            host, domain.total_requests, domain.delay
        );
    }
    if stats.skipped_branches > 0 {
        println!(
            "  {} Skipped branches: {} (see log for details)",
            style("!").yellow(),
            stats.skipped_branches
        );
    }
    println!("  Output file: {}", output.display());
}

/// Print the mapping summary, including every distinct unmatched key.
pub fn print_mapping_summary(report: &ReconcileReport, output: &Path) {
    println!("\nMapping completed:");
    println!("  Processed: {} records", report.processed);
    println!("  Matched: {} records", report.matched);
    println!("  Unmatched: {} records", report.unmatched);
    if report.malformed > 0 {
        println!(
            "  {} Malformed harvest records skipped: {}",
            style("!").yellow(),
            report.malformed
        );
    }
    if report.overrides_replaced > 0 {
        println!(
            "  {} Overrides replacing reference codes: {}",
            style("!").yellow(),
            report.overrides_replaced
        );
    }
    println!("  Output file: {}", output.display());

    if report.unmatched_keys.is_empty() {
        println!("\n{} All records matched successfully!", style("✓").green());
        return;
    }

    println!("\nUnmatched records:");
    for key in &report.unmatched_keys {
        println!("  {} {}", style("→").dim(), key.readable());
    }
    println!("\nNote: Unmatched records might be due to:");
    println!("  - Different naming conventions");
    println!("  - Administrative boundary changes");
    println!("  - Data inconsistencies");
}
