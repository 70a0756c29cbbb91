//! Test command implementation.
//!
//! Runs scrape cycles against the configured process list source without
//! starting the HTTP server.

use pm2_prometheus_exporter::config::Config;
use pm2_prometheus_exporter::state::scraper_for;
use pm2_prometheus_exporter::WarmupSuppressor;
use std::time::Instant;

/// Runs `iterations` scrape cycles and prints the outcome of each.
pub async fn command_test(
    iterations: usize,
    verbose: bool,
    config: &Config,
    warmup: WarmupSuppressor,
) -> anyhow::Result<()> {
    println!("🧪 PM2 Prometheus Exporter - Test Mode");
    println!("======================================");

    let scraper = scraper_for(config, warmup);
    println!("Source: {}", scraper.provider().describe());

    let mut failures = 0usize;
    for iteration in 1..=iterations {
        println!("\n🔄 Iteration {}/{}:", iteration, iterations);

        let start = Instant::now();
        match scraper.scrape().await {
            Ok(output) => {
                let samples = output
                    .body
                    .lines()
                    .filter(|l| !l.starts_with('#') && !l.is_empty())
                    .count();

                println!("   Processes:   {}", output.processes);
                println!("   Metrics:     {}", output.metrics);
                println!("   Samples:     {}", samples);
                println!("   Unparsable:  {}", output.report.unparsable);
                println!("   Malformed:   {}", output.report.malformed);
                println!(
                    "   Duration:    {:.2}ms",
                    start.elapsed().as_secs_f64() * 1000.0
                );

                if verbose {
                    println!();
                    print!("{}", output.body);
                }
            }
            Err(e) => {
                failures += 1;
                println!("   ❌ Scrape failed: {}", e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {iterations} scrape(s) failed");
    }

    println!("\n✅ Test completed successfully");
    Ok(())
}
