/*!
 * syncx-bench
 *
 * Runs the standard workloads and prints one JSON report per line on stdout.
 * Logs go to stderr.
 *
 * Configuration comes from the environment (see `HarnessConfig::from_env`);
 * passing `--pretty` indents the JSON.
 */

use anyhow::Context;
use syncx::harness::workloads;
use syncx::{init_tracing, HarnessConfig, ShardManager, SyncConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let pretty = std::env::args().skip(1).any(|arg| arg == "--pretty");
    let config = HarnessConfig::from_env();
    let sync = SyncConfig::from_env();

    info!(
        threads = config.threads,
        iterations = config.iterations,
        strategy = ?sync.select_strategy(),
        default_shards = ShardManager::default_shards(),
        "syncx-bench starting"
    );

    for report in workloads::run_all(&config) {
        let line = if pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        }
        .with_context(|| format!("failed to encode {} report", report.benchmark))?;
        println!("{line}");
    }

    info!("syncx-bench finished");
    Ok(())
}
