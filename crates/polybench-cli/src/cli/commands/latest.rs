use polybench_core::errors::DiscoveryError;

use super::exit_codes;
use crate::cli::args::LatestArgs;

pub fn run(args: LatestArgs) -> anyhow::Result<i32> {
    let cfg = super::load_config(&args.config)?;
    let layout = cfg.layout();

    match layout.latest(args.stage) {
        Some(p) => {
            println!("{}", p.display());
            Ok(exit_codes::OK)
        }
        None => Err(DiscoveryError {
            stage: args.stage,
            dir: layout.dir(args.stage),
        }
        .into()),
    }
}
