use polybench_core::config::{load_config, write_sample_config};

use super::exit_codes;
use crate::cli::args::InitArgs;

pub fn run(args: InitArgs) -> anyhow::Result<i32> {
    if !args.config.exists() {
        if let Some(parent) = args.config.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        write_sample_config(&args.config)?;
        eprintln!("created {}", args.config.display());
    } else {
        eprintln!("note: {} already exists (skipped)", args.config.display());
    }

    let cfg = load_config(&args.config)?;
    let layout = cfg.layout();
    layout.ensure()?;
    eprintln!("data layout ready under {}", layout.root().display());

    Ok(exit_codes::OK)
}
