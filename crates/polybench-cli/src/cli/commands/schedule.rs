use polybench_core::report::console;

use super::exit_codes;
use crate::cli::args::ScheduleArgs;

pub fn run(args: ScheduleArgs) -> anyhow::Result<i32> {
    let cfg = super::load_config(&args.config)?;
    let schedule = cfg.schedule.build()?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
    } else {
        print!("{}", console::render_schedule(&schedule));
    }
    Ok(exit_codes::OK)
}
