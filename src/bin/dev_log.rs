//! dev-log - record a dev log under the project (or PRD) page
//!
//! Usage:
//!   dev-log "Add search" -t 기능 -c "details"
//!   dev-log "Fix login" -t 버그 -p <PRD URL>
//!   dev-log --list --limit 5

use clap::Parser;
use notion_skills::cli::{commands, init_logging, report_error, LogCli};

fn main() {
    let cli = LogCli::parse();
    init_logging(cli.common.verbose);

    if let Err(e) = commands::log(cli) {
        report_error(&e);
        std::process::exit(1);
    }
}
