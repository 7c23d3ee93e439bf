//! prd-fetch - list PRD items from the tasks database or print one
//!
//! Usage:
//!   prd-fetch             - every item
//!   prd-fetch 진행중       - items with that status
//!   prd-fetch detail <ID> - one page with its body

use clap::Parser;
use notion_skills::cli::{commands, init_logging, report_error, FetchCli};

fn main() {
    let cli = FetchCli::parse();
    init_logging(cli.common.verbose);

    if let Err(e) = commands::fetch(cli) {
        report_error(&e);
        std::process::exit(1);
    }
}
