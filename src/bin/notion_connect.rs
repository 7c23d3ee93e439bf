//! notion-connect - link the current project to a Notion project page
//!
//! Usage:
//!   notion-connect                      - interactive setup
//!   notion-connect --mode link --url U  - link without prompts
//!   notion-connect --migrate            - convert a legacy config

use clap::Parser;
use notion_skills::cli::{commands, init_logging, report_error, ConnectCli};

fn main() {
    let cli = ConnectCli::parse();
    init_logging(cli.common.verbose);

    if let Err(e) = commands::connect(cli) {
        report_error(&e);
        std::process::exit(1);
    }
}
