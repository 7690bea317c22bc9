//! dirchat - conversations kept as plain directories
//!
//! A thin CLI over a storage root where every conversation is a folder of
//! message files. Folders may be edited by other tools between runs; every
//! folder is reconciled before its messages are shown.

use clap::Parser;

mod commands;
mod util;

use commands::Cli;

fn main() {
    dirchat_core::logging::init();
    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
