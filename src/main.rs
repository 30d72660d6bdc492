//! soundcart CLI

use std::process;

use clap::Parser;
use soundcart::config;

use crate::cli::Cli;

mod cli;

#[tokio::main]
pub async fn main() {
    config::load_dotenv();

    let cli = Cli::parse();

    if let Err(error) = cli.run().await {
        #[expect(
            clippy::print_stderr,
            reason = "errors are reported on stderr before exiting"
        )]
        {
            eprintln!("{error}");
        }

        process::exit(1);
    }
}
