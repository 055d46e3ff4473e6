//! funcgen: generate functional API bindings from an operator schema.

use std::process;

use clap::Parser;

use funcgen::cli::{self, Args};

fn main() {
    let args = Args::parse();
    cli::init_logging(args.log_disable);

    match cli::run(&args) {
        Ok(summary) => eprintln!("{summary}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
