use clap::Parser;
use shelf::cli::commands::Cli;
use shelf::cli::handlers;
use shelf::logging;

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
