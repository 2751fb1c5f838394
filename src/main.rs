mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let args = Cli::parse();
    cli::logging::init(args.verbose, args.quiet);
    cli::output::set_quiet(args.quiet);

    let config = args.config.as_deref();

    let result = match &args.command {
        Commands::Apply { run, trace_file } => {
            cli::commands::apply::execute(config, run, trace_file.as_deref())
        }
        Commands::Status { run } => cli::commands::status::execute(config, run),
        Commands::History {
            trace_file,
            key,
            since,
            last,
        } => cli::commands::history::execute(trace_file, key.as_deref(), since.as_deref(), *last),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(e.exit_code());
    }
}
