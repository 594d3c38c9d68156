use ideacheck::cli::commands::{CliArgs, Commands};
use ideacheck::cli::handlers::{handle_config, handle_validate};
use ideacheck::util::logging::{
    init_logging, json_from_env, resolve_level, LoggingConfig, LOG_LEVEL_VAR,
};
use ideacheck::VERSION;

use clap::Parser;
use std::env;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("ideacheck v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Validate(validate_args) => handle_validate(validate_args, args.quiet).await,
        Commands::Config => handle_config(),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let from_env = env::var(LOG_LEVEL_VAR).ok();
    let level = resolve_level(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
        from_env.as_deref(),
    );

    init_logging(LoggingConfig::with_level(level).json(json_from_env()));
}
