//! Application startup: arguments, configuration, logging, then dispatch

use clap::{CommandFactory, FromArgMatches};

use super::cli::args::Args;
use super::cli::config::Settings;
use super::commands;
use crate::core::error_handling::{log_error_with_context, user_facing_message};
use crate::core::logging::init_logging;
use crate::core::styles::palette_to_clap;
use crate::core::version;

/// Run the command line tool and exit with its status
pub fn startup() {
    // Help and usage errors are rendered before the configuration is read
    let help_color = !std::env::args().any(|arg| arg == "--no-color")
        && colored::control::SHOULD_COLORIZE.should_colorize();
    let matches = Args::command()
        .styles(palette_to_clap(help_color))
        .get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let settings = match Settings::resolve(&args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", user_facing_message(&e, "Loading configuration"));
            std::process::exit(1);
        }
    };

    let use_color = settings
        .color
        .unwrap_or_else(|| colored::control::SHOULD_COLORIZE.should_colorize());
    colored::control::set_override(use_color);

    let log_file = settings
        .log_file
        .as_ref()
        .map(|path| path.to_string_lossy().into_owned());
    if let Err(e) = init_logging(
        settings.log_level.as_deref(),
        settings.log_format.as_deref(),
        log_file.as_deref(),
        use_color,
    ) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    log::debug!(
        "tweetbucket {} (built {}, git {})",
        version::version(),
        version::build_time(),
        version::git_hash()
    );
    log::debug!("Effective settings: {:?}", settings);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = commands::run(&args.command, &settings, use_color, &mut out) {
        log_error_with_context(&e, "Command");
        eprintln!("{}", user_facing_message(&e, "Command"));
        std::process::exit(1);
    }
}
