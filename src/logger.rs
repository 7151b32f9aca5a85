use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

/// Logs go to stderr so they never interleave with the conversation.
pub fn init(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);
}
