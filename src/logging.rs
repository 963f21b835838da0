use std::fs::File;

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Initialises the global logger.
///
/// `verbose` lowers the default filter from info to debug; `RUST_LOG` still
/// wins when set. When `file` is given, records go there instead of stderr,
/// which the terminal demo needs because the screen belongs to the game.
pub fn init(verbose: bool, file: Option<File>) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);
    if let Some(file) = file {
        builder.target(Target::Pipe(Box::new(file)));
    }

    // Only fails when a logger is already installed; tests call this often.
    let _ = builder.try_init();
}
