mod config;
mod gate;
mod models;
mod run;
mod settlement;
mod store;
mod totals;
mod ui;

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    let (settings, args) = config::Settings::resolve(args, |key| std::env::var(key).ok())?;
    let store = store::Store::open(&settings.data_dir)?;

    match args.len() {
        0 | 1 => run::as_tui(&store, &settings.gate),
        _ => run::as_cli(&args, &store, &settings.gate),
    }
}
