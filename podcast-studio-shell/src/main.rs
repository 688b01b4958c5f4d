//! Podcast Studio binary entry point

mod app;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    ::log::info!("Starting Podcast Studio");
    app::app_main();
}
