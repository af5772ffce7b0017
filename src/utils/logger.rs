use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 容器環境設 LOG_FORMAT=json，本機預設 compact
pub fn init_cli_logger(verbose: bool) {
    let default_filter = if verbose {
        "roads_etl=debug,info"
    } else {
        "roads_etl=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let base = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(base.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(base.compact())
            .init();
    }
}
