use std::env;

use tracing_subscriber::{prelude::*, EnvFilter, Layer};

const LOG_ENV: &str = "HEADSYNC_LOG";

pub fn build_tracing(verbose: bool) {
    // If {LOG_ENV} is set, default to env, otherwise only show our own info logs
    let mut filter = EnvFilter::new(match verbose {
        true => "warn,headsync=debug,headsync_cli=debug",
        false => "warn,headsync=info,headsync_cli=info",
    });
    if env::var(LOG_ENV).is_ok() {
        filter = EnvFilter::from_env(LOG_ENV);
    }

    let fmt_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(fmt_layer).init();
}
