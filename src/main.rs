use clap::{CommandFactory, Parser};
use colored::Colorize;
use sitemap_scrub::cli::{execute_command, Cli};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    match execute_command(&cli) {
        Ok(outcome) => {
            println!(
                "Sitemap cleaning process complete. Modified XML saved as {}.",
                outcome.output.display()
            );
            println!(
                "{} text value(s) rewritten, {} tag(s) pruned.",
                outcome.report.replaced_leaves,
                outcome.report.pruned_total()
            );
        }
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            if e.is_usage() {
                eprintln!("{}", Cli::command().render_usage());
            }
            std::process::exit(e.exit_code());
        }
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -d -d -d");
            LevelFilter::TRACE
        }
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}
