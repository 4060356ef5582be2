use std::io::{BufRead, Write};

use ordtree::config::ShellConfig;
use ordtree::shell::{Output, Shell};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Logs go to stderr so they never interleave with command output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ordtree=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration from environment variables
    let config = match ShellConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: btree_min_degree={}, echo={}",
        config.btree_min_degree,
        config.echo
    );

    let mut shell = match Shell::new(config) {
        Ok(shell) => shell,
        Err(e) => {
            tracing::error!("Failed to create shell: {e}");
            std::process::exit(1);
        }
    };

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to read input: {e}");
                std::process::exit(1);
            }
        };

        for output in shell.handle_line(&line) {
            let written = match output {
                Output::Line(text) => writeln!(stdout, "{text}"),
                Output::Error(text) => writeln!(stderr, "{text}"),
            };
            if let Err(e) = written {
                tracing::debug!("output closed: {e}");
                return;
            }
        }
    }

    if let Err(e) = stdout.flush() {
        tracing::debug!("output closed: {e}");
    }
}
