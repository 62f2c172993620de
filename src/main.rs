use tracing_subscriber::EnvFilter;
use xmldecode::cli::Cli;

fn main() {
    let matches = Cli::build_command().get_matches();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| Cli::log_level(&matches).into()),
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match Cli::run_with_matches(matches) {
        Ok(status) => std::process::exit(status),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    }
}
