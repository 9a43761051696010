//! redka-cli - send one command to a Redis-compatible server
//!
//! ```text
//! $ redka-cli set name Ariz
//! OK
//! $ redka-cli get name
//! "Ariz"
//! $ redka-cli --port 6380 lrange list 0 -1
//! 1) "a"
//! 2) "b"
//! ```

use clap::Parser;
use redka::{Client, ClientConfig, Error, Locale};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Redka command-line client
#[derive(Parser, Debug)]
#[command(name = "redka-cli", version = redka::VERSION)]
#[command(about = "Send a command to a Redis-compatible server")]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = redka::DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = redka::DEFAULT_PORT)]
    port: u16,

    /// Language for error messages (en, ru)
    #[arg(short, long, default_value = "en")]
    lang: String,

    /// Exit immediately on the first failure
    #[arg(short, long)]
    debug: bool,

    /// Command name followed by its arguments
    #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::new(args.host, args.port)
        .with_locale(Locale::from_tag(&args.lang))
        .with_debug(args.debug);

    debug!(server = %config.endpoint(), "Starting redka-cli");

    let mut client = Client::new(config);
    let (name, rest) = args
        .command
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("missing command"))?;

    match client.send(name, rest) {
        Ok(reply) => {
            println!("{}", reply);
            Ok(())
        }
        Err(Error::Server(message)) => {
            println!("(error) {}", message);
            std::process::exit(1);
        }
        Err(e) => Err(anyhow::anyhow!(client.render(&e))),
    }
}
