use clap::Parser;
use log::info;
use server::network::Server;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// UDP port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Simulation tick rate (updates per second); snapshots go out at half
    /// this rate
    #[arg(short, long, default_value = "60")]
    tick_rate: u32,

    /// Maximum concurrent players
    #[arg(short, long, default_value = "16")]
    max_players: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);
    let tick_duration = Duration::from_secs_f64(1.0 / f64::from(args.tick_rate.max(1)));

    info!(
        "Starting server on {} at {} Hz for up to {} players",
        addr, args.tick_rate, args.max_players
    );

    let mut server = Server::new(&addr, tick_duration, args.max_players).await?;
    server.run().await
}
