use clap::Parser;
use rtsp_proxy::config::redacted_url;
use rtsp_proxy::{Server, StreamRegistry, parse_streams};
use std::io;
use std::process;
use std::thread;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rtsp-proxy",
    about = "RTSP proxy that relays camera streams and repairs malformed Transport headers"
)]
struct Args {
    /// Port to listen on
    #[arg(long, short, env = "PORT", default_value_t = 8554)]
    port: u16,

    /// Stream definitions as JSON objects with "name", "url", and the
    /// optional "fix_force_tcp_in_transport" flag
    #[arg(long, env = "STREAMS")]
    streams: String,
}

fn init_logging() {
    let default = if std::env::var("DEBUG").is_ok_and(|v| v == "true") {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    init_logging();

    let args = Args::parse();

    let streams = match parse_streams(&args.streams) {
        Ok(streams) => streams,
        Err(e) => {
            tracing::error!(error = %e, "invalid stream configuration");
            process::exit(1);
        }
    };

    for stream in &streams {
        tracing::info!(
            name = %stream.name,
            url = %redacted_url(&stream.url),
            fix_transport = stream.fix_force_tcp_in_transport,
            "proxying stream"
        );
    }

    let bind_addr = format!("0.0.0.0:{}", args.port);
    let mut server = Server::new(&bind_addr, StreamRegistry::new(streams));

    if let Err(e) = server.start() {
        tracing::error!(error = %e, "failed to start proxy");
        process::exit(1);
    }

    println!("RTSP proxy on {} — press Enter to stop", bind_addr);
    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        // No usable stdin, e.g. under a container supervisor: stay up
        // until killed.
        Ok(0) | Err(_) => loop {
            thread::park();
        },
        Ok(_) => server.stop(),
    }
}
