use clap::Parser;
use ld19_driver::{default_port_name, run_driver, DriverConfig};
use std::io::Write;
use std::time::Duration;

#[derive(Parser)]
#[clap(about = "Reads scans from an LD19 LiDAR and prints them as JSON lines.")]
struct Cli {
    /// The device path to a serial port
    #[clap(default_value_t = default_port_name().to_string())]
    port: String,

    /// Number of scans to print before exiting
    #[clap(short, long, default_value_t = 10)]
    count: usize,

    /// Read timeout in ms after which a partial frame is dropped
    #[clap(long, default_value_t = 100)]
    timeout_ms: u64,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = DriverConfig {
        port_name: cli.port,
        read_timeout: Duration::from_millis(cli.timeout_ms),
    };
    let (driver_threads, scan_rx) = match run_driver(&config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for scan in scan_rx.iter().take(cli.count) {
        let line = serde_json::to_string(&scan).unwrap();
        if writeln!(out, "{line}").is_err() {
            break;
        }
    }

    let stats = driver_threads.stats();
    eprintln!("{:?}", stats);
    if let Err(e) = driver_threads.join() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
