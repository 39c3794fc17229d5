use clap::Parser;
use crossbeam_channel::{Receiver, TryRecvError};
use ld19_driver::{default_port_name, run_driver, DriverConfig, Scan};
use piston_window::{EventLoop, PistonWindow, WindowSettings};
use plotters::drawing::IntoDrawingArea;
use plotters::prelude::{ChartBuilder, Circle, Cross, RGBColor, BLUE, WHITE};
use plotters::style::Color;
use plotters_piston::{draw_piston_window, PistonBackend};
use std::error::Error;

#[derive(Parser)]
#[clap(about = "Reads data from an LD19 LiDAR and plots the latest scan.")]
struct Cli {
    /// The device path to a serial port
    #[clap(default_value_t = default_port_name().to_string())]
    port: String,
}

const WINDOW_RANGE: f64 = 5000.;
const FPS: u64 = 60;

/// Dark red for weak returns up to yellow for strong ones.
fn heat_color(intensity: u8) -> RGBColor {
    let t = intensity as f64 / 255.;
    let r = (96. + 159. * (t * 2.).min(1.)) as u8;
    let g = (255. * (t * 2. - 1.).max(0.)) as u8;
    RGBColor(r, g, 0)
}

fn draw(
    b: PistonBackend,
    scan_rx: &Receiver<Scan>,
    latest: &mut Scan,
    connected: &mut bool,
) -> Result<(), Box<dyn Error>> {
    loop {
        match scan_rx.try_recv() {
            Ok(scan) => *latest = scan,
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                *connected = false;
                break;
            }
        }
    }

    let root = b.into_drawing_area();
    root.fill(&WHITE)?;

    let mut cc = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(-WINDOW_RANGE..WINDOW_RANGE, -WINDOW_RANGE..WINDOW_RANGE)?;
    cc.configure_mesh()
        .x_desc("X (mm)")
        .y_desc("Y (mm)")
        .draw()?;

    let circles: Vec<_> = latest
        .valid_points()
        .map(|p| Circle::new(p.to_cartesian(), 2, heat_color(p.intensity).filled()))
        .collect();
    cc.draw_series(circles)?;
    cc.draw_series(std::iter::once(Cross::new(
        (0., 0.),
        8,
        BLUE.stroke_width(2),
    )))?;

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let (driver_threads, scan_rx) = match run_driver(&DriverConfig::new(cli.port)) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Make sure the lidar is connected and the port is correct.");
            std::process::exit(1);
        }
    };

    let mut window: PistonWindow = WindowSettings::new("LD19 Lidar Point Cloud", [800, 800])
        .build()
        .unwrap();
    window.set_max_fps(FPS);

    let mut latest = Scan::new();
    let mut connected = true;
    while draw_piston_window(&mut window, |b| {
        draw(b, &scan_rx, &mut latest, &mut connected)
    })
    .is_some()
    {
        if !connected {
            break;
        }
    }

    let stats = driver_threads.stats();
    println!(
        "{} scans, {} frames accepted, {} rejected.",
        stats.scans_emitted,
        stats.frames_accepted,
        stats.frames_rejected()
    );
    if let Err(e) = driver_threads.join() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
