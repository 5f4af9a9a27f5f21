use std::time::{Duration, Instant};

use clap::Parser;
use htu31d::{Htu31dBuilder, HumidityResolution, SlaveAddress, TemperatureResolution};
use linux_embedded_hal::{Delay, I2cdev};

/// Periodically measure temperature and humidity on all HTU31D sensors on a bus.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to I2C bus (e.g., /dev/i2c-1)
    #[arg(short, long)]
    path: String,
    /// Humidity oversampling setting (0-3)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    humidity_osr: u8,
    /// Temperature oversampling setting (0-3)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    temperature_osr: u8,
    /// Seconds between measurements
    #[arg(short, long, default_value_t = 1)]
    interval: u64,
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    init(args);
}

fn humidity_resolution(osr: u8) -> HumidityResolution {
    match osr {
        0 => HumidityResolution::Osr0,
        1 => HumidityResolution::Osr1,
        2 => HumidityResolution::Osr2,
        _ => HumidityResolution::Osr3,
    }
}

fn temperature_resolution(osr: u8) -> TemperatureResolution {
    match osr {
        0 => TemperatureResolution::Osr0,
        1 => TemperatureResolution::Osr1,
        2 => TemperatureResolution::Osr2,
        _ => TemperatureResolution::Osr3,
    }
}

fn init(args: Args) {
    println!("[HUM] Opening bus: {}", args.path);
    // Open the I2C bus
    let mut i2c = I2cdev::new(&args.path).expect("Failed to open I2C device");
    let mut delay = Delay;
    // Open all available devices
    let addrs = [
        SlaveAddress::default(),
        SlaveAddress::default().with_a0(true),
    ];
    let mut htus = addrs
        .iter()
        .filter_map(|addr| {
            match Htu31dBuilder::default()
                .with_address(*addr)
                .with_humidity_resolution(humidity_resolution(args.humidity_osr))
                .with_temperature_resolution(temperature_resolution(args.temperature_osr))
                .build(&mut i2c, &mut delay)
            {
                Ok(htu) => {
                    println!("[HUM] Device found at address {:02x}", htu.get_address());
                    Some(htu)
                }
                Err(e) => {
                    log::warn!("[HUM] Address {:02x} not found: {e:?}", addr.into_bits());
                    None
                }
            }
        })
        .collect::<Vec<_>>();

    println!("[HUM] Devices found: {}", htus.len());
    let interval = Duration::from_secs(args.interval);

    loop {
        let start = Instant::now();
        for htu in htus.iter_mut() {
            match htu.measure(&mut i2c, &mut delay) {
                Ok((temp, hum)) => log::info!(
                    "[HUM] Sensor 0x{:02x}: {:.2} C, {:.2}%",
                    htu.get_address(),
                    temp.celsius(),
                    hum.percentage()
                ),
                Err(e) => log::warn!(
                    "[HUM] Sensor 0x{:02x}: Error reading: {e:?}",
                    htu.get_address()
                ),
            }
        }
        log::info!(
            "[HUM] Read {} sensors in {:.2} ms.",
            htus.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        if start.elapsed() < interval {
            std::thread::sleep(interval - start.elapsed());
        }
    }
}
