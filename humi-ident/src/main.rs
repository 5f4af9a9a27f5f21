use clap::Parser;
use htu31d::{Htu31dBuilder, SlaveAddress};
use linux_embedded_hal::{Delay, I2cdev};

/// Identify the HTU31D sensors on an I2C bus by their serial numbers.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to I2C bus (e.g., /dev/i2c-1)
    #[arg(short, long)]
    path: String,
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    println!("[IDENT] Opening bus: {}", args.path);
    let mut i2c = I2cdev::new(&args.path).expect("Failed to open I2C device");
    let mut delay = Delay;
    let addrs = [
        SlaveAddress::default(),
        SlaveAddress::default().with_a0(true),
    ];
    for addr in addrs {
        match Htu31dBuilder::default()
            .with_address(addr)
            .build(&mut i2c, &mut delay)
        {
            Ok(mut htu) => {
                match htu.serial_number(&mut i2c) {
                    Ok(serial) => {
                        println!("[IDENT] Sensor 0x{:02x}: serial {serial:06x}", htu.get_address())
                    }
                    Err(e) => log::error!(
                        "[IDENT] Sensor 0x{:02x}: Error reading serial: {e:?}",
                        htu.get_address()
                    ),
                }
                match htu.measure(&mut i2c, &mut delay) {
                    Ok((temp, hum)) => println!(
                        "[IDENT] Sensor 0x{:02x}: {:.2} C, {:.2}%",
                        htu.get_address(),
                        temp.celsius(),
                        hum.percentage()
                    ),
                    Err(e) => log::error!(
                        "[IDENT] Sensor 0x{:02x}: Error reading: {e:?}",
                        htu.get_address()
                    ),
                }
            }
            Err(e) => log::warn!("[IDENT] Address {:02x} not found: {e:?}", addr.into_bits()),
        }
    }
}
