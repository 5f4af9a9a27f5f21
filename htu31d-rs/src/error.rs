#[derive(Debug)]
/// Represents errors that can occur while interacting with the HTU31D sensor.
pub enum Error<E> {
    /// An error occurred while communicating with the I2C bus.
    I2c(E),
    /// A response did not have the length expected for the issued command.
    InvalidLength,
    /// A response word did not match its CRC byte.
    InvalidCrc,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::I2c(e)
    }
}
