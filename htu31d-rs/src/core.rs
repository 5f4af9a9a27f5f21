use core::time::Duration;

use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

use crate::{
    Error, Humidity, HumidityResolution, Temperature, TemperatureResolution,
    address::SlaveAddress,
    command::{
        self, Conversion, HTU31D_HEATER_OFF, HTU31D_HEATER_ON, HTU31D_READ_SERIAL,
        HTU31D_READ_TEMP_HUM, HTU31D_RESET_DELAY_US, HTU31D_SOFT_RESET, READ_SERIAL_LEN,
        READ_TEMP_HUM_LEN,
    },
};

/// Represents the HTU31D sensor.
pub struct Htu31d {
    pub(crate) address: u8,
    pub(crate) hres: HumidityResolution,
    pub(crate) tres: TemperatureResolution,
    pub(crate) heater: bool,
}

#[derive(Debug, Default)]
/// Builder for a HTU31D sensor.
pub struct Htu31dBuilder {
    pub(crate) address: SlaveAddress,
    pub(crate) hres: HumidityResolution,
    pub(crate) tres: TemperatureResolution,
}

impl Htu31dBuilder {
    /// Set the address of the HTU31D sensor.
    pub fn with_address(mut self, address: SlaveAddress) -> Self {
        self.address = address;
        self
    }

    /// Set the humidity resolution for the HTU31D sensor.
    pub fn with_humidity_resolution(mut self, resolution: HumidityResolution) -> Self {
        self.hres = resolution;
        self
    }

    /// Set the temperature resolution for the HTU31D sensor.
    pub fn with_temperature_resolution(mut self, resolution: TemperatureResolution) -> Self {
        self.tres = resolution;
        self
    }

    /// Build the HTU31D sensor with the specified configuration.
    ///
    /// Soft-resets the device and reads back its serial number to check
    /// that a responding sensor is present at the configured address.
    pub fn build<T: I2c<SevenBitAddress>, D: DelayNs>(
        self,
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<Htu31d, Error<T::Error>> {
        let mut dev = Htu31d {
            address: self.address.into_bits(),
            hres: self.hres,
            tres: self.tres,
            heater: false,
        };
        dev.reset(i2c, delay)?;
        // The conversion resolution rides in every trigger command, so the
        // requested settings survive the reset.
        dev.hres = self.hres;
        dev.tres = self.tres;
        dev.serial_number(i2c)?;
        Ok(dev)
    }
}

impl Htu31d {
    /// Get the address of the device.
    pub fn get_address(&self) -> u8 {
        self.address
    }

    /// Get the current humidity and temperature resolutions.
    pub fn get_resolution(&self) -> (HumidityResolution, TemperatureResolution) {
        (self.hres, self.tres)
    }

    /// Set the humidity and temperature resolutions.
    ///
    /// The resolution is encoded into every conversion command, so this
    /// causes no bus traffic until the next trigger.
    pub fn set_resolution(
        &mut self,
        humidity_resolution: HumidityResolution,
        temperature_resolution: TemperatureResolution,
    ) {
        self.hres = humidity_resolution;
        self.tres = temperature_resolution;
    }

    /// Perform a soft reset of the sensor, returning all settings to their
    /// power-on defaults.
    pub fn reset<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<(), Error<T::Error>> {
        i2c.write(self.address, &[HTU31D_SOFT_RESET])?;
        delay.delay_us(HTU31D_RESET_DELAY_US);
        self.hres = HumidityResolution::default();
        self.tres = TemperatureResolution::default();
        self.heater = false;
        Ok(())
    }

    /// Get the unique serial number of the sensor.
    pub fn serial_number<T: I2c<SevenBitAddress>>(
        &mut self,
        i2c: &mut T,
    ) -> Result<u32, Error<T::Error>> {
        let mut buf = [0u8; READ_SERIAL_LEN];
        i2c.write_read(self.address, &[HTU31D_READ_SERIAL], &mut buf)?;
        command::decode_serial_number(&buf)
    }

    /// Set the heater state of the HTU31D sensor.
    pub fn set_heater<T: I2c<SevenBitAddress>>(
        &mut self,
        i2c: &mut T,
        enable: bool,
    ) -> Result<(), Error<T::Error>> {
        let opcode = if enable {
            HTU31D_HEATER_ON
        } else {
            HTU31D_HEATER_OFF
        };
        i2c.write(self.address, &[opcode])?;
        self.heater = enable;
        Ok(())
    }

    /// Get the heater state of the HTU31D sensor.
    ///
    /// The heater state cannot be read back from the device; this returns
    /// the last state the driver commanded.
    pub fn get_heater(&self) -> bool {
        self.heater
    }

    /// Trigger a conversion of temperature and humidity.
    ///
    /// # Returns:
    /// - [`Duration`]: The duration to wait for the conversion to complete.
    pub fn trigger<T: I2c<SevenBitAddress>>(
        &mut self,
        i2c: &mut T,
    ) -> Result<Duration, Error<T::Error>> {
        let cmd = Conversion::default()
            .with_humidity_resolution(self.hres)
            .with_temperature_resolution(self.tres);
        i2c.write(self.address, &[cmd.into_bits()])?;
        let delay = self.hres.delay_time() + self.tres.delay_time();
        Ok(Duration::from_micros(delay as _))
    }

    /// Read back the result of a completed conversion.
    pub fn read_temperature_humidity<T: I2c<SevenBitAddress>>(
        &mut self,
        i2c: &mut T,
    ) -> Result<(Temperature, Humidity), Error<T::Error>> {
        let mut buf = [0u8; READ_TEMP_HUM_LEN];
        i2c.write_read(self.address, &[HTU31D_READ_TEMP_HUM], &mut buf)?;
        command::decode_temperature_humidity(&buf)
    }

    /// Measure temperature and humidity.
    ///
    /// Triggers a conversion, blocks for the conversion delay of the
    /// configured resolutions, then reads back and checks the result.
    pub fn measure<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        i2c: &mut T,
        delay: &mut D,
    ) -> Result<(Temperature, Humidity), Error<T::Error>> {
        let wait = self.trigger(i2c)?;
        delay.delay_us(wait.as_micros() as _);
        self.read_temperature_humidity(i2c)
    }

    /// Get the builder for the HTU31D sensor.
    /// This allows you to reconfigure the address or resolutions.
    pub fn to_builder(self) -> Htu31dBuilder {
        Htu31dBuilder {
            address: SlaveAddress::from_bits(self.address),
            hres: self.hres,
            tres: self.tres,
        }
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        i2c::{Mock as I2cMock, Transaction as I2cTransaction},
    };

    use super::*;
    use crate::command::crc8;

    const ADDR: u8 = 0x40;

    fn dev() -> Htu31d {
        Htu31d {
            address: ADDR,
            hres: HumidityResolution::default(),
            tres: TemperatureResolution::default(),
            heater: false,
        }
    }

    fn word(value: u16) -> [u8; 3] {
        let [hi, lo] = value.to_be_bytes();
        [hi, lo, crc8(&[hi, lo])]
    }

    #[test]
    fn build_probes_the_device() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![HTU31D_SOFT_RESET]),
            I2cTransaction::write_read(
                ADDR,
                vec![HTU31D_READ_SERIAL],
                vec![0x12, 0x34, 0x56, crc8(&[0x12, 0x34, 0x56])],
            ),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay;
        let htu = Htu31dBuilder::default()
            .with_humidity_resolution(HumidityResolution::Osr2)
            .build(&mut i2c, &mut delay)
            .unwrap();
        assert_eq!(htu.get_address(), 0x40);
        assert_eq!(
            htu.get_resolution(),
            (HumidityResolution::Osr2, TemperatureResolution::Osr0)
        );
        i2c.done();
    }

    #[test]
    fn measure_checks_crc_and_converts() {
        let t = word(0x683a);
        let h = word(0x4e85);
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x40]),
            I2cTransaction::write_read(
                ADDR,
                vec![HTU31D_READ_TEMP_HUM],
                vec![t[0], t[1], t[2], h[0], h[1], h[2]],
            ),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay;
        let (temp, hum) = dev().measure(&mut i2c, &mut delay).unwrap();
        assert!((temp.celsius() - 27.1783).abs() < 1e-3);
        assert!((hum.percentage() - 30.6722).abs() < 1e-3);
        i2c.done();
    }

    #[test]
    fn measure_rejects_corrupted_response() {
        let t = word(0x683a);
        let h = word(0x4e85);
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x40]),
            I2cTransaction::write_read(
                ADDR,
                vec![HTU31D_READ_TEMP_HUM],
                // flipped bit in the temperature word
                vec![t[0] ^ 0x80, t[1], t[2], h[0], h[1], h[2]],
            ),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay;
        assert!(matches!(
            dev().measure(&mut i2c, &mut delay),
            Err(Error::InvalidCrc)
        ));
        i2c.done();
    }

    #[test]
    fn trigger_encodes_resolutions() {
        let expectations = [I2cTransaction::write(ADDR, vec![0x5e])];
        let mut i2c = I2cMock::new(&expectations);
        let mut htu = dev();
        htu.set_resolution(HumidityResolution::Osr3, TemperatureResolution::Osr3);
        let wait = htu.trigger(&mut i2c).unwrap();
        assert_eq!(wait, Duration::from_micros(7800 + 12100));
        i2c.done();
    }

    #[test]
    fn trigger_propagates_bus_errors() {
        let expectations = [I2cTransaction::write(ADDR, vec![0x40])
            .with_error(embedded_hal::i2c::ErrorKind::Other)];
        let mut i2c = I2cMock::new(&expectations);
        assert!(matches!(dev().trigger(&mut i2c), Err(Error::I2c(_))));
        i2c.done();
    }

    #[test]
    fn heater_commands() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![HTU31D_HEATER_ON]),
            I2cTransaction::write(ADDR, vec![HTU31D_HEATER_OFF]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut htu = dev();
        htu.set_heater(&mut i2c, true).unwrap();
        assert!(htu.get_heater());
        htu.set_heater(&mut i2c, false).unwrap();
        assert!(!htu.get_heater());
        i2c.done();
    }

    #[test]
    fn reset_restores_defaults() {
        let expectations = [I2cTransaction::write(ADDR, vec![HTU31D_SOFT_RESET])];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay;
        let mut htu = dev();
        htu.set_resolution(HumidityResolution::Osr3, TemperatureResolution::Osr1);
        htu.heater = true;
        htu.reset(&mut i2c, &mut delay).unwrap();
        assert_eq!(
            htu.get_resolution(),
            (HumidityResolution::Osr0, TemperatureResolution::Osr0)
        );
        assert!(!htu.get_heater());
        i2c.done();
    }

    #[test]
    fn serial_number_roundtrip() {
        let expectations = [I2cTransaction::write_read(
            ADDR,
            vec![HTU31D_READ_SERIAL],
            vec![0x12, 0x34, 0x56, crc8(&[0x12, 0x34, 0x56])],
        )];
        let mut i2c = I2cMock::new(&expectations);
        assert_eq!(dev().serial_number(&mut i2c).unwrap(), 0x123456);
        i2c.done();
    }
}
