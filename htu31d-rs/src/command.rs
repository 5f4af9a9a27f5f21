use bitfield_struct::bitfield;

use crate::Error;

pub(crate) const HTU31D_READ_TEMP_HUM: u8 = 0x00; // Read the conversion values
pub(crate) const HTU31D_HEATER_OFF: u8 = 0x02; // Disable heater
pub(crate) const HTU31D_HEATER_ON: u8 = 0x04; // Enable heater
pub(crate) const HTU31D_READ_SERIAL: u8 = 0x0a; // Read out of serial register
pub(crate) const HTU31D_SOFT_RESET: u8 = 0x1e; // Soft reset

/// Settle time after a soft reset, in microseconds.
pub(crate) const HTU31D_RESET_DELAY_US: u32 = 15_000;

/// Response length of the temperature/humidity readout: two 16-bit words,
/// each followed by its CRC byte.
pub(crate) const READ_TEMP_HUM_LEN: usize = 6;
/// Response length of the serial number readout: three serial bytes
/// followed by a CRC byte.
pub(crate) const READ_SERIAL_LEN: usize = 4;

#[bitfield(u8)]
/// The conversion command issued to start a measurement.
/// Bit 6 is the fixed command prefix (0x40); the OSR bits select the
/// per-channel resolution.
pub(crate) struct Conversion {
    #[bits(1, default = false, access = RO)]
    rsvd: bool,
    #[bits(2, default = TemperatureResolution::Osr0)]
    pub temperature_resolution: TemperatureResolution,
    #[bits(2, default = HumidityResolution::Osr0)]
    pub humidity_resolution: HumidityResolution,
    #[bits(1, default = false, access = RO)]
    rsvd2: bool,
    #[bits(1, default = true, access = RO)]
    pub start: bool,
    #[bits(1, default = false, access = RO)]
    rsvd3: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
/// Humidity measurement resolution (oversampling setting) for the HTU31D sensor.
pub enum HumidityResolution {
    #[default]
    /// 0.020 %RH resolution, with a conversion time of 1.0 milliseconds.
    Osr0 = 0b00,
    /// 0.014 %RH resolution, with a conversion time of 2.0 milliseconds.
    Osr1 = 0b01,
    /// 0.010 %RH resolution, with a conversion time of 3.9 milliseconds.
    Osr2 = 0b10,
    /// 0.007 %RH resolution, with a conversion time of 7.8 milliseconds.
    Osr3 = 0b11,
}

impl HumidityResolution {
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits {
            0b00 => HumidityResolution::Osr0,
            0b01 => HumidityResolution::Osr1,
            0b10 => HumidityResolution::Osr2,
            0b11 => HumidityResolution::Osr3,
            _ => panic!("Invalid HumidityResolution bits"),
        }
    }

    pub(crate) const fn into_bits(self) -> u8 {
        match self {
            HumidityResolution::Osr0 => 0b00,
            HumidityResolution::Osr1 => 0b01,
            HumidityResolution::Osr2 => 0b10,
            HumidityResolution::Osr3 => 0b11,
        }
    }

    /// Returns the conversion time in microseconds for the given humidity resolution.
    pub(crate) fn delay_time(self) -> u32 {
        match self {
            HumidityResolution::Osr0 => 1000,
            HumidityResolution::Osr1 => 2000,
            HumidityResolution::Osr2 => 3900,
            HumidityResolution::Osr3 => 7800,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
/// Temperature measurement resolution (oversampling setting) for the HTU31D sensor.
pub enum TemperatureResolution {
    #[default]
    /// 0.040 degC resolution, with a conversion time of 1.6 milliseconds.
    Osr0 = 0b00,
    /// 0.025 degC resolution, with a conversion time of 3.1 milliseconds.
    Osr1 = 0b01,
    /// 0.016 degC resolution, with a conversion time of 6.1 milliseconds.
    Osr2 = 0b10,
    /// 0.012 degC resolution, with a conversion time of 12.1 milliseconds.
    Osr3 = 0b11,
}

impl TemperatureResolution {
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits {
            0b00 => TemperatureResolution::Osr0,
            0b01 => TemperatureResolution::Osr1,
            0b10 => TemperatureResolution::Osr2,
            0b11 => TemperatureResolution::Osr3,
            _ => panic!("Invalid TemperatureResolution bits"),
        }
    }

    pub(crate) const fn into_bits(self) -> u8 {
        match self {
            TemperatureResolution::Osr0 => 0b00,
            TemperatureResolution::Osr1 => 0b01,
            TemperatureResolution::Osr2 => 0b10,
            TemperatureResolution::Osr3 => 0b11,
        }
    }

    /// Returns the conversion time in microseconds for the given temperature resolution.
    pub(crate) fn delay_time(self) -> u32 {
        match self {
            TemperatureResolution::Osr0 => 1600,
            TemperatureResolution::Osr1 => 3100,
            TemperatureResolution::Osr2 => 6100,
            TemperatureResolution::Osr3 => 12100,
        }
    }
}

#[derive(Debug, Default)]
/// Represents a temperature measurement from the HTU31D sensor.
pub struct Temperature {
    pub(crate) value: u16,
}

impl Temperature {
    /// Converts the raw value to degrees Celsius.
    pub fn celsius(&self) -> f32 {
        -40.0 + 165.0 * (self.value as f32 / 65535.0)
    }
}

#[derive(Debug, Default)]
/// Represents a humidity measurement from the HTU31D sensor.
pub struct Humidity {
    pub(crate) value: u16,
}

impl Humidity {
    /// Converts the raw value to relative humidity in percent, clamped to 0-100.
    pub fn percentage(&self) -> f32 {
        (100.0 * (self.value as f32 / 65535.0)).clamp(0.0, 100.0)
    }
}

/// CRC-8 over the given bytes with polynomial x^8 + x^5 + x^4 + 1 and
/// initial value 0, as appended by the HTU31D to every word it returns.
pub(crate) fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Splits a temperature/humidity response into its raw words, validating
/// the frame length and the CRC byte trailing each word.
pub(crate) fn decode_temperature_humidity<E>(
    buf: &[u8],
) -> Result<(Temperature, Humidity), Error<E>> {
    if buf.len() != READ_TEMP_HUM_LEN {
        return Err(Error::InvalidLength);
    }
    if crc8(&buf[0..2]) != buf[2] || crc8(&buf[3..5]) != buf[5] {
        return Err(Error::InvalidCrc);
    }
    let temp = Temperature {
        value: u16::from_be_bytes([buf[0], buf[1]]),
    };
    let hum = Humidity {
        value: u16::from_be_bytes([buf[3], buf[4]]),
    };
    Ok((temp, hum))
}

/// Decodes the serial number response, validating the frame length and the
/// CRC byte trailing the 24-bit serial.
pub(crate) fn decode_serial_number<E>(buf: &[u8]) -> Result<u32, Error<E>> {
    if buf.len() != READ_SERIAL_LEN {
        return Err(Error::InvalidLength);
    }
    if crc8(&buf[0..3]) != buf[3] {
        return Err(Error::InvalidCrc);
    }
    Ok(u32::from_be_bytes([0, buf[0], buf[1], buf[2]]))
}
