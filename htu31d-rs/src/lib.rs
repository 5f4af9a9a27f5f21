// #![no_std]
#![deny(missing_docs)]
//!# HTU31D - Driver for the TE Connectivity HTU31D Humidity and Temperature Sensor
//! This crate provides a driver for the HTU31D sensor, allowing you to read humidity and temperature data.
//! It supports per-channel resolution settings, heater control, soft reset and serial number readout.
mod address;
mod command;
mod core;
mod error;

pub use address::SlaveAddress;
pub use command::{Humidity, HumidityResolution, Temperature, TemperatureResolution};
pub use core::{Htu31d, Htu31dBuilder};
pub use error::Error;
