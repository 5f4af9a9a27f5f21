use bitfield_struct::bitfield;

#[bitfield(u8)]
/// Represents the slave address for the HTU31D sensor.
/// The address is 7 bits long; the `a0` bit mirrors the level of the ADDR pin.
/// The default address is 0x40 (ADDR low), pulling ADDR high selects 0x41.
pub struct SlaveAddress {
    #[bits(1, default = false)]
    pub a0: bool,
    #[bits(7, default = 0x40 >> 1)]
    reserved: u8,
}
