#![deny(unsafe_code)]
#![deny(warnings)]
//! HD44780 character LCD behind a PCF8574 I2C backpack
//!
//! The expander drives the controller in 4-bit mode. Every byte is sent as
//! two nibbles, each latched by pulsing EN.
//!
//! PCF8574 pin map (common "LCM1602" backpack):
//! - P0: RS
//! - P1: RW (held low, write only)
//! - P2: EN
//! - P3: backlight
//! - P4-P7: D4-D7

use defmt::{info, warn, Debug2Format};
use embedded_hal::i2c::I2c;
use embedded_hal_async::delay::DelayNs;
use ntp_clock_core::{DisplayLine, DisplaySink};

/// Default 7-bit address with A0-A2 pulled high
pub const DEFAULT_ADDRESS: u8 = 0x27;

const RS: u8 = 0b0000_0001;
const EN: u8 = 0b0000_0100;
const BACKLIGHT: u8 = 0b0000_1000;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INCREMENT: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM address of the first cell of each row
const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

/// Two-row character LCD
pub struct CharacterLcd<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> CharacterLcd<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Run the 4-bit initialization sequence and clear the screen
    pub async fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), I::Error> {
        // Controller needs >40 ms after Vcc rises
        delay.delay_ms(50).await;

        // Force 8-bit mode three times, then switch to 4-bit
        self.write_nibble(0x03, 0)?;
        delay.delay_us(4_500).await;
        self.write_nibble(0x03, 0)?;
        delay.delay_us(150).await;
        self.write_nibble(0x03, 0)?;
        delay.delay_us(150).await;
        self.write_nibble(0x02, 0)?;

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.command(CMD_CLEAR)?;
        delay.delay_ms(2).await;
        self.command(CMD_ENTRY_MODE_INCREMENT)?;

        info!("LCD initialized at I2C address {=u8:#x}", self.address);
        Ok(())
    }

    fn write_row(&mut self, row: usize, line: &DisplayLine) -> Result<(), I::Error> {
        self.command(CMD_SET_DDRAM | ROW_OFFSETS[row])?;
        for &byte in line.as_bytes() {
            self.write_byte(byte, RS)?;
        }
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), I::Error> {
        self.write_byte(cmd, 0)
    }

    fn write_byte(&mut self, byte: u8, mode: u8) -> Result<(), I::Error> {
        self.write_nibble(byte >> 4, mode)?;
        self.write_nibble(byte & 0x0F, mode)
    }

    /// Latch one nibble: data with EN high, then EN low
    ///
    /// An I2C byte at 100 kHz takes ~90 us, longer than the controller's
    /// 37 us command time, so no extra delay is needed between nibbles.
    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), I::Error> {
        let bits = (nibble << 4) | mode | BACKLIGHT;
        self.i2c.write(self.address, &[bits | EN, bits])
    }
}

impl<I: I2c> DisplaySink for CharacterLcd<I> {
    fn write(&mut self, line0: &DisplayLine, line1: &DisplayLine) {
        for (row, line) in [line0, line1].into_iter().enumerate() {
            if let Err(e) = self.write_row(row, line) {
                warn!("LCD write failed on row {}: {:?}", row, Debug2Format(&e));
                return;
            }
        }
    }
}
