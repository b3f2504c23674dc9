//! Status frame understood by the display firmware.
//!
//! Layout (12 bytes):
//!
//! ```text
//! 55 aa 01 01 06 | cpu tens | cpu ones | cpu tenths | gpu tens | gpu ones | gpu tenths | checksum
//! ```
//!
//! Each digit occupies a whole byte. The checksum is the sum of the six
//! digit bytes plus 7, modulo 256. The device never acknowledges a frame,
//! so a malformed one just shows up as a garbled display.

use std::fmt;

pub const FRAME_LEN: usize = 12;
pub const HEADER: [u8; 5] = [0x55, 0xaa, 0x01, 0x01, 0x06];
const CHECKSUM_BIAS: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Build the frame for a CPU/GPU temperature pair in °C.
    ///
    /// Total for every `f64`: negative and non-finite inputs encode as 0.0,
    /// and values of 100°C or more keep their full tens count in the first
    /// byte (the display cannot show them correctly anyway).
    pub fn encode(cpu_temp: f64, gpu_temp: f64) -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[..5].copy_from_slice(&HEADER);
        bytes[5..8].copy_from_slice(&digits(cpu_temp));
        bytes[8..11].copy_from_slice(&digits(gpu_temp));
        bytes[11] = checksum(&bytes[5..11]);
        Frame(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    pub fn cpu_digits(&self) -> [u8; 3] {
        [self.0[5], self.0[6], self.0[7]]
    }

    pub fn gpu_digits(&self) -> [u8; 3] {
        [self.0[8], self.0[9], self.0[10]]
    }

    pub fn checksum(&self) -> u8 {
        self.0[11]
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Split a temperature into (tens, ones, tenths), one byte each.
fn digits(temp: f64) -> [u8; 3] {
    let temp = if temp.is_finite() && temp > 0.0 { temp } else { 0.0 };
    let ones = temp % 10.0;
    // (t - t mod 10) / 10 is an exact integer up to rounding noise
    let tens = ((temp - ones) / 10.0).round();
    let tenths = ((temp * 10.0) % 10.0).floor();
    // float-to-int `as` saturates, so huge values pin at 255
    [tens as u8, ones.floor() as u8, tenths as u8]
}

fn checksum(digits: &[u8]) -> u8 {
    digits
        .iter()
        .fold(CHECKSUM_BIAS, |acc, &b| acc.wrapping_add(b))
}
