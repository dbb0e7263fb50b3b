//! Factory trimming parameters stored in the BME280 NVM.

use super::registers::{CALIB_H_LEN, CALIB_TP_LEN};

/// The 18 compensation coefficients, named as in the datasheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Calibration {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

impl Calibration {
    /// Parse the 0x88..0xA1 block and the 0xE1..0xE7 block.
    pub fn parse(tp: &[u8; CALIB_TP_LEN], h: &[u8; CALIB_H_LEN]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([tp[i], tp[i + 1]]);
        let i16_at = |i: usize| i16::from_le_bytes([tp[i], tp[i + 1]]);

        Self {
            dig_t1: u16_at(0),
            dig_t2: i16_at(2),
            dig_t3: i16_at(4),
            dig_p1: u16_at(6),
            dig_p2: i16_at(8),
            dig_p3: i16_at(10),
            dig_p4: i16_at(12),
            dig_p5: i16_at(14),
            dig_p6: i16_at(16),
            dig_p7: i16_at(18),
            dig_p8: i16_at(20),
            dig_p9: i16_at(22),
            // 0xA1, the last byte of the first block; 0xA0 is unused
            dig_h1: tp[25],
            dig_h2: i16::from_le_bytes([h[0], h[1]]),
            dig_h3: h[2],
            // 0xE4[7:0] / 0xE5[3:0] and 0xE6[7:0] / 0xE5[7:4]
            dig_h4: sign_extend_12(((h[3] as i32) << 4) | (h[4] as i32 & 0x0F)) as i16,
            dig_h5: sign_extend_12(((h[5] as i32) << 4) | (h[4] as i32 >> 4)) as i16,
            dig_h6: h[6] as i8,
        }
    }
}

/// Interpret the low 12 bits of `value` as a signed quantity.
pub fn sign_extend_12(value: i32) -> i32 {
    if value & 0x800 != 0 {
        -((value - 1) ^ 0xFFF)
    } else {
        value
    }
}
