/// Coding rate LoRa (коды HAL)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CodingRate {
    #[default]
    Undefined = 0x00,
    Cr4_5 = 0x01,
    Cr4_6 = 0x02,
    Cr4_7 = 0x03,
    Cr4_8 = 0x04,
}

impl CodingRate {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0x01 => CodingRate::Cr4_5,
            0x02 => CodingRate::Cr4_6,
            0x03 => CodingRate::Cr4_7,
            0x04 => CodingRate::Cr4_8,
            _ => CodingRate::Undefined,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}
