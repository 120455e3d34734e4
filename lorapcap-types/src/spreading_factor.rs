/// LoRa spreading factor (поле `datarate` пакета HAL)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SpreadingFactor {
    #[default]
    Undefined = 0,
    Sf5 = 5,
    Sf6 = 6,
    Sf7 = 7,
    Sf8 = 8,
    Sf9 = 9,
    Sf10 = 10,
    Sf11 = 11,
    Sf12 = 12,
}

impl SpreadingFactor {
    pub fn from_u32(v: u32) -> Self {
        match v {
            5 => SpreadingFactor::Sf5,
            6 => SpreadingFactor::Sf6,
            7 => SpreadingFactor::Sf7,
            8 => SpreadingFactor::Sf8,
            9 => SpreadingFactor::Sf9,
            10 => SpreadingFactor::Sf10,
            11 => SpreadingFactor::Sf11,
            12 => SpreadingFactor::Sf12,
            _ => SpreadingFactor::Undefined,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}
