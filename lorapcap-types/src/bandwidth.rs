/// Полоса канала в кодировке HAL (не совпадает с кодировкой LoRaTap)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Bandwidth {
    #[default]
    Undefined = 0x00,
    Khz125 = 0x04,
    Khz250 = 0x05,
    Khz500 = 0x06,
}

impl Bandwidth {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0x04 => Bandwidth::Khz125,
            0x05 => Bandwidth::Khz250,
            0x06 => Bandwidth::Khz500,
            _ => Bandwidth::Undefined,
        }
    }

    /// Полоса по значению в герцах (как в `global_conf.json`).
    pub fn from_hz(hz: u32) -> Self {
        match hz {
            125_000 => Bandwidth::Khz125,
            250_000 => Bandwidth::Khz250,
            500_000 => Bandwidth::Khz500,
            _ => Bandwidth::Undefined,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn hz(&self) -> Option<u32> {
        match self {
            Bandwidth::Khz125 => Some(125_000),
            Bandwidth::Khz250 => Some(250_000),
            Bandwidth::Khz500 => Some(500_000),
            Bandwidth::Undefined => None,
        }
    }
}
