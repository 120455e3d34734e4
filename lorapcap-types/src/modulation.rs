/// Тип модуляции принятого пакета (коды HAL концентратора)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Modulation {
    #[default]
    Undefined = 0x00,
    /// Непрерывная несущая (только для TX)
    Cw = 0x08,
    Lora = 0x10,
    Fsk = 0x20,
}

impl Modulation {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0x08 => Modulation::Cw,
            0x10 => Modulation::Lora,
            0x20 => Modulation::Fsk,
            _ => Modulation::Undefined,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn is_lora(&self) -> bool {
        *self == Modulation::Lora
    }
}
