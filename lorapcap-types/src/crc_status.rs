/// Статус CRC принятого пакета (коды HAL)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CrcStatus {
    #[default]
    Undefined = 0x00,
    /// Пакет без CRC
    NoCrc = 0x01,
    CrcOk = 0x10,
    CrcBad = 0x11,
}

impl CrcStatus {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0x01 => CrcStatus::NoCrc,
            0x10 => CrcStatus::CrcOk,
            0x11 => CrcStatus::CrcBad,
            _ => CrcStatus::Undefined,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}
