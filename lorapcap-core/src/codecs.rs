//! Перевод метаданных HAL в коды полей LoRaTap.
//!
//! Все функции тотальные: неизвестное значение кодируется нулём, а выход
//! за диапазон насыщается до границы `i8`.

use lorapcap_types::{Bandwidth, CodingRate, CrcStatus, SpreadingFactor};

/// Смещение RSSI в LoRaTap: поле хранит `dBm + 139`.
pub const RSSI_OFFSET_DBM: f32 = 139.0;

/// Флаги статуса CRC в байте `flags` заголовка LoRaTap.
pub const FLAG_CRC_OK: u8 = 0x80;
pub const FLAG_CRC_BAD: u8 = 0x10;
pub const FLAG_NO_CRC: u8 = 0x20;

/// Кодирует RSSI (дБм) в знаковый байт LoRaTap с насыщением.
pub fn encode_rssi_dbm(rssi_dbm: f32) -> i8 {
    let rval = rssi_dbm + RSSI_OFFSET_DBM;

    if rval > 127.0 {
        return 127;
    }
    if rval < -128.0 {
        return -128;
    }

    rval as i8
}

/// Кодирует SNR (дБ) в знаковый байт с фиксированной точкой.
///
/// Отрицательные значения хранятся с шагом 0.25 дБ, положительные без
/// масштабирования. Старые версии Wireshark (например, сборка 2021-03-26)
/// неверно декодируют отрицательные значения, новые исправлены.
pub fn encode_snr_db(snr_db: f32) -> i8 {
    if snr_db == 0.0 {
        return 0;
    }

    if snr_db < 0.0 {
        let rval = snr_db * 4.0;
        if rval < -128.0 {
            return -128;
        }
        return rval as i8;
    }

    if snr_db > 127.0 {
        return 127;
    }

    snr_db as i8
}

/// LoRaTap хранит полосу как кратное 125 кГц.
pub fn bandwidth_code(bw: Bandwidth) -> u8 {
    match bw {
        Bandwidth::Khz125 => 1,
        Bandwidth::Khz250 => 2,
        Bandwidth::Khz500 => 4,
        Bandwidth::Undefined => 0,
    }
}

/// HAL и LoRaTap совпадают для SF7..SF12, остальное кодируется нулём.
pub fn spreading_factor_code(sf: SpreadingFactor) -> u8 {
    match sf {
        SpreadingFactor::Sf7
        | SpreadingFactor::Sf8
        | SpreadingFactor::Sf9
        | SpreadingFactor::Sf10
        | SpreadingFactor::Sf11
        | SpreadingFactor::Sf12 => sf.as_u8(),
        _ => 0,
    }
}

/// Знаменатель coding rate 4/x.
pub fn coding_rate_code(cr: CodingRate) -> u8 {
    match cr {
        CodingRate::Cr4_5 => 5,
        CodingRate::Cr4_6 => 6,
        CodingRate::Cr4_7 => 7,
        CodingRate::Cr4_8 => 8,
        CodingRate::Undefined => 0,
    }
}

pub fn crc_flags(status: CrcStatus) -> u8 {
    match status {
        CrcStatus::CrcOk => FLAG_CRC_OK,
        CrcStatus::CrcBad => FLAG_CRC_BAD,
        CrcStatus::NoCrc => FLAG_NO_CRC,
        CrcStatus::Undefined => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rssi_offset_and_saturation() {
        assert_eq!(encode_rssi_dbm(-139.0), 0);
        assert_eq!(encode_rssi_dbm(-40.0), 99);
        assert_eq!(encode_rssi_dbm(-42.0), 97);
        assert_eq!(encode_rssi_dbm(0.0), 127, "139 > 127 → насыщение");
        assert_eq!(encode_rssi_dbm(-300.0), -128);
        assert_eq!(encode_rssi_dbm(-267.0), -128);
    }

    #[test]
    fn test_rssi_truncates_toward_zero() {
        assert_eq!(encode_rssi_dbm(-20.5), 118);
        assert_eq!(encode_rssi_dbm(-140.7), -1);
        assert_eq!(encode_rssi_dbm(f32::NAN), 0);
    }

    #[test]
    fn test_snr_vectors() {
        assert_eq!(encode_snr_db(0.0), 0);
        assert_eq!(encode_snr_db(-32.0), -128, "точная граница -32 × 4");
        assert_eq!(encode_snr_db(-33.0), -128);
        assert_eq!(encode_snr_db(10.0), 10);
        assert_eq!(encode_snr_db(130.0), 127);
    }

    #[test]
    fn test_snr_asymmetry() {
        // отрицательные × 4, положительные как есть
        assert_eq!(encode_snr_db(-2.5), -10);
        assert_eq!(encode_snr_db(2.5), 2);
        assert_eq!(encode_snr_db(9.5), 9);
        assert_eq!(encode_snr_db(-0.1), 0);
        assert_eq!(encode_snr_db(f32::NAN), 0);
    }

    #[test]
    fn test_bandwidth_translator() {
        assert_eq!(bandwidth_code(Bandwidth::Khz125), 1);
        assert_eq!(bandwidth_code(Bandwidth::Khz250), 2);
        assert_eq!(bandwidth_code(Bandwidth::Khz500), 4);
        assert_eq!(bandwidth_code(Bandwidth::Undefined), 0);
        assert_eq!(bandwidth_code(Bandwidth::from_u8(0x7F)), 0);
    }

    #[test]
    fn test_spreading_factor_passthrough() {
        for sf in 7..=12u32 {
            assert_eq!(spreading_factor_code(SpreadingFactor::from_u32(sf)), sf as u8);
        }
        assert_eq!(spreading_factor_code(SpreadingFactor::Sf5), 0);
        assert_eq!(spreading_factor_code(SpreadingFactor::Sf6), 0);
        assert_eq!(spreading_factor_code(SpreadingFactor::Undefined), 0);
    }

    #[test]
    fn test_coding_rate_and_flags() {
        assert_eq!(coding_rate_code(CodingRate::Cr4_5), 5);
        assert_eq!(coding_rate_code(CodingRate::Cr4_8), 8);
        assert_eq!(coding_rate_code(CodingRate::Undefined), 0);

        assert_eq!(crc_flags(CrcStatus::CrcOk), 0x80);
        assert_eq!(crc_flags(CrcStatus::CrcBad), 0x10);
        assert_eq!(crc_flags(CrcStatus::NoCrc), 0x20);
        assert_eq!(crc_flags(CrcStatus::Undefined), 0);
    }
}
