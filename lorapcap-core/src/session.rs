use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use log::{debug, warn};
use lorapcap_types::{CaptureTimestamp, PcapError, PcapResult, RxPacket};

use crate::{
    format::{PcapGlobalHeader, PCAP_SNAPLEN},
    record::write_rx_packet,
};

/// Открытая сессия записи pcap-файла.
///
/// Жизненный цикл: [`create`](Self::create) → [`start`](Self::start) →
/// `write`/`flush` → [`stop`](Self::stop) → [`StoppedSession::destroy`].
/// `stop` поглощает сессию, поэтому запись после остановки и повторная
/// остановка не компилируются.
///
/// Сессия не синхронизирована: при использовании из нескольких потоков
/// сериализация вызовов остаётся на вызывающей стороне.
pub struct PcapSession {
    path: PathBuf,
    writer: BufWriter<File>,
    /// Сериализованный (big-endian) EUI шлюза, вычисляется один раз
    gw_eui: [u8; 8],
    records_written: u64,
}

/// Закрытая сессия: файл уже закрыт, осталось освободить сессию.
#[derive(Debug)]
pub struct StoppedSession {
    path: PathBuf,
    records_written: u64,
}

impl PcapSession {
    /// Открывает файл на дозапись (создаёт, если его нет).
    pub fn create<P: AsRef<Path>>(
        path: P,
        gateway_eui: u64,
    ) -> PcapResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().append(true).create(true).open(&path)?;

        debug!("Opened capture file {path:?}, gateway EUI {gateway_eui:016X}");

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            gw_eui: gateway_eui.to_be_bytes(),
            records_written: 0,
        })
    }

    /// Пишет глобальный заголовок, если файл пуст.
    ///
    /// Непустой файл считается ранее начатой совместимой записью, и тогда
    /// ничего не пишется.
    pub fn start(&mut self) -> PcapResult<()> {
        let len = self.writer.seek(SeekFrom::End(0))?;

        if len != 0 {
            debug!("Resuming capture {:?} at offset {len}", self.path);
            return Ok(());
        }

        PcapGlobalHeader::loratap(PCAP_SNAPLEN).write_to(&mut self.writer)?;
        self.writer.flush()?;

        debug!("Wrote pcap global header to {:?}", self.path);
        Ok(())
    }

    /// Записывает принятый пакет. Возвращает число байт (0 для не-LoRa).
    pub fn write(
        &mut self,
        packet: &RxPacket,
        ts: CaptureTimestamp,
    ) -> PcapResult<usize> {
        let n = write_rx_packet(&mut self.writer, &self.gw_eui, packet, ts)?;

        if n > 0 {
            self.records_written += 1;
        }

        Ok(n)
    }

    /// Сбрасывает буфер в файл.
    pub fn flush(&mut self) -> PcapResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Сбрасывает буфер и закрывает файл.
    ///
    /// Файл закрывается в любом случае; ошибка означает, что хвост буфера
    /// не удалось дописать.
    pub fn stop(self) -> PcapResult<StoppedSession> {
        let PcapSession {
            path,
            writer,
            records_written,
            ..
        } = self;

        match writer.into_inner() {
            Ok(file) => drop(file),
            Err(e) => {
                warn!("Failed to flush {path:?} on stop: {}", e.error());
                return Err(PcapError::Io(e.into_error()));
            }
        }

        debug!("Closed capture file {path:?} ({records_written} records)");

        Ok(StoppedSession {
            path,
            records_written,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// EUI шлюза в том виде, в каком он попадает в каждую запись.
    pub fn gateway_eui(&self) -> &[u8; 8] {
        &self.gw_eui
    }

    /// Количество записанных LoRa записей за сессию.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

impl StoppedSession {
    /// Освобождает сессию.
    pub fn destroy(self) {
        debug!("Released capture session {:?}", self.path);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

impl std::fmt::Debug for PcapSession {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("PcapSession")
            .field("path", &self.path)
            .field("gw_eui", &self.gw_eui)
            .field("records_written", &self.records_written)
            .finish()
    }
}
