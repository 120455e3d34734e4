use std::{
    io::Read,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use lorapcap_recorder::{
    create_source, parse_gateway_eui, ChannelPlan, RecorderConfig, RecordingPipeline, SourceKind,
};

#[derive(Parser, Debug)]
#[command(
    name = "lorapcap",
    version = env!("CARGO_PKG_VERSION"),
    about = "Capture LoRa concentrator packets to a pcap file (LoRaTap)",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Записать принятые пакеты в .pcap
    Record(RecordArgs),
    /// Вывести частоты каналов из global_conf.json
    Channels {
        /// Файл конфигурации (по умолчанию: stdin)
        #[arg(short, long)]
        conf: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct RecordArgs {
    /// Источник пакетов: sim, sx1302
    #[arg(short, long, default_value = "sim")]
    source: String,
    /// Путь к выходному файлу (дозапись, если существует)
    #[arg(short, long, default_value = "lora.pcap")]
    output: PathBuf,
    /// EUI шлюза, 16 hex-цифр (AA555A0000000101, AA:55:5A:...)
    #[arg(short = 'e', long, default_value = "AA555A0000000000")]
    gateway_eui: String,
    /// global_conf.json с планом каналов. По умолчанию: EU868
    #[arg(short, long)]
    conf: Option<PathBuf>,
    /// Средняя частота пакетов симулятора (пакетов/с)
    #[arg(short, long, default_value = "5.0")]
    rate: f64,
    /// Ограничение записи (секунды). По умолчанию: до Ctrl+C
    #[arg(short, long)]
    duration: Option<u64>,
    /// Остановиться после N принятых пакетов
    #[arg(short = 'n', long)]
    max_packets: Option<u64>,
    /// Сбрасывать файл каждые N записей (0 = только при остановке)
    #[arg(long, default_value = "16")]
    flush_every: u32,
    /// Ёмкость канала между источником и писателем (пакетов)
    #[arg(long, default_value = "256")]
    ring_capacity: usize,
    /// Интервал вывода статистики (секунды)
    #[arg(long, default_value = "5")]
    stats_interval: u64,
    /// Seed симулятора (воспроизводимый трафик)
    #[arg(long)]
    seed: Option<u64>,
    /// Тихий режим (только ошибки)
    #[arg(short, long)]
    quiet: bool,
}

fn init_logger(quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .format_timestamp_secs()
        .init();
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Record(args) => record(args),
        Command::Channels { conf } => {
            init_logger(false);

            match channels(conf) {
                Ok(plan) => println!("{plan}"),
                Err(e) => {
                    error!("{e:#}");
                    std::process::exit(1);
                }
            }
        }
    }
}

fn channels(conf: Option<PathBuf>) -> anyhow::Result<ChannelPlan> {
    let text = match conf {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {path:?}"))?,
        None => {
            let mut s = String::new();
            std::io::stdin()
                .read_to_string(&mut s)
                .context("failed to read stdin")?;
            s
        }
    };

    ChannelPlan::from_json_str(&text).context("invalid SX130x configuration")
}

fn record(args: RecordArgs) {
    init_logger(args.quiet);

    let source_kind: SourceKind = match args.source.parse() {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let gateway_eui = match parse_gateway_eui(&args.gateway_eui) {
        Ok(eui) => eui,
        Err(e) => {
            error!("--gateway-eui: {e}");
            std::process::exit(1);
        }
    };

    let channel_plan = match &args.conf {
        Some(path) => match ChannelPlan::from_file(path) {
            Ok(p) => p,
            Err(e) => {
                error!("--conf {path:?}: {e}");
                std::process::exit(1);
            }
        },
        None => ChannelPlan::eu868(),
    };

    let config = RecorderConfig {
        source: source_kind,
        output_path: args.output.clone(),
        gateway_eui,
        channel_plan,
        packets_per_sec: args.rate,
        duration_secs: args.duration,
        max_packets: args.max_packets,
        flush_every: args.flush_every,
        ring_capacity: args.ring_capacity,
        stats_interval_secs: args.stats_interval,
        seed: args.seed,
    };

    let source = match create_source(&config) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to open packet source: {e}");
            std::process::exit(1);
        }
    };

    let (pipeline, metrics) = RecordingPipeline::new(config);
    let stop_flag: Arc<AtomicBool> = pipeline.stop_flag();

    let stop_ctrlc = stop_flag.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        if stop_ctrlc.swap(true, Ordering::SeqCst) {
            // Второй Ctrl+C: принудительный выход
            warn!("Force exit");
            std::process::exit(130);
        }
        warn!("Ctrl+C received, closing capture file...");
    }) {
        warn!("Failed to set Ctrl+C handler: {e}");
    }

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Source        : {}", args.source);
    info!("  Gateway EUI   : {gateway_eui:016X}");
    info!("  Link type     : LoRaTap ({})", lorapcap_core::LINKTYPE_LORATAP);
    info!("  Output        : {:?}", args.output);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let session_start = Instant::now();

    if let Err(e) = pipeline.run(source) {
        error!("Capture failed: {e}");
        std::process::exit(1);
    }

    // --- Итоговая статистика ---
    let summary = metrics.summary(&session_start);
    info!("\n{summary}");

    if summary.dropped_packets > 0 {
        warn!(
            "⚠ {} packets dropped ({:.2}% loss). Consider a larger --ring-capacity",
            summary.dropped_packets, summary.drop_rate_pct
        );
    }

    if summary.write_errors > 0 {
        warn!(
            "⚠ {} write errors occurred. Check disk space and I/O.",
            summary.write_errors
        );
        std::process::exit(1);
    }

    info!("✓ Capture complete: {:?}", args.output);
}
