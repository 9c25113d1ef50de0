//! ARQ 시뮬레이터 CLI
//!
//! 파일(또는 합성 데이터)을 잡음 채널로 전송하고 복구 결과와 통계를 출력한다.
//!
//! 사용법:
//!   cargo run --release --bin arqsim -- [OPTIONS]
//!
//! 예시:
//!   # BSC, BER 1%
//!   cargo run --release --bin arqsim -- -i image.bmp -o received.bmp --ber 0.01
//!
//!   # 버스트 채널 + CRC16
//!   cargo run --release --bin arqsim -- -i image.bmp --channel ge --detection crc16

use std::path::PathBuf;
use std::str::FromStr;

use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use arqsim::stream::{write_stream, SplitStream};
use arqsim::{
    ChannelConfig, Config, ConfigError, DeliveryController, DetectionCodec, GilbertElliottParams,
};

/// 합성 스트림 본문 크기 (바이트)
const SYNTHETIC_BODY_LEN: usize = 64 * 1024;

/// CLI 설정
struct CliConfig {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    report: Option<PathBuf>,
    config: Config,
}

#[derive(Clone, Copy, PartialEq)]
enum ChannelKind {
    Bsc,
    GilbertElliott,
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, ConfigError> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| ConfigError::InvalidArgument(format!("{} 값 필요", flag)))
}

fn parse<T: FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, ConfigError> {
    let raw = value(args, i, flag)?;
    raw.parse()
        .map_err(|_| ConfigError::InvalidArgument(format!("{}: 유효하지 않은 값 {}", flag, raw)))
}

fn print_help() {
    println!(
        r#"ARQ Sim - 검출/정정 계층형 재전송 시뮬레이터

잡음 채널(BSC / Gilbert-Elliott) 위에서 패킷 단위 재전송을 시뮬레이션
- 검출 실패 시 Reed-Solomon 정정 시도
- 재시도 소진 패킷은 노이즈로 대체

사용법:
  cargo run --release --bin arqsim -- [OPTIONS]

옵션:
  -i, --input <PATH>        입력 파일 (없으면 합성 데이터)
  -o, --output <PATH>       복구된 파일 경로
  --header-len <N>          그대로 유지할 헤더 길이 (기본: 54)
  --channel <bsc|ge>        채널 모델 (기본: bsc)
  --ber <P>                 BSC 비트 반전 확률 (기본: 0.001)
  --good-to-bad <P>         GE Good→Bad 전이 확률 (기본: 0.05)
  --bad-to-good <P>         GE Bad→Good 전이 확률 (기본: 0.1)
  --good-error <P>          GE Good 상태 에러 확률 (기본: 0.01)
  --bad-error <P>           GE Bad 상태 에러 확률 (기본: 0.2)
  -d, --detection <CODE>    parity|crc8|crc16|crc32 (기본: crc32)
  --parity-symbols <K>      Reed-Solomon 패리티 심볼 수 (기본: 30)
  --packet-size <N>         패킷 크기 바이트 (기본: 64)
  --max-retries <N>         패킷당 최대 시도 횟수 (기본: 10)
  --seed <N>                난수 시드 (기본: 0)
  --report <PATH>           실행 보고서(bincode) 저장 경로
  -h, --help                이 도움말 출력

로그 레벨은 RUST_LOG 환경 변수로 조정 (예: RUST_LOG=arqsim=debug)
"#
    );
}

fn parse_args() -> Result<CliConfig, ConfigError> {
    let args: Vec<String> = std::env::args().collect();

    let mut cli = CliConfig {
        input: None,
        output: None,
        report: None,
        config: Config::default(),
    };
    let mut kind = ChannelKind::Bsc;
    let mut ber = 0.001;
    let mut ge = GilbertElliottParams::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--input" | "-i" => {
                cli.input = Some(PathBuf::from(value(&args, i, flag)?));
                i += 1;
            }
            "--output" | "-o" => {
                cli.output = Some(PathBuf::from(value(&args, i, flag)?));
                i += 1;
            }
            "--report" => {
                cli.report = Some(PathBuf::from(value(&args, i, flag)?));
                i += 1;
            }
            "--header-len" => {
                cli.config.header_len = parse(&args, i, flag)?;
                i += 1;
            }
            "--channel" => {
                kind = match value(&args, i, flag)? {
                    "bsc" => ChannelKind::Bsc,
                    "ge" | "gilbert-elliott" => ChannelKind::GilbertElliott,
                    other => {
                        return Err(ConfigError::InvalidArgument(format!(
                            "알 수 없는 채널: {}",
                            other
                        )))
                    }
                };
                i += 1;
            }
            "--ber" => {
                ber = parse(&args, i, flag)?;
                i += 1;
            }
            "--good-to-bad" => {
                ge.good_to_bad = parse(&args, i, flag)?;
                i += 1;
            }
            "--bad-to-good" => {
                ge.bad_to_good = parse(&args, i, flag)?;
                i += 1;
            }
            "--good-error" => {
                ge.good_error_prob = parse(&args, i, flag)?;
                i += 1;
            }
            "--bad-error" => {
                ge.bad_error_prob = parse(&args, i, flag)?;
                i += 1;
            }
            "--detection" | "-d" => {
                cli.config.detection = value(&args, i, flag)?.parse::<DetectionCodec>()?;
                i += 1;
            }
            "--parity-symbols" => {
                cli.config.parity_symbols = parse(&args, i, flag)?;
                i += 1;
            }
            "--packet-size" => {
                cli.config.packet_size = parse(&args, i, flag)?;
                i += 1;
            }
            "--max-retries" => {
                cli.config.max_retries = parse(&args, i, flag)?;
                i += 1;
            }
            "--seed" => {
                cli.config.seed = parse(&args, i, flag)?;
                i += 1;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                return Err(ConfigError::InvalidArgument(format!(
                    "알 수 없는 옵션: {}",
                    other
                )))
            }
        }
        i += 1;
    }

    cli.config.channel = match kind {
        ChannelKind::Bsc => ChannelConfig::Bsc {
            crossover_probability: ber,
        },
        ChannelKind::GilbertElliott => ChannelConfig::GilbertElliott(ge),
    };

    Ok(cli)
}

/// 입력 파일이 없을 때 쓰는 합성 스트림
fn synthetic_stream(header_len: usize) -> SplitStream {
    let data: Vec<u8> = (0..header_len + SYNTHETIC_BODY_LEN)
        .map(|i| (i % 251) as u8)
        .collect();
    SplitStream::split(data.into(), header_len)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 로깅 설정
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = parse_args()?;
    let config = cli.config.clone();
    config.validate()?;

    info!("ARQ Sim starting...");
    info!("Channel: {:?}", config.channel);
    info!("Detection: {}", config.detection);
    info!("Parity symbols: {}", config.parity_symbols);
    info!("Packet size: {} bytes", config.packet_size);
    info!("Max retries: {}", config.max_retries);
    info!("Seed: {}", config.seed);

    let stream = if let Some(path) = &cli.input {
        info!("Loading file: {:?}", path);
        SplitStream::read(path, config.header_len)?
    } else {
        info!("Using synthetic data ({} bytes)", SYNTHETIC_BODY_LEN);
        synthetic_stream(config.header_len)
    };

    info!(
        "Header: {} bytes, body: {} bytes",
        stream.header.len(),
        stream.body.len()
    );

    let mut controller = DeliveryController::new(config)?;
    let output = controller.run(&stream.header, &stream.body);
    let report = controller.report();

    let (header, body) = output.split_at(stream.header.len());
    if body != &stream.body[..] {
        info!("Recovered body differs from input");
    }

    if let Some(path) = &cli.output {
        write_stream(path, header, body)?;
        info!("Output written: {:?}", path);
    }

    let stats = &report.statistics;
    println!("\n=== Attempt histogram ===");
    for (attempt, count) in stats.histogram() {
        println!("  attempt {:>2}: {}", attempt, count);
    }
    println!("  lost      : {}", stats.lost_packets);
    println!("  exhausted : {}", stats.exhausted_packets());
    println!("\n{}", stats.summary());
    println!(
        "Channel: {} units, {} corrupted ({:.4}%)",
        report.channel.transmitted_units,
        report.channel.corrupted_units,
        report.channel.error_rate() * 100.0
    );

    if let Some(occupancy) = &report.occupancy {
        println!(
            "Gilbert-Elliott occupancy: Good {:.2}% | Bad {:.2}%",
            occupancy.good_percent(),
            occupancy.bad_percent()
        );
    }

    if let Some(path) = &cli.report {
        std::fs::write(path, report.to_bytes()?)?;
        info!("Report written: {:?}", path);
    }

    Ok(())
}
