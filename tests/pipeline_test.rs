//! 전송 파이프라인 통합 테스트

use arqsim::stream::{write_stream, SplitStream};
use arqsim::{
    ChannelConfig, ChannelModel, ChannelState, Config, DeliveryController, DetectionCodec, Frame,
    GilbertElliottParams, RetryOutcome, RunReport,
};
use bytes::Bytes;

fn bsc(p: f64) -> ChannelConfig {
    ChannelConfig::Bsc {
        crossover_probability: p,
    }
}

#[test]
fn test_noiseless_bsc_delivers_directly() {
    let config = Config {
        channel: bsc(0.0),
        detection: DetectionCodec::Crc32,
        ..Config::default()
    };
    let mut controller = DeliveryController::new(config).unwrap();

    let frame = Frame::create(1, Bytes::from_static(&[0x41, 0x42, 0x43]), DetectionCodec::Crc32);
    let delivery = controller.deliver(&frame);

    assert_eq!(delivery.outcome, RetryOutcome::DeliveredDirect { attempts: 1 });
    assert_eq!(&delivery.payload[..], &[0x41, 0x42, 0x43]);
    assert_eq!(controller.statistics().accepted_at(1), 1);
}

#[test]
fn test_always_flipping_channel_loses_packet() {
    let config = Config {
        channel: bsc(1.0),
        detection: DetectionCodec::Parity,
        parity_symbols: 4,
        ..Config::default()
    };
    let mut controller = DeliveryController::new(config).unwrap();

    let input = [0x10u8, 0x20, 0x30, 0x40];
    let output = controller.run(&[], &input);

    assert_eq!(output.len(), input.len());

    let stats = controller.statistics();
    assert_eq!(stats.lost_packets, 1);
    assert_eq!(stats.accepted_packets(), 0);
    assert_eq!(stats.exhausted_packets(), 1);

    // 시도마다 페이로드(5 bytes) + 패리티(4 bytes), 모든 비트 반전
    let report = controller.report();
    assert_eq!(report.channel.transmitted_units, 10 * 9 * 8);
    assert_eq!(report.channel.corrupted_units, 10 * 9 * 8);
}

#[test]
fn test_lost_packets_are_seeded_noise_not_zeros() {
    let input: Vec<u8> = (0..16).map(|i| i as u8 + 1).collect();

    let run = |seed| {
        let mut controller = DeliveryController::new(Config {
            channel: bsc(1.0),
            detection: DetectionCodec::Parity,
            parity_symbols: 4,
            max_retries: 2,
            seed,
            ..Config::default()
        })
        .unwrap();
        let output = controller.run(&[], &input);
        assert_eq!(controller.statistics().lost_packets, 1);
        output
    };

    let first = run(3);
    assert_eq!(first.len(), input.len());
    assert_ne!(&first[..], &[0u8; 16][..]);
    assert_ne!(&first[..], &input[..]);
    assert_eq!(run(3), first);
    assert_ne!(run(4), first);
}

#[test]
fn test_130_byte_stream_makes_three_packets() {
    let config = Config {
        channel: bsc(0.0),
        packet_size: 64,
        header_len: 0,
        ..Config::default()
    };
    let mut controller = DeliveryController::new(config).unwrap();

    let body: Vec<u8> = (0..130).map(|i| (i * 7) as u8).collect();
    let output = controller.run(&[], &body);

    assert_eq!(&output[..], &body[..]);

    let stats = controller.statistics();
    assert_eq!(stats.total_packets(), 3);
    assert_eq!(
        stats.histogram().iter().map(|(_, count)| count).sum::<u64>(),
        3
    );
}

#[test]
fn test_frozen_good_gilbert_elliott_is_passthrough() {
    let config = Config {
        channel: ChannelConfig::GilbertElliott(GilbertElliottParams {
            good_to_bad: 0.0,
            bad_to_good: 0.0,
            good_error_prob: 0.0,
            bad_error_prob: 0.9,
            initial_state: ChannelState::Good,
        }),
        ..Config::default()
    };
    let mut controller = DeliveryController::new(config).unwrap();

    let header = vec![0x42u8; 54];
    let body: Vec<u8> = (0..1000).map(|i| (i % 256) as u8).collect();
    let output = controller.run(&header, &body);

    assert_eq!(&output[..54], &header[..]);
    assert_eq!(&output[54..], &body[..]);

    let report = controller.report();
    let occupancy = report.occupancy.unwrap();
    assert_eq!(occupancy.bad_units, 0);
    assert_eq!(occupancy.good_percent(), 100.0);
    assert_eq!(report.channel.corrupted_units, 0);
    assert_eq!(controller.statistics().accepted_at(1), 16);
}

#[test]
fn test_noisy_run_preserves_length_and_header() {
    let mut controller = DeliveryController::new(Config {
        seed: 7,
        ..Config::harsh()
    })
    .unwrap();

    let header = vec![0xEEu8; 54];
    let body: Vec<u8> = (0..4096).map(|i| (i % 253) as u8).collect();
    let output = controller.run(&header, &body);

    assert_eq!(output.len(), header.len() + body.len());
    assert_eq!(&output[..54], &header[..]);
    assert_eq!(controller.statistics().total_packets(), 64);
    assert!(controller.channel().occupancy().is_some());
}

#[test]
fn test_same_seed_same_output() {
    let body: Vec<u8> = (0..2048).map(|i| (i * 31 % 256) as u8).collect();

    let run = |seed| {
        let mut controller = DeliveryController::new(Config {
            channel: bsc(0.01),
            seed,
            ..Config::default()
        })
        .unwrap();
        let output = controller.run(&[], &body);
        (output, controller.report())
    };

    let (first, first_report) = run(11);
    let (second, second_report) = run(11);
    assert_eq!(first, second);
    assert_eq!(first_report, second_report);
}

#[test]
fn test_file_pipeline_with_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.bmp");
    let output = dir.path().join("output.bmp");

    let header = vec![0x4Du8; 54];
    let body: Vec<u8> = (0..640).map(|i| i as u8).collect();
    write_stream(&input, &header, &body).unwrap();

    let stream = SplitStream::read(&input, 54).unwrap();
    let mut controller = DeliveryController::new(Config::noiseless()).unwrap();
    let recovered = controller.run(&stream.header, &stream.body);
    write_stream(&output, &recovered[..54], &recovered[54..]).unwrap();

    assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&input).unwrap());

    let bytes = controller.report().to_bytes().unwrap();
    let report = RunReport::from_bytes(&bytes).unwrap();
    assert_eq!(report.statistics.accepted_at(1), 10);
    assert!(report.occupancy.is_none());
}
