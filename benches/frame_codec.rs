//! Benchmarks for the frame codec and receive path
//!
//! Covers:
//! - Decoding a full datagram into a frame
//! - Encoding with and without a checksum policy
//! - Typed payload decoding per topic
//! - The ingest pipeline (decode, filter, queue) per datagram
//!
//! Platform: Cross-platform, no network access

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use groundlink::codec::{self, FnChecksum};
use groundlink::events::EVENT_CHANNEL_CAPACITY;
use groundlink::ingest::Ingest;
use groundlink::provider::Datagram;
use groundlink::queue::FrameQueue;
use groundlink::test_utils::{patterned_frame, sample_electrical, telemetry_datagrams};
use groundlink::{
    Electrical, FRAME_LEN, LinkMetrics, MAX_USER_DATA_LEN, Telemetry, Topic, TopicPayload,
};
use std::hint::black_box;
use std::sync::Arc;
use tokio::sync::broadcast;

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(FRAME_LEN as u64));

    for len in [0usize, 21, 512, MAX_USER_DATA_LEN] {
        let wire = codec::encode(&patterned_frame(Topic::ELECTRICAL, len));
        group.bench_with_input(BenchmarkId::from_parameter(len), &wire, |b, wire| {
            b.iter(|| black_box(codec::decode(black_box(wire))))
        });
    }

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let frame = sample_electrical().to_frame();
    let sum = FnChecksum::new(|covered: &[u8]| {
        covered.iter().fold(0u16, |acc, b| acc.wrapping_add(*b as u16))
    });

    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Bytes(FRAME_LEN as u64));

    group.bench_function("plain", |b| b.iter(|| black_box(codec::encode(black_box(&frame)))));
    group.bench_function("with_checksum", |b| {
        b.iter(|| black_box(codec::encode_with_checksum(black_box(&frame), &sum)))
    });

    group.finish();
}

fn bench_payloads(c: &mut Criterion) {
    let frames: Vec<_> =
        telemetry_datagrams().iter().filter_map(|wire| codec::decode(wire).ok()).collect();
    let electrical = sample_electrical().to_frame();

    let mut group = c.benchmark_group("payloads");

    group.bench_function("electrical_from_frame", |b| {
        b.iter(|| black_box(Electrical::from_frame(black_box(&electrical))))
    });

    group.bench_function("telemetry_dispatch_all_topics", |b| {
        b.iter(|| {
            for frame in &frames {
                black_box(Telemetry::decode(black_box(frame)));
            }
        })
    });

    group.finish();
}

fn bench_ingest(c: &mut Criterion) {
    let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    let ingest = Ingest::new(
        Topic::TELEMETRY.into_iter().collect(),
        FrameQueue::with_capacity(64),
        Arc::new(LinkMetrics::new()),
        events,
    );
    let accepted = codec::encode(&sample_electrical().to_frame());
    let filtered = codec::encode(&patterned_frame(Topic(9999), 16));

    let mut group = c.benchmark_group("ingest");
    group.throughput(Throughput::Elements(1));

    // Queue stays full, so every accepted datagram also exercises eviction
    group.bench_function("accepted", |b| {
        b.iter(|| black_box(ingest.process(Datagram::new(accepted.clone(), None))))
    });
    group.bench_function("topic_filtered", |b| {
        b.iter(|| black_box(ingest.process(Datagram::new(filtered.clone(), None))))
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_encode, bench_payloads, bench_ingest);
criterion_main!(benches);
