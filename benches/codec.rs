use std::hint::black_box;

use criterion::{BatchSize, Criterion, Throughput};
use libmqtt::mqtt::QoS;
use libmqtt::mqtt::packet::{self, PacketBuffer};
use libmqtt::mqtt::varint;

const TOPIC: &str = "sensors/temperature";
const PAYLOAD: &[u8] = b"{\"celsius\":23.5,\"humidity\":41}";

pub fn bench_varint(c: &mut Criterion) {
    let mut group = c.benchmark_group("varint");
    group.bench_function("encode", |b| {
        let mut buf = [0u8; varint::MAX_LEN];
        b.iter(|| {
            for value in [0, 127, 16_383, 2_097_151, 268_435_455] {
                black_box(varint::encode(black_box(value), &mut buf).unwrap());
            }
        })
    });
    group.bench_function("decode", |b| {
        let encoded: [&[u8]; 4] = [
            &[0x7F],
            &[0xFF, 0x7F],
            &[0xFF, 0xFF, 0x7F],
            &[0xFF, 0xFF, 0xFF, 0x7F],
        ];
        b.iter(|| {
            for bytes in encoded {
                black_box(varint::decode(black_box(bytes)).unwrap());
            }
        })
    });
    group.finish();
}

pub fn bench_encode_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish");
    group.throughput(Throughput::Bytes(PAYLOAD.len() as u64));
    let mut buffer = PacketBuffer::<256>::new();
    group.bench_function("encode", |b| {
        b.iter(|| {
            let flags = packet::publish_flags(QoS::AtLeastOnce, false, false);
            let frame = packet::publish(buffer.writer(), TOPIC, Some(7), PAYLOAD, flags).unwrap();
            black_box(frame.len());
        })
    });
    group.finish();
}

pub fn bench_decode_publish(c: &mut Criterion) {
    let mut encoder = PacketBuffer::<256>::new();
    let flags = packet::publish_flags(QoS::AtLeastOnce, false, false);
    let wire = packet::publish(encoder.writer(), TOPIC, Some(7), PAYLOAD, flags)
        .unwrap()
        .to_vec();

    let mut group = c.benchmark_group("publish");
    group.throughput(Throughput::Bytes(wire.len() as u64));
    group.bench_function("decode", |b| {
        b.iter_batched_ref(
            PacketBuffer::<256>::new,
            |buffer| {
                let mut bytes = wire[1..].iter().copied();
                let frame = buffer
                    .decode(wire[0], || bytes.next().ok_or(libmqtt::mqtt::Error::Timeout))
                    .unwrap();
                let body = buffer.body().unwrap();
                let publish = packet::Publish::parse(&frame.header, body).unwrap();
                black_box(publish.payload.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}
