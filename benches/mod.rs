use criterion::{criterion_group, criterion_main};

mod codec;

criterion_group!(
    benches,
    codec::bench_varint,
    codec::bench_encode_publish,
    codec::bench_decode_publish
);
criterion_main!(benches);
