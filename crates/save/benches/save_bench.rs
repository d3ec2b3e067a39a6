//! Save record codec benchmarks.
//!
//! Measures encode/decode of a slot record as the progression map grows,
//! with and without lz4 compression.
//!
//! Run with: `cargo bench -p save --bench save_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use save::save_codec::{decode_record, encode_record};
use save::SaveRecord;

const MAP_SIZES: [usize; 4] = [100, 1_000, 10_000, 50_000];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A record with `entries` progression objects spread over the object-type
/// tags, plus a populated inventory and extension map.
fn build_synthetic_record(entries: usize) -> SaveRecord {
    let mut record = SaveRecord::default();
    record.scene.scene_name = "Forest_02".to_string();
    record.respawn.checkpoint_name = "Campfire".to_string();
    record.respawn.position = [12.5, 0.0, -48.25];

    record.progression.ids = (0..entries as u32)
        .map(|i| ((i % 12 + 1) << 24) | (i & 0x00FF_FFFF))
        .collect();
    record.progression.serialized_states = (0..entries)
        .map(|i| {
            if i % 3 == 0 {
                r#"{"wasTriggered":true}"#.to_string()
            } else {
                format!(r#"{{"wasTriggered":false,"counter":{i}}}"#)
            }
        })
        .collect();

    record.inventory.item_names = ["Berry", "Tonic", "Elixir", "Bomb"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    record.inventory.item_counts = vec![3, 1, 0, 7];
    record
        .extensions
        .insert("ability_wheel".to_string(), vec![0u8; 64]);
    record
}

// ---------------------------------------------------------------------------
// 1. ENCODE (SaveRecord -> file bytes)
// ---------------------------------------------------------------------------

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_encode");

    for &entries in &MAP_SIZES {
        let record = build_synthetic_record(entries);
        for compress in [false, true] {
            let label = if compress { "lz4" } else { "plain" };
            group.bench_with_input(
                BenchmarkId::new(label, format!("{entries}_objects")),
                &record,
                |b, record| {
                    b.iter(|| black_box(encode_record(record, compress).unwrap()));
                },
            );
        }
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// 2. DECODE (file bytes -> SaveRecord, including header check and migration)
// ---------------------------------------------------------------------------

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_decode");

    for &entries in &MAP_SIZES {
        let record = build_synthetic_record(entries);
        for compress in [false, true] {
            let label = if compress { "lz4" } else { "plain" };
            let bytes = encode_record(&record, compress).unwrap();
            group.bench_with_input(
                BenchmarkId::new(label, format!("{entries}_objects")),
                &bytes,
                |b, bytes| {
                    b.iter(|| black_box(decode_record(bytes).unwrap().progression.len()));
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
