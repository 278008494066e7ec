use std::hint::black_box;

use bytepair::{EncoderConfig, Tokenizer, Trainer, TrainerConfig};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};

fn build_corpus() -> Vec<u8> {
    let words: [&[u8]; 8] = [
        b"the ", b"moon ", b"because ", b"it ", b"is ", b"easy ", b"hard ", b"decade ",
    ];
    let mut data = Vec::with_capacity(64 * 1024);
    for idx in 0..8192usize {
        data.extend_from_slice(words[(idx * 7 + idx / 3) % words.len()]);
    }
    data
}

fn bench_training(c: &mut Criterion) {
    let corpus = build_corpus();
    let cfg = TrainerConfig::builder()
        .target_vocab_size(512)
        .show_progress(false)
        .build()
        .expect("configuration");

    let mut group = c.benchmark_group("train_text_corpus");
    group.throughput(Throughput::Bytes(corpus.len() as u64));
    group.sampling_mode(SamplingMode::Flat);
    group.sample_size(10);
    group.bench_function(BenchmarkId::from_parameter("vocab_512"), |b| {
        b.iter(|| {
            let trainer = Trainer::new(cfg.clone());
            let artefacts = trainer.train(&corpus).expect("training");
            let _ = black_box(artefacts);
        });
    });
    group.finish();
}

fn bench_encoding(c: &mut Criterion) {
    let corpus = build_corpus();
    let cfg = TrainerConfig::builder()
        .target_vocab_size(512)
        .show_progress(false)
        .build()
        .expect("configuration");
    let vocab = Trainer::new(cfg).train(&corpus).expect("training").vocab;
    let sample = &corpus[..4096];

    let mut group = c.benchmark_group("encode_text");
    group.throughput(Throughput::Bytes(sample.len() as u64));
    for preserve in [false, true] {
        let tokenizer = Tokenizer::new(
            vocab.clone(),
            EncoderConfig::builder()
                .preserve_word_boundaries(preserve)
                .build(),
        );
        group.bench_with_input(
            BenchmarkId::new("preserve_word_boundaries", preserve),
            &tokenizer,
            |b, tokenizer| b.iter(|| black_box(tokenizer.encode(sample).expect("encode"))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_training, bench_encoding);
criterion_main!(benches);
