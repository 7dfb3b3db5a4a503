//! Criterion benchmarks for the sentiment pipeline.
//!
//! Covers the stages that run per tweet at inference time plus a training
//! run on a synthetic corpus:
//! - Normalization
//! - TF-IDF vectorization
//! - Single and batch prediction
//! - Fitting

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tweet_sentiment::analysis::analyzer::TweetNormalizer;
use tweet_sentiment::config::PipelineConfig;
use tweet_sentiment::ml::tfidf::{TfIdfVectorizer, VectorizerConfig};
use tweet_sentiment::pipeline::SentimentPipeline;

const POSITIVE: &[&str] = &[
    "love", "amazing", "great", "happy", "wonderful", "excited", "best", "awesome",
];
const NEGATIVE: &[&str] = &[
    "hate", "awful", "terrible", "sad", "worst", "angry", "broken", "delayed",
];
const NEUTRAL: &[&str] = &[
    "train", "weather", "report", "tuesday", "station", "meeting", "update", "schedule",
];

/// Generate labeled tweets for benchmarking.
fn generate_tweets(count: usize) -> (Vec<String>, Vec<String>) {
    let classes = [("positive", POSITIVE), ("negative", NEGATIVE), ("neutral", NEUTRAL)];
    let mut texts = Vec::with_capacity(count);
    let mut labels = Vec::with_capacity(count);

    for i in 0..count {
        let (label, words) = classes[i % classes.len()];
        let (_, noise) = classes[(i / 3 + 1) % classes.len()];
        let mut tweet = vec![format!("@user{}", i % 17)];
        for j in 0..(6 + i % 8) {
            // Mostly class words with some cross-class noise
            let pool = if j % 4 == 3 { noise } else { words };
            tweet.push(pool[(i * 7 + j * 13) % pool.len()].to_string());
        }
        if i % 5 == 0 {
            tweet.push(format!("https://t.co/{i}"));
        }
        tweet.push(format!("#{}", words[i % words.len()]));
        texts.push(tweet.join(" "));
        labels.push(label.to_string());
    }

    (texts, labels)
}

fn bench_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalization");
    let normalizer = TweetNormalizer::new().unwrap();
    let (texts, _) = generate_tweets(100);

    group.bench_function("normalize_single_tweet", |b| {
        b.iter(|| black_box(normalizer.normalize(black_box(&texts[0])).unwrap()))
    });

    group.throughput(Throughput::Elements(texts.len() as u64));
    group.bench_function("normalize_100_tweets", |b| {
        b.iter(|| {
            for text in &texts {
                black_box(normalizer.normalize(black_box(text)).unwrap());
            }
        })
    });

    group.finish();
}

fn bench_vectorization(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectorization");
    let (texts, _) = generate_tweets(1000);
    let mut vectorizer = TfIdfVectorizer::with_default_analyzer(VectorizerConfig::default()).unwrap();
    vectorizer.fit(&texts).unwrap();

    group.bench_function("transform_single_tweet", |b| {
        b.iter(|| black_box(vectorizer.transform(black_box(&texts[0])).unwrap()))
    });

    group.throughput(Throughput::Elements(texts.len() as u64));
    group.bench_function("transform_batch_1000", |b| {
        b.iter(|| black_box(vectorizer.transform_batch(black_box(&texts)).unwrap()))
    });

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");
    let (texts, labels) = generate_tweets(600);
    let (pipeline, _) = SentimentPipeline::train(&texts, &labels, &PipelineConfig::default()).unwrap();

    group.bench_function("predict_single_tweet", |b| {
        b.iter(|| black_box(pipeline.predict(black_box(&texts[1])).unwrap()))
    });

    group.throughput(Throughput::Elements(texts.len() as u64));
    group.bench_function("predict_batch_600", |b| {
        b.iter(|| black_box(pipeline.predict_batch(black_box(&texts)).unwrap()))
    });

    group.finish();
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10);

    for size in [150, 600].iter() {
        let (texts, labels) = generate_tweets(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("train_pipeline", size), size, |b, _| {
            b.iter(|| {
                black_box(
                    SentimentPipeline::train(&texts, &labels, &PipelineConfig::default()).unwrap(),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_normalization,
    bench_vectorization,
    bench_prediction
);

criterion_group!(slow_benches, bench_training);

criterion_main!(benches, slow_benches);
