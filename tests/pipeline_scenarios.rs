//! End-to-end scenarios for the sentiment pipeline.

use std::sync::Arc;
use std::thread;

use tweet_sentiment::analysis::analyzer::TweetNormalizer;
use tweet_sentiment::config::PipelineConfig;
use tweet_sentiment::dataset::CsvDatasetReader;
use tweet_sentiment::error::{Result, SentimentError};
use tweet_sentiment::evaluation::{evaluate, train_test_split, DEFAULT_SEED};
use tweet_sentiment::ml::label::LabelEncoder;
use tweet_sentiment::pipeline::SentimentPipeline;
use tweet_sentiment::storage::{ArtifactStore, MemoryStorage};

const TWEETS_CSV: &str = "\
id,content,label
1,\"I love my new phone, the camera is amazing\",positive
2,What a wonderful morning feeling happy,positive
3,@friend thanks for the great gift! #blessed,positive
4,So happy with this amazing team,positive
5,\"This update is awful, everything crashes\",negative
6,\"I hate waiting in line, terrible service\",negative
7,Worst flight ever delayed again https://t.co/abc,negative
8,Angry about the broken screen,negative
9,The meeting is scheduled for tuesday,neutral
10,Weather report: cloudy with light wind,neutral
11,Train to the city leaves at noon,neutral
12,The store opens at nine on monday,neutral
";

fn trained() -> Result<SentimentPipeline> {
    let dataset = CsvDatasetReader::new().read(TWEETS_CSV.as_bytes())?;
    let (pipeline, _) =
        SentimentPipeline::train(dataset.texts(), dataset.labels(), &PipelineConfig::default())?;
    Ok(pipeline)
}

#[test]
fn test_tweet_normalization_scenario() -> Result<()> {
    let normalizer = TweetNormalizer::new()?;
    let tokens = normalizer.normalize("I LOVE this!!! #amazing http://x.co @bob")?;
    assert_eq!(tokens, vec!["love", "amazing"]);

    let again = normalizer.normalize(&tokens.join(" "))?;
    assert_eq!(again, tokens);
    Ok(())
}

#[test]
fn test_empty_input_scenario() -> Result<()> {
    let pipeline = trained()?;
    let normalizer = TweetNormalizer::new()?;

    assert!(normalizer.normalize("")?.is_empty());
    assert!(pipeline.vectorizer().transform("")?.is_zero());

    let label = pipeline.predict("")?;
    assert!(pipeline.classes().contains(&label));
    Ok(())
}

#[test]
fn test_missing_label_column_scenario() {
    let csv = "id,content\n1,hello world\n";
    let err = CsvDatasetReader::new().read(csv.as_bytes()).unwrap_err();

    assert!(err.is_input_error());
    assert!(matches!(err, SentimentError::MissingColumns(ref cols) if cols == &["label"]));
    assert!(err.to_string().contains("label"));
}

#[test]
fn test_label_order_scenario() -> Result<()> {
    let pipeline = trained()?;
    let encoder = pipeline.label_encoder().unwrap();

    assert_eq!(encoder.encode("negative")?, 0);
    assert_eq!(encoder.encode("neutral")?, 1);
    assert_eq!(encoder.encode("positive")?, 2);
    assert_eq!(encoder.decode(1)?, "neutral");

    let err = encoder.encode("mixed").unwrap_err();
    assert!(matches!(err, SentimentError::UnknownLabel(ref l) if l == "mixed"));
    Ok(())
}

#[test]
fn test_predict_before_loading_scenario() {
    let pipeline = SentimentPipeline::new(&PipelineConfig::default()).unwrap();
    let err = pipeline.predict("I love it").unwrap_err();
    assert!(err.is_state_error(), "unexpected error: {err}");

    let store = ArtifactStore::new(MemoryStorage::new());
    let err = store.load_pipeline().unwrap_err();
    assert!(matches!(err, SentimentError::ArtifactMissing { .. }));
}

#[test]
fn test_learns_training_sentiment() -> Result<()> {
    let pipeline = trained()?;
    assert_eq!(pipeline.predict("love this amazing phone")?, "positive");
    assert_eq!(pipeline.predict("awful terrible crashes")?, "negative");
    assert_eq!(pipeline.predict("weather report for tuesday")?, "neutral");
    Ok(())
}

#[test]
fn test_feature_vectors_are_unit_length() -> Result<()> {
    let pipeline = trained()?;
    for text in ["love it", "awful awful awful service", "weather on monday at noon"] {
        let vector = pipeline.vectorizer().transform(text)?;
        assert!((vector.l2_norm() - 1.0).abs() < 1e-9, "{text}");
    }
    assert!(pipeline.vectorizer().transform("zzz qqq")?.is_zero());
    Ok(())
}

#[test]
fn test_training_is_reproducible() -> Result<()> {
    let first = trained()?;
    let second = trained()?;
    assert_eq!(first.classifier(), second.classifier());
    assert_eq!(
        first.vectorizer().feature_names(),
        second.vectorizer().feature_names()
    );
    Ok(())
}

#[test]
fn test_concurrent_predict_matches_sequential() -> Result<()> {
    let pipeline = Arc::new(trained()?);
    let texts: Vec<String> = (0..64)
        .map(|i| match i % 4 {
            0 => format!("love this amazing day {i}"),
            1 => format!("terrible awful service #{i}"),
            2 => format!("meeting on tuesday at {i}"),
            _ => String::new(),
        })
        .collect();
    let expected: Vec<String> = texts
        .iter()
        .map(|t| pipeline.predict(t))
        .collect::<Result<_>>()?;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pipeline = Arc::clone(&pipeline);
            let texts = texts.clone();
            thread::spawn(move || {
                texts
                    .iter()
                    .map(|t| pipeline.predict(t))
                    .collect::<Result<Vec<String>>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap()?, expected);
    }
    assert_eq!(pipeline.predict_batch(&texts)?, expected);
    Ok(())
}

#[test]
fn test_holdout_evaluation() -> Result<()> {
    let dataset = CsvDatasetReader::new().read(TWEETS_CSV.as_bytes())?;
    let encoder = LabelEncoder::fit(dataset.labels())?;
    let targets = encoder.encode_all(dataset.labels())?;

    let split = train_test_split(dataset.len(), 0.25, DEFAULT_SEED, Some(targets.as_slice()))?;
    assert_eq!(split.test.len(), 3);

    let train = dataset.subset(&split.train)?;
    let test = dataset.subset(&split.test)?;
    let (pipeline, report) =
        SentimentPipeline::train(train.texts(), train.labels(), &PipelineConfig::default())?;
    assert_eq!(report.classes.len(), 3);

    let evaluation = evaluate(&pipeline, &test)?;
    assert_eq!(evaluation.report.support, 3);
    assert_eq!(evaluation.confusion_matrix.total(), 3);
    assert!(evaluation.to_string().contains("Confusion matrix"));
    Ok(())
}

#[test]
fn test_stratified_holdout_with_singleton_class() -> Result<()> {
    let csv = format!("{TWEETS_CSV}13,Not sure how I feel about this,mixed\n");
    let dataset = CsvDatasetReader::new().read(csv.as_bytes())?;
    let encoder = LabelEncoder::fit(dataset.labels())?;
    let targets = encoder.encode_all(dataset.labels())?;

    let split = train_test_split(dataset.len(), 0.5, DEFAULT_SEED, Some(targets.as_slice()))?;
    let train = dataset.subset(&split.train)?;
    let test = dataset.subset(&split.test)?;
    assert!(train.labels().iter().any(|l| l == "mixed"));
    assert!(test.labels().iter().all(|l| l != "mixed"));

    let (pipeline, report) =
        SentimentPipeline::train(train.texts(), train.labels(), &PipelineConfig::default())?;
    assert_eq!(report.classes.len(), 4);

    let evaluation = evaluate(&pipeline, &test)?;
    assert_eq!(evaluation.report.support, test.len());
    Ok(())
}
