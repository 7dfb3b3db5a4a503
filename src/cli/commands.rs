//! Command implementations for the CLI.

use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::analysis::analyzer::TweetNormalizer;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::PipelineConfig;
use crate::dataset::{CsvDatasetReader, Dataset};
use crate::evaluation::{evaluate, train_test_split};
use crate::ml::label::LabelEncoder;
use crate::pipeline::SentimentPipeline;
use crate::storage::{ArtifactKind, ArtifactStore, FileStorage, Storage};

/// Prompt shown by the interactive predictor.
pub const PROMPT: &str = "Enter a tweet: ";

/// Reply to an empty line in the interactive predictor.
pub const EMPTY_INPUT_MESSAGE: &str = "Please type something first";

/// Execute a CLI command.
pub fn execute_command(args: SentimentArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args, &args),
        Command::Predict(predict_args) => predict(predict_args, &args),
        Command::Evaluate(evaluate_args) => evaluate_artifacts(evaluate_args, &args),
        Command::Normalize(normalize_args) => normalize(normalize_args, &args),
        Command::Inspect(inspect_args) => inspect(inspect_args, &args),
    }
}

/// Build the training configuration from an optional file plus flag overrides.
pub fn training_config(args: &TrainArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(max_features) = args.max_features {
        config.vectorizer.max_features = Some(max_features);
    }
    if let Some(max_iter) = args.max_iter {
        config.classifier.max_iter = max_iter;
    }
    if let Some(c) = args.c {
        config.classifier.c = c;
    }
    config.validate().context("invalid training configuration")?;
    Ok(config)
}

/// Train on a split of a CSV file, report on the hold-out rows and save.
fn train(args: &TrainArgs, cli_args: &SentimentArgs) -> Result<()> {
    let start_time = Instant::now();
    let config = training_config(args)?;
    let dataset = read_dataset(&args.data)?;
    log::info!("Label distribution: {:?}", dataset.label_counts());

    let stratify = if args.stratify {
        let encoder = LabelEncoder::fit(dataset.labels())?;
        Some(encoder.encode_all(dataset.labels())?)
    } else {
        None
    };
    let split = train_test_split(dataset.len(), args.test_size, args.seed, stratify.as_deref())
        .context("splitting dataset")?;

    let train_set = dataset.subset(&split.train)?;
    let test_set = dataset.subset(&split.test)?;

    let (pipeline, training) =
        SentimentPipeline::train(train_set.texts(), train_set.labels(), &config)
            .context("training pipeline")?;

    let evaluation = if test_set.is_empty() {
        None
    } else {
        Some(evaluate(&pipeline, &test_set).context(
            "evaluating hold-out rows (a hold-out label is missing from the training rows; --stratify keeps every class in training)",
        )?)
    };

    let store = ArtifactStore::new(
        FileStorage::new(&args.artifacts)
            .with_context(|| format!("opening {}", args.artifacts.display()))?,
    );
    store
        .save_pipeline(&pipeline)
        .with_context(|| format!("saving artifacts to {}", args.artifacts.display()))?;

    let result = TrainingResult {
        artifacts: args.artifacts.display().to_string(),
        train_rows: train_set.len(),
        test_rows: test_set.len(),
        training,
        evaluation,
        duration_ms: start_time.elapsed().as_millis() as u64,
    };
    output_result("Training complete", &result, cli_args)?;
    Ok(())
}

/// Classify texts given on the command line, or run the interactive loop.
fn predict(args: &PredictArgs, cli_args: &SentimentArgs) -> Result<()> {
    let pipeline = load_pipeline(&args.artifacts)?;

    if args.texts.is_empty() {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        return run_interactive(&pipeline, stdin.lock(), stdout.lock(), cli_args);
    }

    let (results, blank) = classify_texts(&pipeline, &args.texts)?;
    if blank > 0 {
        match cli_args.output_format {
            OutputFormat::Human => println!("{EMPTY_INPUT_MESSAGE}"),
            OutputFormat::Json => eprintln!("{EMPTY_INPUT_MESSAGE}"),
        }
    }
    if !results.0.is_empty() {
        output_result("", &results, cli_args)?;
    }
    Ok(())
}

/// Classify every non-blank text; also returns how many blank texts were skipped.
pub fn classify_texts(
    pipeline: &SentimentPipeline,
    texts: &[String],
) -> Result<(PredictionResults, usize)> {
    let mut results = Vec::with_capacity(texts.len());
    let mut blank = 0;
    for text in texts {
        if text.trim().is_empty() {
            blank += 1;
            continue;
        }
        results.push(PredictionResult {
            text: text.clone(),
            prediction: pipeline.predict_with_confidence(text)?,
        });
    }
    Ok((PredictionResults(results), blank))
}

/// Read tweets line by line and print a prediction for each.
///
/// `q` (any case, surrounding whitespace ignored) ends the loop, as does end
/// of input. Blank lines get a reminder instead of a prediction.
pub fn run_interactive<R, W>(
    pipeline: &SentimentPipeline,
    input: R,
    mut output: W,
    cli_args: &SentimentArgs,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let human = cli_args.output_format == OutputFormat::Human;
    if human && cli_args.verbosity() > 0 {
        writeln!(output, "Twitter Sentiment Predictor (type 'q' to quit)")?;
    }

    let mut lines = input.lines();
    loop {
        if human {
            write!(output, "{PROMPT}")?;
            output.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("reading input")?;
        let text = line.trim();

        if text.eq_ignore_ascii_case("q") {
            break;
        }
        if text.is_empty() {
            writeln!(output, "{EMPTY_INPUT_MESSAGE}")?;
            continue;
        }

        let prediction = pipeline.predict_with_confidence(text)?;
        if human {
            writeln!(output, "Predicted sentiment: {}", prediction.label)?;
            writeln!(output, "{}", "-".repeat(40))?;
        } else {
            let result = PredictionResult {
                text: text.to_string(),
                prediction,
            };
            writeln!(output, "{}", to_json(&result, false)?)?;
        }
    }
    Ok(())
}

/// Report saved artifacts' accuracy on a labeled CSV file.
fn evaluate_artifacts(args: &EvaluateArgs, cli_args: &SentimentArgs) -> Result<()> {
    let pipeline = load_pipeline(&args.artifacts)?;
    let dataset = read_dataset(&args.data)?;
    let evaluation = evaluate(&pipeline, &dataset)
        .with_context(|| format!("evaluating {}", args.data.display()))?;
    output_result("Evaluation", &evaluation, cli_args)?;
    Ok(())
}

/// Print normalized tokens for each text (or stdin line).
fn normalize(args: &NormalizeArgs, cli_args: &SentimentArgs) -> Result<()> {
    let normalizer = TweetNormalizer::new()?;

    let texts: Vec<String> = if args.texts.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<std::io::Result<_>>()
            .context("reading stdin")?
    } else {
        args.texts.clone()
    };

    let results = texts
        .into_iter()
        .map(|text| {
            let tokens = normalizer.normalize(&text)?;
            Ok(NormalizationResult { text, tokens })
        })
        .collect::<crate::error::Result<Vec<_>>>()?;

    output_result("", &NormalizationResults(results), cli_args)?;
    Ok(())
}

/// Summarize the artifacts in a directory.
fn inspect(args: &InspectArgs, cli_args: &SentimentArgs) -> Result<()> {
    let storage = open_storage(&args.artifacts)?;
    let files = ArtifactKind::all()
        .iter()
        .filter(|kind| storage.file_exists(kind.file_name()))
        .map(|kind| {
            Ok(ArtifactFile {
                name: kind.file_name().to_string(),
                size_bytes: storage.file_size(kind.file_name())?,
            })
        })
        .collect::<crate::error::Result<Vec<_>>>()?;

    let pipeline = ArtifactStore::new(storage)
        .load_pipeline()
        .with_context(|| format!("loading artifacts from {}", args.artifacts.display()))?;
    let summary = summarize(&pipeline, args.top, files, &args.artifacts)?;
    output_result("", &summary, cli_args)?;
    Ok(())
}

/// Collect the inspection summary of a fitted pipeline.
pub fn summarize(
    pipeline: &SentimentPipeline,
    top: usize,
    files: Vec<ArtifactFile>,
    directory: &Path,
) -> Result<ArtifactSummary> {
    let (vectorizer, classifier, encoder) = pipeline.parts()?;

    let top_features = encoder
        .classes()
        .iter()
        .enumerate()
        .map(|(class, label)| ClassFeatures {
            label: label.clone(),
            features: classifier
                .top_features(class, top)
                .into_iter()
                .filter_map(|(index, weight)| {
                    vectorizer
                        .feature_name(index)
                        .map(|term| (term.to_string(), weight))
                })
                .collect(),
        })
        .collect();

    Ok(ArtifactSummary {
        directory: directory.display().to_string(),
        files,
        analyzer: vectorizer.analyzer().name().to_string(),
        n_documents: vectorizer.n_documents(),
        vocabulary_size: vectorizer.vocabulary_size(),
        ngram_range: vectorizer.config().ngram_range,
        classes: encoder.classes().to_vec(),
        top_features,
    })
}

fn read_dataset(path: &Path) -> Result<Dataset> {
    CsvDatasetReader::new()
        .read_path(path)
        .with_context(|| format!("reading dataset {}", path.display()))
}

fn open_storage(directory: &Path) -> Result<FileStorage> {
    FileStorage::open(directory)
        .with_context(|| format!("opening artifacts in {}", directory.display()))
}

/// Load the three artifacts once; nothing is predicted if this fails.
fn load_pipeline(directory: &Path) -> Result<SentimentPipeline> {
    ArtifactStore::new(open_storage(directory)?)
        .load_pipeline()
        .with_context(|| format!("loading artifacts from {}", directory.display()))
}
