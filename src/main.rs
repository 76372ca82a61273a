use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use banking_intent::{
    IntentDetailNormalizer, KeywordOverlapScorer, KeywordRegistry, NormalizerConfig,
    RawIntentFields,
};

const USAGE: &str = "\
Usage:
  banking-intent resolve <phrase>
  banking-intent classify [--registry PATH] <utterance>
  banking-intent normalize <fields-json>
  banking-intent samples [--registry PATH] <samples.csv>";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("banking-intent v{}", banking_intent::VERSION);

    let args: Vec<String> = env::args().skip(1).collect();
    let (registry_flag, rest) = take_registry_flag(&args)?;
    let config = NormalizerConfig::from_env()?;

    match rest.split_first() {
        Some((command, tail)) if command == "resolve" => run_resolve(&config, &tail.join(" ")),
        Some((command, tail)) if command == "classify" => {
            let registry = load_registry(&config, registry_flag)?;
            run_classify(registry, &tail.join(" "))
        }
        Some((command, tail)) if command == "normalize" => run_normalize(&config, &tail.join(" ")),
        Some((command, [path])) if command == "samples" => {
            let registry = load_registry(&config, registry_flag)?;
            run_samples(registry, Path::new(path))
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

/// Pull `--registry PATH` out of the argument list
fn take_registry_flag(args: &[String]) -> Result<(Option<PathBuf>, Vec<String>)> {
    let mut registry = None;
    let mut rest = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "--registry" {
            let path = iter.next().context("--registry needs a path")?;
            registry = Some(PathBuf::from(path));
        } else {
            rest.push(arg.clone());
        }
    }

    Ok((registry, rest))
}

fn load_registry(config: &NormalizerConfig, flag: Option<PathBuf>) -> Result<Arc<KeywordRegistry>> {
    let registry = match flag {
        Some(path) => KeywordRegistry::from_file(path)?,
        None => config.load_registry()?,
    };

    if registry.is_empty() {
        bail!("No keyword mappings loaded; pass --registry or set {}", banking_intent::config::ENV_REGISTRY);
    }
    Ok(Arc::new(registry))
}

fn run_resolve(config: &NormalizerConfig, phrase: &str) -> Result<()> {
    match config.resolver().resolve(Some(phrase)) {
        Some(date) => println!("{}", date),
        None => println!("unresolved"),
    }
    Ok(())
}

fn run_classify(registry: Arc<KeywordRegistry>, utterance: &str) -> Result<()> {
    let scorer = KeywordOverlapScorer::new(registry);

    match scorer.classify(utterance) {
        Some(m) => println!("{} (score {})", m.intent_id, m.score),
        None => println!("no match"),
    }
    Ok(())
}

fn run_normalize(config: &NormalizerConfig, json: &str) -> Result<()> {
    let fields: RawIntentFields =
        serde_json::from_str(json).context("Failed to parse intent fields JSON")?;

    let normalizer = IntentDetailNormalizer::new(Arc::new(KeywordRegistry::default()), config.resolver());
    let detail = normalizer.build(fields)?;

    println!("{}", serde_json::to_string_pretty(&detail)?);
    Ok(())
}

#[derive(Debug, Deserialize)]
struct SampleInput {
    category: String,
    title: String,
}

fn run_samples(registry: Arc<KeywordRegistry>, path: &Path) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open samples file: {:?}", path))?;
    let scorer = KeywordOverlapScorer::new(registry);

    let mut total = 0usize;
    let mut agreed = 0usize;
    let mut unmatched = 0usize;

    for record in reader.deserialize() {
        let sample: SampleInput = record.context("Failed to parse sample row")?;
        total += 1;

        match scorer.classify(&sample.title) {
            Some(m) if m.intent_id == sample.category => agreed += 1,
            Some(m) => println!("✗ {:?}: expected {}, got {}", sample.title, sample.category, m.intent_id),
            None => {
                unmatched += 1;
                println!("∅ {:?}: expected {}, no match", sample.title, sample.category);
            }
        }
    }

    println!("{} samples, {} agreed, {} disagreed, {} unmatched", total, agreed, total - agreed - unmatched, unmatched);
    Ok(())
}
