//! Writes a synthetic, synonym-augmented symptom dataset for fine-tuning the
//! severity classifier.
//!
//! Usage: `generate_symptom_data [COUNT] [OUTPUT]`
//! (defaults: 5000 examples, `symptom_data_large.json`).

use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::Context;
use rand::{seq::SliceRandom, Rng};
use serde::Serialize;

const DEFAULT_COUNT: usize = 5000;
const DEFAULT_OUTPUT: &str = "symptom_data_large.json";
const AUGMENT_PROBABILITY: f64 = 0.8;
const REPLACE_PROBABILITY: f64 = 0.5;

/// Labels: 0 Mild, 1 Moderate, 2 Severe, 3 Critical.
const BASE_EXAMPLES: [(&str, u8); 4] = [
    ("I have a slight headache and feel tired.", 0),
    ("I experience moderate fever and a sore throat.", 1),
    ("I have severe stomach pain and have been vomiting.", 2),
    ("I have critical chest pain and difficulty breathing.", 3),
];

const SYNONYMS: [(&str, &[&str]); 15] = [
    ("slight", &["mild", "light", "minor"]),
    ("headache", &["head pain", "migraine"]),
    ("tired", &["fatigued", "exhausted"]),
    ("moderate", &["medium", "average", "somewhat"]),
    ("fever", &["elevated temperature", "high temperature"]),
    ("sore", &["irritated", "raw"]),
    ("throat", &["pharynx"]),
    ("severe", &["intense", "extreme", "strong"]),
    ("stomach", &["abdominal", "belly"]),
    ("pain", &["ache"]),
    ("vomiting", &["throwing up", "emesis"]),
    ("critical", &["life-threatening", "urgent", "emergency"]),
    ("chest", &["thoracic"]),
    ("difficulty", &["trouble"]),
    ("breathing", &["respiration", "getting air"]),
];

#[derive(Debug, Serialize, PartialEq)]
struct Example {
    text: String,
    label: u8,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Swaps known words for a random synonym, keeping leading capitals and a
/// trailing punctuation mark.
fn augment_text<R: Rng + ?Sized>(
    text: &str,
    synonyms: &HashMap<&str, &[&str]>,
    rng: &mut R,
) -> String {
    text.split_whitespace()
        .map(|word| {
            let key = word.to_lowercase();
            let key = key.trim_matches(|c| c == '.' || c == ',');
            let Some(options) = synonyms.get(key) else {
                return word.to_string();
            };
            if !rng.gen_bool(REPLACE_PROBABILITY) {
                return word.to_string();
            }
            let Some(choice) = options.choose(&mut *rng) else {
                return word.to_string();
            };
            let mut out = if word.starts_with(char::is_uppercase) {
                capitalize(choice)
            } else {
                choice.to_string()
            };
            if let Some(p) = word.chars().last().filter(|c| ".,!?".contains(*c)) {
                out.push(p);
            }
            out
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Example> {
    let synonyms: HashMap<&str, &[&str]> = SYNONYMS.iter().copied().collect();
    (0..count)
        .filter_map(|_| {
            let &(text, label) = BASE_EXAMPLES.choose(&mut *rng)?;
            let text = if rng.gen_bool(AUGMENT_PROBABILITY) {
                augment_text(text, &synonyms, &mut *rng)
            } else {
                text.to_string()
            };
            Some(Example { text, label })
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let count = match args.next() {
        Some(n) => n.parse::<usize>().with_context(|| format!("invalid count {n:?}"))?,
        None => DEFAULT_COUNT,
    };
    let output = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_OUTPUT.into()));

    let dataset = generate(count, &mut rand::thread_rng());
    let json = serde_json::to_string_pretty(&dataset).context("serialize dataset")?;
    fs::write(&output, json).with_context(|| format!("write {}", output.display()))?;

    tracing::info!(count = dataset.len(), output = %output.display(), "synthetic examples generated");
    Ok(())
}
