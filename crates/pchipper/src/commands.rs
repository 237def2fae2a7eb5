//! # Subcommands

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use promptchipper::instruct::InstructRequest;
use promptchipper::{
    BpeTokenizer,
    InstructAdapter,
    InstructOptions,
    InstructTokenizer,
    Tokenizer,
    load_tokenizer_path,
};
use promptchipper_model_cache::{ModelCache, ModelCacheOptions};

use crate::{Args, Command};

type T = u32;

fn read_stdin() -> anyhow::Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

fn model_cache(args: &Args) -> anyhow::Result<ModelCache> {
    let mut options = ModelCacheOptions::default();
    if let Some(dir) = &args.model_dir {
        options = options.with_model_dir(dir);
    }
    ModelCache::init(options)
}

fn load_tokenizer(args: &Args) -> anyhow::Result<BpeTokenizer<T>> {
    let path: PathBuf = model_cache(args)?.resolve_model_path(&args.model)?;
    log::info!("loading model: {}", path.display());

    load_tokenizer_path(&path).with_context(|| format!("failed to load {}", path.display()))
}

/// Run a subcommand, writing its output to `out`.
pub fn run(
    args: &Args,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match &args.command {
        Command::Models => {
            for path in model_cache(args)?.list_models()? {
                writeln!(out, "{}", path.display())?;
            }
            Ok(())
        }
        command => {
            let tokenizer = load_tokenizer(args)?;
            run_with_tokenizer(command, tokenizer, out)
        }
    }
}

fn run_with_tokenizer(
    command: &Command,
    tokenizer: BpeTokenizer<T>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match command {
        Command::Encode { text, bos, eos } => {
            let text = match text {
                Some(text) => text.clone(),
                None => read_stdin()?,
            };
            let tokens = tokenizer.encode(&text, *bos, *eos)?;
            write_ids(out, &tokens)
        }
        Command::Decode { ids, controls } => {
            let ids = if ids.is_empty() {
                parse_ids(&read_stdin()?)?
            } else {
                ids.clone()
            };
            let text = if *controls {
                tokenizer.to_string(&ids)?
            } else {
                tokenizer.decode(&ids)?
            };
            writeln!(out, "{text}")?;
            Ok(())
        }
        Command::Vocab { limit } => {
            let vocab = tokenizer.vocab();
            let limit = limit.unwrap_or(vocab.len());
            for (id, token) in vocab.iter().enumerate().take(limit) {
                writeln!(out, "{id}\t{}", token.escape_debug())?;
            }
            Ok(())
        }
        Command::Instruct {
            request,
            eos_policy,
            no_text,
        } => {
            let source = match request {
                Some(path) => read_file(path)?,
                None => read_stdin()?,
            };
            let request: InstructRequest =
                serde_json::from_str(&source).context("failed to parse instruct request")?;

            let adapter = InstructAdapter::new(Arc::new(tokenizer)).with_options(
                InstructOptions::default()
                    .with_eos_policy((*eos_policy).into())
                    .with_render_text(!no_text),
            );
            let tokenized = adapter.encode_instruct(&request)?;

            write_ids(out, &tokenized.tokens)?;
            if let Some(text) = tokenized.text {
                writeln!(out, "{text}")?;
            }
            Ok(())
        }
        Command::Models => unreachable!("handled without a tokenizer"),
    }
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_ids(
    out: &mut dyn Write,
    tokens: &[T],
) -> anyhow::Result<()> {
    let line = tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "{line}")?;
    Ok(())
}

fn parse_ids(source: &str) -> anyhow::Result<Vec<T>> {
    source
        .split_whitespace()
        .map(|s| s.parse::<T>().with_context(|| format!("invalid token id {s:?}")))
        .collect()
}
