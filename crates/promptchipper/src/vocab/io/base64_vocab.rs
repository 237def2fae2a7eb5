//! # Base64 Rank Files
//!
//! One `base64(bytes) rank` pair per line; ranks must cover `0..n` exactly once.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::errors::{PCError, PCResult};

/// Load span tokens, in rank order, from a base64 rank file.
pub fn load_base64_span_vocab_path<P: AsRef<Path>>(path: P) -> PCResult<Vec<Vec<u8>>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| PCError::ModelLoad(format!("{}: {e}", path.display())))?;

    read_base64_span_vocab(BufReader::new(file))
        .map_err(|e| PCError::ModelLoad(format!("{}: {e}", path.display())))
}

/// Read span tokens, in rank order, from base64 rank lines.
///
/// Blank lines are skipped.
pub fn read_base64_span_vocab<R: BufRead>(reader: R) -> PCResult<Vec<Vec<u8>>> {
    let mut entries: Vec<(usize, usize, Vec<u8>)> = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| PCError::ModelLoad(e.to_string()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let malformed = || PCError::ModelLoad(format!("line {}: malformed entry", lineno + 1));

        let (encoded, rank) = line.split_once(' ').ok_or_else(malformed)?;
        let rank: usize = rank.trim().parse().map_err(|_| malformed())?;
        let span = STANDARD
            .decode(encoded)
            .map_err(|e| PCError::ModelLoad(format!("line {}: {e}", lineno + 1)))?;

        entries.push((lineno + 1, rank, span));
    }

    // Ranks index `0..entries.len()`.
    let mut ranked: Vec<Option<Vec<u8>>> = vec![None; entries.len()];
    for (lineno, rank, span) in entries {
        let slot = ranked.get_mut(rank).ok_or_else(|| {
            PCError::ModelLoad(format!("line {lineno}: rank {rank} out of range"))
        })?;
        if slot.replace(span).is_some() {
            return Err(PCError::ModelLoad(format!(
                "line {lineno}: duplicate rank {rank}"
            )));
        }
    }

    // In range and distinct, so every slot is filled.
    Ok(ranked.into_iter().flatten().collect())
}

/// Save span tokens, in rank order, to a base64 rank file.
pub fn save_base64_span_vocab_path<P: AsRef<Path>>(
    spans: &[Vec<u8>],
    path: P,
) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_base64_span_vocab(spans, &mut writer)?;
    writer.flush()
}

/// Write span tokens, in rank order, as base64 rank lines.
pub fn write_base64_span_vocab<W: Write>(
    spans: &[Vec<u8>],
    writer: &mut W,
) -> std::io::Result<()> {
    for (rank, span) in spans.iter().enumerate() {
        writeln!(writer, "{} {}", STANDARD.encode(span), rank)?;
    }
    Ok(())
}
