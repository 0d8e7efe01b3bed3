// Chat log truncation - Rolls an append-only JSONL log back to its last whole second
use crate::error::AnalyzerError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

const READ_CHUNK: u64 = 64 * 1024;

#[derive(Deserialize)]
struct LogLine {
    time_in_seconds: f64,
}

/// Drops the trailing run of lines that share the last line's whole second.
///
/// Messages of that second may be incomplete after an interrupted download,
/// so the download resumes from the returned second. A log that lies
/// entirely within one second is cleared. Returns `None` for an empty log.
pub fn truncate_to_last_whole_second(buffer: &mut Vec<u8>) -> Result<Option<i64>, AnalyzerError> {
    match whole_second_boundary(buffer, 0)? {
        Some((keep, second)) => {
            buffer.truncate(keep);
            Ok(Some(second))
        }
        None => Ok(None),
    }
}

/// Same as [`truncate_to_last_whole_second`], applied to a file in place.
///
/// Library entry point for the chat downloader: call it on an existing log
/// before appending, and request messages from the returned second onward.
/// The charting binary never writes logs, so it does not call this.
///
/// The file is read backward in chunks until a line from an earlier second
/// is found, so only the tail of a long log is loaded.
pub async fn truncate_log_file(path: &Path) -> Result<Option<i64>> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to open chat log {}", path.display()))?;

    let file_len = file.metadata().await?.len();
    let mut tail: Vec<u8> = Vec::new();
    let mut tail_start = file_len;

    let (keep, second) = loop {
        let read_from = tail_start.saturating_sub(READ_CHUNK);
        let mut chunk = vec![0u8; (tail_start - read_from) as usize];
        file.seek(SeekFrom::Start(read_from)).await?;
        file.read_exact(&mut chunk).await?;
        chunk.extend_from_slice(&tail);
        tail = chunk;
        tail_start = read_from;

        if tail_start == 0 {
            match whole_second_boundary(&tail, 0)? {
                Some(found) => break found,
                None => return Ok(None),
            }
        }

        // The first line of a mid-file chunk may be cut short; skip it.
        let Some(newline) = tail.iter().position(|&b| b == b'\n') else {
            continue;
        };
        let lines_start = newline + 1;
        let base = tail_start as usize + lines_start;

        match whole_second_boundary(&tail[lines_start..], base)? {
            Some((keep, second)) if keep > 0 => break (base + keep, second),
            _ => continue,
        }
    };

    let keep = keep as u64;
    if keep < file_len {
        file.set_len(keep).await?;
        tracing::info!(
            "Truncated chat log {} from {} to {} bytes, resuming at {}s",
            path.display(),
            file_len,
            keep,
            second
        );
    }

    Ok(Some(second))
}

/// Byte length to keep and the last line's whole second.
fn whole_second_boundary(
    buffer: &[u8],
    base_offset: usize,
) -> Result<Option<(usize, i64)>, AnalyzerError> {
    let end = content_end(buffer, buffer.len());
    if end == 0 {
        return Ok(None);
    }

    let start = line_start(buffer, end);
    let last_second = line_second(&buffer[start..end], base_offset + start)?;

    let mut keep = start;
    while keep > 0 {
        let end = content_end(buffer, keep);
        if end == 0 {
            break;
        }

        let start = line_start(buffer, end);
        if line_second(&buffer[start..end], base_offset + start)? != last_second {
            return Ok(Some((keep, last_second)));
        }
        keep = start;
    }

    // Beginning of the log reached without leaving the last second.
    Ok(Some((0, last_second)))
}

fn content_end(buffer: &[u8], mut end: usize) -> usize {
    while end > 0 && buffer[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    end
}

fn line_start(buffer: &[u8], end: usize) -> usize {
    buffer[..end]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |newline| newline + 1)
}

fn line_second(line: &[u8], offset: usize) -> Result<i64, AnalyzerError> {
    let parsed: LogLine =
        serde_json::from_slice(line).map_err(|e| AnalyzerError::MalformedChatLog {
            offset,
            reason: e.to_string(),
        })?;

    Ok(parsed.time_in_seconds.floor() as i64)
}
