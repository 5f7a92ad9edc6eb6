use std::io::BufRead;

use hints_client::{follow_log_stream, StreamEnd};
use hints_engine::{LogBuffer, LogEntry};
use tokio::sync::watch;

use super::Context;

/// Follow the backend log socket and print entries as they arrive, until
/// Ctrl-C or until reconnecting gives up. With `stdin`, read frames from
/// stdin instead (one JSON object per line) and print the buffered tail.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub(crate) async fn run_logs(ctx: &Context, stdin: bool) -> anyhow::Result<()> {
    if stdin {
        return print_stdin_frames(ctx.config.log_max_lines);
    }

    let url = ctx.config.log_stream_url();
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    println!("following {url} (Ctrl-C to stop)");
    let mut buffer = LogBuffer::new(ctx.config.log_max_lines);
    let end = follow_log_stream(&url, &mut buffer, stop_rx, |entry| {
        println!("{}", format_entry(entry));
    })
    .await;
    match end {
        StreamEnd::Stopped => println!("stopped after {} lines", buffer.len()),
        StreamEnd::GaveUp => println!("log stream unavailable; gave up reconnecting"),
    }
    Ok(())
}

fn print_stdin_frames(max_lines: usize) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let (buffer, skipped) = collect_frames(stdin.lock(), max_lines)?;
    if skipped > 0 {
        tracing::debug!(skipped, "ignored non-JSON frames");
    }
    for entry in buffer.iter() {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

fn format_entry(entry: &LogEntry) -> String {
    let platform = entry
        .platform
        .as_deref()
        .map(|p| format!("[{p}] "))
        .unwrap_or_default();
    format!(
        "{} {:<8}{platform}{}",
        entry.timestamp, entry.level, entry.message
    )
}

fn collect_frames(reader: impl BufRead, max_lines: usize) -> std::io::Result<(LogBuffer, usize)> {
    let mut buffer = LogBuffer::new(max_lines);
    let mut skipped = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match LogEntry::parse_frame(&line) {
            Some(entry) => buffer.push(entry),
            None => skipped += 1,
        }
    }
    Ok((buffer, skipped))
}
