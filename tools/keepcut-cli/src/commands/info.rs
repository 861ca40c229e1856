//! Show session information.

use std::path::PathBuf;

use super::{load_session, secs};

pub fn run(path: PathBuf, json: bool) -> anyhow::Result<()> {
    let session = load_session(&path)?;
    let model = &session.model;
    let segments = model.compute_keep_segments();

    if json {
        println!("{}", serde_json::to_string_pretty(&segments)?);
        return Ok(());
    }

    println!("Session: {}", path.display());
    if let Some(source) = &session.source {
        println!("  Source: {}", source.display());
    }
    println!("  Created: {}", session.created_at);
    println!("  Modified: {}", session.modified_at);
    println!("  Duration: {}", secs(model.duration()));
    println!(
        "  Trim: {} - {}",
        secs(model.trim().start),
        secs(model.trim().end)
    );
    println!();

    println!("Cuts ({}):", model.cuts().len());
    for cut in model.cuts() {
        println!(
            "  {:<5} {:<8} {} - {}  {}{}",
            cut.id.to_string(),
            cut.kind.as_str(),
            secs(cut.start),
            secs(cut.end),
            if cut.enabled { "on " } else { "off" },
            if cut.label.is_empty() {
                String::new()
            } else {
                format!("  \"{}\"", cut.label)
            }
        );
    }
    println!();

    println!("Keep segments ({}):", segments.len());
    for segment in &segments {
        println!("  {} - {}", secs(segment.start), secs(segment.end));
    }
    println!(
        "  Kept: {}  Removed: {}",
        secs(model.kept_duration()),
        secs(model.removed_duration())
    );

    Ok(())
}
