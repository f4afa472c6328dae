//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `quicknotes_core` linkage without a browser host.
//! - Decode a saved compact note list and print one line per record.
//!
//! Usage: `quicknotes_cli [notes.json]`

use quicknotes_core::{core_version, decode_note_list};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("quicknotes_core version={}", core_version());

    let Some(path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match describe_notes(&path) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn describe_notes(path: &str) -> Result<Vec<String>, String> {
    let raw = std::fs::read_to_string(path).map_err(|err| format!("cannot read `{path}`: {err}"))?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|err| format!("`{path}` is not JSON: {err}"))?;

    let lines = decode_note_list(&value)
        .into_iter()
        .enumerate()
        .map(|(position, decoded)| match decoded {
            Ok(note) => format!(
                "note id={} flags={} size=\"{}\" partial={} tags={}",
                note.id(),
                note.flags(),
                note.human_readable_size(),
                note.is_partial(),
                note.tags().len()
            ),
            Err(err) => format!("malformed position={position} error=\"{err}\""),
        })
        .collect();
    Ok(lines)
}
