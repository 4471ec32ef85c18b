//! Watch command
//!
//! Usage: roster watch [--db <PATH>]
//!
//! Renders the list once, then again after every change, while reading
//! `FIRST LAST AGE` lines from stdin. `quit` or end of input stops.

use super::list::render_snapshot;
use super::StoreArgs;
use clap::Args;
use roster_core::model::Snapshot;
use roster_core::{ExError, NewPerson};
use roster_engine::ViewSync;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

/// Execute watch command
pub fn execute(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.store.open()?;
    let runtime = tokio::runtime::Runtime::new()?;

    let result = runtime.block_on(async {
        let rendered = Arc::new(Notify::new());
        let on_snapshot = {
            let rendered = rendered.clone();
            move |people: Snapshot| {
                println!("--- {} people ---", people.len());
                print!("{}", render_snapshot(&people));
                rendered.notify_one();
            }
        };
        let on_error = {
            let rendered = rendered.clone();
            move |err: ExError| {
                eprintln!("Could not refresh the list: {}", err);
                rendered.notify_one();
            }
        };
        let sync = ViewSync::start_with_errors(&store, on_snapshot, on_error);

        // Show the current list before accepting input
        rendered.notified().await;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "quit" || line == "exit" {
                break;
            }
            match parse_person_line(line) {
                Ok(person) => {
                    let store = store.clone();
                    // insert blocks on durable I/O; keep it off the runtime threads
                    let id = tokio::task::spawn_blocking(move || store.insert(person)).await??;
                    tracing::debug!(person_id = id, "person added from stdin");
                }
                Err(reason) => eprintln!("Ignored '{}': {}", line, reason),
            }
        }

        sync.stop().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    });

    store.close()?;
    result
}

/// Parse `FIRST LAST AGE`
///
/// Only the shape is checked here: the age must be an integer. Any integer
/// value and any non-blank names go through to the store unchanged.
pub fn parse_person_line(line: &str) -> Result<NewPerson, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [first, last, age] = parts.as_slice() else {
        return Err(format!(
            "expected FIRST LAST AGE, got {} field(s)",
            parts.len()
        ));
    };
    let age: i64 = age
        .parse()
        .map_err(|_| format!("age '{}' is not an integer", age))?;
    Ok(NewPerson::new(*first, *last, age))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_line() {
        assert_eq!(
            parse_person_line("Ada Lovelace 36").unwrap(),
            NewPerson::new("Ada", "Lovelace", 36)
        );
    }

    #[test]
    fn test_parse_negative_age() {
        assert_eq!(parse_person_line("  X  Y  -3 ").unwrap().age, -3);
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(parse_person_line("Ada 36").is_err());
        assert!(parse_person_line("Ada Lovelace thirty").is_err());
        assert!(parse_person_line("Ada King Lovelace 36").is_err());
    }
}
