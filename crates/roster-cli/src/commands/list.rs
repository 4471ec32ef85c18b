//! List command
//!
//! Usage: roster list [--json] [--db <PATH>]

use super::StoreArgs;
use clap::Args;
use roster_core::model::Snapshot;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Print the list as a JSON array
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

/// Execute list command
pub fn execute(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.store.open()?;
    let people = store.query_all_ordered_by_id_desc()?;
    store.close()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&people)?);
    } else {
        print!("{}", render_snapshot(&people));
    }
    Ok(())
}

/// Plain-text rendering of a snapshot, one person per line
pub fn render_snapshot(people: &Snapshot) -> String {
    if people.is_empty() {
        return "(no people yet)\n".to_string();
    }

    let width = people
        .iter()
        .map(|p| p.id.to_string().len())
        .max()
        .unwrap_or(1);

    people
        .iter()
        .map(|p| {
            format!(
                "{:>width$}  {} {} ({})\n",
                p.id,
                p.first_name,
                p.last_name,
                p.age,
                width = width
            )
        })
        .collect()
}
