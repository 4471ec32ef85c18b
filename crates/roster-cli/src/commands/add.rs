//! Add command
//!
//! Usage: roster add <FIRST> <LAST> <AGE> [--db <PATH>]

use super::StoreArgs;
use clap::Args;
use roster_core::NewPerson;

#[derive(Debug, Args)]
pub struct AddArgs {
    pub first_name: String,
    pub last_name: String,
    /// Any integer is accepted, including negatives
    #[arg(allow_negative_numbers = true)]
    pub age: i64,

    #[command(flatten)]
    pub store: StoreArgs,
}

/// Execute add command
pub fn execute(args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.store.open()?;
    let id = store.insert(NewPerson::new(args.first_name, args.last_name, args.age))?;
    store.close()?;

    println!("{}", id);
    Ok(())
}
