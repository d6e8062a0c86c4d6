//! Builtin command
//!
//! Usage: failkit builtin [--names]

use clap::Args;
use failkit_core::{default_allocator, RESERVED_CATEGORY};

#[derive(Debug, Args)]
pub struct BuiltinArgs {
    /// Print one `<id> <name>` line per identifier instead of JSON
    #[arg(long)]
    pub names: bool,
}

/// Execute builtin command
pub fn execute(args: BuiltinArgs) -> Result<(), Box<dyn std::error::Error>> {
    let records: Vec<_> = default_allocator()
        .export()
        .into_iter()
        .filter(|r| r.category == RESERVED_CATEGORY)
        .collect();

    if args.names {
        for record in &records {
            println!("{} {}", record.rendered_id, record.name);
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&records)?);
    }
    Ok(())
}
