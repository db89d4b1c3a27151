use clap::Parser;
use kintree::graph::PersonIndex;
use kintree::kinship::{self, QueryResult};
use kintree::Dataset;
use std::path::PathBuf;

/// Standalone kinship query tool
#[derive(Parser, Debug)]
#[command(name = "kintree-relate")]
#[command(version)]
#[command(about = "Answer \"how are these two people related?\"", long_about = None)]
struct Args {
    /// Input JSON file with people and relationships (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Id of the first person
    #[arg(value_name = "PERSON_A")]
    person_a: String,

    /// Id of the second person
    #[arg(value_name = "PERSON_B")]
    person_b: String,

    /// Also print the connecting path, one person per line
    #[arg(short, long)]
    path: bool,
}

fn main() -> Result<(), String> {
    let args = Args::parse();

    let raw = if args.input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(&args.input)
            .map_err(|e| format!("Failed to read input file: {}", e))?
    };
    let dataset: Dataset =
        serde_json::from_str(&raw).map_err(|e| format!("Failed to parse input JSON: {}", e))?;
    let index = PersonIndex::build(&dataset);

    for id in [&args.person_a, &args.person_b] {
        if !index.contains(id) {
            return Err(format!("Unknown person id: {}", id));
        }
    }

    match kinship::query(&index, &args.person_a, &args.person_b) {
        QueryResult::Related { path, label, .. } => {
            println!("{}", label);
            if args.path {
                for id in &path {
                    let name = index
                        .person(id)
                        .map(|p| p.display_name())
                        .unwrap_or_else(|| id.clone());
                    println!("  {} ({})", name, id);
                }
            }
            Ok(())
        }
        QueryResult::NoPath { message, .. } => {
            println!("{}", message);
            Ok(())
        }
    }
}
