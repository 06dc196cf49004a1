use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use hub_gate::config::loader::load_access_policy;
use hub_gate::http::script;
use hub_gate::proxy::validate_target;
use hub_gate::routing::match_upstream;

#[derive(Parser)]
#[command(name = "hub-gate-cli")]
#[command(about = "Offline checks against the hub-gate URL table and access lists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which upstream shape a URL matches and what it captures
    Match { url: String },
    /// Decide whether the proxy would fetch a URL under an access list
    Check {
        url: String,
        #[arg(short, long, default_value = "config.json")]
        access_list: PathBuf,
    },
    /// Print the diagnostic perl script for a proxy base URL
    Script {
        #[arg(default_value = "http://localhost:5000")]
        base: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Match { url } => match match_upstream(&url) {
            Some(m) => {
                println!("kind:     {:?}", m.kind);
                println!("identity: {}", m.identity().unwrap_or("-"));
                println!("captures: {:?}", m.captures);
                ExitCode::SUCCESS
            }
            None => {
                println!("no upstream shape matches {}", url);
                ExitCode::FAILURE
            }
        },
        Commands::Check { url, access_list } => {
            let policy = match load_access_policy(&access_list) {
                Ok(policy) => policy,
                Err(e) => {
                    eprintln!("failed to load {}: {}", access_list.display(), e);
                    return ExitCode::FAILURE;
                }
            };
            match validate_target(&url, &policy) {
                Ok(target) => {
                    println!("admitted, fetches {}", target);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    println!("refused ({}): {}", e.status(), e);
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Script { base } => {
            println!("{}", script::render(base.trim_end_matches('/')));
            ExitCode::SUCCESS
        }
    }
}
