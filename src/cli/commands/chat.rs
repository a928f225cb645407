//! Interactive question loop.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(top_k: Option<usize>, no_generate: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask { generate: !no_generate }, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let top_k = top_k.unwrap_or(orchestrator.settings().retrieval.top_k);
    let engine = orchestrator.rag_engine(!no_generate)?;

    println!("\n{}", style("Vidsage Chat").bold().cyan());
    println!(
        "{}\n",
        style("Ask about your indexed videos, or type 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        match engine.ask(input, top_k).await {
            Ok(response) => {
                println!(
                    "\n{} {}\n",
                    style("Vidsage:").cyan().bold(),
                    response.format_for_display()
                );
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
