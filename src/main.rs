// Scopetrace: step-through binding table and scope stack visualizer

mod bindings;
mod evaluator;
mod lexer;
mod render;
mod trace;
mod ui;

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use evaluator::Evaluator;
use ui::App;

fn print_usage(program_name: &str) {
    eprintln!("Usage: {} [--plain] [file.c]", program_name);
    eprintln!();
    eprintln!("Examples:");
    eprintln!(
        "  {} demos/showcase.c          # Step through the trace in the TUI",
        program_name
    );
    eprintln!(
        "  {} --plain demos/showcase.c  # Print the full trace as text",
        program_name
    );
    eprintln!(
        "  cat demos/showcase.c | {}    # Read from stdin (always plain)",
        program_name
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("scopetrace");

    let mut plain = false;
    let mut file: Option<String> = None;
    for arg in &args[1..] {
        match arg.as_str() {
            "--plain" => plain = true,
            "--help" | "-h" => {
                print_usage(program_name);
                return Ok(());
            }
            _ if arg.starts_with('-') => {
                eprintln!("Error: Unknown option '{}'", arg);
                eprintln!();
                print_usage(program_name);
                std::process::exit(1);
            }
            _ => {
                if file.is_some() {
                    eprintln!("Error: More than one input file given");
                    eprintln!();
                    print_usage(program_name);
                    std::process::exit(1);
                }
                file = Some(arg.clone());
            }
        }
    }

    let source = match &file {
        Some(path) => {
            if !Path::new(path).exists() {
                eprintln!("Error: File '{}' not found", path);
                eprintln!();
                print_usage(program_name);
                std::process::exit(1);
            }
            fs::read_to_string(path)?
        }
        None => {
            if io::stdin().is_terminal() {
                eprintln!("Error: No input file provided and stdin is a terminal");
                eprintln!();
                print_usage(program_name);
                std::process::exit(1);
            }
            // Piped input cannot share the terminal with the TUI
            plain = true;
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let mut evaluator = match Evaluator::new(&source) {
        Ok(evaluator) => evaluator,
        Err(e) => {
            eprintln!("Lex error: {}", e);
            std::process::exit(1);
        }
    };

    let fatal = evaluator.run().err();
    if let Some(e) = &fatal {
        eprintln!("Fatal: {}", e);
    }

    let mut diagnostics: Vec<String> = evaluator.diagnostics().to_vec();
    let (trace, _) = evaluator.into_parts();

    if plain {
        for (index, event) in trace.events().iter().enumerate() {
            println!("{}", render::format_event(event, index + 1));
        }
        for diagnostic in &diagnostics {
            eprintln!("{}", diagnostic);
        }
        if !diagnostics.is_empty() || fatal.is_some() {
            std::process::exit(1);
        }
        return Ok(());
    }

    // The alternate screen hides anything written to stderr above, so a
    // fatal error has to ride along in the trace pane's diagnostics.
    if let Some(e) = fatal {
        diagnostics.push(format!("Fatal: {}", e));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(trace, diagnostics, source);
    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
