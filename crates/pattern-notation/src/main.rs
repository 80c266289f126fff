use anyhow::Result;
use clap::{Parser, Subcommand};
use pattern_core::{Fraction, State, TimeSpan};
use pattern_notation::{evaluate, format, parse};

#[derive(Parser)]
#[command(name = "pattern-notation")]
#[command(about = "Mini notation parser and validator for the pattern algebra engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a mini notation pattern
    Validate {
        /// Pattern to validate
        pattern: String,
    },
    /// Format a mini notation pattern back to canonical notation
    Fmt {
        /// Pattern to format
        pattern: String,
    },
    /// Print the AST for a pattern
    Ast {
        /// Pattern to parse
        pattern: String,

        /// Output format (json or debug)
        #[arg(short, long, default_value = "debug")]
        output_format: String,
    },
    /// Evaluate a pattern and show the events for a query window
    Eval {
        /// Pattern to evaluate
        pattern: String,

        /// Start cycle (default: 0)
        #[arg(short, long, default_value = "0")]
        from: f64,

        /// Duration in cycles (default: 1)
        #[arg(short, long, default_value = "1")]
        duration: f64,

        /// Output format (json or debug)
        #[arg(long, default_value = "debug")]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { pattern } => match parse(&pattern) {
            Ok(_) => {
                println!("✓ Pattern is valid");
                Ok(())
            }
            Err(e) => {
                eprintln!("✗ Parse error: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Fmt { pattern } => match parse(&pattern) {
            Ok(ast) => {
                println!("{}", format(&ast));
                Ok(())
            }
            Err(e) => {
                eprintln!("✗ Parse error: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Ast {
            pattern,
            output_format,
        } => match parse(&pattern) {
            Ok(ast) => {
                match output_format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&ast)?),
                    _ => println!("{:#?}", ast),
                }
                Ok(())
            }
            Err(e) => {
                eprintln!("✗ Parse error: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Eval {
            pattern,
            from,
            duration,
            format,
        } => match parse(&pattern) {
            Ok(ast) => match evaluate(&ast) {
                Ok(pat) => {
                    let begin = Fraction::from_float(from);
                    let end = Fraction::from_float(from + duration);
                    let span = TimeSpan::new(begin, end);
                    let state = State::new(span);

                    let haps = pat.query(state);

                    match format.as_str() {
                        "json" => println!("{}", serde_json::to_string_pretty(&haps)?),
                        _ => {
                            println!("Events: {}", haps.len());
                            for (i, hap) in haps.iter().enumerate() {
                                println!("  [{}] {:?}", i, hap);
                            }
                        }
                    }
                    Ok(())
                }
                Err(e) => {
                    eprintln!("✗ Evaluation error: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("✗ Parse error: {}", e);
                std::process::exit(1);
            }
        },
    }
}
