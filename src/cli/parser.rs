//! CLI argument parsing and structure definitions

use clap::{ArgAction, Parser, Subcommand};

/// C3PA classification evaluation toolkit
#[derive(Parser)]
#[command(name = "c3pa")]
#[command(
    author,
    version,
    about = "Merge, filter, score and compare LLM privacy-policy classification runs",
    long_about = r#"
c3pa - evaluate LLM labels for CCPA/CPRA privacy-policy disclosures

WORKFLOW:
  infer     ask one or more models to label annotated spans
  merge     combine result files, dropping repeated observations
  evaluate  optionally filter conflicting spans, then score each model
  compare   score two runs side by side and print the difference

EXAMPLES:
  c3pa merge --inputs run1.json run2.json --output combined.json
  c3pa evaluate --input combined.json --filter --threshold 0.75
  c3pa compare --input1 before.json --input2 after.json
  c3pa infer --models openai:gpt-4.1-mini,gemini:gemini-2.0-flash --policies-dir dumps/

Set RUST_LOG (or pass -v) for progress on stderr.
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Combine result files and deduplicate records per model
    #[command(visible_alias = "m")]
    Merge(crate::cli::commands::MergeArgs),

    /// Score two result files and print both reports and their delta
    #[command(visible_alias = "c")]
    Compare(crate::cli::commands::CompareArgs),

    /// Score one result file, optionally filtering conflicting spans first
    #[command(visible_alias = "e")]
    Evaluate(crate::cli::commands::EvaluateArgs),

    /// Run models over sampled policy dumps
    #[command(visible_alias = "i")]
    Infer(crate::cli::commands::InferArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Parse a similarity threshold in `[0, 1]`.
pub fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("threshold must be between 0 and 1, got {}", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("0.75"), Ok(0.75));
        assert_eq!(parse_threshold("1"), Ok(1.0));
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("-0.1").is_err());
        assert!(parse_threshold("high").is_err());
    }

    #[test]
    fn test_original_flag_spellings() {
        let cli = Cli::try_parse_from([
            "c3pa",
            "evaluate",
            "--input",
            "combined.json",
            "--filter",
            "--filtered_output",
            "out",
        ])
        .unwrap();
        match cli.command {
            Commands::Evaluate(args) => {
                assert!(args.filter);
                assert_eq!(args.filtered_output.as_deref(), Some(std::path::Path::new("out")));
                assert_eq!(args.threshold, 0.75);
            }
            _ => panic!("expected evaluate"),
        }
    }
}
