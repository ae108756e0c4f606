//! # holevm CLI
//!
//! Command-line interface for hole-inference challenges.
//!
//! Usage:
//!   holevm generate [--seed N] [--easy] [--cases N] [--config FILE] [--out FILE]
//!   holevm evaluate --challenge FILE [--submission FILE]
//!   holevm run --challenge FILE --assign "?a=2,?b=3" --input 3,4
//!   holevm demo [--seed N]
//!   holevm schema
//!
//! Examples:
//!   holevm generate --seed 7 --out challenge.json
//!   holevm evaluate --challenge challenge.json --submission reply.txt
//!   echo '<HOLES>?a=1</HOLES>' | holevm evaluate --challenge challenge.json

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use holevm_challenge::submission::parse_block;
use holevm_challenge::{Challenge, ChallengeConfig, HvmEnv};
use holevm_vm::{Assignment, Error, InstructionSchema, Int, Interpreter, StepState};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "holevm")]
#[command(author, version, about = "holevm - infer the hidden constants of a stack-machine program")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug logging and per-step traces for `run`
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only warnings and the command's own output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a challenge and print its prompt
    Generate {
        /// RNG seed (overrides the config file)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Base computation only, no counted loop
        #[arg(long)]
        easy: bool,

        /// Number of test cases
        #[arg(short, long)]
        cases: Option<usize>,

        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Save the challenge (hidden assignment included) as JSON
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Score a reply against a saved challenge
    Evaluate {
        #[arg(long, required = true)]
        challenge: PathBuf,

        /// Reply text file; stdin when omitted
        #[arg(long)]
        submission: Option<PathBuf>,
    },
    /// Run a saved challenge's program once under an assignment
    Run {
        #[arg(long, required = true)]
        challenge: PathBuf,

        /// Comma-separated hole values, e.g. "?a=2,?b=-3"
        #[arg(short, long, required = true)]
        assign: String,

        /// Comma-separated input integers
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
        input: Vec<Int>,
    },
    /// Generate a challenge and answer it twice: correctly, then with one hole perturbed
    Demo {
        #[arg(short, long, default_value = "7")]
        seed: u64,
    },
    /// Show the instruction set
    Schema,
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(
    path: Option<&Path>,
    seed: Option<u64>,
    easy: bool,
    cases: Option<usize>,
) -> anyhow::Result<ChallengeConfig> {
    let mut config = match path {
        Some(p) => ChallengeConfig::from_file(p)?,
        None => ChallengeConfig::default(),
    };
    if seed.is_some() {
        config.seed = seed;
    }
    if easy {
        config.hard = false;
    }
    if let Some(n) = cases {
        config.cases = n;
    }
    Ok(config)
}

async fn generate(config: ChallengeConfig, out: Option<&Path>) -> anyhow::Result<()> {
    let mut env = HvmEnv::new(config)?;
    let challenge = env.generate().await?;

    if let Some(path) = out {
        challenge.save(path)?;
        tracing::info!(path = %path.display(), "saved challenge");
    }
    print!("{}", challenge.prompt);
    Ok(())
}

fn read_submission(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display())),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
            Ok(text)
        }
    }
}

/// Returns the score
fn evaluate(challenge: &Path, submission: Option<&Path>) -> anyhow::Result<f64> {
    let challenge = Challenge::load(challenge)?;
    let text = read_submission(submission)?;

    let evaluation = challenge.evaluate(&text);
    println!("{}", serde_json::to_string_pretty(&evaluation)?);
    Ok(evaluation.score)
}

fn parse_assign(spec: &str) -> anyhow::Result<Assignment> {
    let block = spec.replace(',', "\n");
    let assignment = parse_block(&block).map_err(|rejection| {
        Error::invalid_argument(rejection.to_string()).with_context("flag", "--assign")
    })?;
    Ok(assignment)
}

fn run(challenge: &Path, assign: &str, input: &[Int], verbose: bool) -> anyhow::Result<()> {
    let challenge = Challenge::load(challenge)?;
    let assignment = parse_assign(assign)?;

    let mut interp = Interpreter::new(&challenge.program, &assignment, input);
    loop {
        let ip = interp.ip();
        match interp.step() {
            Ok(state) => {
                if verbose {
                    println!(
                        "  {:4}. {:03}: {:<12} {:?}",
                        interp.steps(),
                        ip,
                        challenge.program.code[ip].to_string(),
                        interp.stack().as_slice()
                    );
                }
                if state == StepState::Halted {
                    break;
                }
            }
            Err(e) => {
                if !interp.printed().is_empty() {
                    println!("{}", interp.printed().join("\n"));
                }
                bail!("execution failed after {} steps: {}", interp.steps(), e);
            }
        }
    }

    println!("{}", interp.printed().join("\n"));
    Ok(())
}

async fn demo(seed: u64, quiet: bool) -> anyhow::Result<()> {
    let mut env = HvmEnv::new(ChallengeConfig { seed: Some(seed), ..ChallengeConfig::default() })?;
    let challenge = env.generate().await?;

    if !quiet {
        println!("{}", challenge.prompt);
        println!("--- Hidden assignment ---\n{}\n", challenge.hidden());
    }

    let correct = challenge.reference_answer();
    let (score, _) = env.evaluate(challenge.clone(), &correct).await;
    println!("{:<22} score {:.1}", "Hidden assignment:", score);

    // shift the first data hole by one inside its domain
    let mut perturbed = challenge.hidden().clone();
    if let Some(hole) = challenge.program.holes.iter().find(|h| !h.domain.is_singleton()) {
        let current = perturbed.resolve(&hole.name)?;
        let shifted = if hole.domain.contains(current + 1) { current + 1 } else { current - 1 };
        perturbed.insert(hole.name.clone(), shifted);
    }
    let lines: Vec<String> = perturbed.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    let reply = format!("<HOLES>\n{}\n</HOLES>", lines.join("\n"));
    let (score, details) = env.evaluate(challenge, &reply).await;
    println!(
        "{:<22} score {:.1} ({}/{} cases)",
        "Perturbed assignment:", score, details.passed, details.total
    );
    Ok(())
}

fn show_schema() {
    print!("{}", InstructionSchema::new().to_reference());
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Generate { seed, easy, cases, config, out } => {
            match load_config(config.as_deref(), seed, easy, cases) {
                Ok(config) => generate(config, out.as_deref()).await,
                Err(e) => Err(e),
            }
        }
        Commands::Evaluate { challenge, submission } => {
            match evaluate(&challenge, submission.as_deref()) {
                Ok(score) if score >= 1.0 => Ok(()),
                Ok(_) => std::process::exit(2),
                Err(e) => Err(e),
            }
        }
        Commands::Run { challenge, assign, input } => run(&challenge, &assign, &input, cli.verbose),
        Commands::Demo { seed } => demo(seed, cli.quiet).await,
        Commands::Schema => {
            show_schema();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holevm_vm::ErrorKind;

    #[test]
    fn test_parse_assign() {
        let assignment = parse_assign("?a=2,?b=-3").unwrap();
        assert_eq!(assignment.to_string(), "?a=2, ?b=-3");

        let err = parse_assign("?a=2,?b:3").unwrap_err();
        let err = err.downcast_ref::<Error>().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
