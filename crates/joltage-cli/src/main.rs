use clap::{Parser, Subcommand};
use joltage_solver::{BranchAndBound, LpProblem, Solver};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "joltage")]
#[command(about = "Fewest button presses for factory machines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Abort solving after this many milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    /// Give up after solving this many branch-and-bound relaxations
    #[arg(long, global = true)]
    max_nodes: Option<usize>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a machine file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
    /// Total fewest presses to configure every machine's indicator lights
    Lights {
        /// The machine file
        file: PathBuf,
    },
    /// Total fewest presses to reach every machine's joltage targets
    Joltage {
        /// The machine file
        file: PathBuf,
    },
    /// Solve a linear program given as JSON
    Solve {
        /// The JSON problem file
        file: PathBuf,
        /// Require integer variable values
        #[arg(short, long)]
        integer: bool,
    },
}

fn read_source(file: &Path) -> String {
    match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse_machines(file: &Path) -> joltage_machine::Program {
    let source = read_source(file);
    match joltage_machine::Parser::parse(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut solver = Solver::new();
    if let Some(ms) = cli.timeout_ms {
        solver = solver.with_deadline(Instant::now() + Duration::from_millis(ms));
    }

    let mut search = BranchAndBound::new(solver.clone());
    if let Some(max) = cli.max_nodes {
        search = search.with_max_nodes(max);
    }

    match cli.command {
        Commands::Check { file } => {
            let source = read_source(&file);
            match joltage_machine::Parser::parse(&source) {
                Ok(program) => {
                    let buttons: usize = program.machines.iter().map(|m| m.buttons.len()).sum();
                    println!("✓ {} is valid", file.display());
                    println!("  {} machines", program.machines.len());
                    println!("  {} buttons", buttons);
                }
                Err(e) => {
                    eprintln!("✗ {} has errors:", file.display());
                    eprintln!("  {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Lights { file } => {
            let program = parse_machines(&file);
            match program.total_light_presses() {
                Ok(total) => println!("{}", total),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Joltage { file } => {
            let program = parse_machines(&file);
            match program.total_joltage_presses(&search) {
                Ok(total) => println!("{}", total),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Solve { file, integer } => {
            let source = read_source(&file);
            let problem: LpProblem = match serde_json::from_str(&source) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Invalid problem: {}", e);
                    std::process::exit(1);
                }
            };

            let result = if integer {
                search
                    .find_integer_optimum(&problem)
                    .map(|s| (s.values, s.objective_value))
            } else {
                solver.solve(&problem).map(|s| {
                    let objective = s.objective_value(&problem.objective);
                    (s.values(problem.num_variables()), objective)
                })
            };

            match result {
                Ok((values, objective)) => {
                    println!("Status: OPTIMAL");
                    println!("Objective: {}", objective);
                    println!();
                    for (name, value) in problem.variables.iter().zip(&values) {
                        println!("  {:20} {:12.4}", name, value);
                    }
                }
                Err(e) => {
                    println!("Status: FAILED");
                    println!("{}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
