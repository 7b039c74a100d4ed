use std::process;

use clap::Parser;

use interpreter::run::run_interactive;
use interpreter::world::RunStatus;

/// Runs a Pascal-like program, prompting on stdin whenever it reads input.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Trace every executed instruction on stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Print the instruction tree before running.
    #[arg(long)]
    tree: bool,

    file: String,
}

fn main() {
    let args = Args::parse();

    let program = parser::parse_file(&args.file).unwrap_or_else(|error| {
        eprintln!("Failed to read '{}': {}", &args.file, error);
        process::exit(1);
    });

    let tree = match program {
        Ok(tree) => tree,
        Err(errors) => {
            for error in errors {
                eprintln!("{}", error);
            }
            process::exit(1);
        },
    };

    if args.tree {
        print!("{}", tree.dump());
    }

    match run_interactive(tree, args.verbose) {
        Ok(RunStatus::Finished) => println!(),
        Ok(status) => {
            eprintln!("Run {}", status);
            process::exit(2);
        },
        Err(error) => {
            eprintln!("Interpreter error: {}", error);
            process::exit(2);
        },
    }
}
