//! Command-line interface for the `rdgen` parser generator.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use rdgen::util::Tracer;
use rdgen::CliError;

#[derive(Parser)]
#[command(name = "rdgen")]
#[command(about = "A parser generator for a superset of EBNF", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a grammar and emit recursive-descent Python parser source.
    Create {
        /// Grammar file to read (stdin when absent).
        #[arg(long)]
        input: Option<PathBuf>,
        /// Where to write the rendered parser (stdout when absent).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Emit `# VERBOSE:` structural comments and trace progress to stderr.
        #[arg(long)]
        verbose: bool,
        /// Run target inference and generate value-returning code.
        #[arg(long)]
        decorate: bool,
    },
    /// Emit a JSON array of randomly generated sentences.
    Examples {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Number of distinct sentences to produce.
        #[arg(long, default_value_t = 1)]
        quantity: usize,
        /// Bound on a partial derivation's expansion depth/minimum length.
        #[arg(long, default_value_t = 100)]
        limit: usize,
        #[arg(long)]
        verbose: bool,
    },
    /// Emit a JSON array of shortest-first enumerated sentences.
    Shortest {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        quantity: usize,
        #[arg(long, default_value_t = 100)]
        limit: usize,
        #[arg(long)]
        verbose: bool,
    },
}

fn read_source(input: &Option<PathBuf>) -> io::Result<String> {
    match input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_output(output: &Option<PathBuf>, text: &str) -> io::Result<()> {
    match output {
        Some(path) => fs::write(path, text),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(text.as_bytes())
        }
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Create { input, output, verbose, decorate } => {
            let tracer = Tracer::new(verbose);
            let source = read_source(&input)?;
            tracer.verbose("parsing grammar");
            if verbose {
                let grammar = rdgen::syntax::parse_spec(&source)?;
                rdgen::grammar::tree::write_productions(&grammar, &mut io::stderr())?;
            }
            let python = rdgen::create(&source, decorate, verbose)?;
            tracer.result("generated parser source");
            write_output(&output, &python)?;
        }
        Commands::Examples { input, output, quantity, limit, verbose } => {
            let tracer = Tracer::new(verbose);
            let source = read_source(&input)?;
            tracer.verbose("parsing grammar");
            let sentences = rdgen::examples(&source, quantity, limit)?;
            tracer.result(&format!("generated {} sentence(s)", sentences.len()));
            let json = serde_json::to_string_pretty(&sentences)?;
            write_output(&output, &json)?;
        }
        Commands::Shortest { input, output, quantity, limit, verbose } => {
            let tracer = Tracer::new(verbose);
            let source = read_source(&input)?;
            tracer.verbose("parsing grammar");
            let sentences = rdgen::shortest(&source, quantity, limit)?;
            tracer.result(&format!("generated {} sentence(s)", sentences.len()));
            let json = serde_json::to_string_pretty(&sentences)?;
            write_output(&output, &json)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
