//! jparse command-line tool: convert lenient JSON documents to JSON, YAML or
//! TOML, check them, and parse command lines.
//!
//! Usage: jparse [OPTIONS] [FILE|DIR]...
//!
//! Options:
//!   -t, --to <FORMAT>      Output format (json, yaml, toml) [default: json]
//!   -i, --indent <N>       JSON indentation; 0 for compact [default: 4]
//!   -w, --write            Write output next to each input with the format's extension
//!   -o, --output <FILE>    Write output to specified file
//!       --check            Only report whether each input parses
//!   -c, --command <LINE>   Parse one command line and print it as JSON
//!       --shell            Read command lines interactively
//!   -v, --verbose          More logging (repeatable); RUST_LOG overrides
//!   -h, --help             Print help
//!   -V, --version          Print version

use clap::Parser;
use libjparse::{parse_with_filename, to_json, Format, Reader, Value};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info, warn};

mod transcode;

const PROMPT: &str = "[jparse]: ";

#[derive(Parser, Debug)]
#[command(name = "jparse", version)]
#[command(about = "Read lenient JSON documents and jparse command lines")]
struct Args {
    /// Input files or directories; reads stdin when none (or `-`) is given.
    /// Directories contribute their .jp and .json files.
    files: Vec<PathBuf>,

    /// Output format
    #[arg(short = 't', long = "to", default_value = "json", value_parser = parse_format)]
    to: Format,

    /// JSON indentation; 0 for compact output
    #[arg(short, long, default_value_t = 4)]
    indent: usize,

    /// Write output next to each input with the format's extension
    #[arg(short, long, conflicts_with = "output")]
    write: bool,

    /// Write output to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only check that each input parses (exit 0 if all valid, 1 otherwise)
    #[arg(long)]
    check: bool,

    /// Parse one command line and print it as JSON
    #[arg(short = 'c', long = "command", conflicts_with_all = ["files", "shell"])]
    command: Option<String>,

    /// Read command lines from stdin until end of input
    #[arg(long, conflicts_with = "files")]
    shell: bool,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Where one document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    fn name(&self) -> String {
        match self {
            Input::Stdin => "stdin".to_string(),
            Input::File(path) => path.display().to_string(),
        }
    }
}

fn parse_format(s: &str) -> Result<Format, String> {
    Format::from_name(s).ok_or_else(|| format!("Unknown format: {} (expected json, yaml or toml)", s))
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let code = if let Some(line) = &args.command {
        run_command(line, &args)
    } else if args.shell {
        run_shell(&args)
    } else {
        run_files(&args)
    };
    process::exit(code);
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

/// Encode a value in the requested output format.
fn render(value: &Value, format: Format, indent: usize) -> Result<String, String> {
    match format {
        Format::Json => {
            if let Some(what) = value.json_incompatibility() {
                warn!("{} are written as null", what);
            }
            to_json(value, indent).map_err(|e| format!("JSON encode error: {}", e))
        }
        Format::Yaml => transcode::yaml::encode(value),
        Format::Toml => transcode::toml::encode(value),
    }
}

// =============================================================================
// Documents
// =============================================================================

fn run_files(args: &Args) -> i32 {
    let inputs = match collect_inputs(&args.files) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if args.output.is_some() && inputs.len() > 1 {
        eprintln!("Error: --output requires a single input file");
        return 1;
    }

    let mut failed = 0;
    for input in &inputs {
        if let Err(message) = process_input(input, args) {
            eprintln!("{}", message);
            failed += 1;
        }
    }
    info!(inputs = inputs.len(), failed, "done");
    if failed == 0 {
        0
    } else {
        1
    }
}

/// Expand the command-line inputs: `-` is stdin, directories yield their
/// `.jp` and `.json` files in name order.
fn collect_inputs(files: &[PathBuf]) -> Result<Vec<Input>, String> {
    if files.is_empty() {
        return Ok(vec![Input::Stdin]);
    }
    let mut inputs = Vec::new();
    for path in files {
        if path.as_os_str() == "-" {
            inputs.push(Input::Stdin);
        } else if path.is_dir() {
            let entries = fs::read_dir(path)
                .map_err(|e| format!("Error reading directory {}: {}", path.display(), e))?;
            let mut found: Vec<PathBuf> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|p| {
                    p.is_file()
                        && p.extension()
                            .map(|ext| ext == "jp" || ext == "json")
                            .unwrap_or(false)
                })
                .collect();
            found.sort();
            debug!(dir = %path.display(), files = found.len(), "expanded directory");
            inputs.extend(found.into_iter().map(Input::File));
        } else {
            inputs.push(Input::File(path.clone()));
        }
    }
    Ok(inputs)
}

fn process_input(input: &Input, args: &Args) -> Result<(), String> {
    let value = match input {
        Input::File(path) => Reader::new().parse_file(path),
        Input::Stdin => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| format!("Error reading stdin: {}", e))?;
            parse_with_filename(&text, Some("stdin"))
        }
    }
    .map_err(|e| e.report())?;

    if args.check {
        println!("{}: ok", input.name());
        return Ok(());
    }

    let output = render(&value, args.to, args.indent)
        .map_err(|e| format!("Error converting {}: {}", input.name(), e))?;
    write_text_output(&output, args.output.as_deref(), args.write, input, args.to)
}

fn write_text_output(
    output: &str,
    output_file: Option<&Path>,
    write_back: bool,
    input: &Input,
    format: Format,
) -> Result<(), String> {
    if let Some(path) = output_file {
        fs::write(path, with_newline(output))
            .map_err(|e| format!("Error writing {}: {}", path.display(), e))
    } else if write_back {
        let Input::File(input_path) = input else {
            return Err("Error: --write requires an input file".to_string());
        };
        let output_path = input_path.with_extension(format.extension());
        if &output_path == input_path {
            return Err(format!(
                "Error: --write would overwrite {}",
                input_path.display()
            ));
        }
        fs::write(&output_path, with_newline(output))
            .map_err(|e| format!("Error writing {}: {}", output_path.display(), e))?;
        info!(output = %output_path.display(), "wrote");
        Ok(())
    } else {
        print!("{}", with_newline(output));
        Ok(())
    }
}

/// Ensure output ends with a newline.
fn with_newline(output: &str) -> String {
    if output.ends_with('\n') {
        output.to_string()
    } else {
        format!("{}\n", output)
    }
}

// =============================================================================
// Commands
// =============================================================================

fn run_command(line: &str, args: &Args) -> i32 {
    let reader = Reader::new();
    match reader.parse_command(line) {
        Ok(command) => {
            let value = command.map(|c| c.to_value()).unwrap_or(Value::Null);
            match to_json(&value, args.indent) {
                Ok(json) => {
                    println!("{}", json);
                    0
                }
                Err(e) => {
                    eprintln!("JSON encode error: {}", e);
                    1
                }
            }
        }
        Err(e) => {
            eprintln!("{}", e.report());
            1
        }
    }
}

fn run_shell(args: &Args) -> i32 {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let stderr = io::stderr();
    match shell(stdin.lock(), &mut stdout.lock(), &mut stderr.lock(), args.indent) {
        Ok(errors) => {
            info!(errors, "shell finished");
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Prompt for and parse command lines until end of input. A bad line is
/// reported on `err` and the loop carries on. Returns the number of bad
/// lines.
fn shell<R: BufRead, W: Write, E: Write>(
    input: R,
    out: &mut W,
    err: &mut E,
    indent: usize,
) -> io::Result<usize> {
    let reader = Reader::new().filename(Some("shell"));
    let mut errors = 0;
    write!(out, "{}", PROMPT)?;
    out.flush()?;
    for line in input.lines() {
        let line = line?;
        match reader.parse_command(&line) {
            Ok(Some(command)) => {
                let json = to_json(&command.to_value(), indent)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                writeln!(out, "{}", json)?;
            }
            Ok(None) => {}
            Err(e) => {
                errors += 1;
                writeln!(err, "{}", e.report())?;
            }
        }
        write!(out, "{}", PROMPT)?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(errors)
}
