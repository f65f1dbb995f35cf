//! surveyx CLI - survey CSV to XLSX conversion tool
//!
//! Converts one CSV file or every CSV file below a directory into XLSX
//! workbooks written to an `out` directory next to each input.

use clap::{ArgAction, Parser};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use surveyx::{ConvertObserver, ConvertOptions, Converter, FailurePolicy, FileReport, Warning};
use tracing_subscriber::EnvFilter;

/// Survey CSV to XLSX converter
#[derive(Parser, Debug)]
#[command(
    name = "surveyx",
    author = "iyulab",
    version,
    about = "Convert survey CSV files into XLSX workbooks",
    long_about = "surveyx - Convert survey CSV exports into XLSX workbooks.\n\n\
                  The header row is located by its leading \"ID\" label, column names are\n\
                  realigned with their data, and each workbook is written to an \"out\"\n\
                  directory next to its input."
)]
struct Cli {
    /// Input CSV file
    #[arg(short, long, value_name = "FILE", conflicts_with = "directory")]
    file: Option<PathBuf>,

    /// Input directory, searched recursively for CSV files
    #[arg(short, long, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Input file (default)
    #[arg(value_name = "INPUT")]
    positional_file: Option<PathBuf>,

    /// Stop at the first warning or failed file
    #[arg(long)]
    fail_fast: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// What the command line asked to convert.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    File(PathBuf),
    Directory(PathBuf),
}

impl Cli {
    /// Resolve the input: a directory wins, then the positional file, then `-f`.
    fn input(&self) -> Option<Input> {
        if let Some(dir) = &self.directory {
            return Some(Input::Directory(dir.clone()));
        }
        self.positional_file
            .as_ref()
            .or(self.file.as_ref())
            .map(|path| Input::File(path.clone()))
    }

    fn failure_policy(&self) -> FailurePolicy {
        if self.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::Continue
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => println!("{}", "Program finished successfully.".green()),
        Err(e) => {
            eprintln!("{} {}", "An error occurred:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "error",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let converter = Converter::new(ConvertOptions::new().with_failure_policy(cli.failure_policy()));
    let mut console = Console::default();

    match cli.input() {
        Some(Input::Directory(dir)) => {
            let report = converter.convert_directory(&dir, &mut console)?;

            if report.total() == 0 {
                println!(
                    "{} No CSV files found in {}",
                    "!".yellow().bold(),
                    dir.display()
                );
            } else {
                println!(
                    "{} Converted {} of {} files",
                    if report.is_success() {
                        "✓".green().bold()
                    } else {
                        "!".yellow().bold()
                    },
                    report.converted.len(),
                    report.total()
                );
            }
        }

        Some(Input::File(path)) => {
            console.on_start(&path);
            match converter.convert_file(&path, &mut console) {
                Ok(report) => console.on_converted(&report),
                Err(e) if converter.options().failure_policy == FailurePolicy::FailFast => {
                    console.clear();
                    return Err(e.into());
                }
                Err(e) => console.on_failed(&path, &e),
            }
        }

        None => return Err(surveyx::Error::EmptyPath.into()),
    }

    Ok(())
}

/// Prints pipeline events to the terminal.
#[derive(Default)]
struct Console {
    spinner: Option<ProgressBar>,
}

impl Console {
    fn clear(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    fn print(&self, line: String) {
        match &self.spinner {
            Some(pb) => pb.suspend(|| println!("{}", line)),
            None => println!("{}", line),
        }
    }
}

impl ConvertObserver for Console {
    fn on_start(&mut self, input: &Path) {
        self.clear();
        self.spinner = Some(create_spinner(&format!(
            "Converting {}...",
            input.display()
        )));
    }

    fn on_warning(&mut self, input: &Path, warning: &Warning) {
        self.print(format!(
            "{} {}: {}",
            "!".yellow().bold(),
            input.display(),
            warning
        ));
    }

    fn on_converted(&mut self, report: &FileReport) {
        self.clear();
        println!(
            "{} {} -> {} ({} rows, {} columns)",
            "✓".green().bold(),
            report.input.display(),
            report.output.display(),
            report.rows,
            report.columns
        );
    }

    fn on_failed(&mut self, input: &Path, error: &surveyx::Error) {
        self.clear();
        println!("{} {}: {}", "✗".red().bold(), input.display(), error);
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("surveyx").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_file() {
        let cli = parse(&["survey.csv"]);
        assert_eq!(cli.input(), Some(Input::File(PathBuf::from("survey.csv"))));
    }

    #[test]
    fn test_positional_preferred_over_flag() {
        let cli = parse(&["-f", "flag.csv", "positional.csv"]);
        assert_eq!(
            cli.input(),
            Some(Input::File(PathBuf::from("positional.csv")))
        );
    }

    #[test]
    fn test_file_flag() {
        let cli = parse(&["--file", "flag.csv"]);
        assert_eq!(cli.input(), Some(Input::File(PathBuf::from("flag.csv"))));
    }

    #[test]
    fn test_directory_ignores_positional() {
        let cli = parse(&["-d", "surveys", "positional.csv"]);
        assert_eq!(cli.input(), Some(Input::Directory(PathBuf::from("surveys"))));
    }

    #[test]
    fn test_file_and_directory_conflict() {
        let result = Cli::try_parse_from(["surveyx", "-f", "a.csv", "-d", "dir"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_input() {
        let cli = parse(&[]);
        assert_eq!(cli.input(), None);
        assert_eq!(cli.failure_policy(), FailurePolicy::Continue);
    }

    #[test]
    fn test_flags() {
        let cli = parse(&["--fail-fast", "-vv", "x.csv"]);
        assert_eq!(cli.failure_policy(), FailurePolicy::FailFast);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_run_missing_file_continues() {
        let cli = parse(&["definitely-missing.csv"]);
        assert!(run(cli).is_ok());
    }

    #[test]
    fn test_run_missing_file_fail_fast() {
        let cli = parse(&["--fail-fast", "definitely-missing.csv"]);
        let err = run(cli).unwrap_err();
        assert_eq!(err.to_string(), "File definitely-missing.csv not found.");
    }

    #[test]
    fn test_run_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.csv"), "ID,A,B\n1,2,\n").unwrap();
        std::fs::write(dir.path().join("c.txt"), "ID,A,B\n1,2,\n").unwrap();

        let cli = parse(&["-d", dir.path().to_str().unwrap()]);
        run(cli).unwrap();
        assert!(dir.path().join("out").join("a.xlsx").is_file());
        assert!(!dir.path().join("out").join("c.xlsx").exists());
    }

    #[test]
    fn test_run_missing_directory_continues() {
        let cli = parse(&["-d", "no/such/survey-dir"]);
        assert!(run(cli).is_ok());
    }

    #[test]
    fn test_run_missing_directory_fail_fast() {
        let cli = parse(&["--fail-fast", "-d", "no/such/survey-dir"]);
        let err = run(cli).unwrap_err();
        assert_eq!(err.to_string(), "Not a directory: no/such/survey-dir");
    }

    #[test]
    fn test_run_without_input() {
        let cli = parse(&[]);
        let err = run(cli).unwrap_err();
        assert_eq!(err.to_string(), "File path is empty.");
    }
}
