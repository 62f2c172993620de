use crate::demo::Employee;
use crate::options::DEFAULT_MAX_DEPTH;
use crate::{Decoder, DecoderOptions, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::fs::File;
use std::io::{self, BufReader, Write};

pub struct Cli;

impl Cli {
    pub fn build_command() -> Command {
        Command::new("xmldecode")
            .about("Decodes an employee record from XML and reports what went wrong")
            .long_about("Decodes an employee record from XML and reports what went wrong.\n\nThe decoded record is printed to stdout; warnings and errors go to stderr as 'uri:line.column: Severity: message'. Input can be '-' to use stdin. The exit status is 1 when any error was logged.")
            .arg(
                Arg::new("strict")
                    .long("strict")
                    .help("Treat unknown elements as errors instead of skipping them")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("max-depth")
                    .long("max-depth")
                    .help("Deepest element nesting accepted")
                    .value_parser(clap::value_parser!(usize))
                    .default_value("32"),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase log verbosity (-v, -vv)")
                    .action(ArgAction::Count),
            )
            .arg(
                Arg::new("input")
                    .help("Input file path (use '-' for stdin)")
                    .required(true)
                    .index(1),
            )
    }

    /// Log filter matching the number of `-v` flags
    pub fn log_level(matches: &ArgMatches) -> &'static str {
        match matches.get_count("verbose") {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn run() -> Result<i32> {
        let matches = Self::build_command().get_matches();
        Self::run_with_matches(matches)
    }

    pub fn run_with_matches(matches: ArgMatches) -> Result<i32> {
        let stdout = io::stdout();
        Self::run_to(&matches, &mut stdout.lock())
    }

    /// Decode the input named in `matches` and print the record to `out`.
    ///
    /// Returns the process exit status.
    pub fn run_to<W: Write>(matches: &ArgMatches, out: &mut W) -> Result<i32> {
        let input = matches
            .get_one::<String>("input")
            .map(String::as_str)
            .unwrap_or("-");
        let max_depth = matches
            .get_one::<usize>("max-depth")
            .copied()
            .unwrap_or(DEFAULT_MAX_DEPTH);
        let options = DecoderOptions::new()
            .with_skip_unknown_elements(!matches.get_flag("strict"))
            .with_max_depth(max_depth);

        let mut decoder = Decoder::new(options);
        decoder.set_error_stream(io::stderr());
        decoder.set_warning_stream(io::stderr());

        let mut employee = Employee::default();
        let errors = match input {
            "-" => decoder.decode_reader(io::stdin().lock(), &mut employee, Some("STDIN"))?,
            path => {
                let file = File::open(path)?;
                decoder.decode_reader(BufReader::new(file), &mut employee, Some(path))?
            }
        };

        writeln!(out, "{employee}")?;
        let skipped = decoder.num_unknown_elements_skipped();
        if skipped > 0 {
            writeln!(out, "skipped {skipped} unknown element(s)")?;
        }
        Ok(if errors == 0 { 0 } else { 1 })
    }
}
