// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

/// colmask command-line entry point and CLI orchestration.
///
/// The binary takes a delimited extract without a column header, fakes the
/// configured columns in its leading rows and writes the result alongside.
/// This file only wires user input into the profile loader and the masking
/// engine under `src/masking`.
mod error;
mod logging;
mod masking;
mod profile;

use anyhow::{Context, Result, anyhow};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use masking::{
    DEFAULT_DELIMITER, MalformedRowPolicy, MaskOptions, MaskingEngine, RecordTarget, SentinelMode,
    StrategyRegistry, parse_delimiter,
};
use profile::MaskProfile;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Build-time version information. CI bakes in the most recent tag via
/// `COLMASK_VERSION`; otherwise Cargo's package version is used.
const VERSION: &str = match option_env!("COLMASK_VERSION") {
    Some(tag) => tag,
    None => env!("CARGO_PKG_VERSION"),
};

fn branch() -> &'static str {
    option_env!("COLMASK_BRANCH").unwrap_or("main")
}

fn sha() -> &'static str {
    option_env!("COLMASK_COMMIT").unwrap_or("0000000")
}

fn git_url() -> &'static str {
    option_env!("COLMASK_GIT_URL").unwrap_or("https://github.com/stephenlclarke/colmask.git")
}

fn rust_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Human-friendly version banner including branch and commit.
fn version_string() -> String {
    format!(
        "colmask {VERSION} (branch:{}, commit:{}) [rust:{}]",
        branch(),
        sha(),
        rust_version()
    )
}

/// Cached version string with a 'static lifetime for clap metadata.
fn version_str() -> &'static str {
    static VERSION_STR: OnceLock<String> = OnceLock::new();
    VERSION_STR.get_or_init(version_string).as_str()
}

fn main() {
    std::process::exit(match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    });
}

fn run() -> Result<i32> {
    println!("{}", version_string());

    let cmd = build_cli();
    let matches = match cmd.try_get_matches() {
        Ok(m) => m,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                if err.kind() == ErrorKind::DisplayHelp {
                    print_usage();
                }
                return Ok(0);
            }
            _ => err.exit(),
        },
    };

    let opts = CliOptions::from_matches(&matches)?;

    if opts.show_version {
        print_git_clone();
        return Ok(0);
    }

    logging::init_logging(opts.verbose, opts.quiet)?;

    let profile = MaskProfile::load(opts.profile.as_deref()).context("failed to load profile")?;
    let registry = StrategyRegistry::builtin();

    if opts.info {
        print_profile_info(&profile, &registry, opts.profile.as_deref());
        return Ok(0);
    }

    let Some(job) = opts.job else {
        print_usage();
        return Err(anyhow!(
            "missing arguments: IGNORE_LINES NUM_RECORDS INPUT_FILE OUTPUT_FILE are required"
        ));
    };

    let delimiter = opts
        .delimiter
        .or(profile.delimiter)
        .unwrap_or(DEFAULT_DELIMITER);
    let options = MaskOptions {
        target: job.target,
        sentinels: job.sentinels,
        header_present: job.header_present,
        delimiter,
        malformed: opts.malformed,
        consistent: opts.consistent,
    };
    debug!(
        sentinels = options.sentinels.code(),
        target = ?options.target,
        delimiter = ?options.delimiter,
        consistent = options.consistent,
        "masking options resolved"
    );

    let mut rng = match opts.seed {
        Some(seed) => {
            info!(seed, "using seeded random generator");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };

    let engine = MaskingEngine::new(&profile, &registry).context("profile rejected")?;
    let summary = engine
        .mask_file(&job.input, &job.output, &options, &mut rng)
        .with_context(|| format!("failed to mask {}", job.input.display()))?;

    summary.render(&mut io::stdout().lock())?;

    if let Some(report) = &opts.report {
        let xml = summary.to_xml()?;
        fs::write(report, xml)
            .with_context(|| format!("failed to write report {}", report.display()))?;
        info!(report = %report.display(), "wrote run report");
    }

    Ok(0)
}

/// Construct the `clap` command. The positionals are optional at parse time
/// so `--info` and `--version` work on their own; `CliOptions` enforces them.
fn build_cli() -> Command {
    let cmd = Command::new("colmask")
        .about("Mask sensitive columns in header-less delimited extracts")
        .disable_version_flag(true)
        .version(version_str())
        .arg(
            Arg::new("ignore_lines")
                .value_name("IGNORE_LINES")
                .help("NF, NL, NFL or NONE: sentinel lines to keep verbatim"),
        )
        .arg(
            Arg::new("num_records")
                .value_name("NUM_RECORDS")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64))
                .help("Leading rows to mask (-1 = all, 0 = none)"),
        )
        .arg(Arg::new("input").value_name("INPUT_FILE").help("File to mask"))
        .arg(
            Arg::new("output")
                .value_name("OUTPUT_FILE")
                .help("Where to write the masked file"),
        )
        .arg(
            Arg::new("header_present")
                .value_name("HEADER_PRESENT")
                .help("Any non-empty value enables masking"),
        );

    add_flag_args(
        cmd,
        &[
            ("consistent", "Mask repeated values the same way within a file"),
            ("info", "Show the active masking profile and exit"),
        ],
    )
    .arg(
        Arg::new("profile")
            .long("profile")
            .value_name("FILE")
            .help("XML masking profile (default: built-in profile)"),
    )
    .arg(
        Arg::new("delimiter")
            .long("delimiter")
            .value_name("CHAR")
            .help("Field delimiter: literal char, PIPE, TAB, COMMA or hex like 0x1f"),
    )
    .arg(
        Arg::new("seed")
            .long("seed")
            .value_name("N")
            .value_parser(clap::value_parser!(u64))
            .help("Seed the random generator for reproducible output"),
    )
    .arg(
        Arg::new("on_malformed")
            .long("on-malformed")
            .value_name("error|pass")
            .default_value("error")
            .help("Rows with too few fields: abort (error) or leave unmasked (pass)"),
    )
    .arg(
        Arg::new("report")
            .long("report")
            .value_name("FILE")
            .help("Write an XML run summary"),
    )
    .arg(
        Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::Count)
            .help("Increase log detail (-v debug, -vv trace)"),
    )
    .arg(
        Arg::new("quiet")
            .short('q')
            .long("quiet")
            .action(ArgAction::SetTrue)
            .help("Only log errors"),
    )
    .arg(
        Arg::new("version")
            .long("version")
            .action(ArgAction::SetTrue)
            .help("Print version information and exit"),
    )
}

/// Add a set of boolean flag arguments that simply flip a boolean when present.
fn add_flag_args(cmd: Command, flags: &[(&'static str, &'static str)]) -> Command {
    let mut out = cmd;
    for (name, help) in flags {
        out = out.arg(
            Arg::new(*name)
                .long(*name)
                .action(ArgAction::SetTrue)
                .help(*help),
        );
    }
    out
}

/// The positional half of the command line: one masking job.
#[derive(Debug)]
struct MaskJob {
    sentinels: SentinelMode,
    target: RecordTarget,
    input: PathBuf,
    output: PathBuf,
    header_present: bool,
}

/// Structured view of the CLI flags so downstream code gets type-safe access
/// to user intent.
#[derive(Debug)]
struct CliOptions {
    job: Option<MaskJob>,
    profile: Option<String>,
    delimiter: Option<char>,
    seed: Option<u64>,
    consistent: bool,
    malformed: MalformedRowPolicy,
    report: Option<PathBuf>,
    info: bool,
    verbose: u8,
    quiet: bool,
    show_version: bool,
}

impl CliOptions {
    /// Translate clap's `ArgMatches` into `CliOptions`, validating values
    /// clap cannot check on its own.
    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let delimiter = matches
            .get_one::<String>("delimiter")
            .map(|raw| parse_delimiter(raw))
            .transpose()?;
        let malformed = MalformedRowPolicy::parse(
            matches
                .get_one::<String>("on_malformed")
                .map(String::as_str)
                .unwrap_or("error"),
        )?;

        Ok(Self {
            job: extract_job(matches)?,
            profile: matches.get_one::<String>("profile").cloned(),
            delimiter,
            seed: matches.get_one::<u64>("seed").copied(),
            consistent: matches.get_flag("consistent"),
            malformed,
            report: matches.get_one::<String>("report").map(PathBuf::from),
            info: matches.get_flag("info"),
            verbose: matches.get_count("verbose"),
            quiet: matches.get_flag("quiet"),
            show_version: matches.get_flag("version"),
        })
    }
}

/// Collect the positionals. All four required ones must be present
/// together; none at all is fine for the informational modes.
fn extract_job(matches: &ArgMatches) -> Result<Option<MaskJob>> {
    let ignore = matches.get_one::<String>("ignore_lines");
    let count = matches.get_one::<i64>("num_records");
    let input = matches.get_one::<String>("input");
    let output = matches.get_one::<String>("output");

    let (ignore, count, input, output) = match (ignore, count, input, output) {
        (None, None, None, None) => return Ok(None),
        (Some(i), Some(c), Some(inp), Some(out)) => (i, *c, inp, out),
        _ => {
            print_usage();
            return Err(anyhow!(
                "IGNORE_LINES NUM_RECORDS INPUT_FILE OUTPUT_FILE must all be given"
            ));
        }
    };

    let header_present = matches
        .get_one::<String>("header_present")
        .is_some_and(|v| !v.is_empty());

    Ok(Some(MaskJob {
        sentinels: SentinelMode::parse(ignore)?,
        target: RecordTarget::from_count(count)?,
        input: PathBuf::from(input),
        output: PathBuf::from(output),
        header_present,
    }))
}

/// Print the active profile one field position per row. Positions without
/// a column entry are copied through untouched.
fn print_profile_info(profile: &MaskProfile, registry: &StrategyRegistry, source: Option<&str>) {
    println!("Profile: {}", source.unwrap_or("built-in"));
    println!(
        "Delimiter: {:?}",
        profile.delimiter.unwrap_or(DEFAULT_DELIMITER)
    );
    println!(
        "Dates: {} .. {}   Timestamps: {} .. {}",
        profile.dates.start, profile.dates.end, profile.timestamps.start, profile.timestamps.end
    );
    println!(
        "\n  {:>4} {:<20} {:<10} {:>8} Strategy",
        "Pos", "Column", "Type", "Length"
    );
    for position in 0..profile.required_fields() {
        match profile.column_at(position) {
            Some(column) => println!(
                "  {:>4} {:<20} {:<10} {:>8} {}",
                position,
                column.name,
                column.data_type.to_string(),
                column
                    .length
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "-".to_string()),
                registry.resolve(&column.name).name()
            ),
            None => println!("  {:>4} {:<20} {:<10} {:>8} unmasked", position, "-", "-", "-"),
        }
    }
    println!();
}

fn print_git_clone() {
    println!("  git clone {}", git_url());
}

/// Print the condensed usage guide.
fn print_usage() {
    static USAGE: &str = include_str!("../resources/messages/usage_en.txt");
    println!("\n{USAGE}");
}
