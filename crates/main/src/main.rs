use std::error::Error;
use std::path::PathBuf;

use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};

use rekap::sources::{load_remote_sections, local_sections, CommitSource, GitCli, RemoteFilter};
use rekap::{Mode, ReportRequest, TargetMonth};

/// Generates a monthly activity report (rekap) as PDF.
///
/// Fonts are looked up in `assets/fonts` next to the binary or in the
/// directory named by `REKAP_FONTS_DIR`; `--font` uses one file instead.
/// Logging is controlled through `REKAP_LOG` (default `warn`).
#[derive(Parser)]
#[command(author, version, about = "Monthly activity report generator")]
struct Cli {
    /// Directory the PDF is written to.
    #[arg(short, long, global = true, default_value = ".")]
    output: PathBuf,

    /// TrueType font file used for every text style.
    #[arg(short, long, global = true)]
    font: Option<PathBuf>,

    /// Report month (1-12); defaults to the previous month.
    #[arg(short, long, global = true, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// Report year; defaults to the current year.
    #[arg(short, long, global = true)]
    year: Option<i32>,

    /// Comma-separated YYYY-MM-DD dates not worked.
    #[arg(long, global = true, value_delimiter = ',')]
    days_off: Vec<NaiveDate>,

    /// Comma-separated YYYY-MM-DD dates worked; replaces the weekday rule.
    #[arg(long, global = true, value_delimiter = ',')]
    days_on: Vec<NaiveDate>,

    /// Custom report title.
    #[arg(long, global = true)]
    title: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report pull requests and tickets from a pre-fetched JSON document.
    Remote {
        /// Project the items belong to, as OWNER/REPO.
        #[arg(long)]
        project: String,

        /// Contributor name shown in the title and file name.
        #[arg(long)]
        contributor: String,

        /// GitHub login whose items are kept; defaults to `--contributor`.
        #[arg(long)]
        login: Option<String>,

        /// JSON document with `pull_requests` and `issues` arrays.
        #[arg(long)]
        input: PathBuf,
    },

    /// Report commits of an author in one or two local repositories.
    Local {
        /// Author e-mail address as recorded in the commits.
        #[arg(long)]
        author: String,

        /// Repository to read.
        repository: PathBuf,

        /// Optional second repository, shown in the right column.
        second_repository: Option<PathBuf>,
    },
}

fn target_month(month: Option<u32>, year: Option<i32>) -> Result<TargetMonth, String> {
    let today = Local::now().date_naive();
    let Some(month) = month else {
        let previous = TargetMonth::previous(today);
        return Ok(match year {
            Some(year) => TargetMonth::new(year, previous.month()).unwrap_or(previous),
            None => previous,
        });
    };
    let year = year.unwrap_or_else(|| today.year());
    TargetMonth::new(year, month).ok_or_else(|| format!("invalid month {month}/{year}"))
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let month = target_month(cli.month, cli.year)?;

    let request = match cli.command {
        Commands::Remote {
            project,
            contributor,
            login,
            input,
        } => {
            let filter = RemoteFilter::new(month, login.unwrap_or_else(|| contributor.clone()));
            let [pulls, tickets] = load_remote_sections(&input, &filter)?;
            ReportRequest::new(month, project, contributor, Mode::Remote)
                .with_sections(pulls, tickets)
        }
        Commands::Local {
            author,
            repository,
            second_repository,
        } => {
            let primary = GitCli::new(repository);
            let secondary = second_repository.map(GitCli::new);
            let [left, right] = local_sections(&author, month, &primary, secondary.as_ref())?;
            let subject = match &secondary {
                Some(secondary) => format!(
                    "{}+{}",
                    primary.repository_name(),
                    secondary.repository_name()
                ),
                None => primary.repository_name(),
            };
            ReportRequest::new(month, subject, primary.author_name(&author), Mode::Local)
                .with_sections(left, right)
        }
    };

    let request = request
        .with_work_days(cli.days_on)
        .with_days_off(cli.days_off)
        .with_font_path(cli.font)
        .with_output_dir(cli.output)
        .with_title(cli.title);

    info!(
        "generating {} report for {} on {}",
        month.name(),
        request.contributor(),
        request.subject()
    );
    let report = rekap::generate(&request)?;
    report.write_to(request.output_dir())?;
    println!("{}", report.confirmation());
    Ok(())
}

fn main() {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Warn)
        .parse_env(env_logger::Env::default().filter_or("REKAP_LOG", "warn"))
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
