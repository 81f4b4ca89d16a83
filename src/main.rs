use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use semver_tags::cli::run_tagging_workflow;
use semver_tags::config::{self, ConfigOverrides};
use semver_tags::git::Git2Repository;
use semver_tags::output::{GithubActionSink, JsonSink, OutputSink};
use semver_tags::ui;

#[derive(clap::Parser)]
#[command(
    name = "semver-tags",
    version,
    about = "Compute the next semantic version from conventional commits and tag it"
)]
struct Args {
    #[arg(short, long, env = "SEMVER_TAGS_CONFIG", help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        long,
        env = "SEMVER_TAGS_DRY_RUN",
        num_args = 0..=1,
        default_missing_value = "true",
        help = "Compute versions without creating or pushing tags"
    )]
    dry_run: Option<bool>,

    #[arg(
        long,
        env = "SEMVER_TAGS_GITHUB_ACTION",
        num_args = 0..=1,
        default_missing_value = "true",
        help = "Emit GitHub Actions step outputs"
    )]
    github_action: Option<bool>,

    #[arg(
        long,
        env = "SEMVER_TAGS_OUTPUT_JSON",
        num_args = 0..=1,
        default_missing_value = "true",
        help = "Print outputs as one JSON line on stdout"
    )]
    output_json: Option<bool>,

    #[arg(
        long,
        env = "SEMVER_TAGS_ATOMIC",
        num_args = 0..=1,
        default_missing_value = "true",
        help = "Push all tags atomically"
    )]
    atomic: Option<bool>,

    #[arg(
        long = "pre-release-string",
        env = "SEMVER_TAGS_PRE_RELEASE_STRING",
        help = "Pre-release track to start or continue, e.g. rc"
    )]
    pre_release_string: Option<String>,

    #[arg(
        long = "build-string",
        env = "SEMVER_TAGS_BUILD_STRING",
        help = "Build metadata appended to new versions"
    )]
    build_string: Option<String>,

    #[arg(short, long, env = "SEMVER_TAGS_REMOTE", help = "Remote to push tags to")]
    remote: Option<String>,

    #[arg(short, long, env = "SEMVER_TAGS_BRANCH", help = "Branch pushed alongside the tags")]
    branch: Option<String>,

    #[arg(
        short,
        long,
        env = "SEMVER_TAGS_DIRECTORIES",
        value_delimiter = ',',
        help = "Package directories to version independently"
    )]
    directories: Option<Vec<String>>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            dry_run: self.dry_run,
            github_action: self.github_action,
            output_json: self.output_json,
            atomic: self.atomic,
            pre_release_string: self.pre_release_string.clone(),
            build_string: self.build_string.clone(),
            remote: self.remote.clone(),
            branch: self.branch.clone(),
            directories: self.directories.clone(),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| {
            std::env::var("LOG_LEVEL")
                .ok()
                .filter(|level| !level.trim().is_empty())
                .and_then(|level| EnvFilter::try_new(level.to_lowercase()).ok())
        })
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .init();
}

fn main() {
    init_tracing();

    if let Err(e) = run(Args::parse()) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref())
        .context("Failed to load configuration")?
        .merge(args.overrides());

    let working_dir = std::env::current_dir().context("Cannot determine working directory")?;
    let workflow_args = config.into_workflow_args(working_dir.clone());

    let repo = Git2Repository::discover(&working_dir)?;

    let mut sinks: Vec<Box<dyn OutputSink>> = Vec::new();
    if workflow_args.github_action {
        sinks.push(Box::new(GithubActionSink::from_env()));
    }
    if workflow_args.output_json {
        sinks.push(Box::new(JsonSink::stdout()));
    }

    let result = run_tagging_workflow(&repo, &workflow_args, &mut sinks)?;
    ui::display_release_summary(&result, workflow_args.dry_run);
    Ok(())
}
