use std::{
    fmt::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use lurebin_core::{
    commit_run, ensure_report_file, fresh_seed, generate_trials_from_file, seeded_rng,
    update_sections, BalanceSummary, GenerationParams, GeneratorConfig, OutputPaths,
    ReportSection, RunMode, RunSnapshot, SnapshotOutcome, TrialLists, TrialType,
    DEFAULT_REPORT_TEMPLATE,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Lure bin table: one `<image id> <bin>` pair per line
    #[arg(long, value_name = "PATH")]
    bins: PathBuf,

    /// Directory receiving the trial lists, report and snapshot
    #[arg(long, default_value = "trials")]
    out_dir: PathBuf,

    /// Generator config (JSON), created with defaults if missing
    #[arg(long, default_value = "trials/config.json")]
    config: PathBuf,

    /// Seed override
    #[arg(long, conflicts_with = "random_seed")]
    seed: Option<u64>,

    /// Draw a fresh seed instead of the configured one
    #[arg(long, default_value_t = false)]
    random_seed: bool,

    /// Number of conditions override
    #[arg(long)]
    num_cond: Option<usize>,

    /// Images per condition override
    #[arg(long)]
    img_per_cond: Option<usize>,

    /// `full` writes the lists, `check` also compares them against snapshot.json
    #[arg(long, short, default_value = "full")]
    mode: RunMode,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = GeneratorConfig::load_or_init(&args.config)?;
    let seed = resolve_seed(&args, &config);
    let params = resolve_params(&args, &config);
    let paths = OutputPaths::prepare(&args.out_dir)?;
    ensure_report_file(&paths.report, DEFAULT_REPORT_TEMPLATE)?;

    println!(
        "generating forced-choice lists from {} in {} mode (seed {})",
        args.bins.display(),
        args.mode.label(),
        seed
    );

    let lists = generate_trials_from_file(&args.bins, &params, &mut seeded_rng(seed))
        .with_context(|| format!("failed to generate trials from {}", args.bins.display()))?;

    let run = RunSnapshot {
        seed,
        params,
        lists,
    };
    let outcome = commit_run(&paths, args.mode, &run)?;
    write_report(&paths.report, &args.bins, seed, &run.params, &run.lists)?;
    println!(
        "wrote {} encoding and {} test trials to {}",
        run.lists.encoding.len(),
        run.lists.test.len(),
        args.out_dir.display()
    );

    match outcome {
        SnapshotOutcome::Skipped => {}
        SnapshotOutcome::Matched => println!("snapshot check passed"),
        SnapshotOutcome::Recorded => {
            println!("saved new snapshot to {}", paths.snapshot.display())
        }
    }

    Ok(())
}

fn resolve_seed(args: &Args, config: &GeneratorConfig) -> u64 {
    if args.random_seed {
        let seed = fresh_seed();
        info!(seed, "drew fresh seed");
        if args.mode == RunMode::Check {
            warn!("a fresh seed will never match a recorded snapshot");
        }
        seed
    } else {
        args.seed.unwrap_or(config.seed)
    }
}

fn resolve_params(args: &Args, config: &GeneratorConfig) -> GenerationParams {
    let mut params = config.params();
    if let Some(num_cond) = args.num_cond {
        params.num_cond = num_cond;
    }
    if let Some(img_per_cond) = args.img_per_cond {
        params.img_per_cond = img_per_cond;
    }
    params
}

fn write_report(
    report_path: &Path,
    bins_path: &Path,
    seed: u64,
    params: &GenerationParams,
    lists: &TrialLists,
) -> Result<()> {
    let sections = [
        ReportSection::new(
            "configuration",
            render_configuration_section(bins_path, seed, params),
        ),
        ReportSection::new("verification", render_balance_section(&lists.balance())),
    ];

    update_sections(report_path, &sections)
}

fn render_configuration_section(bins_path: &Path, seed: u64, params: &GenerationParams) -> String {
    format!(
        "- Bin table: `{}`\n- Seed: {}\n- Conditions: {}\n- Images per condition: {}\n- Filenames: {} digits, `.{}`\n",
        bins_path.display(),
        seed,
        params.num_cond,
        params.img_per_cond,
        params.naming.digits,
        params.naming.extension
    )
}

fn render_balance_section(summary: &BalanceSummary) -> String {
    let mut bins: Vec<i64> = summary
        .trial_types()
        .flat_map(|(_, counts)| counts.keys().copied())
        .collect();
    bins.sort_unstable();
    bins.dedup();

    let mut output = String::new();
    let _ = write!(&mut output, "| Trial type |");
    for bin in &bins {
        let _ = write!(&mut output, " Bin {} |", bin);
    }
    let _ = writeln!(&mut output);
    let _ = writeln!(&mut output, "| --- |{}", " --- |".repeat(bins.len()));

    for trial_type in TrialType::ALL {
        let counts = summary.counts_for(trial_type);
        let _ = write!(&mut output, "| {} |", trial_type);
        for bin in &bins {
            let _ = write!(&mut output, " {} |", counts.get(bin).copied().unwrap_or(0));
        }
        let _ = writeln!(&mut output);
    }

    output
}
