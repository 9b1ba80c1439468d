use anyhow::Context;
use clap::Parser;
use piecewise_sampler::harness::{self, HarnessConfig};
use piecewise_sampler::SeedSequence;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Compare piecewise-linear density samplers
#[derive(Parser)]
#[command(name = "piecewise-bench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file with the number of samples, seed and density profiles
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of samples drawn from each sampler
    #[arg(short = 'n', long)]
    samples: Option<usize>,

    /// Comma separated seed sequence (e.g. 42,42,42)
    #[arg(short, long)]
    seed: Option<SeedSequence>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Level used when `RUST_LOG` is unset
fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(default_level(verbose).into())
                .from_env_lossy(),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => HarnessConfig::from_file(path)
            .with_context(|| format!("Cannot load {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    if let Some(samples) = cli.samples {
        config.samples = samples;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if cli.verbose {
        info!(?config, "Verbose mode enabled");
    }

    for report in harness::run(&config)? {
        println!("-- {} --", report.name);
        println!("   analytic mean {:.6}", report.analytic_mean);

        for variant in &report.variants {
            let ks = variant
                .ks_p_value
                .map_or_else(|| "-".to_string(), |p| format!("{p:.4}"));
            let elapsed = format!("{:.3?}", variant.elapsed);
            println!(
                "> {:<22} mean {:.6}  time {:>10}  KS p-value {}",
                variant.name, variant.mean, elapsed, ks
            );
        }
    }
    Ok(())
}
