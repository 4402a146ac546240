//! Moment matrix eigenvalue driver
//!
//! Builds the factorial Hankel moment matrix of a given dimension at a given
//! binary scale, inverts its leading block through LDLᵗ, and reports the
//! reciprocal of an extremal eigenvalue of that block.
//!
//! # Usage
//!
//! ```bash
//! # 40x40 moment matrix at 2048 fractional bits
//! moment 40 2048
//!
//! # Smallest eigenvalue of the leading 5x5 inverse block, printing the block
//! moment 40 2048 --block 5 --mode smallest --print
//! ```

use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moment_linalg::{
    extremal_eigenvalue, format_matrix, moment_init, partial_inverse, DenseSymmetricSolver,
    EigenMode, FormatConfig, Matrix, Orientation, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "moment")]
#[command(version)]
#[command(about = "Extremal eigenvalues of factorial moment matrices in fixed point")]
struct Cli {
    /// Dimension of the moment matrix
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    dim: u64,

    /// Fractional bits of the fixed-point representation
    scale: u32,

    /// Size of the leading inverse block (defaults to MOMENT_BLOCK_DIM or 10)
    #[arg(short, long)]
    block: Option<usize>,

    /// Which eigenvalue of the inverse block to report
    #[arg(short, long, value_enum, default_value = "largest")]
    mode: Mode,

    /// Worker threads (defaults to one per core)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Print the inverse block
    #[arg(long, default_value = "false")]
    print: bool,

    /// Only log warnings and errors
    #[arg(short, long, default_value = "false")]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Smallest,
    Largest,
}

impl From<Mode> for EigenMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Smallest => EigenMode::Smallest,
            Mode::Largest => EigenMode::Largest,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet {
        "moment_cli=warn,moment_linalg=warn"
    } else {
        "moment_cli=info,moment_linalg=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure the worker pool")?;
    }

    let mut config = PipelineConfig::from_env();
    if let Some(block) = cli.block {
        config.block_dim = block;
    }

    let dim = usize::try_from(cli.dim).context("dimension does not fit in memory")?;
    tracing::info!(
        dim,
        scale = cli.scale,
        block = config.block_dim,
        threads = rayon::current_num_threads(),
        "Starting moment pipeline"
    );

    let start = Instant::now();

    let mut matrix = Matrix::new(dim, cli.scale, Orientation::Column)?;
    moment_init(&mut matrix)?;
    tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "Moment matrix ready");

    let result = partial_inverse(&mut matrix, &config)?;

    if cli.print {
        print!("{}", format_matrix(&result.block, &FormatConfig::default()));
    }

    let mode = EigenMode::from(cli.mode);
    let eigenvalue = extremal_eigenvalue(&DenseSymmetricSolver, &result.block, mode)?;
    let label = match mode {
        EigenMode::Smallest => "smallest",
        EigenMode::Largest => "largest",
    };

    // The inverse block of an SPD matrix is SPD
    if eigenvalue <= 0.0 {
        bail!(
            "insufficient precision: {} eigenvalue of the inverse block is {:e}, increase the scale",
            label,
            eigenvalue
        );
    }

    println!("Inverse of {} eigenvalue: {:.15e}", label, 1.0 / eigenvalue);
    println!("Elapsed: {:.3}s", start.elapsed().as_secs_f64());

    Ok(())
}
