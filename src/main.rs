//! Benchmark runner for square matrix transposition.
//!
//! `gemt <n>` allocates a 2^n × 2^n matrix, fills it, transposes it and
//! reports how long the transpose took.

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use clap::error::ErrorKind;
use gemt::error::EXIT_USAGE;
use gemt::{GemtError, Pass, Prefetch, SquareMatrix, Strategy, side_length};
use tracing::{debug, info, warn};
use tracing_forest::ForestLayer;
use tracing_forest::util::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

#[derive(Parser, Debug)]
#[command(name = "gemt", version, about, long_about = None)]
struct Args {
    /// Log base 2 of the matrix side length.
    size_exponent: u32,

    /// Transpose kernel to time.
    #[arg(short, long, ignore_case = true, value_enum, default_value_t = Strategy::InPlace)]
    strategy: Strategy,

    /// Do not issue the look-ahead prefetch hint.
    #[arg(long)]
    no_prefetch: bool,

    /// Number of timed transposes; the average is reported.
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    iterations: u32,

    /// Print the matrix before and after transposing.
    #[arg(long)]
    print: bool,

    /// Check every cell of the result against the fill formula.
    #[arg(long)]
    verify: bool,
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    Registry::default()
        .with(env_filter)
        .with(ForestLayer::default())
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = err.print();
                    ExitCode::SUCCESS
                }
                ErrorKind::MissingRequiredArgument => {
                    eprintln!("[ERR] Missing size.");
                    eprintln!("Usage: gemt <n>");
                    ExitCode::from(EXIT_USAGE)
                }
                _ => {
                    let _ = err.print();
                    ExitCode::from(EXIT_USAGE)
                }
            };
        }
    };

    match bench(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("[ERR] {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn bench(args: &Args) -> Result<(), GemtError> {
    let side = side_length(args.size_exponent)?;
    let prefetch = Prefetch::from(!args.no_prefetch);

    info!(
        "Transposing {}x{} matrix: strategy={}, prefetch={} (hardware hint {})",
        side,
        side,
        args.strategy,
        prefetch,
        if gemt::prefetch::is_supported() { "available" } else { "unavailable" }
    );

    let mut matrix = SquareMatrix::allocate(side)?;
    let mut destination = if args.strategy.needs_destination() {
        Some(SquareMatrix::allocate(side)?)
    } else {
        None
    };

    info!("Finished allocating memory.");

    matrix.fill();

    info!("Finished populating with values.");

    if args.print {
        println!("Contents of the matrix:");
        print_matrix(&matrix);
    }

    // Timed runs
    let mut total = 0.0;
    for iteration in 0..args.iterations {
        let start = Instant::now();
        let pass = match destination.as_mut() {
            Some(destination) => Pass::OutOfPlace {
                source: &matrix,
                destination,
            },
            None => Pass::InPlace(&mut matrix),
        };
        gemt::run(pass, prefetch)?;
        let elapsed = start.elapsed().as_secs_f64();
        debug!(iteration, ms = elapsed * 1000.0, "transpose pass");
        total += elapsed;
    }

    info!("Finished transposing the matrix.");

    let avg = total / args.iterations as f64;
    // Every cell is read once and written once.
    let bytes = 2.0 * (side * side * size_of::<f32>()) as f64;
    info!("Time: {}ms", avg * 1000.0);
    if args.iterations > 1 {
        info!("Total: {}ms over {} iterations", total * 1000.0, args.iterations);
    }
    info!("Bandwidth: {:.2} GB/s", bytes / avg / 1e9);

    let result = destination.as_ref().unwrap_or(&matrix);

    if args.print {
        println!("Contents of the matrix:");
        print_matrix(result);
    }

    if args.verify {
        gemt::verify(args.strategy, args.iterations, &matrix, destination.as_ref())?;
        info!("Verified {}x{} result.", side, side);
    }

    if let Some(destination) = destination {
        destination.release();
    }
    matrix.release();

    Ok(())
}

fn print_matrix(matrix: &SquareMatrix) {
    if let Err(err) = matrix.print() {
        warn!("could not print matrix: {}", err);
    }
}
