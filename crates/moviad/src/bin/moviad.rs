use std::time::Instant;

use anyhow::{ensure, Result};
use clap::{Parser, Subcommand};
use moviad::{
    backend::{create_device, get_backend_name, SelectedBackend, SelectedDevice},
    metric::{Evaluator, Metric, MetricLevel},
    quant::{
        compute_product_quantization_efficiency, compute_quantizer_config_size,
        ProductQuantizerConfig, Quantizer,
    },
    synthetic::{random_coreset, SyntheticBatch},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "moviad")]
#[command(about = "MoViAD: evaluation and compression analysis for visual anomaly detection")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show backend information
    Info,

    /// Time every default metric and a product-quantization report on synthetic data
    Bench {
        /// Images in the synthetic batch
        #[arg(long, default_value_t = 16)]
        batch: usize,

        /// Height and width of each anomaly map
        #[arg(long, default_value_t = 64)]
        size: usize,

        /// Coreset rows to quantize
        #[arg(long, default_value_t = 2048)]
        coreset_rows: usize,

        /// Coreset feature dimension
        #[arg(long, default_value_t = 64)]
        dim: usize,

        /// Product-quantization subspaces
        #[arg(long, default_value_t = 8)]
        subspaces: usize,

        /// Centroids per subspace
        #[arg(long, default_value_t = 256)]
        centroids: usize,

        /// Seed for the synthetic data
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

struct BenchArgs {
    batch: usize,
    size: usize,
    coreset_rows: usize,
    dim: usize,
    subspaces: usize,
    centroids: usize,
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let device = create_device();

    match cli.command {
        Commands::Info => {
            println!("MoViAD Information:");
            println!("  Backend: {}", get_backend_name());
            println!("  Device: {device:?}");
            Ok(())
        }

        Commands::Bench {
            batch,
            size,
            coreset_rows,
            dim,
            subspaces,
            centroids,
            seed,
        } => run_bench(
            &BenchArgs {
                batch,
                size,
                coreset_rows,
                dim,
                subspaces,
                centroids,
                seed,
            },
            &device,
        ),
    }
}

fn run_bench(args: &BenchArgs, device: &SelectedDevice) -> Result<()> {
    ensure!(args.batch >= 2, "need at least 2 images so both classes are present");
    ensure!(args.size >= 4, "anomaly maps need at least 4x4 pixels");

    tracing::info!(
        backend = get_backend_name(),
        batch = args.batch,
        size = args.size,
        seed = args.seed,
        "generating synthetic batch"
    );
    let data =
        SyntheticBatch::<SelectedBackend>::generate(args.batch, args.size, args.seed, device);

    println!("Metrics:");
    for metric in Evaluator::default().metrics() {
        let start = Instant::now();
        let value = match metric.level() {
            MetricLevel::Image => metric.compute(data.image_gt.clone(), data.image_pred.clone())?,
            MetricLevel::Pixel => metric.compute(data.pixel_gt.clone(), data.pixel_pred.clone())?,
        };
        println!(
            "  {}: {value} ({:.2} ms)",
            metric.name(),
            start.elapsed().as_secs_f64() * 1e3
        );
    }

    let coreset =
        random_coreset::<SelectedBackend>(args.coreset_rows, args.dim, args.seed, device);

    let start = Instant::now();
    let quantizer =
        ProductQuantizerConfig::new(args.subspaces, args.centroids).init(coreset.clone())?;
    let train_time = start.elapsed();

    let start = Instant::now();
    let codes = quantizer.encode(coreset.clone())?;
    let encode_time = start.elapsed();

    let report = compute_product_quantization_efficiency(coreset, &codes, &quantizer)?;

    println!("Product quantization (m = {}, k = {}):", quantizer.m(), quantizer.k());
    println!("  codebook: {} bytes", compute_quantizer_config_size(&quantizer));
    println!("  codes: {} bytes", codes.num_elements() * codes.element_bytes());
    println!("  {report}");
    println!(
        "  train: {:.2} ms, encode: {:.2} ms",
        train_time.as_secs_f64() * 1e3,
        encode_time.as_secs_f64() * 1e3
    );

    Ok(())
}
