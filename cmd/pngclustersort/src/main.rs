//! pngclustersort - cluster the unique colors of a PNG image.
//!
//! Writes two images: `clusters.png` with one padded block of rows per
//! cluster, and `sorted.png` with every color ordered by a nearest-neighbour
//! walk over the cluster centers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod layout;
mod pixels;
mod sort;

use config::Settings;
use sort::PixelCluster;

/// Cluster the unique colors of a PNG image and write them out in
/// color-sorted order.
#[derive(Parser, Debug)]
#[command(name = "pngclustersort")]
#[command(about = "Cluster and sort the colors of a PNG image")]
#[command(version)]
pub struct Cli {
    /// Input PNG image
    pub input: PathBuf,

    /// Maximum number of clusters (default 256)
    #[arg(short = 'n', long)]
    pub clusters: Option<usize>,

    /// Width of the output images (default 256)
    #[arg(long)]
    pub columns: Option<usize>,

    /// Output directory (default: current directory)
    #[arg(short = 'o', long)]
    pub out_dir: Option<PathBuf>,

    /// Reduce the clusters after clustering
    #[arg(long)]
    pub reduce: bool,

    /// Stop reducing before the mass-normalized variance exceeds this (implies --reduce)
    #[arg(long, allow_negative_numbers = true)]
    pub max_variance: Option<f64>,

    /// Never reduce below this many clusters, at least 1 (implies --reduce)
    #[arg(long)]
    pub min_clusters: Option<usize>,

    /// Settings file (YAML or JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Settings from `--config` (or defaults) with command-line flags applied.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(n) = self.clusters {
            settings.clusters = n;
        }
        if let Some(cols) = self.columns {
            settings.columns = cols;
        }
        if let Some(dir) = &self.out_dir {
            settings.out_dir = dir.clone();
        }
        if self.reduce || self.max_variance.is_some() || self.min_clusters.is_some() {
            let mut opts = settings.reduce.take().unwrap_or_default();
            if self.max_variance.is_some() {
                opts.max_variance = self.max_variance;
            }
            if let Some(min) = self.min_clusters {
                opts.min_clusters = min;
            }
            settings.reduce = Some(opts);
        }
        if let Some(opts) = settings.reduce.as_mut() {
            opts.min_clusters = opts.min_clusters.max(1);
        }
        settings.validate()?;
        Ok(settings)
    }
}

/// Per-cluster line of the report.
#[derive(Debug, Serialize)]
pub struct ClusterSummary {
    pub index: usize,
    pub count: usize,
    pub mass: f64,
    pub point: Vec<f64>,
    pub variance: f64,
    pub center: String,
}

/// Outcome of a run.
#[derive(Debug, Serialize)]
pub struct Report {
    pub input_pixels: usize,
    pub unique_pixels: usize,
    pub clusters: Vec<ClusterSummary>,
    pub clusters_png: PathBuf,
    pub sorted_png: PathBuf,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn summarize(results: &[PixelCluster], centers: &[u32]) -> Vec<ClusterSummary> {
    results
        .iter()
        .zip(centers)
        .enumerate()
        .map(|(index, (r, &center))| ClusterSummary {
            index,
            count: r.count,
            mass: r.mass,
            point: r.point.clone(),
            variance: r.variance,
            center: format!("#{center:06X}"),
        })
        .collect()
}

fn write_image(dir: &Path, name: &str, pixels: &[u32], cols: u32) -> Result<PathBuf> {
    let path = dir.join(name);
    pixels::write_pixels(&path, pixels, cols)?;
    info!("wrote {} pixels to {}", pixels.len(), path.display());
    Ok(path)
}

pub fn run(input: &Path, settings: &Settings) -> Result<(Report, Vec<PixelCluster>)> {
    let (all, width, height) = pixels::read_pixels(input)?;
    info!("read {} pixels from {}x{} image", all.len(), width, height);
    let unique = pixels::unique_sorted(&all);
    info!("found {} unique pixels", unique.len());

    let results = sort::cluster_pixels(&unique, settings.clusters, settings.reduce.as_ref())?;
    let centers: Vec<u32> = results.iter().map(sort::center_pixel).collect();
    let order = sort::nearest_tour(&centers);

    std::fs::create_dir_all(&settings.out_dir)
        .with_context(|| format!("failed to create {}", settings.out_dir.display()))?;
    let cols = u32::try_from(settings.columns)?;
    let clusters_png = write_image(
        &settings.out_dir,
        "clusters.png",
        &layout::cluster_rows(&results, settings.columns),
        cols,
    )?;
    let sorted_png = write_image(
        &settings.out_dir,
        "sorted.png",
        &layout::sorted_pixels(&results, &order, settings.columns),
        cols,
    )?;

    let report = Report {
        input_pixels: all.len(),
        unique_pixels: unique.len(),
        clusters: summarize(&results, &centers),
        clusters_png,
        sorted_png,
    };
    Ok((report, results))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = cli.settings()?;
    let (report, results) = run(&cli.input, &settings)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!(
        "read {} pixels, {} unique",
        report.input_pixels, report.unique_pixels
    );
    for (i, result) in results.iter().enumerate() {
        println!("cluster[{i}]: {result}");
    }
    println!("wrote {}", report.clusters_png.display());
    println!("wrote {}", report.sorted_png.display());
    Ok(())
}
