use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use scaffolder::{
    load_links, scaffold, write_outputs, BucketNaming, ContigSizes, OutputPaths, ScaffoldConfig,
};

/// Build scaffolds from contig links and write AGP, phases and a diagnostic log
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Contig sizes: a two-column `.sizes` table or a FASTA file (optionally gzipped)
    contigs: PathBuf,

    /// Links file: `contigA contigB orientation distance` per line
    links: PathBuf,

    /// Keep contigs with the same `_`-separated prefix in the same bucket
    #[arg(long)]
    prefix: bool,

    /// Bucket name used when --prefix is not given
    #[arg(long)]
    default_bucket: Option<String>,

    /// Gap length between scaffolded contigs in the AGP
    #[arg(long)]
    gap_length: Option<u64>,

    /// Floor applied to every link distance
    #[arg(long)]
    min_distance: Option<i64>,

    /// JSON file with scaffolding settings; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output prefix (default: contigs path without its extension)
    #[arg(long, short = 'o')]
    output_prefix: Option<PathBuf>,

    /// Diagnostic log path (default: scaffold.log next to the outputs)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Optional JSON summary of buckets, layouts and phases
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Skip unparseable link records instead of aborting
    #[arg(long)]
    skip_malformed: bool,

    /// Disable the single-flip refinement of contig orientations
    #[arg(long)]
    no_refine: bool,

    /// Resolve components on a thread pool (needs the `parallel` feature)
    #[arg(long, default_value_t = false)]
    threads: bool,

    /// Number of worker threads when --threads is set (default: max available - 1)
    #[arg(long, default_value_t = num_cpus::get().saturating_sub(1).max(1))]
    max_workers: usize,

    /// Verbose/info output (default: quiet)
    #[arg(long, short = 'v', alias = "info")]
    verbose: bool,

    /// Debug output
    #[arg(long)]
    debug: bool,

    /// Trace output
    #[arg(long)]
    trace: bool,
}

impl Args {
    fn log_level(&self) -> &'static str {
        if self.trace {
            "trace"
        } else if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "error"
        }
    }

    fn scaffold_config(&self) -> Result<ScaffoldConfig> {
        let mut config = match &self.config {
            Some(path) => ScaffoldConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ScaffoldConfig::default(),
        };
        if self.prefix {
            config.bucket_naming = BucketNaming::StripSuffix;
        } else if let Some(name) = &self.default_bucket {
            config.bucket_naming = BucketNaming::Fixed(name.clone());
        }
        if let Some(gap_length) = self.gap_length {
            config.gap_length = gap_length;
        }
        if let Some(min_distance) = self.min_distance {
            config.min_distance = min_distance;
        }
        if self.no_refine {
            config.refine_signs = false;
        }
        if self.threads {
            config.max_workers = self.max_workers;
        }
        Ok(config)
    }

    fn output_paths(&self) -> OutputPaths {
        let prefix = self
            .output_prefix
            .clone()
            .unwrap_or_else(|| default_prefix(&self.contigs));
        let mut paths = OutputPaths::from_prefix(prefix);
        if let Some(log_file) = &self.log_file {
            paths.log = log_file.clone();
        }
        paths.json = self.export_json.clone();
        paths
    }
}

// `contigs.fasta.gz` -> `contigs`, `ctg.sizes` -> `ctg`.
fn default_prefix(contigs: &Path) -> PathBuf {
    let mut prefix = contigs.to_path_buf();
    if prefix
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("bgz"))
        .unwrap_or(false)
    {
        prefix.set_extension("");
    }
    prefix.set_extension("");
    prefix
}

fn run(args: &Args) -> Result<()> {
    let config = args.scaffold_config()?;
    let sizes = ContigSizes::load(&args.contigs)
        .with_context(|| format!("Failed to read contig sizes from {}", args.contigs.display()))?;
    let records = load_links(&args.links, args.skip_malformed)
        .with_context(|| format!("Failed to parse links from {}", args.links.display()))?;

    let run = scaffold(&records, &sizes, &config).context("Scaffolding failed")?;
    let paths = args.output_paths();
    write_outputs(&run, &sizes, &paths).context("Failed to write outputs")?;

    eprintln!(
        "{} buckets, {} scaffolds, {} singletons, N50 {} bp -> {}",
        run.summary.buckets,
        run.summary.scaffolds,
        run.summary.singletons,
        run.summary.n50,
        paths.agp.display()
    );
    Ok(())
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();

    info!("contigs: {}", args.contigs.display());
    info!("links: {}", args.links.display());

    if let Err(error) = run(&args) {
        eprintln!("Scaffolding failed: {error:?}");
        std::process::exit(1);
    }
}
