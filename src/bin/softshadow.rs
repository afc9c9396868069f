use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "softshadow", version)]
struct Cli {
    /// Enable debug logging (`RUST_LOG` is honored when set).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a shadow spec to a PNG, going through the on-disk cache.
    Render(RenderArgs),
    /// Print the cache fingerprint of a shadow spec.
    Fingerprint(FingerprintArgs),
    /// Delete every cached shadow under a cache directory.
    Clear(ClearArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input shadow spec JSON.
    #[arg(long)]
    spec: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Cache root directory (defaults to a `softshadow` folder in the system temp dir).
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Render directly without reading or writing the cache.
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser, Debug)]
struct FingerprintArgs {
    /// Input shadow spec JSON.
    #[arg(long)]
    spec: PathBuf,
}

#[derive(Parser, Debug)]
struct ClearArgs {
    /// Cache root directory (defaults to a `softshadow` folder in the system temp dir).
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

/// Spec file contents: the shadow itself plus optional per-request overrides.
#[derive(Deserialize, Debug)]
struct ShadowRequest {
    #[serde(flatten)]
    spec: softshadow::ShadowSpec,
    #[serde(default)]
    options: softshadow::ShadowOptions,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Fingerprint(args) => cmd_fingerprint(args),
        Command::Clear(args) => cmd_clear(args),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("warn")
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_request_json(path: &Path) -> anyhow::Result<ShadowRequest> {
    let f = File::open(path).with_context(|| format!("open shadow spec '{}'", path.display()))?;
    let r = BufReader::new(f);
    let req: ShadowRequest =
        serde_json::from_reader(r).with_context(|| "parse shadow spec JSON")?;
    Ok(req)
}

fn cache_opts(cache_dir: Option<PathBuf>) -> softshadow::RenderCacheOpts {
    match cache_dir {
        Some(dir) => softshadow::RenderCacheOpts::in_dir(dir),
        None => softshadow::RenderCacheOpts::default(),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let req = read_request_json(&args.spec)?;
    req.spec.validate()?;

    let bytes: Vec<u8> = if args.no_cache {
        let spec = req.options.resolve(&req.spec);
        softshadow::render_shadow_png(&spec, &softshadow::PngCodec)?
    } else {
        let cache = softshadow::RenderCache::new(cache_opts(args.cache_dir))?;
        let bytes = cache.get_or_render_with(&req.spec, &req.options)?;
        let fp = cache.fingerprint_for(&req.spec, &req.options);
        eprintln!("cache entry {}", cache.entry_path(fp).display());
        bytes.to_vec()
    };

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    let (w, h) = req.options.resolve(&req.spec).canvas_size();
    eprintln!("wrote {} ({w}x{h})", args.out.display());
    Ok(())
}

fn cmd_fingerprint(args: FingerprintArgs) -> anyhow::Result<()> {
    let req = read_request_json(&args.spec)?;
    let fp = softshadow::fingerprint_shadow(
        &req.options.resolve(&req.spec),
        req.options.position.as_ref(),
        &softshadow::RasterOpts::default(),
    );
    println!("{fp}");
    Ok(())
}

fn cmd_clear(args: ClearArgs) -> anyhow::Result<()> {
    let cache = softshadow::RenderCache::new(cache_opts(args.cache_dir))?;
    cache.clear_all()?;
    eprintln!("cleared {}", cache.dir().display());
    Ok(())
}
