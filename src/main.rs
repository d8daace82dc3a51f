use bulk_resize::batch::{
    CancelToken, NullMonitor, ProgressMonitor, resize_in_place, spawn_batch, task_queue,
};
use bulk_resize::config::{self, ResizeConfig};
use bulk_resize::imaging::{Quality, RustBackend, get_dimensions, resize_one, scale_factor};
use bulk_resize::report::BatchReport;
use bulk_resize::types::{DimensionRule, DimensionSpec, ResizeRequest};
use bulk_resize::{discover, output};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bulk-resize")]
#[command(about = "Shrink oversized photos in place")]
#[command(long_about = "\
Shrink oversized photos in place

Every JPEG and PNG whose width and/or height exceeds the trigger is rescaled
so that the chosen side matches the target, keeping the aspect ratio. A
resized file only replaces the original when it is no larger, unless
--force is given.

Settings come from, in increasing priority:
  stock defaults  →  resize.toml in DIR (or --config FILE)  →  flags

Dimension names:
  width   the image width
  height  the image height
  either  trigger: either side exceeds; target: the largest side

Run 'bulk-resize gen-config' to generate a documented resize.toml.")]
#[command(version)]
struct Cli {
    /// Log each file's outcome (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Directory holding the images
    dir: PathBuf,

    /// Also resize images in subdirectories
    #[arg(long)]
    recursive: bool,

    /// Side that decides whether an image is resized
    #[arg(long, value_enum)]
    trigger: Option<DimensionSpec>,

    /// Resize when the trigger side exceeds this many pixels
    #[arg(long)]
    trigger_value: Option<u32>,

    /// Side that is scaled to the target value
    #[arg(long, value_enum)]
    target: Option<DimensionSpec>,

    /// New size in pixels of the target side
    #[arg(long)]
    target_value: Option<u32>,

    /// Replace originals even when the resized file is larger
    #[arg(long)]
    force: bool,

    /// JPEG quality, 1-100
    #[arg(long)]
    quality: Option<u32>,

    /// Config file to use instead of DIR/resize.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the final report as JSON instead of progress and a summary
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct OneArgs {
    /// Image to resize
    file: PathBuf,

    /// Side that is scaled to VALUE
    #[arg(long, value_enum, default_value_t = DimensionSpec::Either)]
    target: DimensionSpec,

    /// New size in pixels of the target side
    #[arg(long)]
    value: u32,

    /// Write here instead of replacing FILE
    #[arg(long)]
    output: Option<PathBuf>,

    /// JPEG quality, 1-100
    #[arg(long, default_value_t = Quality::default().value())]
    quality: u32,
}

#[derive(Subcommand)]
enum Command {
    /// Resize every oversized image in a directory
    Run(RunArgs),
    /// Resize a single image unconditionally
    One(OneArgs),
    /// Print a stock resize.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run(args) => {
            let settings = resolve_settings(&args)?;
            let files = discover::discover(&args.dir, settings.recursive)?;
            let request = settings.to_request(files)?;
            tracing::info!(
                "trigger {} > {}, target {} = {}",
                request.trigger().spec,
                request.trigger().value,
                request.target().spec,
                request.target().value
            );

            let token = CancelToken::new();
            let interactive = cancel_on_enter(token.clone());
            let report = if args.json {
                execute(request, NullMonitor::new(token), true)?
            } else {
                if interactive {
                    eprintln!("Press Enter to cancel.");
                }
                let total = request.files().len();
                execute(request, output::ConsoleProgress::new(total, token), false)?
            };

            if report.failed > 0 {
                return Err(format!("{} file(s) could not be resized", report.failed).into());
            }
        }
        Command::One(args) => {
            let rule = DimensionRule::new(args.target, args.value).validate("target")?;
            let backend = RustBackend::new();
            let dims = get_dimensions(&backend, &args.file)?;
            let factor = scale_factor(dims, rule.spec, rule.value);
            let quality = Quality::new(args.quality);
            let (dest, saved) = match args.output {
                Some(dest) if dest != args.file => {
                    let saved = resize_one(&backend, &args.file, &dest, factor, quality)?;
                    (dest, saved)
                }
                _ => {
                    let saved = resize_in_place(&backend, &args.file, factor, quality)?;
                    (args.file, saved)
                }
            };
            println!("{}", output::format_resize_one(&dest, saved));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Warn by default, info with `--verbose`; `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Config file layer, then flags on top.
fn resolve_settings(args: &RunArgs) -> Result<ResizeConfig, config::ConfigError> {
    let mut settings = match &args.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(&args.dir)?,
    };

    if args.recursive {
        settings.recursive = true;
    }
    if args.force {
        settings.force = true;
    }
    if let Some(spec) = args.trigger {
        settings.trigger.dimension = spec;
    }
    if let Some(value) = args.trigger_value {
        settings.trigger.value = value;
    }
    if let Some(spec) = args.target {
        settings.target.dimension = spec;
    }
    if let Some(value) = args.target_value {
        settings.target.value = value;
    }
    if let Some(quality) = args.quality {
        settings.encoding.jpeg_quality = quality;
    }
    settings.validate()?;
    Ok(settings)
}

/// Run the batch on its worker and pump completions on this thread.
fn execute<M>(request: ResizeRequest, monitor: M, json: bool) -> std::io::Result<BatchReport>
where
    M: ProgressMonitor + Send + 'static,
{
    let (dispatcher, queue) = task_queue();
    let handle = spawn_batch(
        RustBackend::new(),
        request,
        monitor,
        dispatcher,
        move |report| print_report(&report, json),
    )?;

    while queue.run_next() {}
    let (report, _monitor) = handle.join();
    Ok(report)
}

fn print_report(report: &BatchReport, json: bool) {
    if !json {
        output::print_summary(report);
        return;
    }
    match serde_json::to_string_pretty(report) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!("could not serialize report: {}", e),
    }
}

/// Trip `token` when Enter is pressed. Only on an interactive stdin;
/// returns whether the watcher was started.
fn cancel_on_enter(token: CancelToken) -> bool {
    if !std::io::stdin().is_terminal() {
        return false;
    }
    let spawned = std::thread::Builder::new()
        .name("cancel-watch".to_string())
        .spawn(move || {
            let mut line = String::new();
            if std::io::stdin().read_line(&mut line).is_ok() {
                tracing::info!("cancel requested");
                token.cancel();
            }
        });
    match spawned {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("cannot watch stdin for cancel: {}", e);
            false
        }
    }
}
