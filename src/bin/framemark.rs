use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "framemark", version)]
struct Cli {
    /// Optional JSON settings file; `FRAMEMARK_*` variables still override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Burn a shape list into a frame and write the JPEG.
    Compose(ComposeArgs),
    /// Original <-> derivative names.
    #[command(subcommand)]
    Name(NameCommand),
    /// Advice records of one video.
    #[command(subcommand)]
    Advice(AdviceCommand),
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Source frame (relative to --root unless absolute).
    #[arg(long)]
    source: String,

    /// JSON array of shapes captured on the display surface.
    #[arg(long)]
    shapes: PathBuf,

    /// Display surface size the shapes were drawn on, as WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_size)]
    display: framemark::SurfaceSize,

    /// Output size; defaults to the source image's own size.
    #[arg(long, value_parser = parse_size)]
    native: Option<framemark::SurfaceSize>,

    /// Output path; defaults to the derivative name next to the source.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Directory relative sources are resolved against.
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

#[derive(Subcommand, Debug)]
enum NameCommand {
    /// Print the `_Mark` derivative name.
    Derivative { reference: String },
    /// Print the original name of a derivative.
    Original { reference: String },
}

#[derive(Subcommand, Debug)]
enum AdviceCommand {
    /// Print the advice list as JSON.
    List { video: String },
    /// Add an advice record.
    Add(AddArgs),
    /// Mark an advice as confirmed.
    Confirm { video: String, id: String },
    /// Delete an advice.
    Delete { video: String, id: String },
    /// Print the derived review status.
    Status {
        video: String,
        /// The video already has a section group.
        #[arg(long)]
        section_group: bool,
    },
}

#[derive(Args, Debug)]
struct AddArgs {
    video: String,

    /// Swing phase code (`address`, `top`, `impact`, ...).
    #[arg(long)]
    phase: String,

    /// Captured frame reference.
    #[arg(long)]
    capture: String,

    #[arg(long)]
    comment: String,

    /// Playback position in seconds.
    #[arg(long, default_value_t = 0.0)]
    at: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("FRAMEMARK_LOG")
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => framemark::Settings::from_json_file(path)?,
        None => framemark::Settings::from_env(),
    };

    match cli.cmd {
        Command::Compose(args) => cmd_compose(settings, args),
        Command::Name(cmd) => cmd_name(cmd),
        Command::Advice(cmd) => cmd_advice(settings, cmd),
    }
}

fn parse_size(s: &str) -> Result<framemark::SurfaceSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let width = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let height = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    Ok(framemark::SurfaceSize::new(width, height))
}

fn read_shapes(path: &Path) -> anyhow::Result<framemark::DrawHistory> {
    let f = File::open(path).with_context(|| format!("open shapes '{}'", path.display()))?;
    let history: framemark::DrawHistory =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse shapes JSON")?;
    Ok(history)
}

fn cmd_compose(settings: framemark::Settings, args: ComposeArgs) -> anyhow::Result<()> {
    let history = read_shapes(&args.shapes)?;
    let source = framemark::MediaRef::parse(&args.source)?;
    let resolver = Arc::new(framemark::FsMediaResolver::new(&args.root));
    let compositor = framemark::Compositor::new(
        resolver,
        framemark::ComposeOptions {
            stroke_width: settings.native_stroke_width,
            jpeg_quality: settings.jpeg_quality,
        },
    );

    let encoded = match args.native {
        Some(native) => compositor.compose(&source, &history, args.display, native)?,
        None => compositor.compose_native(&source, &history, args.display)?,
    };

    let out = args.out.unwrap_or_else(|| {
        args.root
            .join(framemark::derive_derivative_reference(source.as_str()))
    });
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out, &encoded.bytes)
        .with_context(|| format!("write jpeg '{}'", out.display()))?;

    eprintln!(
        "wrote {} ({}x{}, {} shapes)",
        out.display(),
        encoded.width,
        encoded.height,
        history.len()
    );
    Ok(())
}

fn cmd_name(cmd: NameCommand) -> anyhow::Result<()> {
    match cmd {
        NameCommand::Derivative { reference } => {
            println!("{}", framemark::derive_derivative_name(&reference));
        }
        NameCommand::Original { reference } => {
            let name = framemark::derive_original_name(&reference)
                .with_context(|| format!("'{reference}' is not a derivative"))?;
            println!("{name}");
        }
    }
    Ok(())
}

fn cmd_advice(settings: framemark::Settings, cmd: AdviceCommand) -> anyhow::Result<()> {
    let ctx = framemark::AppContext::from_settings(settings)?;
    match cmd {
        AdviceCommand::List { video } => {
            let advices = ctx.advice(&video).list()?;
            println!("{}", serde_json::to_string_pretty(&advices)?);
        }
        AdviceCommand::Add(args) => {
            let saved = ctx.advice(&args.video).create(framemark::NewAdvice {
                phase: Some(framemark::SwingPhase::from_code(&args.phase)?),
                capture: Some(framemark::MediaRef::parse(&args.capture)?),
                capture_sas_url: None,
                comment: args.comment,
                timestamp: args.at,
            })?;
            report(&saved.value.id, saved.persistence, "added");
        }
        AdviceCommand::Confirm { video, id } => {
            let saved = ctx.advice(&video).confirm(&id.as_str().into())?;
            report(&saved.value.id, saved.persistence, "confirmed");
        }
        AdviceCommand::Delete { video, id } => {
            let saved = ctx.advice(&video).delete(&id.as_str().into())?;
            report(&saved.value.id, saved.persistence, "deleted");
        }
        AdviceCommand::Status {
            video,
            section_group,
        } => {
            println!("{}", ctx.advice(&video).status(section_group)?.as_str());
        }
    }
    Ok(())
}

fn report(id: &framemark::AdviceId, persistence: framemark::Persistence, what: &str) {
    match persistence {
        framemark::Persistence::Remote => println!("{what} {id}"),
        framemark::Persistence::LocalOnly => {
            println!("{what} {id} (saved locally, will sync when the server is reachable)");
        }
    }
}
