use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use orrery_kernel::Session;
use orrery_render::{DebugTextRenderer, SceneRenderer, Stage};
use orrery_scene::{SceneDescription, presets};
use orrery_tools::SessionInspector;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orrery-cli", about = "CLI tool for orrery scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and preset count
    Info,
    /// List the built-in scene presets
    Presets,
    /// Advance a scene headless and print frames from the text renderer
    Simulate {
        /// Built-in preset name
        #[arg(short, long, conflicts_with = "scene")]
        preset: Option<String>,
        /// Scene description file (.yaml, .yml or .json)
        #[arg(short, long)]
        scene: Option<PathBuf>,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "10")]
        ticks: u64,
        /// Print a frame every N ticks
        #[arg(short, long, default_value = "1")]
        every: u64,
    },
    /// Write a preset as a scene description
    Export {
        /// Built-in preset name
        #[arg(short, long)]
        preset: String,
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: Format,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Load and validate a scene description file
    Validate { file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

fn load_scene(preset: Option<&str>, scene: Option<&PathBuf>) -> anyhow::Result<SceneDescription> {
    match (preset, scene) {
        (_, Some(path)) => SceneDescription::from_path(path)
            .with_context(|| format!("loading {}", path.display())),
        (Some(name), None) => Ok(presets::load(name)?),
        (None, None) => Ok(presets::solar_system()),
    }
}

/// Tick `session` and write a text frame every `every` ticks plus the last.
/// Returns the number of frames written.
fn simulate(
    session: &mut Session<DebugTextRenderer>,
    ticks: u64,
    every: u64,
    out: &mut impl Write,
) -> std::io::Result<usize> {
    let every = every.max(1);
    let mut frames = 0;
    for tick in 1..=ticks {
        session.tick();
        if tick % every == 0 || tick == ticks {
            write!(out, "{}", session.sink_mut().render_frame())?;
            frames += 1;
        }
    }
    Ok(frames)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("orrery-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("presets: {}", presets::names().len());
        }
        Commands::Presets => {
            for name in presets::names() {
                let scene = presets::load(name)?;
                let bodies = scene
                    .orbits
                    .as_ref()
                    .map_or(0, |o| o.planets.len() + o.moon_count());
                println!(
                    "{name:<18} objects={} bodies={} bindings={}",
                    scene.objects.len(),
                    bodies,
                    scene.bindings.len()
                );
            }
        }
        Commands::Simulate {
            preset,
            scene,
            ticks,
            every,
        } => {
            let description = load_scene(preset.as_deref(), scene.as_ref())?;
            let mut session = Stage::build(&description, DebugTextRenderer::new())?;
            println!("Simulating {}: ticks={ticks}", description.name);
            let frames = simulate(&mut session, ticks, every, &mut std::io::stdout().lock())?;
            tracing::debug!(frames, "simulation finished");

            println!("{}", SessionInspector::summary(&session));
            for info in SessionInspector::bodies(&session) {
                println!("{info}");
            }
        }
        Commands::Export {
            preset,
            format,
            out,
        } => {
            let scene = presets::load(&preset)?;
            let text = match format {
                Format::Yaml => scene.to_yaml()?,
                Format::Json => scene.to_json()?,
            };
            match out {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!(preset = %preset, "exported to {}", path.display());
                }
                None => print!("{text}"),
            }
        }
        Commands::Validate { file } => {
            let scene = SceneDescription::from_path(&file)
                .with_context(|| format!("validating {}", file.display()))?;
            println!(
                "OK: {} (objects={}, lights={}, bindings={})",
                scene.name,
                scene.objects.len(),
                scene.lights.len(),
                scene.bindings.len()
            );
        }
    }

    Ok(())
}
