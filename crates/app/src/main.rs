use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use shotweaver_core::{
    plan_recipe, AudioAnalysis, EnergyExtractor, FeatureExtractor, PlanMode, PlanOptions,
    SpectralExtractor,
};
use tracing_subscriber::EnvFilter;

fn main() -> shotweaver_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            duration,
            backend,
            output,
        } => run_analyze(&input, duration, backend, &output),
        Commands::Plan {
            input,
            output,
            mode,
            aesthetic,
            narrative,
            seed,
        } => run_plan(&input, &output, mode, aesthetic, narrative, seed),
    }
}

fn run_analyze(
    input: &Path,
    duration: f32,
    backend: Backend,
    output: &Path,
) -> shotweaver_core::Result<()> {
    tracing::info!(?input, ?output, ?backend, "analyzing track");

    let samples = read_pcm(input)?;
    let analysis = match backend {
        Backend::Energy => EnergyExtractor::new().extract(&samples, duration)?,
        Backend::Spectral => SpectralExtractor::new().extract(&samples, duration)?,
    };

    fs::write(output, serde_json::to_string_pretty(&analysis)?)?;
    tracing::info!(
        beats = analysis.beats.len(),
        bpm = analysis.bpm,
        "analysis written"
    );
    Ok(())
}

fn run_plan(
    input: &Path,
    output: &Path,
    mode: Mode,
    aesthetic: Option<String>,
    narrative: Option<String>,
    seed: u64,
) -> shotweaver_core::Result<()> {
    tracing::info!(?input, ?output, "planning recipe");

    let analysis: AudioAnalysis = serde_json::from_str(&fs::read_to_string(input)?)?;
    let options = PlanOptions {
        mode: match mode {
            Mode::Aesthetic => PlanMode::Aesthetic,
            Mode::Narrative => PlanMode::Narrative,
        },
        aesthetic_override: aesthetic,
        narrative_override: narrative,
        seed,
    };

    let recipe = plan_recipe(&analysis, &options)?;
    fs::write(output, serde_json::to_string_pretty(&recipe)?)?;
    tracing::info!(shots = recipe.shots.len(), "recipe written");
    Ok(())
}

/// Raw mono f32 little-endian PCM, as produced by
/// `ffmpeg -i track.mp3 -f f32le -ac 1 out.pcm`.
fn read_pcm(path: &Path) -> shotweaver_core::Result<Vec<f32>> {
    let bytes = fs::read(path)?;
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Music video recipe planner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    Energy,
    Spectral,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Aesthetic,
    Narrative,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyse decoded PCM samples and persist the beat grid.
    Analyze {
        /// Path to raw mono f32le PCM samples.
        input: PathBuf,
        /// Track duration in seconds, as probed by the decoder.
        #[arg(short, long)]
        duration: f32,
        /// Analysis backend to run.
        #[arg(short, long, value_enum, default_value_t = Backend::Energy)]
        backend: Backend,
        /// Output path for the analysis JSON.
        output: PathBuf,
    },
    /// Plan a video recipe from an analysis file.
    Plan {
        /// Path to an analysis JSON produced by `analyze` or an external
        /// analyzer.
        input: PathBuf,
        /// Output path for the recipe JSON.
        output: PathBuf,
        /// Synthesis mode.
        #[arg(short, long, value_enum, default_value_t = Mode::Narrative)]
        mode: Mode,
        /// Force a specific aesthetic preset (aesthetic mode).
        #[arg(long)]
        aesthetic: Option<String>,
        /// Force a specific narrative structure (narrative mode).
        #[arg(long)]
        narrative: Option<String>,
        /// Seed for prompt selection; same seed reproduces the recipe.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
    },
}
