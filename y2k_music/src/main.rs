// Y2K MIDI Loop Generator: CLI entry point.
//
// Builds a GenerationConfig (optionally from a JSON file, with flags layered
// on top), generates a song, writes the .mid file under its suggested name,
// and prints the summary.
//
// Usage:
//   cargo run -p y2k_music -- [--style NAME]... [--tempo-mode style|fixed|manual|range]
//     [--bpm N] [--bpm-min N] [--bpm-max N] [--key NAME|0-11|auto]
//     [--scale auto|natural|harmonic|phrygian] [--extended] [--seed N]
//     [--config FILE.json] [--out-dir DIR] [--json FILE] [--list-styles]

use clap::{Parser, ValueEnum};
use log::{error, info};
use std::path::PathBuf;
use y2k_music::config::{GenerationConfig, MAX_BPM, MIN_BPM, TempoMode};
use y2k_music::profile::STYLES;
use y2k_music::smf::write_smf;
use y2k_music::theory::{ScaleMode, parse_pitch_class};
use y2k_music::{Result, Song};

/// Tempo used by `--tempo-mode fixed|manual` when `--bpm` is not given.
const DEFAULT_FIXED_BPM: i32 = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TempoModeArg {
    Style,
    Fixed,
    Manual,
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScaleArg {
    Auto,
    Natural,
    Harmonic,
    Phrygian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyArg {
    Auto,
    Pitch(u8),
}

fn parse_key(text: &str) -> std::result::Result<KeyArg, String> {
    if text.trim().eq_ignore_ascii_case("auto") {
        return Ok(KeyArg::Auto);
    }
    parse_pitch_class(text)
        .map(KeyArg::Pitch)
        .ok_or_else(|| format!("'{text}' is not a note name, a number 0-11, or 'auto'"))
}

#[derive(Parser)]
#[command(name = "generate")]
#[command(about = "Seeded Y2K-style multi-track MIDI loop generator")]
struct Cli {
    /// Style to blend (repeatable; the first is the main style)
    #[arg(long = "style", value_name = "NAME")]
    styles: Vec<String>,

    /// How the tempo is chosen
    #[arg(long, value_enum)]
    tempo_mode: Option<TempoModeArg>,

    /// Tempo for fixed/manual mode
    #[arg(long)]
    bpm: Option<i32>,

    /// Lower tempo bound for range mode
    #[arg(long)]
    bpm_min: Option<i32>,

    /// Upper tempo bound for range mode
    #[arg(long)]
    bpm_max: Option<i32>,

    /// Root key: a note name (A, C#, Bb), a pitch class 0-11, or "auto"
    #[arg(long, value_parser = parse_key)]
    key: Option<KeyArg>,

    /// Scale family
    #[arg(long, value_enum)]
    scale: Option<ScaleArg>,

    /// Expand the loop into intro/drop/break/return
    #[arg(long)]
    extended: bool,

    /// RNG seed (a random one is drawn if omitted)
    #[arg(long)]
    seed: Option<u32>,

    /// JSON config file; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the .mid file
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Also dump the generated song as JSON to this file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Print the built-in styles and exit
    #[arg(long)]
    list_styles: bool,
}

impl Cli {
    /// Layer command-line flags over a base config.
    fn apply(&self, mut config: GenerationConfig) -> GenerationConfig {
        if !self.styles.is_empty() {
            config.styles = self.styles.clone();
        }

        config.tempo = match self.tempo_mode {
            Some(TempoModeArg::Style) => TempoMode::Style,
            Some(TempoModeArg::Fixed) => TempoMode::Fixed {
                bpm: self.bpm.unwrap_or(DEFAULT_FIXED_BPM),
            },
            Some(TempoModeArg::Manual) => TempoMode::Manual {
                bpm: self.bpm.unwrap_or(DEFAULT_FIXED_BPM),
            },
            Some(TempoModeArg::Range) => TempoMode::Range {
                min: self.bpm_min.unwrap_or(MIN_BPM),
                max: self.bpm_max.unwrap_or(MAX_BPM),
            },
            None => match self.bpm {
                Some(bpm) => TempoMode::Fixed { bpm },
                None => config.tempo,
            },
        };

        match self.key {
            Some(KeyArg::Auto) => config.fixed_key = None,
            Some(KeyArg::Pitch(pc)) => config.fixed_key = Some(pc),
            None => {}
        }

        if let Some(scale) = self.scale {
            config.fixed_scale = match scale {
                ScaleArg::Auto => None,
                ScaleArg::Natural => Some(ScaleMode::Natural),
                ScaleArg::Harmonic => Some(ScaleMode::Harmonic),
                ScaleArg::Phrygian => Some(ScaleMode::Phrygian),
            };
        }

        config.extended |= self.extended;
        config
    }
}

fn list_styles() {
    for style in &STYLES {
        let p = &style.params;
        println!(
            "{:<14} {:>3.0}-{:<3.0} BPM  density {:.2}  aggression {:.2}  space {:.2}",
            style.name, p.tempo_min, p.tempo_max, p.density, p.aggression, p.space
        );
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.list_styles {
        list_styles();
        return Ok(());
    }

    let base = match &cli.config {
        Some(path) => {
            info!("loading config from {}", path.display());
            GenerationConfig::load(path)?
        }
        None => GenerationConfig::default(),
    };
    let config = cli.apply(base);
    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);

    let song = Song::generate(&config, seed)?;

    std::fs::create_dir_all(&cli.out_dir)?;
    let path = cli.out_dir.join(song.file_name());
    write_smf(&song, &path)?;

    if let Some(json_path) = &cli.json {
        std::fs::write(json_path, serde_json::to_string_pretty(&song)?)?;
        info!("wrote song dump to {}", json_path.display());
    }

    println!("{}", song.summary());
    println!("{}", path.display());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("{e}");
        std::process::exit(1);
    }
}
