use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;

use drum_machine::audio::loader::{FileLoader, SampleLoader};
use drum_machine::audio::output::RodioOutput;
use drum_machine::audio::registry::{AssetLoadState, SoundRegistry};
use drum_machine::engine::Engine;
use drum_machine::model::kit::KitConfig;
use drum_machine::model::track::{TrackId, TrackKind};
use drum_machine::{storage, tui};

fn cli() -> Command {
    Command::new("drum-machine")
        .about("Sixteen-step drum machine for the terminal")
        .arg(
            Arg::new("kit")
                .short('k')
                .long("kit")
                .value_name("FILE")
                .help("Load tempo options, samples and mix from a YAML kit file"),
        )
        .arg(
            Arg::new("bpm")
                .short('b')
                .long("bpm")
                .value_name("N")
                .value_parser(value_parser!(u32))
                .help("Starting tempo; must be one of the kit's tempo options"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .action(ArgAction::SetTrue)
                .help("Load every sample, print the track table and exit"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .requires("list")
                .help("Print the track table as JSON"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Reduce startup banner output"),
        )
}

fn load_kit(matches: &ArgMatches) -> Result<KitConfig> {
    let mut kit = match matches.get_one::<String>("kit") {
        Some(path) => storage::kit::open(path)?,
        None => KitConfig::default(),
    };
    if let Some(&bpm) = matches.get_one::<u32>("bpm") {
        let tempo = kit.tempo.options.select(bpm).context("--bpm")?;
        kit.tempo.default = tempo.bpm();
    }
    Ok(kit)
}

#[derive(Serialize)]
struct TrackRow {
    track: TrackId,
    label: &'static str,
    source: &'static str,
    locator: Option<String>,
    status: String,
    seconds: Option<f32>,
}

fn track_rows(kit: &KitConfig, loader: &dyn SampleLoader) -> Result<Vec<TrackRow>> {
    let note_length = kit.tempo.options.select(kit.tempo.default)?.step_period();
    let mut registry = SoundRegistry::new(kit, note_length);
    for (track, locator) in kit.sample_assets() {
        registry.apply_load(track, loader.load(&locator));
    }

    let rows = TrackId::ALL
        .into_iter()
        .map(|track| {
            let slot = registry.sample_slot(track);
            let (source, status) = match (track.kind(), slot.map(|s| s.state())) {
                (TrackKind::Tone, _) => ("tone", "synth".to_string()),
                (TrackKind::Noise(_), _) => ("noise", "synth".to_string()),
                (TrackKind::Sample, Some(AssetLoadState::Failed(reason))) => ("sample", format!("failed: {}", reason)),
                (TrackKind::Sample, Some(state)) => ("sample", state.label().to_string()),
                (TrackKind::Sample, None) => ("sample", "missing".to_string()),
            };
            TrackRow {
                track,
                label: track.label(),
                source,
                locator: slot.map(|s| s.locator().to_string()).filter(|l| !l.is_empty()),
                status,
                seconds: slot.and_then(|s| s.sample()).map(|s| s.duration().as_secs_f32()),
            }
        })
        .collect();
    Ok(rows)
}

fn print_list(kit: &KitConfig, json: bool, quiet: bool) -> Result<()> {
    let rows = track_rows(kit, &FileLoader::new())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if !quiet {
        println!("{}", kit.tempo_line());
    }
    for (i, row) in rows.iter().enumerate() {
        let length = row.seconds.map(|s| format!("{:.2}s", s)).unwrap_or_default();
        println!(
            "{:>2} {:<12} {:<7} {:<8} {:<36} {}",
            i + 1,
            row.label,
            row.source,
            length,
            row.locator.as_deref().unwrap_or("-"),
            row.status
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let kit = load_kit(&matches)?;
    let quiet = matches.get_flag("quiet");

    if matches.get_flag("list") {
        return print_list(&kit, matches.get_flag("json"), quiet);
    }

    if !quiet {
        println!("DRUM MACHINE (press p to play, q to quit)");
        print!("{}", kit.summary());
    }

    let engine = Engine::new(&kit, RodioOutput::new())?;
    let loader: Arc<dyn SampleLoader> = Arc::new(FileLoader::new());
    tui::run(engine, loader)
}
