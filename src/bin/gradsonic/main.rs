//! gradsonic - listen to the gradient waveforms of a block sequence
//!
//! Run with: cargo run -- sequence.json --play

mod cli;
mod ui;

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};

use cli::Args;
use gradsonic::{
    io::PlaybackSink, listen, BlockTimeline, DurationCache, ListenConfig, ListenExt, SystemLimits,
};
use ui::{PreviewApp, PreviewInit};

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::init();

    let args = Args::parse();

    let timeline = BlockTimeline::load(&args.timeline)
        .wrap_err_with(|| format!("failed to load {}", args.timeline.display()))?;
    let base = match &args.config {
        Some(path) => ListenConfig::load(path)
            .wrap_err_with(|| format!("failed to load {}", path.display()))?,
        None => ListenConfig::default().play(false),
    };
    let config = args.apply(base)?;
    let system = SystemLimits::default();

    let mut cache = DurationCache::new();
    let total = timeline.duration_update(&mut cache, config.append_only);

    println!("=== gradsonic ===");
    println!("Blocks: {}", timeline.iter().count());
    println!(
        "Sequence duration: {:.3} {}",
        config.time_disp.from_seconds(total),
        config.time_disp
    );

    let mut playback = PlaybackSink::new();
    let rendered = listen(&timeline, &system, &config, Some(&mut playback))
        .wrap_err("failed to render sequence")?;

    match rendered.display_window() {
        Some((start, end)) => println!(
            "Rendered {} samples at {} Hz ({:.3} {unit}), breakpoints {start:.3}..{end:.3} {unit}",
            rendered.samples.len(),
            rendered.rate,
            rendered.display_duration(),
            unit = config.time_disp,
        ),
        None => println!("No blocks in the requested time range"),
    }
    if let Some(dir) = &config.save_path {
        println!("Saved {}", dir.join(gradsonic::io::wav::WAV_FILE_NAME).display());
    }

    if args.preview {
        let init = PreviewInit::new(&timeline, &rendered, args.timeline.display().to_string());
        let mut terminal = ratatui::init();
        let result = PreviewApp::new(init, &rendered).run(&mut terminal);
        ratatui::restore();
        result?;
    }

    Ok(())
}
