use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wordbeat::settings::model::{ExportFormat, PlayerConfig};
use wordbeat::timeline::pass::pass_nominal_duration;
use wordbeat::{
    ExportOpts, FfmpegSink, FfmpegSinkOpts, FrameSink, ImageSequenceSink, Phase, PlaySnapshot,
    Player, PlayerEvent, Rgb8, WordSequence, blend, export_frames,
};

#[derive(Parser, Debug)]
#[command(name = "wordbeat", version, about = "Beat-synchronized word playback and video export")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play the word sequence live in the terminal.
    Play(PlayArgs),
    /// Render the timeline to a video file or image sequence.
    Export(ExportArgs),
    /// Print the derived durations for the current settings.
    Timing(TimingArgs),
}

/// Options shared by every subcommand; flags override the config file.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Beats per minute (20-300).
    #[arg(long)]
    bpm: Option<u32>,

    /// Time signature, e.g. `4/4`.
    #[arg(long)]
    time_sig: Option<String>,

    /// Note value each word is held for, e.g. `1/4`.
    #[arg(long)]
    word_note: Option<String>,

    /// Fade-in note value (`none` to disable).
    #[arg(long)]
    fade_in: Option<String>,

    /// Fade-out note value (`none` to disable).
    #[arg(long)]
    fade_out: Option<String>,

    /// Inter-word gap note value (`none` to disable).
    #[arg(long)]
    gap: Option<String>,

    /// Treat the gap as a cross-fade overlap into the next word.
    #[arg(long)]
    negative_gap: bool,

    /// 1-based first word of each pass.
    #[arg(long)]
    start_word: Option<u32>,

    /// Enable section looping.
    #[arg(long = "loop")]
    loop_enabled: bool,

    /// Loop mode: `all_words` or `by_bars`.
    #[arg(long)]
    loop_mode: Option<String>,

    /// Bars per pass in by_bars mode.
    #[arg(long)]
    loop_bars: Option<u32>,

    /// Number of passes when looping.
    #[arg(long)]
    loop_times: Option<u32>,

    /// Loop until stopped.
    #[arg(long)]
    infinite: bool,
}

impl ConfigArgs {
    fn build(&self) -> anyhow::Result<PlayerConfig> {
        let mut config = match &self.config {
            Some(path) => PlayerConfig::from_json_path(path)?,
            None => PlayerConfig::default(),
        };

        if let Some(bpm) = self.bpm {
            config.timing.bpm = bpm;
        }
        if let Some(sig) = &self.time_sig {
            let (num, den) = sig
                .split_once('/')
                .with_context(|| format!("time signature must be N/D, got '{sig}'"))?;
            config.timing.time_sig_num = num.trim().parse()?;
            config.timing.time_sig_den = den.trim().parse()?;
        }
        if let Some(note) = &self.word_note {
            config.timing.word_note = note.clone();
        }
        if let Some(note) = &self.fade_in {
            config.timing.fade_in_note = note.clone();
        }
        if let Some(note) = &self.fade_out {
            config.timing.fade_out_note = note.clone();
        }
        if let Some(note) = &self.gap {
            config.timing.gap_note = note.clone();
        }
        if self.negative_gap {
            config.timing.gap_is_negative = true;
        }
        if let Some(start) = self.start_word {
            config.start_word = start;
        }
        if self.loop_enabled {
            config.looping.enabled = true;
        }
        if let Some(mode) = &self.loop_mode {
            config.looping.mode = match mode.trim() {
                "all_words" => wordbeat::LoopMode::AllWords,
                "by_bars" => wordbeat::LoopMode::ByBars,
                other => anyhow::bail!("loop mode must be all_words or by_bars, got '{other}'"),
            };
        }
        if let Some(bars) = self.loop_bars {
            config.looping.loop_bars = bars;
        }
        if let Some(times) = self.loop_times {
            config.looping.loop_times = times;
        }
        if self.infinite {
            config.looping.infinite = true;
        }
        Ok(config)
    }
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Input text file; reads stdin when omitted.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Skip the count-in bar.
    #[arg(long)]
    no_count_in: bool,

    /// Silence the metronome click.
    #[arg(long)]
    no_metronome: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Input text file; reads stdin when omitted.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Output video file, or directory for an image sequence.
    #[arg(long)]
    out: PathBuf,

    /// Frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Output resolution, e.g. `1920x1080`.
    #[arg(long)]
    resolution: Option<String>,

    /// Container: `mp4`, `avi`, `mov` or `png_sequence`.
    #[arg(long)]
    format: Option<String>,

    /// Emit an alpha channel instead of the background color.
    #[arg(long)]
    transparent: bool,

    /// Font file (`.ttf`/`.otf`) used to rasterize words.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Enable frame-level parallelism.
    #[arg(long)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Frames per render batch (parallel mode only).
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,
}

#[derive(Args, Debug)]
struct TimingArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Input text file, for pass-duration totals.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Play(args) => cmd_play(args),
        Command::Export(args) => cmd_export(args),
        Command::Timing(args) => cmd_timing(args),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

fn read_words(in_path: Option<&Path>) -> anyhow::Result<WordSequence> {
    let text = match in_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(WordSequence::from_text(&text))
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let mut config = args.config.build()?;
    if args.no_count_in {
        config.count_in = false;
    }
    if args.no_metronome {
        config.metronome.enabled = false;
    }

    let words = Arc::new(read_words(args.in_path.as_deref())?);
    let total = words.len();
    let fg = config.appearance.foreground;
    let bg = config.appearance.background;

    let snapshot = PlaySnapshot::capture(&config, words.clone())?;
    let (player, events) = Player::spawn(snapshot);

    for event in events {
        match event {
            PlayerEvent::Phase(Phase::CountIn) => eprintln!("count-in..."),
            PlayerEvent::Phase(Phase::Completed) => {
                println!();
                println!("complete");
                break;
            }
            PlayerEvent::Phase(Phase::Idle) => {
                println!();
                println!("stopped");
                break;
            }
            PlayerEvent::Phase(_) => {}
            PlayerEvent::Display {
                word_index,
                opacity,
                previous,
            } => {
                print!("\r\x1b[2K");
                if let Some((prev, prev_opacity)) = previous
                    && let Some(word) = words.get(prev)
                {
                    print_colored(word, blend(fg, bg, prev_opacity));
                    print!(" ");
                }
                if let Some(word) = words.get(word_index) {
                    print_colored(word, blend(fg, bg, opacity));
                }
                flush_stdout();
            }
            PlayerEvent::Clear => {
                print!("\r\x1b[2K");
                flush_stdout();
            }
            PlayerEvent::WordProgress { current, total } => {
                eprint!("\r\x1b[2K[word {current}/{total}] ");
            }
            PlayerEvent::Tick {
                beat,
                bar,
                elapsed,
                accent,
            } => {
                let mark = if accent { "*" } else { "." };
                eprint!("\r\x1b[2K{mark} beat {} bar {} {elapsed:+.3}s ", beat + 1, bar + 1);
            }
            PlayerEvent::LoopStatus { iteration, total } => match total {
                Some(total) => eprintln!("loop {iteration}/{total}"),
                None => eprintln!("loop {iteration}/inf"),
            },
        }
    }
    drop(player);
    tracing::debug!(words = total, "playback finished");
    Ok(())
}

fn print_colored(word: &str, color: Rgb8) {
    print!("\x1b[38;2;{};{};{}m{word}\x1b[0m", color.r, color.g, color.b);
}

fn flush_stdout() {
    use std::io::Write as _;
    let _ = std::io::stdout().flush();
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut config = args.config.build()?;
    if let Some(fps) = args.fps {
        config.export.fps = fps;
    }
    if let Some(res) = &args.resolution {
        let (w, h) = res
            .split_once('x')
            .with_context(|| format!("resolution must be WxH, got '{res}'"))?;
        config.export.width = w.trim().parse()?;
        config.export.height = h.trim().parse()?;
    }
    if let Some(format) = &args.format {
        config.export.format = ExportFormat::parse(format)?;
    }
    if args.transparent {
        config.export.transparent_background = true;
    }
    if let Some(font) = &args.font {
        config.appearance.font_path = Some(font.clone());
    }

    let words = read_words(args.in_path.as_deref())?;

    let mut sink: Box<dyn FrameSink> = match config.export.format {
        ExportFormat::ImageSequence => Box::new(ImageSequenceSink::new(&args.out)),
        format => Box::new(FfmpegSink::new(FfmpegSinkOpts::new(&args.out, format))),
    };

    let cancel = AtomicBool::new(false);
    let mut last_percent = u8::MAX;
    let opts = ExportOpts {
        parallel: args.parallel,
        threads: args.threads,
        chunk_size: args.chunk_size,
    };
    let stats = export_frames(
        &config,
        &words,
        sink.as_mut(),
        &cancel,
        &mut |progress| {
            let percent = progress.percent();
            if percent != last_percent {
                last_percent = percent;
                eprint!(
                    "\rexporting... {percent:>3}% ({}/{})",
                    progress.frames_written, progress.frames_planned
                );
            }
        },
        &opts,
    )?;
    eprintln!();

    let seconds = stats.frames_written as f64 / f64::from(config.export.fps);
    println!(
        "wrote {} ({} frames, {seconds:.1}s)",
        args.out.display(),
        stats.frames_written
    );
    Ok(())
}

fn cmd_timing(args: TimingArgs) -> anyhow::Result<()> {
    let config = args.config.build()?;
    let plan = config.resolve_timing()?;

    println!("bpm            {}", plan.bpm);
    println!("1 beat         {:.3}s", plan.seconds_per_beat);
    println!("1 bar          {:.3}s ({} beats)", plan.bar_secs, plan.time_sig_num);
    println!("word           {:.3}s", plan.word_secs);
    println!("fade in        {:.3}s", plan.fade_in_secs);
    println!("fade out       {:.3}s", plan.fade_out_secs);
    println!("gap            {:+.3}s", plan.gap_secs);
    if config.looping.enabled {
        println!(
            "loop pass      {:.2}s ({} bars)",
            f64::from(config.looping.loop_bars) * plan.bar_secs,
            config.looping.loop_bars
        );
    }

    if let Some(path) = args.in_path.as_deref() {
        let words = read_words(Some(path))?;
        let start = words.clamp_start_index(config.start_word);
        let single_pass = pass_nominal_duration(&plan, words.len(), start);
        println!("words          {}", words.len());
        match (config.looping.enabled, config.looping.pass_count()) {
            (false, _) => println!("duration       {single_pass:.2}s"),
            (true, None) => println!("duration       {single_pass:.2}s x inf"),
            (true, Some(times)) => {
                let pass = config
                    .looping
                    .pass_budget_secs(&plan)
                    .unwrap_or(single_pass);
                println!("duration       {:.2}s ({times}x {pass:.2}s)", pass * f64::from(times));
            }
        }
    }
    Ok(())
}
