//! File-based rendering command.

use anyhow::Context;
use clap::Args;
use darvaza_config::{EngineSettings, Params, Preset, get_factory_preset};
use darvaza_engine::{Processor, Sample, TransportInfo};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::wav::{WavSpec, read_channels, write_channels};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Preset file (TOML)
    #[arg(short, long, conflicts_with = "factory")]
    preset: Option<PathBuf>,

    /// Factory preset name (see `darvaza presets`)
    #[arg(short, long)]
    factory: Option<String>,

    /// Engine settings file (TOML)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Host tempo in BPM
    #[arg(long, default_value = "120")]
    bpm: f32,

    /// Time signature, e.g. 4/4 or 7/8
    #[arg(long, default_value = "4/4", value_parser = parse_time_signature)]
    time_signature: (u32, u32),

    /// Processing block size
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Run the engine on 64-bit buffers
    #[arg(long)]
    double: bool,

    /// Parameter override (e.g. "playback_rate=1"), repeatable
    #[arg(long = "set", value_name = "ID=VALUE")]
    assignments: Vec<String>,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

fn parse_time_signature(s: &str) -> Result<(u32, u32), String> {
    let (numerator, denominator) = s
        .split_once('/')
        .ok_or_else(|| format!("Invalid time signature: '{}' (expected N/D)", s))?;
    let numerator: u32 = numerator
        .trim()
        .parse()
        .map_err(|_| format!("Invalid numerator in '{}'", s))?;
    let denominator: u32 = denominator
        .trim()
        .parse()
        .map_err(|_| format!("Invalid denominator in '{}'", s))?;
    if numerator == 0 || denominator == 0 {
        return Err(format!("Time signature parts must be positive: '{}'", s));
    }
    Ok((numerator, denominator))
}

fn load_params(args: &ProcessArgs) -> anyhow::Result<(String, Params)> {
    let preset = if let Some(path) = &args.preset {
        Preset::load(path)?
    } else if let Some(name) = &args.factory {
        get_factory_preset(name)
            .ok_or_else(|| darvaza_config::ConfigError::PresetNotFound(name.clone()))?
    } else {
        Preset::default()
    };

    let mut params = preset.params;
    for assignment in &args.assignments {
        params.assign(assignment)?;
    }
    Ok((preset.name, params))
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if args.block_size == 0 {
        anyhow::bail!("Block size must be at least 1");
    }
    if !matches!(args.bit_depth, 16 | 24 | 32) {
        anyhow::bail!("Unsupported output bit depth: {}", args.bit_depth);
    }

    println!("Reading {}...", args.input.display());
    let (input, spec) = read_channels(&args.input)?;
    let frames = input.first().map_or(0, Vec::len);
    println!(
        "  {} frames, {} channel(s), {} Hz, {:.2}s",
        frames,
        spec.channels,
        spec.sample_rate,
        frames as f32 / spec.sample_rate as f32
    );

    let mut settings = match &args.settings {
        Some(path) => EngineSettings::load(path)
            .with_context(|| format!("loading settings {}", path.display()))?,
        None => EngineSettings::default(),
    };
    settings.sample_rate = spec.sample_rate as f32;
    settings.channels = input.len().max(1);

    let (preset_name, params) = load_params(&args)?;
    let (numerator, denominator) = args.time_signature;

    let mut processor = Processor::new(settings.to_processor_config());
    processor.sync_transport(&TransportInfo::playing(args.bpm, numerator, denominator));
    params.apply(&mut processor);

    tracing::info!(
        preset = %preset_name,
        bpm = args.bpm,
        numerator,
        denominator,
        block_size = args.block_size,
        double = args.double,
        "rendering"
    );
    println!("Processing with preset: {}", preset_name);

    let pb = ProgressBar::new(frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let output = if args.double {
        render::<f64>(&mut processor, &input, args.block_size, &pb)
    } else {
        render::<f32>(&mut processor, &input, args.block_size, &pb)
    };
    pb.finish_with_message("done");

    let flat_in: Vec<f32> = input.iter().flatten().copied().collect();
    let flat_out: Vec<f32> = output.iter().flatten().copied().collect();
    println!("\nStats:");
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&flat_in)),
        linear_to_db(peak(&flat_in))
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&flat_out)),
        linear_to_db(peak(&flat_out))
    );
    println!("  Latency: {} samples", processor.latency_samples());

    let out_spec = WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };
    println!("\nWriting {}...", args.output.display());
    write_channels(&args.output, &output, out_spec)?;
    println!("Done!");

    Ok(())
}

/// Run every channel through `processor` block by block, at sample width `T`.
fn render<T: Sample>(
    processor: &mut Processor,
    input: &[Vec<f32>],
    block_size: usize,
    pb: &ProgressBar,
) -> Vec<Vec<f32>> {
    let frames = input.first().map_or(0, Vec::len);
    let channels = input.len();
    let mut output = vec![vec![0.0f32; frames]; channels];

    let mut in_blocks = vec![vec![T::default(); block_size]; channels];
    let mut out_blocks = vec![vec![T::default(); block_size]; channels];

    let mut start = 0;
    while start < frames {
        let len = block_size.min(frames - start);
        for (block, channel) in in_blocks.iter_mut().zip(input) {
            for (dest, sample) in block.iter_mut().zip(&channel[start..start + len]) {
                *dest = T::from_f32(*sample);
            }
        }

        let inputs: Vec<&[T]> = in_blocks.iter().map(|b| &b[..len]).collect();
        let mut outputs: Vec<&mut [T]> = out_blocks.iter_mut().map(|b| &mut b[..len]).collect();
        processor.process(&inputs, &mut outputs, len);

        for (channel, block) in output.iter_mut().zip(&out_blocks) {
            for (dest, sample) in channel[start..start + len].iter_mut().zip(block) {
                *dest = sample.to_f32();
            }
        }

        start += len;
        pb.set_position(start as u64);
    }
    output
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0, f32::max)
}

fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}
