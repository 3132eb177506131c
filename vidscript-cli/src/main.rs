use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;

use vidscript_core::patterns::registry;
use vidscript_core::{
    ContainerFormat, DirectiveCompiler, MediaDescriptor, OutputFormat, Resolution,
};

mod probe;

#[derive(Parser, Debug)]
#[command(name = "vidscript")]
#[command(about = "Compile plain-text video editing directives into an FFmpeg command line")]
#[command(version)]
struct Args {
    /// Directive file to compile ("-" or omitted reads stdin)
    directives: Option<PathBuf>,

    /// Source media file (overrides an `input` directive)
    #[arg(short, long)]
    input_file: Option<PathBuf>,

    /// Output file appended to the command line
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Media descriptor JSON file, e.g. {"resolution": "1920x1080", "duration": 60.0}
    #[arg(long, value_name = "FILE")]
    descriptor: Option<PathBuf>,

    /// Probe the input file with ffprobe for resolution and duration
    #[arg(long, requires = "input_file")]
    probe: bool,

    /// Source resolution as WxH (overrides descriptor and probe)
    #[arg(long)]
    resolution: Option<String>,

    /// Source duration in seconds (overrides descriptor and probe)
    #[arg(long)]
    duration: Option<f64>,

    /// Add -y so FFmpeg overwrites the output without asking
    #[arg(short = 'y', long)]
    overwrite: bool,

    /// How to print the compiled arguments
    #[arg(short, long, value_enum, default_value = "shell")]
    format: OutputFormat,

    /// Fail when any directive could not be parsed
    #[arg(long)]
    strict: bool,

    /// List available commands
    #[arg(long)]
    list_commands: bool,

    /// List formats accepted by `convert to`
    #[arg(long)]
    list_formats: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn read_directives(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read directive file: {:?}", path)),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read directives from stdin")?;
            Ok(text)
        }
    }
}

fn load_descriptor(args: &Args) -> Result<Option<MediaDescriptor>> {
    let mut descriptor = match &args.descriptor {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read descriptor file: {:?}", path))?;
            Some(MediaDescriptor::from_json(&json).context("Invalid descriptor file")?)
        }
        None => None,
    };

    if args.probe
        && let Some(input) = &args.input_file
    {
        log::info!("Probing {:?}...", input);
        descriptor = Some(probe::probe_media(input)?);
    }

    if let Some(resolution) = &args.resolution {
        let resolution: Resolution = resolution.parse()?;
        descriptor = Some(descriptor.unwrap_or_default().with_resolution(resolution));
    }

    if let Some(duration) = args.duration {
        descriptor = Some(descriptor.unwrap_or_default().with_duration(duration));
    }

    Ok(descriptor)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    if args.list_commands {
        println!("\nAvailable commands:");
        println!("{:-<60}", "");
        for pattern in registry().iter() {
            println!("{:<15} {}", pattern.name, pattern.usage);
        }
        println!("\nUsage: vidscript edits.txt -i input.mp4 -o output.mp4");
        return Ok(());
    }

    if args.list_formats {
        println!("\nAvailable formats:");
        println!("{:-<60}", "");
        for format in ContainerFormat::ALL {
            let kind = if format.is_audio_only() { "audio" } else { "video" };
            println!("{:<8} {:<6} - {}", format.name(), kind, format.description());
        }
        return Ok(());
    }

    let text = read_directives(args.directives.as_ref())?;
    let descriptor = load_descriptor(&args)?;

    let mut compiler = DirectiveCompiler::new().overwrite(args.overwrite);
    if let Some(descriptor) = descriptor {
        compiler = compiler.descriptor(descriptor);
    }
    if let Some(ref input) = args.input_file {
        compiler = compiler.input(input);
    }
    if let Some(ref output) = args.output {
        compiler = compiler.output(output);
    }

    log::debug!("Compiling with output format {}", args.format.name());
    let output = compiler.compile(&text).context("Compilation aborted")?;

    for error in &output.errors {
        let location = error.location();
        eprintln!("{}:{}: {}", location.line, location.column, error);
    }

    println!(
        "{}",
        output
            .render(args.format)
            .context("Failed to render output")?
    );

    if args.strict && !output.errors.is_empty() {
        anyhow::bail!("{} directive(s) failed to parse", output.errors.len());
    }

    Ok(())
}
