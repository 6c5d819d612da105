use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use prompt_exif::pipeline::{self, ProcessOptions, ProcessResult};

#[derive(Parser, Debug)]
#[command(
    name = "prompt-exif",
    version,
    about = "Embed image-generation prompts as EXIF metadata in PNG and JPEG files"
)]
struct Cli {
    /// Image files or directories to process
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// The generation prompt to embed
    #[arg(short, long, value_name = "TEXT")]
    prompt: Option<String>,

    /// Print the embedded prompt of each image and exit
    #[arg(long)]
    show: bool,

    /// Write tagged images into this directory instead of in place
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Keep a .bak copy of each original before overwriting
    #[arg(long)]
    backup: bool,

    /// Preview changes without writing to files
    #[arg(long)]
    dry_run: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }

    // Handle --show
    if cli.show {
        for image_path in &images {
            match pipeline::show_prompt(image_path)? {
                Some(prompt) => println!("{}: {prompt}", image_path.display()),
                None => println!("{}: (no embedded prompt)", image_path.display()),
            }
        }
        return Ok(());
    }

    let Some(ref prompt) = cli.prompt else {
        anyhow::bail!("No prompt given. Pass one with --prompt, or use --show to read.");
    };

    if let Some(ref dir) = cli.output {
        std::fs::create_dir_all(dir)?;
    }

    let options = ProcessOptions {
        dry_run: cli.dry_run,
        backup: cli.backup,
        output_dir: cli.output.clone(),
    };

    log::info!("Found {} image(s) to process", images.len());
    if options.dry_run {
        log::info!("DRY RUN — no files will be modified");
    }

    let results: Vec<ProcessResult> = images
        .iter()
        .map(|path| pipeline::process_image(path, prompt, &options))
        .collect();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            if let Some(ref err) = result.error {
                log::error!("{}: {err}", result.path.display());
            } else if let Some(ref reason) = result.skipped {
                log::warn!("{}: {reason}", result.path.display());
            } else {
                log::info!("Tagged {}", result.path.display());
            }
        }
    }

    let failures = results.iter().filter(|r| r.error.is_some()).count();
    if failures > 0 {
        anyhow::bail!("{failures} of {} image(s) failed", results.len());
    }

    Ok(())
}
