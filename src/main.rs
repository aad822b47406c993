//! Boids frame renderer.
//!
//! Usage: `gpu-boids [CONFIG.json] [-o OUTPUT.png]`
//!
//! Runs the configured number of simulate-then-render invocations and writes
//! the last frame as a PNG. Set `RUST_LOG=debug` for per-frame logging.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use gpu_boids::prelude::*;

const DEFAULT_OUTPUT: &str = "boids.png";
const USAGE: &str = "usage: gpu-boids [CONFIG.json] [-o OUTPUT.png]";

struct Args {
    config: Option<PathBuf>,
    output: PathBuf,
}

enum Command {
    Run(Args),
    Help,
}

fn parse_args() -> Result<Command, String> {
    let mut config = None;
    let mut output = PathBuf::from(DEFAULT_OUTPUT);
    let mut args = env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                output = args
                    .next()
                    .map(PathBuf::from)
                    .ok_or_else(|| format!("{} expects a file path", arg))?;
            }
            "-h" | "--help" => return Ok(Command::Help),
            _ if config.is_none() => config = Some(PathBuf::from(arg)),
            _ => return Err(format!("unexpected argument `{}`", arg)),
        }
    }

    Ok(Command::Run(Args { config, output }))
}

fn run(args: Args) -> Result<(), SimulationError> {
    let config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };

    let ctx = GpuContext::new_blocking()?;
    let mut frames = FrameOrchestrator::from_config(&ctx, &config)?;

    let mut last = None;
    frames.run(|capture| {
        last = Some(capture);
        Ok(())
    })?;

    if let Some(capture) = last {
        save_png(&capture.pixels, &args.output)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("{}\n{}", msg, USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Each error's message already includes its cause.
            eprintln!("gpu-boids failed: {}", e);
            if let SimulationError::Gpu(gpu) = &e {
                if gpu.is_device_unavailable() {
                    eprintln!("No usable GPU device; nothing was simulated.");
                }
            }
            ExitCode::FAILURE
        }
    }
}
