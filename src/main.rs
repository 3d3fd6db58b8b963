use anyhow::Context;
use plotkit::{compile_program, init_logging, load_job, Config, BUILD_DATE, VERSION};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

const USAGE: &str = "Usage: plotkit <job.json> [config.json|config.toml]";

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let mut args = std::env::args().skip(1);
    let Some(job_path) = args.next().map(PathBuf::from) else {
        anyhow::bail!(USAGE);
    };
    if job_path.as_os_str() == "--version" {
        println!("plotkit {} ({})", VERSION, BUILD_DATE);
        return Ok(());
    }

    let config = match args.next() {
        Some(path) => Config::load_from_file(&PathBuf::from(path))?,
        None => Config::load_or_default(&Config::default_path()?)?,
    };

    let job = load_job(&job_path)?;
    info!(layers = job.layers.len(), paths = job.path_count(), "compiling {}", job_path.display());

    let (compiled, program) = compile_program(&job, &config)?;
    for id in &compiled.skipped {
        warn!("skipped '{}': nothing to draw", id);
    }
    match compiled.bounds {
        Some(b) => info!(
            "extents X {:.3}..{:.3} Y {:.3}..{:.3} ({:.3} x {:.3})",
            b.min_x,
            b.max_x,
            b.min_y,
            b.max_y,
            b.width(),
            b.height()
        ),
        None => warn!("program contains no moves"),
    }

    std::io::stdout()
        .lock()
        .write_all(program.as_bytes())
        .context("Failed to write program")?;
    Ok(())
}
