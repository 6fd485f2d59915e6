mod gpu;
mod jobs;

use anyhow::Result;
use marduk_gfx::logging::{LoggingConfig, init_logging};
use marduk_gfx::{ContextWorker, WorkerConfig};

use gpu::HeadlessGpu;

const FRAMES: u64 = 120;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let fallback = std::env::var_os("MARDUK_SANDBOX_FALLBACK_ADAPTER").is_some();
    let context = HeadlessGpu::new("headless wgpu").with_fallback_adapter(fallback);

    let config = WorkerConfig::default().with_env_overrides();
    let worker = ContextWorker::spawn(config, context).inspect_err(|err| {
        log::error!("fatal: graphics worker failed to start: {err:#}");
    })?;
    let gfx = worker.submitter();

    log::info!("adapter: {}", jobs::describe_adapter(&gfx)?);

    let quad = jobs::upload_vertices(&gfx, "quad", &jobs::QUAD)?;
    let strip = jobs::upload_vertices(&gfx, "strip", &jobs::QUAD[..3])?;
    log::info!("uploaded {quad:?} and {strip:?}");

    jobs::clear_buffers(&gfx, vec![quad, strip])?;
    jobs::submit_frames(&gfx, FRAMES)?;
    log::info!("{} command(s) pending after submitting {FRAMES} frames", gfx.pending());

    let buffers = jobs::flush(&gfx)?;
    log::info!("worker holds {buffers} buffer(s), shutting down");

    worker.shutdown()
}
