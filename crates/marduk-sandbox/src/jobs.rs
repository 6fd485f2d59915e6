//! Work the sandbox pushes through each submission mode.

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use marduk_gfx::{Args, Submitter, with_current};

use crate::gpu::{BufferId, HeadlessGpu};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

pub const QUAD: [Vertex; 4] = [
    Vertex { position: [-0.5, -0.5, 0.0], color: [1.0, 0.0, 0.0] },
    Vertex { position: [0.5, -0.5, 0.0], color: [0.0, 1.0, 0.0] },
    Vertex { position: [0.5, 0.5, 0.0], color: [0.0, 0.0, 1.0] },
    Vertex { position: [-0.5, 0.5, 0.0], color: [1.0, 1.0, 1.0] },
];

/// Runs `f` against the context current on this thread.
fn on_gpu<R>(f: impl FnOnce(&mut HeadlessGpu) -> Result<R>) -> Result<R> {
    with_current(f)?
}

/// Synchronous query with a result (rna).
pub fn describe_adapter(gfx: &Submitter) -> Result<String> {
    let info = gfx
        .submit_rna(true, || on_gpu(|gpu| gpu.adapter_info()))?
        .context("adapter query returned no value")??;

    Ok(format!("{} ({:?}, {:?})", info.name, info.backend, info.device_type))
}

/// Synchronous upload with arguments (rwa). The vertex bytes are copied into
/// the command, so the caller's slice can go away immediately.
pub fn upload_vertices(gfx: &Submitter, label: &str, vertices: &[Vertex]) -> Result<BufferId> {
    let args = Args::new()
        .with(label.to_owned())
        .with(bytemuck::cast_slice::<Vertex, u8>(vertices).to_vec());

    gfx.submit_rwa(
        true,
        |mut args| {
            let label = args.take::<String>(0).context("missing buffer label")?;
            let bytes = args.take::<Vec<u8>>(1).context("missing vertex bytes")?;
            on_gpu(|gpu| gpu.upload(&label, &bytes))
        },
        args,
    )?
    .context("upload returned no value")?
}

/// Fire-and-forget clears with arguments (vwa).
pub fn clear_buffers(gfx: &Submitter, ids: Vec<BufferId>) -> Result<()> {
    gfx.submit_vwa(
        false,
        |mut args| {
            let ids = args.take::<Vec<BufferId>>(0).unwrap_or_default();
            match on_gpu(|gpu| gpu.clear(&ids)) {
                Ok(cleared) => log::debug!("cleared {cleared} buffer(s)"),
                Err(err) => log::warn!("buffer clear failed: {err:#}"),
            }
        },
        Args::new().with(ids),
    )?;
    Ok(())
}

/// Fire-and-forget frame submissions (vna).
pub fn submit_frames(gfx: &Submitter, frames: u64) -> Result<()> {
    for frame in 0..frames {
        gfx.submit_vna(false, move || {
            if let Err(err) = on_gpu(|gpu| gpu.submit_frame(frame)) {
                log::warn!("frame {frame} failed: {err:#}");
            }
        })?;
    }
    Ok(())
}

/// Blocks until everything queued so far has run.
pub fn flush(gfx: &Submitter) -> Result<usize> {
    let buffers = gfx
        .submit_rna(true, || on_gpu(|gpu| Ok(gpu.buffer_count())))?
        .context("flush returned no value")??;
    Ok(buffers)
}
