use anyhow::{Context, Result};
use marduk_gfx::RenderContext;

/// Handle to a buffer owned by [`HeadlessGpu`]. Only meaningful on the
/// graphics worker.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(usize);

/// Adapter/device/queue created on first activation.
struct Device {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

/// Offscreen wgpu context. No surface, so it runs on machines without a
/// display as long as some adapter (including a software one) exists.
pub struct HeadlessGpu {
    label: String,
    force_fallback_adapter: bool,
    device: Option<Device>,
    buffers: Vec<wgpu::Buffer>,
}

impl HeadlessGpu {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            force_fallback_adapter: false,
            device: None,
            buffers: Vec::new(),
        }
    }

    pub fn with_fallback_adapter(mut self, force: bool) -> Self {
        self.force_fallback_adapter = force;
        self
    }

    async fn open(&self) -> Result<Device> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: self.force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("marduk-sandbox device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        Ok(Device { adapter, device, queue })
    }

    fn device(&self) -> Result<&Device> {
        self.device
            .as_ref()
            .with_context(|| format!("{} is not active", self.label))
    }

    pub fn adapter_info(&self) -> Result<wgpu::AdapterInfo> {
        Ok(self.device()?.adapter.get_info())
    }

    /// Creates a vertex buffer holding `bytes`.
    pub fn upload(&mut self, label: &str, bytes: &[u8]) -> Result<BufferId> {
        let gpu = self.device()?;
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: bytes.len() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        gpu.queue.write_buffer(&buffer, 0, bytes);

        self.buffers.push(buffer);
        Ok(BufferId(self.buffers.len() - 1))
    }

    /// Zeroes each buffer in one command buffer. Unknown ids are skipped.
    pub fn clear(&self, ids: &[BufferId]) -> Result<usize> {
        let gpu = self.device()?;
        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("marduk-sandbox clear"),
        });

        let mut cleared = 0;
        for id in ids {
            match self.buffers.get(id.0) {
                Some(buffer) => {
                    encoder.clear_buffer(buffer, 0, None);
                    cleared += 1;
                }
                None => log::warn!("clear skipped unknown buffer {id:?}"),
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        Ok(cleared)
    }

    /// Submits an empty frame's worth of work.
    pub fn submit_frame(&self, frame: u64) -> Result<()> {
        let gpu = self.device()?;
        let encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("marduk-sandbox frame"),
        });
        gpu.queue.submit(std::iter::once(encoder.finish()));
        log::trace!("frame {frame} submitted");
        Ok(())
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }
}

impl RenderContext for HeadlessGpu {
    fn make_current(&mut self) -> Result<()> {
        if self.device.is_none() {
            let device = pollster::block_on(self.open())?;
            let info = device.adapter.get_info();
            log::info!("{}: using {} ({:?})", self.label, info.name, info.backend);
            self.device = Some(device);
        }
        Ok(())
    }

    fn release(&mut self) {
        let count = self.buffers.len();
        for buffer in self.buffers.drain(..) {
            buffer.destroy();
        }
        self.device = None;
        log::debug!("{}: released {count} buffer(s)", self.label);
    }

    fn label(&self) -> &str {
        &self.label
    }
}
