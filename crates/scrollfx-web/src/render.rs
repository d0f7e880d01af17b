mod helpers;

use fnv::FnvHashMap;
use scrollfx_core::effects::{EffectKind, EffectUniforms};
use web_sys as web;
use wgpu;

use helpers::{make_effect_pipeline, preferred_alpha_mode, preferred_format, uniform_layout};

struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// WebGPU layer for one section's shader effects. Owns its canvas surface;
/// each effect is a fullscreen pass blended additively into it.
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    layout: wgpu::BindGroupLayout,
    pipelines: FnvHashMap<EffectKind, wgpu::RenderPipeline>,
    slots: Vec<UniformSlot>,
    width: u32,
    height: u32,
    destroyed: bool,
}

impl GpuState {
    pub async fn new(canvas: &web::HtmlCanvasElement, kinds: &[EffectKind]) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: Some("scrollfx_device"),
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format =
            preferred_format(&caps.formats).ok_or_else(|| anyhow::anyhow!("surface has no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: preferred_alpha_mode(&caps.alpha_modes),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let layout = uniform_layout(&device);
        let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("effect_pl"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let mut pipelines = FnvHashMap::default();
        for &kind in kinds {
            if pipelines.contains_key(&kind) {
                continue;
            }
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(kind.label()),
                source: wgpu::ShaderSource::Wgsl(kind.shader_source().into()),
            });
            let pipeline = make_effect_pipeline(
                &device,
                &pl,
                &shader,
                kind.label(),
                kind.fragment_entry(),
                format,
            );
            pipelines.insert(kind, pipeline);
        }
        log::info!(
            "WebGPU ready: {}x{} {:?}, {} effect pipelines",
            width,
            height,
            format,
            pipelines.len()
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            layout,
            pipelines,
            slots: Vec::new(),
            width,
            height,
            destroyed: false,
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if self.destroyed || width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn resolution(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }

    fn ensure_slots(&mut self, n: usize) {
        while self.slots.len() < n {
            let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("effect_uniforms"),
                size: std::mem::size_of::<EffectUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("effect_bg"),
                layout: &self.layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            self.slots.push(UniformSlot { buffer, bind_group });
        }
    }

    /// Draw every effect, in order, into a cleared frame.
    pub fn render(&mut self, effects: &[(EffectKind, EffectUniforms)]) -> Result<(), wgpu::SurfaceError> {
        if self.destroyed {
            return Ok(());
        }
        self.ensure_slots(effects.len());
        for (slot, (_, uniforms)) in self.slots.iter().zip(effects) {
            self.queue
                .write_buffer(&slot.buffer, 0, bytemuck::bytes_of(uniforms));
        }

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("effects_encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("effects_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            for (slot, (kind, _)) in self.slots.iter().zip(effects) {
                let Some(pipeline) = self.pipelines.get(kind) else {
                    continue;
                };
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &slot.bind_group, &[]);
                rpass.draw(0..3, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Release GPU buffers and the device. Later calls are no-ops.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        for slot in self.slots.drain(..) {
            slot.buffer.destroy();
        }
        self.pipelines.clear();
        self.device.destroy();
        log::debug!("WebGPU resources released");
    }
}

impl Drop for GpuState {
    fn drop(&mut self) {
        self.destroy();
    }
}
