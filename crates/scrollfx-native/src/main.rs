//! Desktop preview: plays a scene's shader effects in a window. The mouse
//! wheel scrolls a virtual page, the cursor hovers graph nodes and the
//! keyboard stands in for host events (F fires one-shots, Enter starts the
//! finale, R rewinds the guide).

use std::time::Instant;

use fnv::FnvHashMap;
use glam::Vec2;
use scrollfx_core::effects::{EffectKind, EffectUniforms};
use scrollfx_core::measure::{Measure, Rect, StaticMeasure, Viewport};
use scrollfx_core::scene::{FrameReport, Scene};
use scrollfx_core::SceneDesc;
use winit::event::{ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

const DEMO_SCENE: &str = r#"{
    "trigger": { "elementId": "section", "referenceLine": 0.5 },
    "surfaceId": "stage",
    "conductor": { "cycleDuration": 6.0, "burstDuration": 0.8 },
    "effects": [
        { "id": "ring", "kind": "energyRing" },
        { "id": "bolt", "kind": "lightning" },
        { "id": "shock", "kind": "shockwave", "params": { "mode": "oneShot" } },
        { "id": "helix", "kind": "helix" }
    ],
    "nodes": [
        { "id": "core", "kind": "center", "position": [640, 400], "radius": 36, "guideIndex": -1 },
        { "id": "ingest", "position": [360, 220], "radius": 22, "guideIndex": 0 },
        { "id": "model", "position": [920, 220], "radius": 22, "guideIndex": 1 },
        { "id": "deploy", "position": [920, 600], "radius": 22, "guideIndex": 2 }
    ],
    "cables": [
        { "id": "core-ingest", "from": "core", "to": "ingest", "guideIndex": -1 },
        { "id": "ingest-model", "from": "ingest", "to": "model", "guideIndex": 0 },
        { "id": "model-deploy", "from": "model", "to": "deploy", "guideIndex": 1,
          "shape": { "type": "corner", "corner": [920, 400, 0] } }
    ],
    "guide": { "totalSteps": 3 },
    "resetOnReverseComplete": true,
    "timeline": [
        { "start": 0.0, "end": 0.5,
          "targets": [ { "kind": "uniform", "component": "ring", "field": "intensity", "from": 0, "to": 1 } ] },
        { "start": 0.1, "end": 0.9,
          "targets": [ { "kind": "color", "component": "ring", "from": [0.2, 0.6, 1.0], "to": [0.9, 0.3, 1.0] } ] },
        { "start": 0.3, "end": 1.0,
          "targets": [ { "kind": "uniform", "component": "bolt", "field": "intensity", "from": 0, "to": 1.2 } ] },
        { "start": 0.45, "end": 0.5, "nonSkippable": true,
          "targets": [ { "kind": "fire", "component": "shock" } ] },
        { "start": 0.6, "end": 1.0,
          "targets": [ { "kind": "uniform", "component": "helix", "field": "progress", "from": 0, "to": 1 } ] }
    ]
}"#;

// Virtual page: one screen of lead-in, the section, one screen of tail.
const SECTION_HEIGHT_SCREENS: f32 = 3.0;
const WHEEL_LINE_PX: f32 = 60.0;
const NODE_HIT_SLOP_PX: f32 = 6.0;

struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct GpuState<'w> {
    window: &'w Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    layout: wgpu::BindGroupLayout,
    pipelines: FnvHashMap<EffectKind, wgpu::RenderPipeline>,
    slots: Vec<UniformSlot>,
}

impl<'w> GpuState<'w> {
    async fn new(window: &'w Window, kinds: &[EffectKind]) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("surface has no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("effect_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("effect_pl"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        // Effects write premultiplied color; stack them additively.
        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent::OVER,
        };

        let mut pipelines = FnvHashMap::default();
        for &kind in kinds {
            if pipelines.contains_key(&kind) {
                continue;
            }
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(kind.label()),
                source: wgpu::ShaderSource::Wgsl(kind.shader_source().into()),
            });
            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(kind.label()),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_fullscreen"),
                    buffers: &[],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(kind.fragment_entry()),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(additive),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                cache: None,
                multiview: None,
            });
            pipelines.insert(kind, pipeline);
        }
        log::info!(
            "GPU ready: {}x{} {:?}, {} effect pipelines",
            config.width,
            config.height,
            format,
            pipelines.len()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            layout,
            pipelines,
            slots: Vec::new(),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn resolution(&self) -> [f32; 2] {
        [self.config.width as f32, self.config.height as f32]
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

    fn render(&mut self, effects: &[(EffectKind, EffectUniforms)]) -> Result<(), wgpu::SurfaceError> {
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
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.01,
                            g: 0.01,
                            b: 0.03,
                            a: 1.0,
                        }),
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
}

/// Virtual page around the section, in logical pixels.
struct Page {
    measure: StaticMeasure,
    height: f32,
}

impl Page {
    fn new(viewport: Viewport) -> Self {
        let mut page = Self {
            measure: StaticMeasure::new(viewport),
            height: 0.0,
        };
        page.layout(viewport);
        page
    }

    fn layout(&mut self, viewport: Viewport) {
        let section_height = viewport.height * SECTION_HEIGHT_SCREENS;
        self.measure.set_viewport(viewport);
        self.measure.insert(
            "section",
            Rect::new(0.0, viewport.height, viewport.width, section_height),
        );
        self.height = section_height + viewport.height * 2.0;
        self.pin_stage();
    }

    fn scroll_by(&mut self, dy: f32) {
        let max = (self.height - self.measure.viewport().height).max(0.0);
        let y = (self.measure.scroll_y() + dy).clamp(0.0, max);
        self.measure.set_scroll(y);
        self.pin_stage();
    }

    // The stage is sticky: it always covers the window.
    fn pin_stage(&mut self) {
        let vp = self.measure.viewport();
        let top = self.measure.scroll_y();
        self.measure
            .insert("stage", Rect::new(0.0, top, vp.width, vp.height));
    }
}

/// Revealed node under `cursor`, nearest center first.
fn node_under(scene: &Scene, cursor: Vec2) -> Option<String> {
    scene
        .graph()
        .nodes()
        .iter()
        .filter(|n| n.revealed)
        .filter_map(|n| n.projected().map(|c| (n, c.distance(cursor))))
        .filter(|(n, d)| *d <= n.radius + NODE_HIT_SLOP_PX)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(n, _)| n.name.clone())
}

fn log_report(report: &FrameReport) {
    for id in &report.fired {
        log::info!("fired {id}");
    }
    for ev in &report.guide_events {
        log::info!("guide {:?}", ev);
    }
    if report.reverse_completed {
        log::info!("scrolled back above the section");
    }
    for (what, reason) in &report.skipped {
        log::trace!("skipped {what}: {reason}");
    }
}

fn logical_viewport(window: &Window) -> Viewport {
    let size = window.inner_size().to_logical::<f32>(window.scale_factor());
    Viewport::new(size.width, size.height)
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let desc = SceneDesc::from_json(DEMO_SCENE)?;
    let mut scene = Scene::from_desc(&desc)?;
    let kinds: Vec<EffectKind> = desc.effects.iter().map(|e| e.kind).collect();
    let one_shots: Vec<String> = desc
        .effects
        .iter()
        .filter(|e| e.kind == EffectKind::Shockwave)
        .map(|e| e.id.clone())
        .collect();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("scrollfx preview")
        .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 800.0))
        .build(&event_loop)?;

    let mut gpu = pollster::block_on(GpuState::new(&window, &kinds))?;
    let mut page = Page::new(logical_viewport(&window));
    let mut cursor: Option<Vec2> = None;
    let mut hovered: Option<String> = None;
    let mut last_frame = Instant::now();
    let mut last_step = i32::MIN;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => {
                scene.teardown();
                elwt.exit();
            }
            WindowEvent::Resized(size) => {
                gpu.resize(size);
                page.layout(logical_viewport(gpu.window));
                scene.request_evaluation();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * WHEEL_LINE_PX,
                    MouseScrollDelta::PixelDelta(p) => {
                        -(p.y / gpu.window.scale_factor()) as f32
                    }
                };
                page.scroll_by(dy);
                scene.request_evaluation();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let p = position.to_logical::<f32>(gpu.window.scale_factor());
                cursor = Some(Vec2::new(p.x, p.y));
            }
            WindowEvent::CursorLeft { .. } => cursor = None,
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match logical_key.as_ref() {
                Key::Character("f") => {
                    for id in &one_shots {
                        scene.fire(id.clone());
                    }
                }
                Key::Character("r") => scene.reset_guide(),
                Key::Named(NamedKey::Enter) => scene.trigger_finale(),
                Key::Named(NamedKey::Escape) => elwt.exit(),
                _ => {}
            },
            _ => {}
        },
        Event::AboutToWait => {
            let next = cursor.and_then(|c| node_under(&scene, c));
            if next != hovered {
                if let Some(id) = hovered.take() {
                    scene.set_hover(id, false);
                }
                if let Some(id) = &next {
                    scene.set_hover(id.clone(), true);
                }
                hovered = next;
            }

            let now = Instant::now();
            let dt = (now - last_frame).as_secs_f32();
            last_frame = now;
            let report = scene.frame(dt, &page.measure);
            log_report(&report);
            if !report.alive {
                elwt.exit();
                return;
            }

            let step = scene.guide().map(|g| g.step_index()).unwrap_or(-1);
            if step != last_step {
                last_step = step;
                gpu.window.set_title(&format!("scrollfx preview (guide step {step})"));
            }

            let uniforms = scene.effect_uniforms(gpu.resolution());
            match gpu.render(&uniforms) {
                Ok(_) => gpu.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => gpu.resize(gpu.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(e) => log::warn!("render error: {:?}", e),
            }
        }
        _ => {}
    })?;
    Ok(())
}
