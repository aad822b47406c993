//! Frame orchestration: one compute step followed by one render step per
//! invocation, alternating the current buffer through a [`Generation`].

use crate::config::RunConfig;
use crate::error::{ConfigError, SimulationError};
use crate::generation::{Generation, Slot};
use crate::gpu::{
    create_params_buffer, BindingPair, FlockingKernel, GpuContext, OffscreenTarget, ParticleStore,
    Programs, Rasterizer,
};
use crate::output::PixelBuffer;
use crate::particle::Particle;
use crate::spawn;

/// Where the orchestrator is in its simulate-then-render cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    /// No step has completed yet.
    StepPending,
    /// The last invocation finished compute, render and capture.
    StepComplete,
}

/// Slots one invocation reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramePlan {
    /// Zero-based invocation number.
    pub frame: u64,
    pub generation: Generation,
    /// Slot the compute step reads.
    pub source_slot: Slot,
    /// Slot the compute step writes and the render step draws from.
    pub rendered_slot: Slot,
}

/// Generation, state and invocation count of an orchestrator.
///
/// Frame work runs through [`FrameCursor::advance`], which moves the cursor
/// only when that work succeeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameCursor {
    generation: Generation,
    state: FrameState,
    frames: u32,
    frames_run: u32,
}

impl FrameCursor {
    pub fn new(frames: u32) -> Self {
        Self {
            generation: Generation::INITIAL,
            state: FrameState::StepPending,
            frames,
            frames_run: 0,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn frames_run(&self) -> u32 {
        self.frames_run
    }

    pub fn is_finished(&self) -> bool {
        self.frames_run >= self.frames
    }

    /// The next invocation, or `None` once finished.
    pub fn plan(&self) -> Option<FramePlan> {
        if self.is_finished() {
            return None;
        }
        Some(FramePlan {
            frame: self.frames_run as u64,
            generation: self.generation,
            source_slot: self.generation.source_slot(),
            rendered_slot: self.generation.destination_slot(),
        })
    }

    /// Run `work` for the next invocation and step past it if it succeeds.
    ///
    /// Returns `Ok(None)` without calling `work` once finished. An error
    /// from `work` leaves the cursor as it was.
    pub fn advance<T, E>(
        &mut self,
        work: impl FnOnce(FramePlan) -> Result<T, E>,
    ) -> Result<Option<T>, E> {
        let Some(plan) = self.plan() else {
            return Ok(None);
        };
        let value = work(plan)?;

        self.generation = self.generation.next();
        self.frames_run += 1;
        self.state = FrameState::StepComplete;
        Ok(Some(value))
    }
}

/// Result of one invocation.
#[derive(Clone, Debug)]
pub struct FrameCapture {
    /// Zero-based invocation number.
    pub frame: u64,
    /// Slot the compute step read.
    pub source_slot: Slot,
    /// Slot the compute step wrote and the render step drew from.
    pub rendered_slot: Slot,
    pub pixels: PixelBuffer,
}

/// Sequences the flocking kernel and the rasterizer against an offscreen
/// target.
///
/// All buffers, both binding sets and both pipelines are created up front;
/// an invocation only selects among them by generation.
pub struct FrameOrchestrator<'ctx> {
    ctx: &'ctx GpuContext,
    store: ParticleStore,
    // Kept alive for the bind groups.
    _params_buffer: wgpu::Buffer,
    bindings: Option<BindingPair>,
    kernel: FlockingKernel,
    rasterizer: Rasterizer,
    target: OffscreenTarget,
    cursor: FrameCursor,
    clear_color: wgpu::Color,
}

impl<'ctx> FrameOrchestrator<'ctx> {
    /// Build everything from a run configuration, spawning the initial
    /// population from `config.seed`.
    pub fn from_config(ctx: &'ctx GpuContext, config: &RunConfig) -> Result<Self, SimulationError> {
        config.validate_for_device(&ctx.device.limits())?;
        let programs = Programs::compile(ctx, config.workgroup_size)?;
        let mut rng = spawn::rng_from_seed(config.seed);
        let initial = spawn::initialize(config.particle_count, &mut rng);
        Self::new(ctx, &programs, config, &initial)
    }

    /// Build from compiled programs and an explicit initial population.
    ///
    /// `initial` must hold exactly `config.particle_count` particles and
    /// `programs` must be compiled for `config.workgroup_size`. Every
    /// configuration check, including the device limits, runs before the
    /// first GPU object is created.
    pub fn new(
        ctx: &'ctx GpuContext,
        programs: &Programs,
        config: &RunConfig,
        initial: &[Particle],
    ) -> Result<Self, SimulationError> {
        config.validate_for_device(&ctx.device.limits())?;
        if programs.workgroup_size() != config.workgroup_size {
            return Err(ConfigError::WorkgroupSizeMismatch {
                configured: config.workgroup_size,
                compiled: programs.workgroup_size(),
            }
            .into());
        }
        if initial.len() as u64 != config.particle_count as u64 {
            return Err(ConfigError::ParticleBufferSize {
                expected: Particle::buffer_size(config.particle_count),
                actual: initial.len() as u64 * Particle::SIZE,
            }
            .into());
        }

        let count = config.particle_count;
        if count == 0 {
            log::warn!("Particle count is 0; frames will only clear the target");
        }

        let kernel = FlockingKernel::new(ctx, programs, count)?;
        let rasterizer = Rasterizer::new(ctx, programs, count)?;

        let (store, params_buffer, target) = ctx.scoped(|| {
            (
                ParticleStore::new(&ctx.device, initial),
                create_params_buffer(&ctx.device, &config.params),
                OffscreenTarget::new(&ctx.device, config.width, config.height),
            )
        })?;

        let bindings = if count > 0 {
            let pair = ctx.scoped(|| {
                BindingPair::build(
                    &ctx.device,
                    kernel.bind_group_layout(),
                    &params_buffer,
                    store.buffers(),
                    count,
                )
            })??;
            Some(pair)
        } else {
            None
        };

        let [r, g, b, a] = config.clear_color;

        Ok(Self {
            ctx,
            store,
            _params_buffer: params_buffer,
            bindings,
            kernel,
            rasterizer,
            target,
            cursor: FrameCursor::new(config.frames),
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    pub fn generation(&self) -> Generation {
        self.cursor.generation()
    }

    pub fn state(&self) -> FrameState {
        self.cursor.state()
    }

    pub fn particle_count(&self) -> u32 {
        self.store.count()
    }

    /// True once the configured number of invocations has run.
    pub fn is_finished(&self) -> bool {
        self.cursor.is_finished()
    }

    /// Run one compute step and one render step.
    ///
    /// Returns `Ok(None)` once the orchestrator is finished. On failure the
    /// generation, state and current slot are unchanged, so the buffers
    /// still hold the last fully written generation.
    pub fn run_frame(&mut self) -> Result<Option<FrameCapture>, SimulationError> {
        let mut cursor = self.cursor;
        let capture = cursor.advance(|plan| self.encode_frame(plan))?;
        self.cursor = cursor;
        Ok(capture)
    }

    fn encode_frame(&self, plan: FramePlan) -> Result<FrameCapture, SimulationError> {
        log::debug!(
            "Frame {}: generation {}, reading slot {:?}, writing slot {:?}, {} workgroups",
            plan.frame,
            plan.generation.steps(),
            plan.source_slot,
            plan.rendered_slot,
            self.kernel.workgroups()
        );

        self.ctx.scoped(|| {
            let mut encoder = self
                .ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });

            if let Some(bindings) = &self.bindings {
                self.kernel
                    .dispatch(&mut encoder, bindings.for_generation(plan.generation));
            }
            self.rasterizer.draw(
                &mut encoder,
                self.target.view(),
                self.store.buffer(plan.rendered_slot),
                self.clear_color,
            );
            self.target.copy_to_readback(&mut encoder);

            self.ctx.queue.submit(std::iter::once(encoder.finish()));
        })?;

        let pixels = self.target.read(self.ctx)?;

        Ok(FrameCapture {
            frame: plan.frame,
            source_slot: plan.source_slot,
            rendered_slot: plan.rendered_slot,
            pixels,
        })
    }

    /// Run every remaining invocation, handing each capture to `sink`.
    pub fn run<F>(&mut self, mut sink: F) -> Result<(), SimulationError>
    where
        F: FnMut(FrameCapture) -> Result<(), SimulationError>,
    {
        while let Some(capture) = self.run_frame()? {
            sink(capture)?;
        }
        Ok(())
    }

    /// Copy the particles of `slot` back to the host.
    pub fn read_particles(&self, slot: Slot) -> Result<Vec<Particle>, SimulationError> {
        Ok(self.store.read(self.ctx, slot)?)
    }

    /// Particles of the latest generation.
    pub fn current_particles(&self) -> Result<Vec<Particle>, SimulationError> {
        self.read_particles(self.generation().source_slot())
    }
}
