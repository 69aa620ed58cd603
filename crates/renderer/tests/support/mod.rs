#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};

use renderer::{
    Destination, DrawCall, Extent, FrameStatus, GpuErrorKind, PassClock, PassParams, Program,
    RenderBackend, RenderError, TargetAllocator, TargetSpec, TimeSample, TimeSource,
};

/// CPU stand-in for an offscreen target.
#[derive(Debug)]
pub struct FakeTarget {
    pub id: usize,
    pub extent: Extent,
    pub pixels: RefCell<Vec<[f32; 4]>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    /// Number of frames presented before this draw.
    pub frame: usize,
    pub program: Program,
    pub sampled: Option<usize>,
    /// `None` for the window surface.
    pub destination: Option<usize>,
    pub params: PassParams,
    pub sampled_pixels: Option<Vec<[f32; 4]>>,
}

/// Back-end that keeps resource accounting and simulates the user program
/// on the CPU: every pass into a target writes `input + deltaTime` into the
/// first channel.
#[derive(Debug)]
pub struct FakeBackend {
    pub size: Extent,
    pub live: BTreeSet<usize>,
    pub allocation_attempts: usize,
    pub fail_allocation_at: Option<usize>,
    pub fail_validation_of: Option<usize>,
    /// Zero-based `begin_frame` calls that report no surface frame.
    pub skip_begin_calls: HashSet<usize>,
    pub draws: Vec<DrawRecord>,
    pub presented: usize,
    begin_calls: usize,
    in_frame: bool,
    next_id: usize,
}

impl FakeBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Extent::new(width, height),
            live: BTreeSet::new(),
            allocation_attempts: 0,
            fail_allocation_at: None,
            fail_validation_of: None,
            skip_begin_calls: HashSet::new(),
            draws: Vec::new(),
            presented: 0,
            begin_calls: 0,
            in_frame: false,
            next_id: 0,
        }
    }

    pub fn draws_in_frame(&self, frame: usize) -> Vec<&DrawRecord> {
        self.draws.iter().filter(|draw| draw.frame == frame).collect()
    }
}

impl TargetAllocator for FakeBackend {
    type Target = FakeTarget;

    fn allocate_target(&mut self, spec: &TargetSpec<'_>) -> Result<FakeTarget, RenderError> {
        let attempt = self.allocation_attempts;
        self.allocation_attempts += 1;
        if self.fail_allocation_at == Some(attempt) {
            return Err(RenderError::Gpu {
                kind: GpuErrorKind::OutOfMemory,
                message: format!("cannot allocate {}", spec.label),
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(id);
        let pixels = match spec.initial {
            Some(initial) => initial.to_vec(),
            None => vec![[0.0; 4]; spec.extent.pixel_count()],
        };
        Ok(FakeTarget {
            id,
            extent: spec.extent,
            pixels: RefCell::new(pixels),
        })
    }

    fn validate_target(&mut self, target: &FakeTarget) -> Result<(), RenderError> {
        if self.fail_validation_of == Some(target.id) {
            return Err(RenderError::TargetValidation {
                label: format!("target {}", target.id),
                reason: "incomplete attachment".to_string(),
            });
        }
        Ok(())
    }

    fn release_target(&mut self, target: FakeTarget) {
        assert!(
            self.live.remove(&target.id),
            "target {} released twice",
            target.id
        );
    }
}

impl RenderBackend for FakeBackend {
    fn framebuffer_size(&self) -> Extent {
        self.size
    }

    fn begin_frame(&mut self) -> Result<FrameStatus, RenderError> {
        let call = self.begin_calls;
        self.begin_calls += 1;
        if self.skip_begin_calls.contains(&call) {
            return Ok(FrameStatus::Skipped);
        }
        self.in_frame = true;
        Ok(FrameStatus::Ready)
    }

    fn draw(&mut self, call: &DrawCall<'_, FakeTarget>) -> Result<(), RenderError> {
        if !self.in_frame {
            return Err(RenderError::FrameNotStarted);
        }

        let destination = match call.destination {
            Destination::Surface => None,
            Destination::Target(target) => Some(target),
        };
        if let (Some(sampled), Some(destination)) = (call.sampled, destination) {
            assert_ne!(
                sampled.id, destination.id,
                "pass samples the target it renders into"
            );
        }

        let sampled_pixels = call.sampled.map(|target| target.pixels.borrow().clone());
        if let (Program::User, Some(input), Some(output)) = (call.program, &sampled_pixels, destination)
        {
            let delta = match call.params.clock {
                PassClock::Delta(seconds) => seconds,
                _ => 0.0,
            };
            let next = input
                .iter()
                .map(|[a, b, c, d]| [a + delta, *b, *c, *d])
                .collect();
            *output.pixels.borrow_mut() = next;
        }

        self.draws.push(DrawRecord {
            frame: self.presented,
            program: call.program,
            sampled: call.sampled.map(|target| target.id),
            destination: destination.map(|target| target.id),
            params: call.params,
            sampled_pixels,
        });
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        if !self.in_frame {
            return Err(RenderError::FrameNotStarted);
        }
        self.in_frame = false;
        self.presented += 1;
        Ok(())
    }
}

/// Clock that replays a fixed list of samples, repeating the last one.
#[derive(Debug, Default)]
pub struct ScriptedClock {
    script: Vec<f64>,
    cursor: usize,
    pub resets: usize,
}

impl ScriptedClock {
    pub fn new(script: &[f64]) -> Self {
        Self {
            script: script.to_vec(),
            cursor: 0,
            resets: 0,
        }
    }

    pub fn samples_taken(&self) -> usize {
        self.cursor
    }
}

impl TimeSource for ScriptedClock {
    fn reset(&mut self) {
        self.resets += 1;
    }

    fn sample(&mut self) -> TimeSample {
        let index = self.cursor.min(self.script.len().saturating_sub(1));
        self.cursor += 1;
        TimeSample::new(self.script.get(index).copied().unwrap_or(0.0))
    }
}
