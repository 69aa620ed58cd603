//! Ping-pong pair of offscreen simulation targets.
//!
//! The pair owns two targets for its whole life. Which one is `input` and
//! which one is `output` is the only thing that changes between frames, and
//! [`OffscreenTargetPair::swap`] flips that label without touching the GPU.

use std::f32::consts::PI;

use crate::backend::{TargetAllocator, TargetSpec};
use crate::error::RenderError;
use crate::types::Extent;

/// Physical slot a target was allocated into. Slots never move; only the
/// `input`/`output` labels do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSlot {
    First,
    Second,
}

impl TargetSlot {
    fn index(self) -> usize {
        match self {
            TargetSlot::First => 0,
            TargetSlot::Second => 1,
        }
    }

    fn other(self) -> Self {
        match self {
            TargetSlot::First => TargetSlot::Second,
            TargetSlot::Second => TargetSlot::First,
        }
    }
}

/// Initial simulation state for a `width`×`height` target.
///
/// Pixel centers are mapped to `[0, 1]²` and then to `[-π, π]²`; the first
/// two channels hold that angle pair, the last two are zero.
pub fn seed_payload(extent: Extent) -> Vec<[f32; 4]> {
    let width = extent.width as f32;
    let height = extent.height as f32;
    let mut pixels = Vec::with_capacity(extent.pixel_count());
    for y in 0..extent.height {
        for x in 0..extent.width {
            let u = (x as f32 + 0.5) / width;
            let v = (y as f32 + 0.5) / height;
            pixels.push([PI * (2.0 * u - 1.0), PI * (2.0 * v - 1.0), 0.0, 0.0]);
        }
    }
    pixels
}

#[derive(Debug)]
pub struct OffscreenTargetPair<T> {
    targets: Option<[T; 2]>,
    input: TargetSlot,
    extent: Extent,
}

impl<T> Default for OffscreenTargetPair<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> OffscreenTargetPair<T> {
    /// A pair that owns nothing. Destroying it is a no-op.
    pub fn empty() -> Self {
        Self {
            targets: None,
            input: TargetSlot::First,
            extent: Extent::new(0, 0),
        }
    }

    /// Allocates both targets, seeds the first one and validates them.
    ///
    /// On failure every target allocated during this call has been released
    /// before the error is returned.
    pub fn create<A>(allocator: &mut A, extent: Extent) -> Result<Self, RenderError>
    where
        A: TargetAllocator<Target = T>,
    {
        let seed = seed_payload(extent);
        let first = allocator.allocate_target(&TargetSpec {
            label: "simulation target A",
            extent,
            initial: Some(&seed),
        })?;
        let second = match allocator.allocate_target(&TargetSpec {
            label: "simulation target B",
            extent,
            initial: None,
        }) {
            Ok(target) => target,
            Err(err) => {
                allocator.release_target(first);
                return Err(err);
            }
        };

        let validation = allocator
            .validate_target(&first)
            .and_then(|_| allocator.validate_target(&second));
        if let Err(err) = validation {
            tracing::error!(
                error = %err,
                width = extent.width,
                height = extent.height,
                "simulation targets failed validation; releasing"
            );
            allocator.release_target(first);
            allocator.release_target(second);
            return Err(err);
        }

        tracing::debug!(
            width = extent.width,
            height = extent.height,
            "allocated simulation target pair"
        );

        Ok(Self {
            targets: Some([first, second]),
            input: TargetSlot::First,
            extent,
        })
    }

    pub fn is_allocated(&self) -> bool {
        self.targets.is_some()
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Slot currently labelled `input`.
    pub fn input_slot(&self) -> TargetSlot {
        self.input
    }

    /// Slot currently labelled `output`.
    pub fn output_slot(&self) -> TargetSlot {
        self.input.other()
    }

    /// Target read by the next simulation pass.
    pub fn input(&self) -> Option<&T> {
        self.slot(self.input_slot())
    }

    /// Target written by the next simulation pass.
    pub fn output(&self) -> Option<&T> {
        self.slot(self.output_slot())
    }

    pub fn slot(&self, slot: TargetSlot) -> Option<&T> {
        self.targets.as_ref().map(|targets| &targets[slot.index()])
    }

    /// Exchanges the `input` and `output` labels.
    pub fn swap(&mut self) {
        self.input = self.input.other();
    }

    /// Releases both targets. Calling this on an empty or already destroyed
    /// pair does nothing.
    pub fn destroy<A>(&mut self, allocator: &mut A)
    where
        A: TargetAllocator<Target = T>,
    {
        let Some(targets) = self.targets.take() else {
            return;
        };
        for target in targets {
            allocator.release_target(target);
        }
        self.input = TargetSlot::First;
        tracing::debug!("released simulation target pair");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_maps_pixel_centers_to_angles() {
        let extent = Extent::new(4, 2);
        let seed = seed_payload(extent);
        assert_eq!(seed.len(), 8);

        let first = seed[0];
        assert!((first[0] - PI * (2.0 * 0.125 - 1.0)).abs() < 1e-6);
        assert!((first[1] - PI * (2.0 * 0.25 - 1.0)).abs() < 1e-6);

        // Row-major: index 5 is x = 1, y = 1.
        let pixel = seed[5];
        assert!((pixel[0] - PI * (2.0 * 0.375 - 1.0)).abs() < 1e-6);
        assert!((pixel[1] - PI * (2.0 * 0.75 - 1.0)).abs() < 1e-6);
    }

    #[test]
    fn seed_zeroes_trailing_channels_and_stays_in_range() {
        for pixel in seed_payload(Extent::new(7, 5)) {
            assert_eq!(pixel[2], 0.0);
            assert_eq!(pixel[3], 0.0);
            assert!(pixel[0].abs() < PI);
            assert!(pixel[1].abs() < PI);
        }
    }

    #[test]
    fn swap_flips_slots() {
        let mut pair: OffscreenTargetPair<u32> = OffscreenTargetPair {
            targets: Some([10, 20]),
            input: TargetSlot::First,
            extent: Extent::new(1, 1),
        };
        assert_eq!(pair.input(), Some(&10));
        assert_eq!(pair.output(), Some(&20));

        pair.swap();
        assert_eq!(pair.input_slot(), TargetSlot::Second);
        assert_eq!(pair.input(), Some(&20));
        assert_eq!(pair.output(), Some(&10));
    }

    #[test]
    fn empty_pair_exposes_no_targets() {
        let pair: OffscreenTargetPair<u32> = OffscreenTargetPair::default();
        assert!(!pair.is_allocated());
        assert!(pair.input().is_none());
        assert!(pair.output().is_none());
    }
}
