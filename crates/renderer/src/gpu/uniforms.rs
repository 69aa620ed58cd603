use bytemuck::{Pod, Zeroable};

use crate::backend::{PassClock, PassParams};

/// Mirror of the `FragtoyParams` uniform block injected into every program.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub(crate) struct ShaderParams {
    pub view_port_size: [f32; 2],
    pub current_time: f32,
    pub delta_time: f32,
}

impl ShaderParams {
    /// Values for one pass. Clocks a pass does not use are left at zero.
    pub fn for_pass(params: &PassParams) -> Self {
        let (current_time, delta_time) = match params.clock {
            PassClock::Current(seconds) => (seconds, 0.0),
            PassClock::Delta(seconds) => (0.0, seconds),
            PassClock::None => (0.0, 0.0),
        };
        Self {
            view_port_size: params.view_port_size,
            current_time,
            delta_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_std140_block() {
        assert_eq!(std::mem::size_of::<ShaderParams>(), 16);
        let params = ShaderParams::for_pass(&PassParams {
            view_port_size: [640.0, 480.0],
            clock: PassClock::Delta(0.016),
        });
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&params));
        assert_eq!(floats, &[640.0, 480.0, 0.0, 0.016]);
    }

    #[test]
    fn current_time_fills_its_own_slot() {
        let params = ShaderParams::for_pass(&PassParams {
            view_port_size: [1.0, 1.0],
            clock: PassClock::Current(2.5),
        });
        assert_eq!(params.current_time, 2.5);
        assert_eq!(params.delta_time, 0.0);
    }
}
