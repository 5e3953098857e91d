use crate::math::hex_to_linear;
use crate::types::LineVertex;

pub const GRID_SIZE: f32 = 200.0;
pub const GRID_DIVISIONS: u32 = 200;
pub const CENTER_LINE_COLOR: u32 = 0x444444;
pub const LINE_COLOR: u32 = 0x222222;

/// Ground reference grid on the XZ plane, drawn as a line list
#[derive(Debug, Clone)]
pub struct GridHelper {
    pub size: f32,
    pub divisions: u32,
    pub center_color: [f32; 3],
    pub color: [f32; 3],
}

impl Default for GridHelper {
    fn default() -> Self {
        Self {
            size: GRID_SIZE,
            divisions: GRID_DIVISIONS,
            center_color: hex_to_linear(CENTER_LINE_COLOR),
            color: hex_to_linear(LINE_COLOR),
        }
    }
}

impl GridHelper {
    /// Two vertices per line; one line along X and one along Z for each of
    /// the `divisions + 1` offsets
    pub fn vertices(&self) -> Vec<LineVertex> {
        let divisions = self.divisions.max(1);
        let half = self.size * 0.5;
        let step = self.size / divisions as f32;
        let center = divisions / 2;

        let mut vertices = Vec::with_capacity((divisions as usize + 1) * 4);
        for i in 0..=divisions {
            let k = -half + i as f32 * step;
            let color = if i == center { self.center_color } else { self.color };

            vertices.push(LineVertex { position: [-half, 0.0, k], color });
            vertices.push(LineVertex { position: [half, 0.0, k], color });
            vertices.push(LineVertex { position: [k, 0.0, -half], color });
            vertices.push(LineVertex { position: [k, 0.0, half], color });
        }
        vertices
    }

    pub fn line_count(&self) -> usize {
        (self.divisions.max(1) as usize + 1) * 2
    }
}
