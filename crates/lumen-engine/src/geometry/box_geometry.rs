use super::buffer::Geometry;

/// Axis-aligned box centered on the origin, each face subdivided into a grid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoxGeometry {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub depth_segments: u32,
}

impl Default for BoxGeometry {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

impl BoxGeometry {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
            width_segments: 1,
            height_segments: 1,
            depth_segments: 1,
        }
    }

    /// Sets all three segment counts. Values below 1 are raised to 1.
    pub fn with_segments(mut self, width: u32, height: u32, depth: u32) -> Self {
        self.width_segments = width;
        self.height_segments = height;
        self.depth_segments = depth;
        self
    }

    pub fn build(&self) -> Geometry {
        let gx = self.width_segments.max(1);
        let gy = self.height_segments.max(1);
        let gz = self.depth_segments.max(1);
        let (w, h, d) = (self.width, self.height, self.depth);

        let mut builder = PlaneBuilder::default();

        // Face order: +X, -X, +Y, -Y, +Z, -Z.
        builder.plane([Z, Y, X], -1.0, -1.0, d, h, w, gz, gy);
        builder.plane([Z, Y, X], 1.0, -1.0, d, h, -w, gz, gy);
        builder.plane([X, Z, Y], 1.0, 1.0, w, d, h, gx, gz);
        builder.plane([X, Z, Y], 1.0, -1.0, w, d, -h, gx, gz);
        builder.plane([X, Y, Z], 1.0, -1.0, w, h, d, gx, gy);
        builder.plane([X, Y, Z], -1.0, -1.0, w, h, -d, gx, gy);

        builder.geometry
    }
}

const X: usize = 0;
const Y: usize = 1;
const Z: usize = 2;

#[derive(Default)]
struct PlaneBuilder {
    geometry: Geometry,
}

impl PlaneBuilder {
    /// One face of the box. `axes` maps the plane's (u, v, w) onto (x, y, z);
    /// `depth` places the face along `w` and its sign picks the normal.
    #[allow(clippy::too_many_arguments)]
    fn plane(
        &mut self,
        axes: [usize; 3],
        u_dir: f32,
        v_dir: f32,
        width: f32,
        height: f32,
        depth: f32,
        grid_x: u32,
        grid_y: u32,
    ) {
        let [u, v, w] = axes;
        let seg_w = width / grid_x as f32;
        let seg_h = height / grid_y as f32;
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        let half_d = depth / 2.0;
        let row = grid_x + 1;

        let g = &mut self.geometry;
        let base = g.positions.len() as u32;
        let normal_sign = if depth > 0.0 { 1.0 } else { -1.0 };

        for iy in 0..=grid_y {
            let y = iy as f32 * seg_h - half_h;
            for ix in 0..=grid_x {
                let x = ix as f32 * seg_w - half_w;

                let mut p = [0.0; 3];
                p[u] = x * u_dir;
                p[v] = y * v_dir;
                p[w] = half_d;
                g.positions.push(p);

                let mut n = [0.0; 3];
                n[w] = normal_sign;
                g.normals.push(n);

                g.uvs.push([ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32]);
            }
        }

        let indices = g.indices.get_or_insert_with(Vec::new);
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = base + ix + row * iy;
                let b = base + ix + row * (iy + 1);
                let c = base + (ix + 1) + row * (iy + 1);
                let d = base + (ix + 1) + row * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn unit_box_has_24_vertices_and_12_triangles() {
        let g = BoxGeometry::default().build();
        assert_eq!(g.vertex_count(), 24);
        assert_eq!(g.triangle_count(), 12);
        for p in &g.positions {
            assert!(p.iter().all(|c| (c.abs() - 0.5).abs() < 1e-6));
        }
    }

    #[test]
    fn segments_multiply_grid() {
        let g = BoxGeometry::new(1.0, 1.0, 1.0).with_segments(2, 2, 2).build();
        // 6 faces * 3x3 vertices, 6 faces * 2x2 quads * 2 triangles
        assert_eq!(g.vertex_count(), 54);
        assert_eq!(g.triangle_count(), 48);
    }

    #[test]
    fn zero_segments_are_raised_to_one() {
        let g = BoxGeometry::new(2.0, 1.0, 1.0).with_segments(0, 0, 0).build();
        assert_eq!(g.triangle_count(), 12);
    }

    #[test]
    fn triangles_wind_counter_clockwise_outward() {
        let g = BoxGeometry::new(1.0, 2.0, 3.0).with_segments(3, 1, 2).build();
        let indices = g.indices.as_ref().unwrap();
        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(g.positions[i as usize]));
            let face_n = (b - a).cross(c - a).normalize();
            let stored = Vec3::from(g.normals[tri[0] as usize]);
            assert!(face_n.dot(stored) > 0.99, "{face_n:?} vs {stored:?}");
        }
    }
}
