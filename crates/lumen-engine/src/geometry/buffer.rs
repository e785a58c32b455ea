use std::collections::HashSet;

use glam::Vec3;

/// CPU-side triangle geometry.
///
/// Attributes are parallel arrays (one entry per vertex). `indices`, when
/// present, lists triangles as index triples; otherwise every three consecutive
/// vertices form a triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Option<Vec<u32>>,
}

impl Geometry {
    /// Non-indexed geometry from raw triangle corners.
    ///
    /// Trailing corners that do not complete a triangle are dropped. Normals
    /// are flat per triangle; UVs are zero.
    pub fn from_positions(mut positions: Vec<[f32; 3]>) -> Self {
        let extra = positions.len() % 3;
        if extra != 0 {
            log::warn!("geometry: dropping {extra} trailing vertices that do not form a triangle");
            positions.truncate(positions.len() - extra);
        }

        let mut normals = Vec::with_capacity(positions.len());
        for tri in positions.chunks_exact(3) {
            let a = Vec3::from(tri[0]);
            let b = Vec3::from(tri[1]);
            let c = Vec3::from(tri[2]);
            let n = (b - a).cross(c - a).normalize_or_zero();
            normals.extend([n.to_array(); 3]);
        }

        let uvs = vec![[0.0, 0.0]; positions.len()];
        Self { positions, normals, uvs, indices: None }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Triangle-list indices, synthesizing `0..n` for non-indexed geometry.
    pub fn triangle_indices(&self) -> Vec<u32> {
        match &self.indices {
            Some(indices) => indices.clone(),
            None => (0..self.positions.len() as u32).collect(),
        }
    }

    /// Line-list indices covering every unique triangle edge once.
    pub fn wireframe_indices(&self) -> Vec<u32> {
        let tris = self.triangle_indices();
        let mut seen = HashSet::with_capacity(tris.len());
        let mut lines = Vec::with_capacity(tris.len() * 2);

        for tri in tris.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    lines.push(a);
                    lines.push(b);
                }
            }
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_positions_drops_incomplete_triangle() {
        let g = Geometry::from_positions(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [5.0, 5.0, 5.0],
        ]);
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.triangle_count(), 1);
        assert_eq!(g.normals[0], [0.0, 0.0, 1.0]);
        assert_eq!(g.uvs.len(), 3);
    }

    #[test]
    fn wireframe_shares_edges_between_triangles() {
        let g = Geometry {
            positions: vec![[0.0; 3]; 4],
            normals: vec![[0.0; 3]; 4],
            uvs: vec![[0.0; 2]; 4],
            indices: Some(vec![0, 1, 2, 0, 2, 3]),
        };
        // 6 edges total, diagonal 0-2 shared => 5 lines.
        assert_eq!(g.wireframe_indices().len(), 10);
    }
}
