use glam::Vec3;
use terrascene_common::MAX_TERRAIN_SEGMENTS;
use terrascene_noise::PermutationTable;

/// Horizontal frequency of the terrain heightfield.
pub const HEIGHT_FREQUENCY: f64 = 0.2;
/// Peak height of the terrain heightfield.
pub const HEIGHT_AMPLITUDE: f64 = 2.0;

/// Heightfield value at world `(x, z)`.
pub fn terrain_height(table: &PermutationTable, x: f32, z: f32) -> f32 {
    (table.noise2(x as f64 * HEIGHT_FREQUENCY, z as f64 * HEIGHT_FREQUENCY) * HEIGHT_AMPLITUDE)
        as f32
}

/// Segment count actually meshed: at least one quad, at most
/// [`MAX_TERRAIN_SEGMENTS`] per edge.
pub fn clamp_segments(segments: u32) -> u32 {
    segments.clamp(1, MAX_TERRAIN_SEGMENTS)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Square grid mesh displaced by the noise heightfield.
///
/// Built once; nothing about it changes per frame.
#[derive(Debug, Clone)]
pub struct Terrain {
    vertices: Vec<TerrainVertex>,
    indices: Vec<u32>,
    size: f32,
    segments: u32,
    elevation: f32,
}

impl Terrain {
    /// Build a `size` x `size` patch centred on the origin with `segments`
    /// quads per edge. `elevation` is a vertical offset applied when placing
    /// the patch in the world; vertex heights stay raw heightfield values.
    /// `segments` is clamped with [`clamp_segments`].
    pub fn generate(table: &PermutationTable, size: f32, segments: u32, elevation: f32) -> Self {
        let segments = clamp_segments(segments);
        let row = segments + 1;
        let step = size / segments as f32;
        let half = size * 0.5;

        let quads = segments as usize * segments as usize;
        let mut vertices = Vec::with_capacity(row as usize * row as usize);
        for j in 0..row {
            let z = -half + j as f32 * step;
            for i in 0..row {
                let x = -half + i as f32 * step;
                vertices.push(TerrainVertex {
                    position: Vec3::new(x, terrain_height(table, x, z), z),
                    normal: Vec3::ZERO,
                });
            }
        }

        let mut indices = Vec::with_capacity(quads * 6);
        for j in 0..segments {
            for i in 0..segments {
                let a = j * row + i;
                let b = a + 1;
                let c = a + row;
                let d = c + 1;
                // Counter-clockwise seen from above.
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let pa = vertices[a].position;
            let face = (vertices[b].position - pa).cross(vertices[c].position - pa);
            vertices[a].normal += face;
            vertices[b].normal += face;
            vertices[c].normal += face;
        }
        for v in &mut vertices {
            let n = v.normal.normalize_or_zero();
            v.normal = if n == Vec3::ZERO { Vec3::Y } else { n };
        }

        tracing::debug!(
            vertices = vertices.len(),
            triangles = indices.len() / 3,
            "terrain generated"
        );

        Self {
            vertices,
            indices,
            size,
            segments,
            elevation,
        }
    }

    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    /// Lowest and highest vertex height.
    pub fn height_range(&self) -> (f32, f32) {
        self.vertices
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v.position.y), hi.max(v.position.y))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_dimensions() {
        let table = PermutationTable::new();
        let t = Terrain::generate(&table, 10.0, 4, 0.0);
        assert_eq!(t.vertices().len(), 25);
        assert_eq!(t.indices().len(), 4 * 4 * 6);
        assert!(t.indices().iter().all(|&i| (i as usize) < t.vertices().len()));
    }

    #[test]
    fn corners_span_the_patch() {
        let table = PermutationTable::new();
        let t = Terrain::generate(&table, 10.0, 5, 0.0);
        let first = t.vertices().first().unwrap().position;
        let last = t.vertices().last().unwrap().position;
        assert_eq!((first.x, first.z), (-5.0, -5.0));
        assert!((last.x - 5.0).abs() < 1e-5 && (last.z - 5.0).abs() < 1e-5);
    }

    #[test]
    fn heights_follow_noise() {
        let table = PermutationTable::new();
        let t = Terrain::generate(&table, 20.0, 8, -3.0);
        for v in t.vertices() {
            let p = v.position;
            let expected = table.noise2(p.x as f64 * 0.2, p.z as f64 * 0.2) * 2.0;
            assert_eq!(p.y, expected as f32);
        }
        assert_eq!(t.elevation(), -3.0);
    }

    #[test]
    fn normals_point_up() {
        let table = PermutationTable::new();
        let t = Terrain::generate(&table, 30.0, 16, 0.0);
        for v in t.vertices() {
            assert!((v.normal.length() - 1.0).abs() < 1e-4);
            assert!(v.normal.y > 0.0);
        }
    }

    #[test]
    fn height_range_within_amplitude() {
        let table = PermutationTable::new();
        let t = Terrain::generate(&table, 60.0, 32, 0.0);
        let (lo, hi) = t.height_range();
        assert!(lo >= -2.0 && hi <= 2.0);
        assert!(lo < hi);
    }

    #[test]
    fn segment_count_bounded() {
        assert_eq!(clamp_segments(0), 1);
        assert_eq!(clamp_segments(96), 96);
        assert_eq!(clamp_segments(65_536), MAX_TERRAIN_SEGMENTS);
        assert_eq!(clamp_segments(u32::MAX), MAX_TERRAIN_SEGMENTS);
        // The largest grid still indexes with u32.
        let row = MAX_TERRAIN_SEGMENTS as u64 + 1;
        assert!(row * row <= u32::MAX as u64);
    }

    #[test]
    fn zero_segments_clamped() {
        let table = PermutationTable::new();
        let t = Terrain::generate(&table, 1.0, 0, 0.0);
        assert_eq!(t.segments(), 1);
        assert_eq!(t.vertices().len(), 4);
    }
}
