//! Topological checks on re-materialized meshes.

use crate::mesh::remesh::MeshData;
use hashbrown::HashMap;

/// Comprehensive manifold analysis results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifoldAnalysis {
    /// Every edge is shared by exactly two faces
    pub is_manifold: bool,
    /// Number of distinct undirected edges
    pub edge_count: usize,
    /// Number of boundary edges (0 for closed manifolds)
    pub boundary_edges: usize,
    /// Number of non-manifold edges (shared by >2 faces)
    pub non_manifold_edges: usize,
    /// Number of vertices no face references
    pub isolated_vertices: usize,
    /// No directed edge is used twice, so neighbouring faces agree on winding
    pub consistent_orientation: bool,
    /// Euler characteristic (V - E + F) over referenced vertices
    pub euler_characteristic: i64,
}

impl MeshData {
    /// Count edge usage over all faces.
    pub fn analyze_manifold(&self) -> ManifoldAnalysis {
        let mut undirected: HashMap<(usize, usize), usize> = HashMap::new();
        let mut directed: HashMap<(usize, usize), usize> = HashMap::new();
        let mut referenced = vec![false; self.vertices.len()];

        for face in &self.faces {
            let n = face.indices.len();
            for k in 0..n {
                let (a, b) = (face.indices[k], face.indices[(k + 1) % n]);
                if let Some(flag) = referenced.get_mut(a) {
                    *flag = true;
                }
                *directed.entry((a, b)).or_insert(0) += 1;
                *undirected.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }

        let boundary_edges = undirected.values().filter(|&&c| c == 1).count();
        let non_manifold_edges = undirected.values().filter(|&&c| c > 2).count();
        let used_vertices = referenced.iter().filter(|&&r| r).count();

        ManifoldAnalysis {
            is_manifold: boundary_edges == 0 && non_manifold_edges == 0,
            edge_count: undirected.len(),
            boundary_edges,
            non_manifold_edges,
            isolated_vertices: self.vertices.len() - used_vertices,
            consistent_orientation: directed.values().all(|&c| c == 1),
            euler_characteristic: used_vertices as i64 - undirected.len() as i64
                + self.faces.len() as i64,
        }
    }
}
