//! Vertex compaction after face filtering.

use hashbrown::HashMap;

use crate::mesh::Mesh;

/// Remove vertices that no submesh references.
///
/// Surviving vertices keep their relative order. Each submesh is rebased so
/// its `base_vertex` is the lowest vertex it references (0 when empty) and
/// its indices are rewritten relative to that. Bounds are left as they are,
/// since no referenced geometry moves.
///
/// Returns the number of removed vertices.
pub fn compact_vertices(mesh: &mut Mesh) -> usize {
    let vertex_count = mesh.positions.len();
    let mut used = vec![false; vertex_count];
    for sub in &mesh.submeshes {
        for vertex in sub.absolute_indices() {
            if let Some(flag) = usize::try_from(vertex).ok().and_then(|v| used.get_mut(v)) {
                *flag = true;
            }
        }
    }

    let kept = used.iter().filter(|&&u| u).count();
    if kept == vertex_count {
        return 0;
    }

    let mut remap: HashMap<u64, u32> = HashMap::with_capacity(kept);
    let mut next = 0u32;
    for (old, _) in used.iter().enumerate().filter(|(_, u)| **u) {
        remap.insert(old as u64, next);
        next += 1;
    }

    mesh.positions = retain_used(std::mem::take(&mut mesh.positions), &used);
    if let Some(normals) = mesh.normals.take() {
        mesh.normals = Some(retain_used(normals, &used));
    }
    if let Some(colors) = mesh.colors.take() {
        mesh.colors = Some(retain_used(colors, &used));
    }
    for channel in mesh.uv_channels.iter_mut() {
        if let Some(uvs) = channel.take() {
            *channel = Some(retain_used(uvs, &used));
        }
    }

    for sub in &mut mesh.submeshes {
        // Out-of-range references have no vertex to keep; they map to 0
        let absolute: Vec<u32> = sub
            .absolute_indices()
            .map(|v| remap.get(&v).copied().unwrap_or(0))
            .collect();
        let base = absolute.iter().copied().min().unwrap_or(0);
        sub.base_vertex = base;
        sub.indices = absolute.into_iter().map(|v| v - base).collect();
    }

    let removed = vertex_count - kept;
    tracing::debug!(
        "Compacted mesh '{}': {} -> {} vertices",
        mesh.name,
        vertex_count,
        kept
    );
    removed
}

fn retain_used<T>(values: Vec<T>, used: &[bool]) -> Vec<T> {
    values
        .into_iter()
        .zip(used.iter())
        .filter_map(|(value, &keep)| keep.then_some(value))
        .collect()
}
