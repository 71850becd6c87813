//! Joining fill segments into closed rings.
//!
//! Every edge record may border a fill on its left (`fillStyle0`) and one on its right
//! (`fillStyle1`). Right-side segments are reversed by the caller, so inside this module the
//! fill always lies to the left of a segment and each fill's outline is a set of directed
//! cycles. Usually there is exactly one way to continue from a point; several candidates only
//! appear where outlines of the same fill touch at a vertex:
//!
//! ```text
//!          +<-----+
//! fill 1   |      ^
//!          v      |
//!          +----->o<-----+
//!                 |      ^  fill 1
//!                 v      |
//!                 +----->+
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::edge::segment::Segment;
use crate::foundation::core::PointKey;
use crate::foundation::error::{XflError, XflResult};

/// Fill style index (`index` attribute of a `FillStyle`).
pub type FillId = u32;

/// Open segments of one fill, keyed by start point.
#[derive(Default)]
struct FillGraph {
    origins: Vec<PointKey>,
    edges: HashMap<PointKey, Vec<Segment>>,
}

impl FillGraph {
    fn insert(&mut self, seg: Segment) {
        let key = PointKey::from(seg.start);
        let list = self.edges.entry(key).or_default();
        if list.is_empty() && !self.origins.contains(&key) {
            self.origins.push(key);
        }
        list.push(seg);
    }

    fn candidates(&self, at: PointKey) -> usize {
        self.edges.get(&at).map_or(0, Vec::len)
    }

    /// Depth-first search for a chain of unused segments from `at` back to `origin`.
    ///
    /// On success the chain's segments are removed from the graph and returned in path
    /// order. Points in `visited` may not be entered again, so rings never cross themselves.
    fn walk(
        &mut self,
        at: PointKey,
        origin: PointKey,
        visited: &mut HashSet<PointKey>,
    ) -> Option<Vec<Segment>> {
        for i in 0..self.candidates(at) {
            let next = PointKey::from(self.edges[&at][i].end());
            if next == origin {
                return self.take(at, i).map(|seg| vec![seg]);
            }
            if visited.insert(next) {
                match self.walk(next, origin, visited) {
                    Some(mut rest) => {
                        rest.push(self.take(at, i)?);
                        return Some(rest);
                    }
                    None => {
                        visited.remove(&next);
                    }
                }
            }
        }
        None
    }

    fn take(&mut self, at: PointKey, i: usize) -> Option<Segment> {
        let list = self.edges.get_mut(&at)?;
        (i < list.len()).then(|| list.remove(i))
    }
}

/// Join segments into closed rings, grouped by fill.
///
/// Input segments must already be oriented with their fill on the left. Closed segments pass
/// through as single rings. Rings are returned per fill in ascending fill order; within a
/// fill, closed inputs come first, then assembled rings in discovery order.
///
/// Fails with [`XflError::Assembly`] when an open segment cannot be completed into a ring,
/// which only happens for malformed input.
pub fn assemble_rings(
    segments: impl IntoIterator<Item = (Segment, FillId)>,
) -> XflResult<BTreeMap<FillId, Vec<Segment>>> {
    let mut rings: BTreeMap<FillId, Vec<Segment>> = BTreeMap::new();
    let mut graphs: BTreeMap<FillId, FillGraph> = BTreeMap::new();

    for (seg, fill) in segments {
        if seg.is_closed() {
            rings.entry(fill).or_default().push(seg);
        } else {
            graphs.entry(fill).or_default().insert(seg);
        }
    }

    for (fill, mut graph) in graphs {
        let origins = graph.origins.clone();
        for origin in origins {
            while let Some(first) = graph.edges.get_mut(&origin).and_then(Vec::pop) {
                let at = PointKey::from(first.end());
                let mut visited = HashSet::from([origin, at]);
                let chain = graph.walk(at, origin, &mut visited).ok_or_else(|| {
                    XflError::assembly(format!("failed to build shape for fill {fill}"))
                })?;

                let mut ring = first;
                for seg in chain.iter().rev() {
                    ring.join(seg);
                }
                rings.entry(fill).or_default().push(ring);
            }
        }
    }

    Ok(rings)
}

#[cfg(test)]
#[path = "../../tests/unit/edge/assemble.rs"]
mod tests;
