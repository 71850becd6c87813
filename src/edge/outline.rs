use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::edge::assemble::{FillId, assemble_rings};
use crate::edge::segment::{Segment, SegmentBuilder};
use crate::foundation::error::XflResult;
use crate::project::model::EdgeRecord;

/// Stroke style index (`index` attribute of a `StrokeStyle`).
pub type StrokeId = u32;

/// Decoded geometry of a shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    /// Closed rings per fill, in ascending fill order.
    pub fills: BTreeMap<FillId, Vec<Segment>>,
    /// Stroke segments per stroke style, in order of first use.
    pub strokes: Vec<(StrokeId, Vec<Segment>)>,
}

impl Outline {
    fn stroke_mut(&mut self, id: StrokeId) -> &mut Vec<Segment> {
        let pos = match self.strokes.iter().position(|(s, _)| *s == id) {
            Some(pos) => pos,
            None => {
                self.strokes.push((id, Vec::new()));
                self.strokes.len() - 1
            }
        };
        &mut self.strokes[pos].1
    }
}

/// Decode edge records into fill rings and stroke paths.
///
/// Every segment is routed to each side that carries a fill (the right side reversed so the
/// fill lies on its left) and to its stroke, if any. Fill segments are then assembled into
/// closed rings; stroke segments are kept as decoded.
pub fn outline_edges(records: &[EdgeRecord]) -> XflResult<Outline> {
    let mut outline = Outline::default();
    let mut fill_segments: Vec<(Segment, FillId)> = Vec::new();

    for record in records {
        let mut sides: SmallVec<[(FillId, bool); 2]> = SmallVec::new();
        if let Some(fill) = record.fill_left {
            sides.push((fill, false));
        }
        if let Some(fill) = record.fill_right {
            sides.push((fill, true));
        }

        for seg in SegmentBuilder::new(&record.edges) {
            let seg = seg?;
            for &(fill, reverse) in &sides {
                let oriented = if reverse { seg.reversed() } else { seg.clone() };
                fill_segments.push((oriented, fill));
            }
            if let Some(stroke) = record.stroke {
                outline.stroke_mut(stroke).push(seg);
            }
        }
    }

    outline.fills = assemble_rings(fill_segments)?;
    Ok(outline)
}

#[cfg(test)]
#[path = "../../tests/unit/edge/outline.rs"]
mod tests;
