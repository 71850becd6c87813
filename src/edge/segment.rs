use crate::edge::token::{Token, Tokenizer};
use crate::foundation::core::{Point, PointKey, Rect, fmt_num};
use crate::foundation::error::{XflError, XflResult};

/// Destination of one drawing command after the initial move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Vertex {
    /// Straight line to `to`.
    Line(Point),
    /// Quadratic Bézier through `ctrl` to `to`.
    Quad {
        /// Control point.
        ctrl: Point,
        /// Destination.
        to: Point,
    },
}

impl Vertex {
    /// End point of the command.
    pub fn to(self) -> Point {
        match self {
            Self::Line(to) | Self::Quad { to, .. } => to,
        }
    }
}

/// Open or closed polyline with quadratic pieces, starting with a move to `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Move destination.
    pub start: Point,
    /// Drawing commands in order.
    pub vertices: Vec<Vertex>,
}

impl Segment {
    /// Segment with no drawing commands yet.
    pub fn new(start: Point) -> Self {
        Self {
            start,
            vertices: Vec::new(),
        }
    }

    /// Last point of the segment (`start` when there are no vertices).
    pub fn end(&self) -> Point {
        self.vertices.last().map_or(self.start, |v| v.to())
    }

    /// Return `true` when the segment ends where it starts.
    pub fn is_closed(&self) -> bool {
        PointKey::from(self.start) == PointKey::from(self.end())
    }

    /// Number of drawing commands, not counting the initial move.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// The same path traversed backwards.
    ///
    /// Each vertex is re-targeted at the previous vertex's end point; a quadratic keeps its
    /// control point.
    pub fn reversed(&self) -> Segment {
        let mut vertices = Vec::with_capacity(self.vertices.len());
        for (i, v) in self.vertices.iter().enumerate().rev() {
            let prev = if i == 0 {
                self.start
            } else {
                self.vertices[i - 1].to()
            };
            vertices.push(match *v {
                Vertex::Line(_) => Vertex::Line(prev),
                Vertex::Quad { ctrl, .. } => Vertex::Quad { ctrl, to: prev },
            });
        }
        Segment {
            start: self.end(),
            vertices,
        }
    }

    /// Append `next`, which must start where `self` ends. Its move point is dropped.
    pub fn join(&mut self, next: &Segment) {
        debug_assert_eq!(PointKey::from(self.end()), PointKey::from(next.start));
        self.vertices.extend_from_slice(&next.vertices);
    }

    /// Control-polygon bounds. Quadratic hulls contain their curves, so this is conservative.
    pub fn bounds(&self) -> Rect {
        let mut r = Rect::from_points(self.start, self.start);
        for v in &self.vertices {
            if let Vertex::Quad { ctrl, .. } = v {
                r = r.union_pt(*ctrl);
            }
            r = r.union_pt(v.to());
        }
        r
    }

    /// SVG path data for this segment.
    ///
    /// Closed segments end with `Z`; a final straight line back to the start is folded into
    /// the `Z`.
    pub fn to_path_data(&self) -> String {
        let mut out = String::new();
        self.write_path_data(&mut out);
        out
    }

    pub(crate) fn write_path_data(&self, out: &mut String) {
        fn push_point(out: &mut String, p: Point) {
            out.push(' ');
            out.push_str(&fmt_num(p.x));
            out.push(' ');
            out.push_str(&fmt_num(p.y));
        }

        let closed = !self.vertices.is_empty() && self.is_closed();
        let mut vertices = self.vertices.as_slice();
        if closed {
            if let Some((Vertex::Line(_), rest)) = vertices.split_last() {
                vertices = rest;
            }
        }

        out.push('M');
        push_point(out, self.start);
        for v in vertices {
            match *v {
                Vertex::Line(to) => {
                    out.push_str(" L");
                    push_point(out, to);
                }
                Vertex::Quad { ctrl, to } => {
                    out.push_str(" Q");
                    push_point(out, ctrl);
                    push_point(out, to);
                }
            }
        }
        if closed {
            out.push_str(" Z");
        }
    }
}

/// Path data for several segments, space separated.
pub fn segments_to_path_data<'a>(segments: impl IntoIterator<Item = &'a Segment>) -> String {
    let mut out = String::new();
    for s in segments {
        if !out.is_empty() {
            out.push(' ');
        }
        s.write_path_data(&mut out);
    }
    out
}

/// Lazy builder turning an `edges` attribute into segments.
///
/// A move to a new point closes out the segment in progress; a move to the current point is
/// ignored. Segments made only of a move are dropped.
pub struct SegmentBuilder<'a> {
    tokens: Tokenizer<'a>,
    current: Option<Segment>,
    started: bool,
    done: bool,
}

impl<'a> SegmentBuilder<'a> {
    /// Build segments from an `edges` attribute.
    pub fn new(edges: &'a str) -> Self {
        Self {
            tokens: Tokenizer::new(edges),
            current: None,
            started: false,
            done: false,
        }
    }

    fn next_token(&mut self) -> XflResult<Option<Token>> {
        loop {
            match self.tokens.next().transpose()? {
                Some(Token::Select(_)) => continue,
                other => return Ok(other),
            }
        }
    }

    fn number(&mut self) -> XflResult<f64> {
        match self.next_token()? {
            Some(Token::Number(v)) => Ok(v),
            Some(t) => Err(XflError::format(format!("expected number, found {t:?}"))),
            None => Err(XflError::format("unexpected end of edges, expected number")),
        }
    }

    fn point(&mut self) -> XflResult<Point> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(Point::new(x, y))
    }

    fn finish_current(&mut self) -> Option<Segment> {
        self.current.take().filter(|s| !s.vertices.is_empty())
    }

    fn step(&mut self) -> XflResult<Option<Segment>> {
        if !self.started {
            self.started = true;
            match self.next_token()? {
                Some(Token::MoveTo) => {}
                Some(t) => {
                    return Err(XflError::format(format!(
                        "edges must start with a move command, found {t:?}"
                    )));
                }
                None => return Err(XflError::format("edges must start with a move command")),
            }
            let start = self.point()?;
            self.current = Some(Segment::new(start));
        }

        loop {
            let Some(cmd) = self.next_token()? else {
                self.done = true;
                return Ok(self.finish_current());
            };
            let p = self.point()?;
            match cmd {
                Token::MoveTo => {
                    let moved = self
                        .current
                        .as_ref()
                        .is_none_or(|c| PointKey::from(c.end()) != PointKey::from(p));
                    if moved {
                        let finished = self.current.replace(Segment::new(p));
                        if let Some(seg) = finished.filter(|s| !s.vertices.is_empty()) {
                            return Ok(Some(seg));
                        }
                    }
                }
                Token::LineTo => self.push(Vertex::Line(p)),
                Token::QuadTo => {
                    let to = self.point()?;
                    self.push(Vertex::Quad { ctrl: p, to });
                }
                Token::Number(_) | Token::Select(_) => {
                    return Err(XflError::format(format!("expected command, found {cmd:?}")));
                }
            }
        }
    }

    fn push(&mut self, v: Vertex) {
        if let Some(current) = self.current.as_mut() {
            current.vertices.push(v);
        }
    }
}

impl Iterator for SegmentBuilder<'_> {
    type Item = XflResult<Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(seg)) => Some(Ok(seg)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode every segment of an `edges` attribute.
pub fn parse_edges(edges: &str) -> XflResult<Vec<Segment>> {
    SegmentBuilder::new(edges).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/edge/segment.rs"]
mod tests;
