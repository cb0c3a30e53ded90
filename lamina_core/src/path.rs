// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path data in two interchangeable forms.
//!
//! - **Instructions** ([`PathInstruction`]): a drawing-command sequence, the
//!   form stored on path layers and fed to geometry construction.
//! - **Nodes** ([`PathNode`]): anchor points with optional incoming and
//!   outgoing control points, the form edited by node tools.
//!
//! # Canonical node lists
//!
//! Conversion between the two is lossless for line and cubic segments when
//! the node list is canonical:
//!
//! - A control point equal to its anchor is written as absent.
//! - The last node of every figure carries a [`FigureEnd`] marker.
//! - The first node of an open figure has no incoming control, and the last
//!   node of an open figure has no outgoing control.
//!
//! Quadratic segments are elevated to cubics, and arcs are approximated by
//! cubics within a tolerance, so those do not survive a round trip.

use alloc::vec::Vec;

use kurbo::{Arc, BezPath, PathEl, Point, QuadBez, SvgArc, Vec2};

/// An elliptical arc segment in SVG endpoint parameterization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcSegment {
    /// End point.
    pub to: Point,
    /// Ellipse radii.
    pub radii: Vec2,
    /// Ellipse rotation in radians.
    pub x_rotation: f64,
    /// Whether to take the longer of the two candidate arcs.
    pub large_arc: bool,
    /// Whether the arc sweeps in the positive-angle direction.
    pub sweep: bool,
}

/// One drawing command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathInstruction {
    /// Start a new figure.
    MoveTo(Point),
    /// Straight segment.
    LineTo(Point),
    /// Quadratic segment: control, end.
    QuadTo(Point, Point),
    /// Cubic segment: first control, second control, end.
    CubicTo(Point, Point, Point),
    /// Elliptical arc.
    ArcTo(ArcSegment),
    /// Close the current figure.
    Close,
}

/// How a figure ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FigureEnd {
    /// The figure is left open.
    Open,
    /// The figure closes back to its first node.
    Closed,
}

/// An editable anchor point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathNode {
    /// Anchor position.
    pub position: Point,
    /// Control point of the segment arriving at this node.
    pub incoming: Option<Point>,
    /// Control point of the segment leaving this node.
    pub outgoing: Option<Point>,
    /// Set on the last node of a figure.
    pub end: Option<FigureEnd>,
}

impl PathNode {
    /// Creates a corner node with no control points.
    #[must_use]
    pub const fn corner(position: Point) -> Self {
        Self {
            position,
            incoming: None,
            outgoing: None,
            end: None,
        }
    }

    /// Returns this node with a figure-end marker.
    #[must_use]
    pub const fn ending(mut self, end: FigureEnd) -> Self {
        self.end = Some(end);
        self
    }
}

/// Path geometry stored as instructions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathData {
    instructions: Vec<PathInstruction>,
}

impl PathData {
    /// Creates path data from an instruction sequence.
    #[must_use]
    pub const fn new(instructions: Vec<PathInstruction>) -> Self {
        Self { instructions }
    }

    /// Creates path data from a node list.
    #[must_use]
    pub fn from_nodes(nodes: &[PathNode]) -> Self {
        Self::new(instructions_from_nodes(nodes))
    }

    /// Creates path data from a kurbo path.
    #[must_use]
    pub fn from_bez_path(path: &BezPath) -> Self {
        let instructions = path
            .elements()
            .iter()
            .map(|el| match *el {
                PathEl::MoveTo(p) => PathInstruction::MoveTo(p),
                PathEl::LineTo(p) => PathInstruction::LineTo(p),
                PathEl::QuadTo(c, p) => PathInstruction::QuadTo(c, p),
                PathEl::CurveTo(c1, c2, p) => PathInstruction::CubicTo(c1, c2, p),
                PathEl::ClosePath => PathInstruction::Close,
            })
            .collect();
        Self::new(instructions)
    }

    /// Returns the instruction sequence.
    #[must_use]
    pub fn instructions(&self) -> &[PathInstruction] {
        &self.instructions
    }

    /// Converts to a node list, approximating arcs within `tolerance`.
    #[must_use]
    pub fn to_nodes(&self, tolerance: f64) -> Vec<PathNode> {
        nodes_from_instructions(&self.instructions, tolerance)
    }

    /// Builds a kurbo path, approximating arcs within `tolerance`.
    #[must_use]
    pub fn to_bez_path(&self, tolerance: f64) -> BezPath {
        let mut path = BezPath::new();
        let mut current = Point::ORIGIN;
        let mut start = Point::ORIGIN;
        let mut open = false;
        for ins in &self.instructions {
            if !open && !matches!(ins, PathInstruction::MoveTo(_) | PathInstruction::Close) {
                path.move_to(current);
                start = current;
                open = true;
            }
            match *ins {
                PathInstruction::MoveTo(p) => {
                    path.move_to(p);
                    start = p;
                    current = p;
                    open = true;
                }
                PathInstruction::LineTo(p) => {
                    path.line_to(p);
                    current = p;
                }
                PathInstruction::QuadTo(c, p) => {
                    path.quad_to(c, p);
                    current = p;
                }
                PathInstruction::CubicTo(c1, c2, p) => {
                    path.curve_to(c1, c2, p);
                    current = p;
                }
                PathInstruction::ArcTo(arc) => {
                    for el in arc_elements(current, &arc, tolerance) {
                        path.push(el);
                    }
                    current = arc.to;
                }
                PathInstruction::Close => {
                    if open {
                        path.close_path();
                    }
                    current = start;
                    open = false;
                }
            }
        }
        path
    }
}

/// Approximates an arc from `from` as cubic (or line) path elements.
fn arc_elements(from: Point, arc: &ArcSegment, tolerance: f64) -> Vec<PathEl> {
    let svg = SvgArc {
        from,
        to: arc.to,
        radii: arc.radii,
        x_rotation: arc.x_rotation,
        large_arc: arc.large_arc,
        sweep: arc.sweep,
    };
    match Arc::from_svg_arc(&svg) {
        Some(arc) => arc.append_iter(tolerance).collect(),
        None => alloc::vec![PathEl::LineTo(svg.to)],
    }
}

fn control(point: Point, anchor: Point) -> Option<Point> {
    (point != anchor).then_some(point)
}

/// Converts a node list to instructions.
///
/// A closed figure whose closing segment is curved gets an explicit
/// [`CubicTo`](PathInstruction::CubicTo) back to its first node. A closed
/// figure whose last node sits on its first node and closes straight gets an
/// explicit [`LineTo`](PathInstruction::LineTo), so the duplicate node
/// survives the trip back.
#[must_use]
pub fn instructions_from_nodes(nodes: &[PathNode]) -> Vec<PathInstruction> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < nodes.len() {
        let end = nodes[start..]
            .iter()
            .position(|n| n.end.is_some())
            .map_or(nodes.len() - 1, |offset| start + offset);

        out.push(PathInstruction::MoveTo(nodes[start].position));
        for pair in nodes[start..=end].windows(2) {
            out.push(segment(&pair[0], &pair[1]));
        }

        if nodes[end].end == Some(FigureEnd::Closed) {
            let first = &nodes[start];
            let last = &nodes[end];
            if last.outgoing.is_some() || first.incoming.is_some() {
                out.push(segment(last, first));
            } else if end > start && last.position == first.position {
                out.push(PathInstruction::LineTo(first.position));
            }
            out.push(PathInstruction::Close);
        }
        start = end + 1;
    }
    out
}

fn segment(from: &PathNode, to: &PathNode) -> PathInstruction {
    if from.outgoing.is_none() && to.incoming.is_none() {
        PathInstruction::LineTo(to.position)
    } else {
        PathInstruction::CubicTo(
            from.outgoing.unwrap_or(from.position),
            to.incoming.unwrap_or(to.position),
            to.position,
        )
    }
}

/// Converts instructions to a canonical node list.
///
/// Quadratics are elevated to cubics and arcs are approximated by cubics
/// within `tolerance`. A segment that returns to the figure's first node
/// immediately before a close is folded into the first node.
#[must_use]
pub fn nodes_from_instructions(instructions: &[PathInstruction], tolerance: f64) -> Vec<PathNode> {
    let mut builder = NodeBuilder::default();
    for ins in instructions {
        match *ins {
            PathInstruction::MoveTo(p) => builder.move_to(p),
            PathInstruction::LineTo(p) => builder.line_to(p),
            PathInstruction::QuadTo(c, p) => {
                let cubic = QuadBez::new(builder.current, c, p).raise();
                builder.cubic_to(cubic.p1, cubic.p2, p);
            }
            PathInstruction::CubicTo(c1, c2, p) => builder.cubic_to(c1, c2, p),
            PathInstruction::ArcTo(arc) => {
                for el in arc_elements(builder.current, &arc, tolerance) {
                    match el {
                        PathEl::CurveTo(c1, c2, p) => builder.cubic_to(c1, c2, p),
                        PathEl::LineTo(p) => builder.line_to(p),
                        _ => {}
                    }
                }
            }
            PathInstruction::Close => builder.close(),
        }
    }
    builder.finish()
}

#[derive(Default)]
struct NodeBuilder {
    nodes: Vec<PathNode>,
    /// Index of the first node of the figure being built.
    figure: Option<usize>,
    current: Point,
}

impl NodeBuilder {
    fn end_open_figure(&mut self) {
        if self.figure.take().is_some() {
            if let Some(last) = self.nodes.last_mut() {
                last.end = Some(FigureEnd::Open);
            }
        }
    }

    fn ensure_figure(&mut self) {
        if self.figure.is_none() {
            self.nodes.push(PathNode::corner(self.current));
            self.figure = Some(self.nodes.len() - 1);
        }
    }

    fn move_to(&mut self, p: Point) {
        self.end_open_figure();
        self.current = p;
        self.ensure_figure();
    }

    fn line_to(&mut self, p: Point) {
        self.ensure_figure();
        self.nodes.push(PathNode::corner(p));
        self.current = p;
    }

    fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.ensure_figure();
        if let Some(last) = self.nodes.last_mut() {
            last.outgoing = control(c1, last.position);
        }
        self.nodes.push(PathNode {
            position: p,
            incoming: control(c2, p),
            outgoing: None,
            end: None,
        });
        self.current = p;
    }

    fn close(&mut self) {
        let Some(first) = self.figure.take() else {
            return;
        };
        let start = self.nodes[first].position;
        let last = self.nodes.len() - 1;
        if last > first && self.nodes[last].position == start {
            if let Some(closing) = self.nodes.pop() {
                self.nodes[first].incoming = closing.incoming;
            }
        }
        if let Some(node) = self.nodes.last_mut() {
            node.end = Some(FigureEnd::Closed);
        }
        self.current = start;
    }

    fn finish(mut self) -> Vec<PathNode> {
        self.end_open_figure();
        self.nodes
    }
}
