//! Edge router (stage E).
//!
//! Recomputes every non-manual route now that pixel coordinates are
//! stable. Five kinds: straight, orthogonal with optional rounded corners,
//! cubic bezier, circular arc (including self-loops), and manual waypoint
//! lists which pass through untouched apart from the boundary attachment
//! points at either end.

use crate::config::Config;
use crate::diag::DiagnosticKind;
use crate::geometry::{ccw, Point};
use crate::layout::{EdgePath, Layout, NodeState, PathShape};
use crate::model::{ArcSide, AxisPreference, RoutingSpec};

pub fn route(layout: &mut Layout, config: &Config) {
    for index in 0..layout.edges.len() {
        if layout.edges[index].dropped {
            continue;
        }
        let (from, to) = {
            let edge = &layout.edges[index];
            (edge.from.clone(), edge.to.clone())
        };

        // Resolve both endpoints to their outermost visible ancestors so
        // edges leave enclosing rectangles at the border, not from inside.
        let from_vis = resolve_visible(layout, &from, &to);
        let to_vis = resolve_visible(layout, &to, &from);

        let spec = layout.edges[index].routing.clone();
        let path = if from_vis == to_vis {
            build_self_loop(layout, index, &from_vis, spec, config)
        } else {
            build_route(layout, index, &from_vis, &to_vis, spec, config)
        };
        layout.edges[index].path = Some(path);
    }
}

// ── Endpoint resolution ─────────────────────────────────────────────────

/// Walk the containment chain of `endpoint` outward and return the
/// outermost ancestor that is not part of `other`'s containment chain.
/// Falls back to the endpoint itself when every ancestor is shared.
fn resolve_visible(layout: &Layout, endpoint: &str, other: &str) -> String {
    let mut other_chain: Vec<String> = vec![other.to_string()];
    other_chain.extend(layout.ancestors(other));

    let mut chain = vec![endpoint.to_string()];
    chain.extend(layout.ancestors(endpoint));

    chain
        .into_iter()
        .filter(|id| !other_chain.contains(id))
        .last()
        .unwrap_or_else(|| endpoint.to_string())
}

// ── Attachment ──────────────────────────────────────────────────────────

/// Attachment point on a node's boundary facing `toward`. Containers
/// attach on their rectangle border; icons attach at a kind-specific
/// radial offset from their centre (cloud nodes use the wider offset to
/// clear the ellipse).
fn attachment_point(node: &NodeState, toward: Point, config: &Config) -> Point {
    let rect = node.rect();
    if node.is_container() {
        return rect.boundary_toward(toward);
    }
    let (boundary, offset) = if node.shape.is_ellipse() {
        (rect.ellipse_boundary_toward(toward), config.cloud_edge_offset)
    } else {
        (rect.boundary_toward(toward), config.edge_offset)
    };
    // The marker inset wins when the shape boundary sits closer than the
    // kind-specific offset.
    let distance = node.center.distance(boundary).max(offset);
    let dir = node.center.direction_to(toward);
    Point::new(
        node.center.x + dir.x * distance,
        node.center.y + dir.y * distance,
    )
}

// ── Route construction ──────────────────────────────────────────────────

fn build_route(
    layout: &mut Layout,
    edge_index: usize,
    from_vis: &str,
    to_vis: &str,
    spec: Option<RoutingSpec>,
    config: &Config,
) -> EdgePath {
    let from_node = layout.nodes[from_vis].clone();
    let to_node = layout.nodes[to_vis].clone();

    match spec {
        None | Some(RoutingSpec::Straight) => straight(&from_node, &to_node, config),
        Some(RoutingSpec::Orthogonal {
            corner_radius,
            preference,
        }) => orthogonal(&from_node, &to_node, corner_radius, preference, config),
        Some(RoutingSpec::Bezier { curvature }) => {
            bezier(layout, edge_index, &from_node, &to_node, curvature, config)
        }
        Some(RoutingSpec::Arc { radius, side }) => {
            arc(layout, edge_index, &from_node, &to_node, radius, side, config)
        }
        Some(RoutingSpec::Manual { waypoints }) => {
            manual(&from_node, &to_node, &waypoints, config)
        }
    }
}

fn straight(from: &NodeState, to: &NodeState, config: &Config) -> EdgePath {
    let start = attachment_point(from, to.center, config);
    let end = attachment_point(to, from.center, config);
    EdgePath {
        shape: PathShape::Line,
        points: vec![start, end],
    }
}

fn orthogonal(
    from: &NodeState,
    to: &NodeState,
    corner_radius: f64,
    preference: AxisPreference,
    config: &Config,
) -> EdgePath {
    let dx = to.center.x - from.center.x;
    let dy = to.center.y - from.center.y;
    let horizontal_first = match preference {
        AxisPreference::Horizontal => true,
        AxisPreference::Vertical => false,
        AxisPreference::Auto => dx.abs() > dy.abs(),
    };

    let points = if horizontal_first {
        // H-V-H through the horizontal midpoint. Exit and entry are both
        // horizontal; aligned nodes detour sideways instead of collapsing.
        let aligned = dx.abs() < 1e-9;
        let sign = if aligned { 1.0 } else { dx.signum() };
        let start =
            attachment_point(from, Point::new(from.center.x + sign, from.center.y), config);
        let entry_sign = if aligned { sign } else { -sign };
        let end =
            attachment_point(to, Point::new(to.center.x + entry_sign, to.center.y), config);
        let mut mid_x = (start.x + end.x) / 2.0;
        if aligned {
            mid_x += config.edge_offset;
        }
        vec![
            start,
            Point::new(mid_x, start.y),
            Point::new(mid_x, end.y),
            end,
        ]
    } else {
        // V-H-V through the vertical midpoint; same-level endpoints detour
        // below so the crossbar clears both shapes.
        let aligned = dy.abs() < 1e-9;
        let sign = if aligned { 1.0 } else { dy.signum() };
        let start =
            attachment_point(from, Point::new(from.center.x, from.center.y + sign), config);
        let entry_sign = if aligned { sign } else { -sign };
        let end =
            attachment_point(to, Point::new(to.center.x, to.center.y + entry_sign), config);
        let mut mid_y = (start.y + end.y) / 2.0;
        if aligned {
            mid_y += config.edge_offset;
        }
        vec![
            start,
            Point::new(start.x, mid_y),
            Point::new(end.x, mid_y),
            end,
        ]
    };

    let points = eliminate_collinear(points);
    let corner_radius = clamp_corner_radius(corner_radius, &points);
    EdgePath {
        shape: PathShape::Polyline { corner_radius },
        points,
    }
}

/// Drop duplicate and collinear interior vertices.
fn eliminate_collinear(points: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if let Some(last) = out.last() {
            if last.distance(p) < 1e-9 {
                continue;
            }
        }
        out.push(p);
    }
    let mut i = 1;
    while i + 1 < out.len() {
        if ccw(out[i - 1], out[i], out[i + 1]).abs() < 1e-9 {
            out.remove(i);
        } else {
            i += 1;
        }
    }
    out
}

/// A corner radius larger than half the shorter incident segment would
/// self-intersect; clamp it down.
fn clamp_corner_radius(radius: f64, points: &[Point]) -> f64 {
    if radius <= 0.0 || points.len() < 3 {
        return radius.max(0.0);
    }
    let mut limit = f64::INFINITY;
    for i in 1..points.len() - 1 {
        let incoming = points[i - 1].distance(points[i]) / 2.0;
        let outgoing = points[i].distance(points[i + 1]) / 2.0;
        limit = limit.min(incoming).min(outgoing);
    }
    radius.min(limit)
}

fn bezier(
    layout: &mut Layout,
    edge_index: usize,
    from: &NodeState,
    to: &NodeState,
    curvature: f64,
    config: &Config,
) -> EdgePath {
    let start = attachment_point(from, to.center, config);
    let mut end = attachment_point(to, from.center, config);

    let mut chord = start.distance(end);
    if chord < 1e-9 {
        let (edge_from, edge_to) = {
            let e = &layout.edges[edge_index];
            (e.from.clone(), e.to.clone())
        };
        layout.warn(
            DiagnosticKind::NumericDegenerate,
            format!(
                "zero-length bezier chord on '{}' -> '{}'; snapped to one pixel",
                edge_from, edge_to
            ),
        );
        end = Point::new(start.x + 1.0, start.y);
        chord = 1.0;
    }

    let vx = end.x - start.x;
    let vy = end.y - start.y;
    // Perpendicular offset with the same sign at both controls keeps the
    // curve free of inflection.
    let px = vy / chord;
    let py = -vx / chord;
    let k = curvature * chord / 2.0;
    let c1 = Point::new(start.x + vx / 3.0 + px * k, start.y + vy / 3.0 + py * k);
    let c2 = Point::new(
        start.x + 2.0 * vx / 3.0 + px * k,
        start.y + 2.0 * vy / 3.0 + py * k,
    );

    EdgePath {
        shape: PathShape::Cubic { c1, c2 },
        points: vec![start, end],
    }
}

fn side_vector(side: ArcSide) -> Point {
    match side {
        ArcSide::Top => Point::new(0.0, -1.0),
        ArcSide::Bottom => Point::new(0.0, 1.0),
        ArcSide::Left => Point::new(-1.0, 0.0),
        ArcSide::Right => Point::new(1.0, 0.0),
    }
}

/// SVG sweep flag for an arc from `start` to `end` bulging toward `side`.
fn sweep_toward(start: Point, end: Point, side: Point) -> bool {
    let vx = end.x - start.x;
    let vy = end.y - start.y;
    vx * side.y - vy * side.x < 0.0
}

fn arc(
    layout: &mut Layout,
    edge_index: usize,
    from: &NodeState,
    to: &NodeState,
    radius: Option<f64>,
    side: ArcSide,
    config: &Config,
) -> EdgePath {
    let start = attachment_point(from, to.center, config);
    let mut end = attachment_point(to, from.center, config);

    let mut chord = start.distance(end);
    if chord < 1e-9 {
        let (edge_from, edge_to) = {
            let e = &layout.edges[edge_index];
            (e.from.clone(), e.to.clone())
        };
        layout.warn(
            DiagnosticKind::NumericDegenerate,
            format!(
                "zero-length arc chord on '{}' -> '{}'; snapped to one pixel",
                edge_from, edge_to
            ),
        );
        end = Point::new(start.x + 1.0, start.y);
        chord = 1.0;
    }

    let mut radius = radius.unwrap_or(chord);
    if radius < 1.0 {
        let (edge_from, edge_to) = {
            let e = &layout.edges[edge_index];
            (e.from.clone(), e.to.clone())
        };
        layout.warn(
            DiagnosticKind::NumericDegenerate,
            format!(
                "degenerate arc radius on '{}' -> '{}'; snapped to one pixel",
                edge_from, edge_to
            ),
        );
        radius = 1.0;
    }
    if radius < chord / 2.0 {
        radius = chord / 2.0;
    }

    let side_vec = side_vector(side);
    let mid = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
    let h = (radius * radius - (chord / 2.0) * (chord / 2.0)).max(0.0).sqrt();
    // Centre sits opposite the bulge side.
    let mut px = (end.y - start.y) / chord;
    let mut py = -(end.x - start.x) / chord;
    if px * side_vec.x + py * side_vec.y > 0.0 {
        px = -px;
        py = -py;
    }
    let center = Point::new(mid.x + px * h, mid.y + py * h);

    // The short arc of a wide-radius circle renders nearly flat; use the
    // large arc whenever the chord is shorter than the diameter.
    let large_arc = chord < 2.0 * radius;
    let sweep = sweep_toward(start, end, side_vec);

    EdgePath {
        shape: PathShape::Arc {
            center,
            radius,
            large_arc,
            sweep,
        },
        points: vec![start, end],
    }
}

fn build_self_loop(
    layout: &mut Layout,
    edge_index: usize,
    node_id: &str,
    spec: Option<RoutingSpec>,
    config: &Config,
) -> EdgePath {
    let node = layout.nodes[node_id].clone();

    if let Some(RoutingSpec::Manual { waypoints }) = spec {
        return manual(&node, &node, &waypoints, config);
    }
    let (radius, side) = match spec {
        Some(RoutingSpec::Arc { radius, side }) => {
            (radius.unwrap_or(config.self_loop_radius), side)
        }
        _ => (config.self_loop_radius, ArcSide::Top),
    };

    let mut radius = radius;
    if radius < 1.0 {
        layout.warn(
            DiagnosticKind::NumericDegenerate,
            format!("degenerate self-loop radius on '{}'; snapped to one pixel", node_id),
        );
        radius = 1.0;
    }

    let rect = node.rect();
    let offset = config.self_loop_offset;
    let side_vec = side_vector(side);
    let (start, end) = match side {
        ArcSide::Top => (
            Point::new(node.center.x - offset, rect.top()),
            Point::new(node.center.x + offset, rect.top()),
        ),
        ArcSide::Bottom => (
            Point::new(node.center.x + offset, rect.bottom()),
            Point::new(node.center.x - offset, rect.bottom()),
        ),
        ArcSide::Left => (
            Point::new(rect.left(), node.center.y + offset),
            Point::new(rect.left(), node.center.y - offset),
        ),
        ArcSide::Right => (
            Point::new(rect.right(), node.center.y - offset),
            Point::new(rect.right(), node.center.y + offset),
        ),
    };

    let center = Point::new(
        node.center.x + side_vec.x * radius,
        node.center.y + side_vec.y * radius,
    );
    let chord = start.distance(end);
    let large_arc = chord < 2.0 * radius;
    let sweep = sweep_toward(start, end, side_vec);

    EdgePath {
        shape: PathShape::Arc {
            center,
            radius,
            large_arc,
            sweep,
        },
        points: vec![start, end],
    }
}

/// Manual waypoints are consumed verbatim; only the two boundary
/// attachments are added around them.
fn manual(from: &NodeState, to: &NodeState, waypoints: &[Point], config: &Config) -> EdgePath {
    let toward_first = waypoints.first().copied().unwrap_or(to.center);
    let toward_last = waypoints.last().copied().unwrap_or(from.center);
    let mut points = Vec::with_capacity(waypoints.len() + 2);
    points.push(attachment_point(from, toward_first, config));
    points.extend_from_slice(waypoints);
    points.push(attachment_point(to, toward_last, config));
    EdgePath {
        shape: PathShape::Polyline { corner_radius: 0.0 },
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::segment_intersects_rect;
    use crate::icons::IconRegistry;
    use crate::layout::{centrality, expand, inflate, optimize, placer, redistribute, structure, topology};
    use crate::model::{ChildRef, Connection, Diagram, Element, Scope};

    fn routed(elements: Vec<Element>, connections: Vec<Connection>) -> Layout {
        let diagram = Diagram {
            canvas: None,
            icons: indexmap::IndexMap::new(),
            elements,
            connections,
        };
        let cfg = Config::default();
        let mut layout =
            Layout::from_diagram(&diagram, &cfg, &IconRegistry::default()).unwrap();
        structure::analyse(&mut layout, &cfg).unwrap();
        topology::tag(&mut layout);
        centrality::order(&mut layout);
        placer::place(&mut layout, &cfg);
        optimize::refine(&mut layout, &cfg);
        expand::expand(&mut layout, &cfg);
        inflate::inflate(&mut layout, &cfg);
        redistribute::redistribute(&mut layout, &cfg);
        route(&mut layout, &cfg);
        layout
    }

    #[test]
    fn test_straight_route_descends_between_chain_nodes() {
        let layout = routed(
            vec![Element::new("a"), Element::new("b")],
            vec![Connection::new("a", "b")],
        );
        let path = layout.edges[0].path.as_ref().unwrap();
        assert_eq!(path.shape, PathShape::Line);
        let a = &layout.nodes["a"];
        let b = &layout.nodes["b"];
        assert_eq!(path.points[0].x, a.center.x);
        assert!(path.points[0].y > a.center.y, "leaves a downward");
        assert!(path.points[1].y < b.center.y, "enters b from above");
    }

    #[test]
    fn test_self_loop_arc_top() {
        let mut conn = Connection::new("x", "x");
        conn.routing = Some(RoutingSpec::Arc {
            radius: Some(50.0),
            side: ArcSide::Top,
        });
        let layout = routed(vec![Element::new("x")], vec![conn]);

        let path = layout.edges[0].path.as_ref().unwrap();
        let rect = layout.nodes["x"].rect();
        assert_eq!(path.points.len(), 2);
        let span = path.points[0].distance(path.points[1]);
        assert!((span - 40.0).abs() < 1e-6, "endpoints 40 px apart, got {}", span);
        assert!((path.points[0].y - rect.top()).abs() < 1e-6);
        match path.shape {
            PathShape::Arc {
                center,
                radius,
                large_arc,
                ..
            } => {
                assert_eq!(radius, 50.0);
                assert!(large_arc, "short chord must take the large arc");
                assert!(center.y < rect.top(), "arc centre above the node");
            }
            ref other => panic!("expected arc, got {:?}", other),
        }
    }

    #[test]
    fn test_self_loop_without_spec_defaults_to_arc() {
        let layout = routed(vec![Element::new("x")], vec![Connection::new("x", "x")]);
        let path = layout.edges[0].path.as_ref().unwrap();
        assert!(matches!(path.shape, PathShape::Arc { .. }));
    }

    #[test]
    fn test_orthogonal_vertical_preference_routes_around() {
        // a and c share level 0 with b between them one level down; the
        // V-H-V route must not clip b.
        let mut conn = Connection::new("a", "c");
        conn.routing = Some(RoutingSpec::Orthogonal {
            corner_radius: 0.0,
            preference: AxisPreference::Vertical,
        });
        let layout = routed(
            vec![
                Element::new("a"),
                Element::new("b"),
                Element::new("c"),
            ],
            vec![conn, Connection::new("a", "b"), Connection::new("c", "b")],
        );

        let path = layout.edges[0].path.as_ref().unwrap();
        assert_eq!(path.points.len(), 4, "V-H-V shape has four points");
        // First and last segments vertical, middle horizontal.
        assert!((path.points[0].x - path.points[1].x).abs() < 1e-6);
        assert!((path.points[1].y - path.points[2].y).abs() < 1e-6);
        assert!((path.points[2].x - path.points[3].x).abs() < 1e-6);

        let b_rect = layout.nodes["b"].rect();
        for pair in path.points.windows(2) {
            assert!(
                !segment_intersects_rect(pair[0], pair[1], &b_rect),
                "route must not cross the intermediate node"
            );
        }
    }

    #[test]
    fn test_orthogonal_corner_radius_clamped() {
        let mut conn = Connection::new("a", "b");
        conn.routing = Some(RoutingSpec::Orthogonal {
            corner_radius: 1e6,
            preference: AxisPreference::Horizontal,
        });
        let layout = routed(
            vec![Element::new("a"), Element::new("b")],
            vec![conn, Connection::new("a", "b")],
        );
        let path = layout.edges[0].path.as_ref().unwrap();
        match path.shape {
            PathShape::Polyline { corner_radius } => {
                let shortest_half = path
                    .points
                    .windows(2)
                    .map(|w| w[0].distance(w[1]) / 2.0)
                    .fold(f64::INFINITY, f64::min);
                assert!(corner_radius <= shortest_half + 1e-6);
            }
            ref other => panic!("expected polyline, got {:?}", other),
        }
    }

    #[test]
    fn test_bezier_controls_at_thirds() {
        let mut conn = Connection::new("a", "b");
        conn.routing = Some(RoutingSpec::Bezier { curvature: 0.0 });
        let layout = routed(
            vec![Element::new("a"), Element::new("b")],
            vec![conn],
        );
        let path = layout.edges[0].path.as_ref().unwrap();
        match path.shape {
            PathShape::Cubic { c1, c2 } => {
                let (start, end) = (path.points[0], path.points[1]);
                // Zero curvature puts the controls exactly on the chord.
                assert!((c1.y - (start.y + (end.y - start.y) / 3.0)).abs() < 1e-6);
                assert!((c2.y - (start.y + 2.0 * (end.y - start.y) / 3.0)).abs() < 1e-6);
            }
            ref other => panic!("expected cubic, got {:?}", other),
        }
    }

    #[test]
    fn test_manual_waypoints_preserved_verbatim() {
        let waypoints = vec![Point::new(400.0, 160.0), Point::new(900.0, 480.0)];
        let mut conn = Connection::new("a", "b");
        conn.routing = Some(RoutingSpec::Manual {
            waypoints: waypoints.clone(),
        });
        let layout = routed(
            vec![Element::new("a"), Element::new("b")],
            vec![conn],
        );

        // Spec untouched.
        match layout.edges[0].routing {
            Some(RoutingSpec::Manual { waypoints: ref w }) => assert_eq!(*w, waypoints),
            ref other => panic!("routing spec must survive, got {:?}", other),
        }
        // Path: attachment, the waypoints verbatim, attachment.
        let path = layout.edges[0].path.as_ref().unwrap();
        assert_eq!(path.points.len(), 4);
        assert_eq!(&path.points[1..3], waypoints.as_slice());
    }

    #[test]
    fn test_edge_from_contained_child_attaches_at_container_border() {
        let mut grp = Element::new("grp");
        grp.contains = vec![ChildRef {
            id: "inner".to_string(),
            scope: Scope::Full,
        }];
        let layout = routed(
            vec![grp, Element::new("inner"), Element::new("out")],
            vec![Connection::new("inner", "out")],
        );

        let path = layout.edges[0].path.as_ref().unwrap();
        let grp_rect = layout.nodes["grp"].rect();
        let start = path.points[0];
        // The start point lies on the container boundary, not inside it.
        let on_boundary = (start.x - grp_rect.left()).abs() < 1e-6
            || (start.x - grp_rect.right()).abs() < 1e-6
            || (start.y - grp_rect.top()).abs() < 1e-6
            || (start.y - grp_rect.bottom()).abs() < 1e-6;
        assert!(on_boundary, "edge must start on the container border");
    }

    #[test]
    fn test_edges_between_siblings_in_same_container_stay_direct() {
        let mut grp = Element::new("grp");
        grp.contains = vec![
            ChildRef {
                id: "u".to_string(),
                scope: Scope::Full,
            },
            ChildRef {
                id: "v".to_string(),
                scope: Scope::Full,
            },
        ];
        let layout = routed(
            vec![grp, Element::new("u"), Element::new("v")],
            vec![Connection::new("u", "v")],
        );
        assert_eq!(resolve_visible(&layout, "u", "v"), "u");
        assert_eq!(resolve_visible(&layout, "v", "u"), "v");
    }

    #[test]
    fn test_dropped_edge_gets_no_path() {
        let layout = routed(
            vec![Element::new("a")],
            vec![Connection::new("a", "ghost")],
        );
        assert!(layout.edges[0].dropped);
        assert!(layout.edges[0].path.is_none());
    }
}
