//! End-to-end routing scenarios.
//!
//! Self-loops, orthogonal detours, manual waypoint round-trips, and the
//! canvas-safety property for computed routes.

use inkdag::config::Config;
use inkdag::geometry::{segment_intersects_rect, Point};
use inkdag::layout::{compute, PathShape};
use inkdag::model::RoutingSpec;
use inkdag::parser::parse_diagram;

fn run(doc: &str) -> inkdag::layout::LayoutOutput {
    let diagram = parse_diagram(doc).expect("document must parse");
    compute(&diagram, &Config::default()).expect("pipeline must succeed")
}

// ===========================================================================
// 1. Self-loop arc (scenario S2)
// ===========================================================================

#[test]
fn test_self_loop_arc_on_top_side() {
    let output = run(
        r#"{"elements":[{"id":"x"}],
            "connections":[{"from":"x","to":"x",
                "routing":{"type":"arc","radius":50,"side":"top"}}]}"#,
    );
    let layout = &output.layout;

    let path = layout.edges[0].path.as_ref().expect("self-loop routed");
    let rect = layout.nodes["x"].rect();

    // Two endpoints 40 px apart on the top edge.
    assert_eq!(path.points.len(), 2);
    let span = path.points[0].distance(path.points[1]);
    assert!((span - 40.0).abs() < 1.0, "span was {}", span);
    for p in &path.points {
        assert!((p.y - rect.top()).abs() < 1.0, "endpoint on the top edge");
    }

    match path.shape {
        PathShape::Arc {
            center,
            radius,
            large_arc,
            ..
        } => {
            assert_eq!(radius, 50.0);
            assert!(center.y < rect.top(), "arc centre above the node");
            assert!(large_arc, "chord 40 < 2r 100 requires the large arc");
        }
        ref other => panic!("expected arc shape, got {:?}", other),
    }
}

// ===========================================================================
// 2. Orthogonal route around an intermediate node (scenario S4)
// ===========================================================================

#[test]
fn test_orthogonal_route_clears_intermediate_node() {
    // a and c share level 0; b sits between them one level down.
    let output = run(
        r#"{"elements":[{"id":"a"},{"id":"b"},{"id":"c"}],
            "connections":[
            {"from":"a","to":"c","routing":{"type":"orthogonal","preference":"vertical"}},
            {"from":"a","to":"b"},
            {"from":"c","to":"b"}]}"#,
    );
    let layout = &output.layout;
    assert_eq!(layout.nodes["a"].level, 0);
    assert_eq!(layout.nodes["c"].level, 0);
    assert_eq!(layout.nodes["b"].level, 1);

    let path = layout.edges[0].path.as_ref().unwrap();
    assert_eq!(path.points.len(), 4, "V-H-V route has four points");

    // Vertical, horizontal, vertical.
    assert!((path.points[0].x - path.points[1].x).abs() < 1e-6);
    assert!((path.points[1].y - path.points[2].y).abs() < 1e-6);
    assert!((path.points[2].x - path.points[3].x).abs() < 1e-6);

    let b_rect = layout.nodes["b"].rect();
    for pair in path.points.windows(2) {
        assert!(
            !segment_intersects_rect(pair[0], pair[1], &b_rect),
            "no segment may cross b's rectangle"
        );
    }
}

// ===========================================================================
// 3. Manual waypoints round-trip byte-exactly (Q7)
// ===========================================================================

#[test]
fn test_manual_routing_spec_survives_pipeline() {
    let doc = r#"{"elements":[{"id":"a"},{"id":"b"}],
        "connections":[{"from":"a","to":"b",
            "routing":{"type":"manual","waypoints":[[410.5,160.25],[900,480]]}}]}"#;
    let diagram = parse_diagram(doc).unwrap();
    let spec_before = serde_json::to_string(&diagram.connections[0].routing).unwrap();

    let output = compute(&diagram, &Config::default()).unwrap();
    let spec_after = serde_json::to_string(&output.layout.edges[0].routing).unwrap();
    assert_eq!(spec_before, spec_after, "manual spec must be untouched");

    // The computed path embeds the waypoints verbatim between the two
    // attachment points.
    let path = output.layout.edges[0].path.as_ref().unwrap();
    assert_eq!(path.points.len(), 4);
    assert_eq!(path.points[1], Point::new(410.5, 160.25));
    assert_eq!(path.points[2], Point::new(900.0, 480.0));
}

#[test]
fn test_legacy_waypoints_promote_to_manual() {
    let output = run(
        r#"{"elements":[{"id":"a"},{"id":"b"}],
            "connections":[{"from":"a","to":"b","waypoints":[[500,500]]}]}"#,
    );
    match output.layout.edges[0].routing {
        Some(RoutingSpec::Manual { ref waypoints }) => {
            assert_eq!(waypoints, &vec![Point::new(500.0, 500.0)]);
        }
        ref other => panic!("expected promotion to manual, got {:?}", other),
    }
}

// ===========================================================================
// 4. Routes stay inside the safety margin (Q4)
// ===========================================================================

#[test]
fn test_routed_paths_respect_canvas_safety_margin() {
    let output = run(
        r#"{"elements":[
            {"id":"a","type":"cloud"},{"id":"b"},{"id":"c"},{"id":"d"}],
            "connections":[
            {"from":"a","to":"b","routing":{"type":"bezier","curvature":0.8}},
            {"from":"b","to":"c","routing":{"type":"orthogonal","corner_radius":10}},
            {"from":"c","to":"d","routing":{"type":"straight"}},
            {"from":"a","to":"d","routing":{"type":"arc","radius":300,"side":"left"}}]}"#,
    );
    let cfg = Config::default();
    let canvas = output.render.canvas;

    for edge in &output.layout.edges {
        if matches!(edge.routing, Some(RoutingSpec::Manual { .. })) {
            continue;
        }
        let Some(path) = &edge.path else { continue };
        for p in &path.points {
            assert!(
                p.x >= cfg.route_safety_margin - 1.0
                    && p.x <= canvas.width - cfg.route_safety_margin + 1.0
                    && p.y >= cfg.route_safety_margin - 1.0
                    && p.y <= canvas.height - cfg.route_safety_margin + 1.0,
                "path point ({}, {}) outside safe area of {}x{} canvas",
                p.x,
                p.y,
                canvas.width,
                canvas.height
            );
        }
    }
}

// ===========================================================================
// 5. Direction markers survive to the render list
// ===========================================================================

#[test]
fn test_bidirectional_edge_rendered_with_both_markers() {
    let output = run(
        r#"{"elements":[{"id":"a"},{"id":"b"}],
            "connections":[{"from":"a","to":"b","direction":"bidirectional"}]}"#,
    );
    let icons = inkdag::icons::IconRegistry::default();
    let svg = inkdag::svg::write_svg(&output.render, &icons);
    assert!(svg.contains("marker-start=\"url(#arrow)\""));
    assert!(svg.contains("marker-end=\"url(#arrow)\""));
}

// ===========================================================================
// 6. Degenerate geometry recovers with a diagnostic
// ===========================================================================

#[test]
fn test_zero_radius_self_loop_snaps_with_diagnostic() {
    let output = run(
        r#"{"elements":[{"id":"x"}],
            "connections":[{"from":"x","to":"x",
                "routing":{"type":"arc","radius":0,"side":"bottom"}}]}"#,
    );
    let layout = &output.layout;
    assert!(layout
        .diagnostics
        .iter()
        .any(|d| d.kind == inkdag::diag::DiagnosticKind::NumericDegenerate));
    match layout.edges[0].path.as_ref().unwrap().shape {
        PathShape::Arc { radius, .. } => assert!(radius >= 1.0),
        ref other => panic!("expected arc, got {:?}", other),
    }
}
