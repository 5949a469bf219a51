//! SVG serialization of an assembled render list.
//!
//! A thin writer: the layout pipeline decides geometry and paint order, and
//! this module only turns [`RenderList`] items into SVG 2.0 bytes. The defs
//! section carries one text-glow filter, a linear gradient per distinct
//! element colour, and a shared arrowhead marker. Every drawable gets a
//! `<desc>` element with its trace identifier for round-tripping.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::geometry::Rect;
use crate::icons::{IconKind, IconRegistry, Shape};
use crate::layout::{
    EdgePath, HAnchor, LabelPlacement, PathShape, RenderList, Renderable, VAnchor,
};
use crate::model::Direction;

const EDGE_STROKE: &str = "#4a4a4a";

/// Serialize a render list to an SVG document string.
pub fn write_svg(render: &RenderList, icons: &IconRegistry) -> String {
    let mut out = String::new();
    let width = fmt_num(render.canvas.width);
    let height = fmt_num(render.canvas.height);

    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = width,
        h = height
    );

    write_defs(&mut out, render);

    for item in &render.items {
        match item {
            Renderable::Container {
                id,
                rect,
                color,
                trace,
            } => write_container(&mut out, id, rect, color, trace),
            Renderable::Icon {
                id,
                shape,
                rect,
                color,
                trace,
            } => write_icon(&mut out, icons, id, shape, rect, color, trace),
            Renderable::Edge {
                direction,
                path,
                trace,
                ..
            } => write_edge(&mut out, *direction, path, trace),
            Renderable::Label {
                placement, trace, ..
            } => write_label(&mut out, placement, trace),
        }
    }

    out.push_str("</svg>\n");
    out
}

// ── Defs ────────────────────────────────────────────────────────────────

fn write_defs(out: &mut String, render: &RenderList) {
    let mut colors: BTreeSet<&str> = BTreeSet::new();
    for item in &render.items {
        match item {
            Renderable::Container { color, .. } | Renderable::Icon { color, .. } => {
                colors.insert(color.as_str());
            }
            _ => {}
        }
    }

    out.push_str("<defs>\n");
    let _ = writeln!(
        out,
        "<filter id=\"text-glow\" x=\"-20%\" y=\"-20%\" width=\"140%\" height=\"140%\">\
         <feGaussianBlur in=\"SourceAlpha\" stdDeviation=\"{}\" result=\"blur\"/>\
         <feFlood flood-color=\"#ffffff\" flood-opacity=\"0.9\"/>\
         <feComposite in2=\"blur\" operator=\"in\"/>\
         <feMerge><feMergeNode/><feMergeNode in=\"SourceGraphic\"/></feMerge>\
         </filter>",
        fmt_num(render.glow.std_deviation)
    );
    for color in colors {
        let _ = writeln!(
            out,
            "<linearGradient id=\"{id}\" x1=\"0\" y1=\"0\" x2=\"0\" y2=\"1\">\
             <stop offset=\"0\" stop-color=\"{c}\" stop-opacity=\"0.95\"/>\
             <stop offset=\"1\" stop-color=\"{c}\" stop-opacity=\"0.55\"/>\
             </linearGradient>",
            id = gradient_id(color),
            c = escape(color)
        );
    }
    out.push_str(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"9\" refY=\"5\" \
         markerWidth=\"7\" markerHeight=\"7\" orient=\"auto-start-reverse\">\
         <path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"#4a4a4a\"/></marker>\n",
    );
    out.push_str("</defs>\n");
}

/// Stable gradient id for a colour value.
fn gradient_id(color: &str) -> String {
    let slug: String = color
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("grad-{}", slug)
}

// ── Containers and icons ────────────────────────────────────────────────

fn write_container(out: &mut String, id: &str, rect: &Rect, color: &str, trace: &str) {
    let _ = writeln!(
        out,
        "<g class=\"container\" data-id=\"{id}\"><desc>{trace}</desc>\
         <rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" rx=\"6\" \
         fill=\"url(#{grad})\" fill-opacity=\"0.25\" stroke=\"{c}\" stroke-width=\"1.5\"/></g>",
        id = escape(id),
        trace = escape(trace),
        x = fmt_num(rect.x),
        y = fmt_num(rect.y),
        w = fmt_num(rect.width),
        h = fmt_num(rect.height),
        grad = gradient_id(color),
        c = escape(color)
    );
}

fn write_icon(
    out: &mut String,
    icons: &IconRegistry,
    id: &str,
    shape: &Shape,
    rect: &Rect,
    color: &str,
    trace: &str,
) {
    let _ = writeln!(
        out,
        "<g class=\"icon\" data-id=\"{}\"><desc>{}</desc>",
        escape(id),
        escape(trace)
    );
    match shape {
        Shape::Custom(name) => {
            if let Some(body) = icons.svg_body(name) {
                // User artwork is authored on a 100x100 canvas and scaled
                // into the icon rect.
                let _ = writeln!(
                    out,
                    "<g transform=\"translate({x} {y}) scale({sx} {sy})\">{body}</g>",
                    x = fmt_num(rect.x),
                    y = fmt_num(rect.y),
                    sx = fmt_num(rect.width / 100.0),
                    sy = fmt_num(rect.height / 100.0),
                    body = body
                );
            } else {
                write_builtin(out, IconKind::Unknown, rect, color);
            }
        }
        Shape::Builtin(kind) => write_builtin(out, *kind, rect, color),
    }
    out.push_str("</g>\n");
}

fn write_builtin(out: &mut String, kind: IconKind, rect: &Rect, color: &str) {
    let grad = gradient_id(color);
    let x = rect.x;
    let y = rect.y;
    let w = rect.width;
    let h = rect.height;
    let stroke = escape(color);

    let body = match kind {
        IconKind::Server => format!(
            "<rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" rx=\"4\" fill=\"url(#{grad})\" stroke=\"{stroke}\"/>\
             <line x1=\"{x1}\" y1=\"{ya}\" x2=\"{x2}\" y2=\"{ya}\" stroke=\"{stroke}\"/>\
             <line x1=\"{x1}\" y1=\"{yb}\" x2=\"{x2}\" y2=\"{yb}\" stroke=\"{stroke}\"/>\
             <circle cx=\"{cx}\" cy=\"{cy}\" r=\"2\" fill=\"{stroke}\"/>",
            x = fmt_num(x),
            y = fmt_num(y),
            w = fmt_num(w),
            h = fmt_num(h),
            x1 = fmt_num(x + w * 0.1),
            x2 = fmt_num(x + w * 0.9),
            ya = fmt_num(y + h / 3.0),
            yb = fmt_num(y + 2.0 * h / 3.0),
            cx = fmt_num(x + w * 0.82),
            cy = fmt_num(y + h * 0.85),
        ),
        IconKind::Cloud => format!(
            "<ellipse cx=\"{cx}\" cy=\"{cy}\" rx=\"{rx}\" ry=\"{ry}\" fill=\"url(#{grad})\" stroke=\"{stroke}\"/>",
            cx = fmt_num(x + w / 2.0),
            cy = fmt_num(y + h / 2.0),
            rx = fmt_num(w / 2.0),
            ry = fmt_num(h / 2.0),
        ),
        IconKind::Database => format!(
            "<path d=\"M {x} {ty} v {body_h} a {rx} {ry} 0 0 0 {w} 0 v -{body_h}\" fill=\"url(#{grad})\" stroke=\"{stroke}\"/>\
             <ellipse cx=\"{cx}\" cy=\"{ty}\" rx=\"{rx}\" ry=\"{ry}\" fill=\"url(#{grad})\" stroke=\"{stroke}\"/>",
            x = fmt_num(x),
            w = fmt_num(w),
            cx = fmt_num(x + w / 2.0),
            ty = fmt_num(y + h * 0.15),
            body_h = fmt_num(h * 0.7),
            rx = fmt_num(w / 2.0),
            ry = fmt_num(h * 0.15),
        ),
        IconKind::Building => format!(
            "<rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" fill=\"url(#{grad})\" stroke=\"{stroke}\"/>\
             <rect x=\"{wx1}\" y=\"{wy1}\" width=\"{ww}\" height=\"{wh}\" fill=\"{stroke}\" fill-opacity=\"0.5\"/>\
             <rect x=\"{wx2}\" y=\"{wy1}\" width=\"{ww}\" height=\"{wh}\" fill=\"{stroke}\" fill-opacity=\"0.5\"/>\
             <rect x=\"{wx1}\" y=\"{wy2}\" width=\"{ww}\" height=\"{wh}\" fill=\"{stroke}\" fill-opacity=\"0.5\"/>\
             <rect x=\"{wx2}\" y=\"{wy2}\" width=\"{ww}\" height=\"{wh}\" fill=\"{stroke}\" fill-opacity=\"0.5\"/>",
            x = fmt_num(x),
            y = fmt_num(y),
            w = fmt_num(w),
            h = fmt_num(h),
            ww = fmt_num(w * 0.2),
            wh = fmt_num(h * 0.2),
            wx1 = fmt_num(x + w * 0.15),
            wx2 = fmt_num(x + w * 0.6),
            wy1 = fmt_num(y + h * 0.15),
            wy2 = fmt_num(y + h * 0.55),
        ),
        IconKind::Firewall => format!(
            "<rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" fill=\"url(#{grad})\" stroke=\"{stroke}\"/>\
             <line x1=\"{x}\" y1=\"{ya}\" x2=\"{xr}\" y2=\"{ya}\" stroke=\"{stroke}\"/>\
             <line x1=\"{x}\" y1=\"{yb}\" x2=\"{xr}\" y2=\"{yb}\" stroke=\"{stroke}\"/>\
             <line x1=\"{bx1}\" y1=\"{y}\" x2=\"{bx1}\" y2=\"{ya}\" stroke=\"{stroke}\"/>\
             <line x1=\"{bx2}\" y1=\"{ya}\" x2=\"{bx2}\" y2=\"{yb}\" stroke=\"{stroke}\"/>\
             <line x1=\"{bx1}\" y1=\"{yb}\" x2=\"{bx1}\" y2=\"{ybt}\" stroke=\"{stroke}\"/>",
            x = fmt_num(x),
            y = fmt_num(y),
            w = fmt_num(w),
            h = fmt_num(h),
            xr = fmt_num(x + w),
            ya = fmt_num(y + h / 3.0),
            yb = fmt_num(y + 2.0 * h / 3.0),
            ybt = fmt_num(y + h),
            bx1 = fmt_num(x + w / 2.0),
            bx2 = fmt_num(x + w / 4.0),
        ),
        IconKind::Router => format!(
            "<ellipse cx=\"{cx}\" cy=\"{cy}\" rx=\"{rx}\" ry=\"{ry}\" fill=\"url(#{grad})\" stroke=\"{stroke}\"/>\
             <path d=\"M {ax1} {cy} h {aw} M {ax2} {cy} h -{aw}\" stroke=\"{stroke}\" stroke-width=\"2\"/>",
            cx = fmt_num(x + w / 2.0),
            cy = fmt_num(y + h / 2.0),
            rx = fmt_num(w / 2.0),
            ry = fmt_num(h / 2.0),
            ax1 = fmt_num(x + w * 0.12),
            ax2 = fmt_num(x + w * 0.88),
            aw = fmt_num(w * 0.2),
        ),
        IconKind::Laptop => format!(
            "<rect x=\"{sx}\" y=\"{y}\" width=\"{sw}\" height=\"{sh}\" rx=\"2\" fill=\"url(#{grad})\" stroke=\"{stroke}\"/>\
             <path d=\"M {x} {by} h {w} l -{inset} -{bh} h -{iw} z\" fill=\"url(#{grad})\" stroke=\"{stroke}\"/>",
            x = fmt_num(x),
            w = fmt_num(w),
            sx = fmt_num(x + w * 0.12),
            sw = fmt_num(w * 0.76),
            y = fmt_num(y),
            sh = fmt_num(h * 0.7),
            by = fmt_num(y + h),
            bh = fmt_num(h * 0.3),
            inset = fmt_num(w * 0.12),
            iw = fmt_num(w * 0.76),
        ),
        IconKind::Computer => format!(
            "<rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{sh}\" rx=\"2\" fill=\"url(#{grad})\" stroke=\"{stroke}\"/>\
             <rect x=\"{fx}\" y=\"{fy}\" width=\"{fw}\" height=\"{fh}\" fill=\"{stroke}\"/>",
            x = fmt_num(x),
            y = fmt_num(y),
            w = fmt_num(w),
            sh = fmt_num(h * 0.75),
            fx = fmt_num(x + w * 0.35),
            fy = fmt_num(y + h * 0.75),
            fw = fmt_num(w * 0.3),
            fh = fmt_num(h * 0.25),
        ),
        IconKind::Document => format!(
            "<path d=\"M {x} {y} h {flat} l {fold} {fold} v {rest} h -{w} z\" fill=\"url(#{grad})\" stroke=\"{stroke}\"/>\
             <path d=\"M {fx} {y} v {fold} h {fold}\" fill=\"none\" stroke=\"{stroke}\"/>",
            x = fmt_num(x),
            y = fmt_num(y),
            w = fmt_num(w),
            flat = fmt_num(w * 0.8),
            fold = fmt_num(w * 0.2),
            rest = fmt_num(h - w * 0.2),
            fx = fmt_num(x + w * 0.8),
        ),
        IconKind::User => format!(
            "<circle cx=\"{cx}\" cy=\"{hy}\" r=\"{hr}\" fill=\"url(#{grad})\" stroke=\"{stroke}\"/>\
             <path d=\"M {sx} {by} a {sr} {sr} 0 0 1 {sw} 0 z\" fill=\"url(#{grad})\" stroke=\"{stroke}\"/>",
            cx = fmt_num(x + w / 2.0),
            hy = fmt_num(y + h * 0.3),
            hr = fmt_num(h * 0.25),
            sx = fmt_num(x + w * 0.2),
            by = fmt_num(y + h),
            sr = fmt_num(w * 0.3),
            sw = fmt_num(w * 0.6),
        ),
        // The fallback shape for unrecognized types: a banana held together
        // with a strip of tape.
        IconKind::Unknown => format!(
            "<path d=\"M {bx} {by} q {qx} {qy} {dx} 0 q -{midx} {peel} -{dx} 0 z\" \
             fill=\"#f5d547\" stroke=\"#8a6d1d\"/>\
             <rect x=\"{tx}\" y=\"{ty}\" width=\"{tw}\" height=\"{th}\" \
             fill=\"#cccccc\" fill-opacity=\"0.8\" stroke=\"#999999\" transform=\"rotate(-12 {tcx} {tcy})\"/>",
            bx = fmt_num(x + w * 0.1),
            by = fmt_num(y + h * 0.4),
            qx = fmt_num(w * 0.4),
            qy = fmt_num(-h * 0.5),
            dx = fmt_num(w * 0.8),
            midx = fmt_num(w * 0.4),
            peel = fmt_num(h * 0.7),
            tx = fmt_num(x + w * 0.38),
            ty = fmt_num(y + h * 0.25),
            tw = fmt_num(w * 0.24),
            th = fmt_num(h * 0.55),
            tcx = fmt_num(x + w * 0.5),
            tcy = fmt_num(y + h * 0.5),
        ),
    };
    out.push_str(&body);
    out.push('\n');
}

// ── Edges ───────────────────────────────────────────────────────────────

fn write_edge(out: &mut String, direction: Direction, path: &EdgePath, trace: &str) {
    let d = path_data(path);
    let markers = match direction {
        Direction::Forward => " marker-end=\"url(#arrow)\"".to_string(),
        Direction::Backward => " marker-start=\"url(#arrow)\"".to_string(),
        Direction::Bidirectional => {
            " marker-start=\"url(#arrow)\" marker-end=\"url(#arrow)\"".to_string()
        }
        Direction::None => String::new(),
    };
    let _ = writeln!(
        out,
        "<g class=\"edge\"><desc>{}</desc>\
         <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\"{}/></g>",
        escape(trace),
        d,
        EDGE_STROKE,
        markers
    );
}

/// SVG path data for a computed route.
pub fn path_data(path: &EdgePath) -> String {
    let points = &path.points;
    match &path.shape {
        PathShape::Line => {
            format!(
                "M {} {} L {} {}",
                fmt_num(points[0].x),
                fmt_num(points[0].y),
                fmt_num(points[1].x),
                fmt_num(points[1].y)
            )
        }
        PathShape::Polyline { corner_radius } => polyline_data(points, *corner_radius),
        PathShape::Cubic { c1, c2 } => format!(
            "M {} {} C {} {}, {} {}, {} {}",
            fmt_num(points[0].x),
            fmt_num(points[0].y),
            fmt_num(c1.x),
            fmt_num(c1.y),
            fmt_num(c2.x),
            fmt_num(c2.y),
            fmt_num(points[1].x),
            fmt_num(points[1].y)
        ),
        PathShape::Arc {
            radius,
            large_arc,
            sweep,
            ..
        } => format!(
            "M {} {} A {} {} 0 {} {} {} {}",
            fmt_num(points[0].x),
            fmt_num(points[0].y),
            fmt_num(*radius),
            fmt_num(*radius),
            u8::from(*large_arc),
            u8::from(*sweep),
            fmt_num(points[1].x),
            fmt_num(points[1].y)
        ),
    }
}

/// Polyline path data; corners become quadratic arcs tangent to both
/// incident segments when a radius is set.
fn polyline_data(points: &[crate::geometry::Point], radius: f64) -> String {
    let mut d = format!("M {} {}", fmt_num(points[0].x), fmt_num(points[0].y));
    if radius <= 0.0 || points.len() < 3 {
        for p in &points[1..] {
            let _ = write!(d, " L {} {}", fmt_num(p.x), fmt_num(p.y));
        }
        return d;
    }
    for i in 1..points.len() - 1 {
        let prev = points[i - 1];
        let corner = points[i];
        let next = points[i + 1];
        let r_in = radius.min(prev.distance(corner) / 2.0);
        let r_out = radius.min(corner.distance(next) / 2.0);
        let din = corner.direction_to(prev);
        let dout = corner.direction_to(next);
        let entry = crate::geometry::Point::new(corner.x + din.x * r_in, corner.y + din.y * r_in);
        let exit =
            crate::geometry::Point::new(corner.x + dout.x * r_out, corner.y + dout.y * r_out);
        let _ = write!(
            d,
            " L {} {} Q {} {} {} {}",
            fmt_num(entry.x),
            fmt_num(entry.y),
            fmt_num(corner.x),
            fmt_num(corner.y),
            fmt_num(exit.x),
            fmt_num(exit.y)
        );
    }
    let last = points[points.len() - 1];
    let _ = write!(d, " L {} {}", fmt_num(last.x), fmt_num(last.y));
    d
}

// ── Labels ──────────────────────────────────────────────────────────────

fn write_label(out: &mut String, placement: &LabelPlacement, trace: &str) {
    let anchor = match placement.h_anchor {
        HAnchor::Start => "start",
        HAnchor::Middle => "middle",
        HAnchor::End => "end",
    };
    let line_height = if placement.lines.is_empty() {
        0.0
    } else {
        placement.size.height / placement.lines.len() as f64
    };
    // First baseline from the vertical anchor; ascent sits at ~0.8em.
    let first_baseline = match placement.v_anchor {
        VAnchor::Top => placement.pos.y + line_height * 0.8,
        VAnchor::Middle => placement.pos.y - placement.size.height / 2.0 + line_height * 0.8,
        VAnchor::Bottom => placement.pos.y - placement.size.height + line_height * 0.8,
    };

    let _ = writeln!(
        out,
        "<g class=\"label\"><desc>{}</desc>\
         <text text-anchor=\"{}\" font-family=\"sans-serif\" font-size=\"13\" \
         fill=\"#1a1a1a\" filter=\"url(#text-glow)\">",
        escape(trace),
        anchor
    );
    for (i, line) in placement.lines.iter().enumerate() {
        let _ = writeln!(
            out,
            "<tspan x=\"{}\" y=\"{}\">{}</tspan>",
            fmt_num(placement.pos.x),
            fmt_num(first_baseline + i as f64 * line_height),
            escape(line)
        );
    }
    out.push_str("</text></g>\n");
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Minimal numeric formatting: integers print without a fraction,
/// everything else keeps two decimals.
fn fmt_num(value: f64) -> String {
    if (value - value.round()).abs() < 1e-6 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.2}", value)
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::geometry::Point;
    use crate::layout::compute;
    use crate::model::{Connection, Diagram, Element};

    fn render_doc(diagram: &Diagram) -> String {
        let output = compute(diagram, &Config::default()).unwrap();
        let icons = IconRegistry::new(diagram.icons.clone());
        write_svg(&output.render, &icons)
    }

    fn simple_diagram() -> Diagram {
        let mut a = Element::new("a");
        a.kind = Some("server".to_string());
        a.label = Some("App <1>".to_string());
        let mut b = Element::new("b");
        b.kind = Some("database".to_string());
        let mut conn = Connection::new("a", "b");
        conn.direction = crate::model::Direction::Forward;
        Diagram {
            canvas: None,
            icons: indexmap::IndexMap::new(),
            elements: vec![a, b],
            connections: vec![conn],
        }
    }

    #[test]
    fn test_svg_document_structure() {
        let svg = render_doc(&simple_diagram());
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.ends_with("</svg>\n"));
        assert!(svg.contains("<defs>"));
        assert!(svg.contains("text-glow"));
        assert!(svg.contains("stdDeviation=\"2\""));
    }

    #[test]
    fn test_labels_escaped() {
        let svg = render_doc(&simple_diagram());
        assert!(svg.contains("App &lt;1&gt;"));
        assert!(!svg.contains("App <1>"));
    }

    #[test]
    fn test_forward_edge_gets_end_marker() {
        let svg = render_doc(&simple_diagram());
        assert!(svg.contains("marker-end=\"url(#arrow)\""));
        assert!(!svg.contains("marker-start"));
    }

    #[test]
    fn test_traces_emitted_as_desc() {
        let svg = render_doc(&simple_diagram());
        assert!(svg.contains("<desc>ndfn:icon:server:a</desc>"));
        assert!(svg.contains("<desc>ndfn:edge:0:a-&gt;b</desc>"));
    }

    #[test]
    fn test_gradient_per_color() {
        let mut diagram = simple_diagram();
        diagram.elements[0].color = Some("#ff0000".to_string());
        let svg = render_doc(&diagram);
        assert!(svg.contains("grad--ff0000"));
        assert!(svg.contains("grad-steelblue"));
    }

    #[test]
    fn test_custom_icon_passthrough() {
        let mut diagram = simple_diagram();
        diagram
            .icons
            .insert("widget".to_string(), "<circle r=\"42\"/>".to_string());
        diagram.elements[0].kind = Some("widget".to_string());
        let svg = render_doc(&diagram);
        assert!(svg.contains("<circle r=\"42\"/>"), "raw SVG body passes through");
    }

    #[test]
    fn test_unknown_type_renders_banana() {
        let mut diagram = simple_diagram();
        diagram.elements[0].kind = Some("flying-toaster".to_string());
        let svg = render_doc(&diagram);
        assert!(svg.contains("#f5d547"), "fallback shape expected");
    }

    #[test]
    fn test_path_data_line() {
        let path = EdgePath {
            shape: PathShape::Line,
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 20.0)],
        };
        assert_eq!(path_data(&path), "M 0 0 L 10 20");
    }

    #[test]
    fn test_path_data_arc_flags() {
        let path = EdgePath {
            shape: PathShape::Arc {
                center: Point::new(0.0, -50.0),
                radius: 50.0,
                large_arc: true,
                sweep: true,
            },
            points: vec![Point::new(-20.0, 0.0), Point::new(20.0, 0.0)],
        };
        assert_eq!(path_data(&path), "M -20 0 A 50 50 0 1 1 20 0");
    }

    #[test]
    fn test_polyline_with_rounded_corner_uses_quadratic() {
        let path = EdgePath {
            shape: PathShape::Polyline { corner_radius: 5.0 },
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
            ],
        };
        let d = path_data(&path);
        assert!(d.contains(" Q 10 0 "), "corner control at the vertex: {}", d);
    }

    #[test]
    fn test_fmt_num_trims_integers() {
        assert_eq!(fmt_num(42.0), "42");
        assert_eq!(fmt_num(42.125), "42.13");
        assert_eq!(fmt_num(-0.0), "0");
    }
}
