//! Outline geometry conversions
//!
//! Icon SVGs are flattened into a single [`BezPath`] in font units, and
//! font-unit paths are turned into UFO contours for compilation.

use super::FontMetadata;
use kurbo::{Affine, BezPath, PathEl, Point};
use norad::{Contour, ContourPoint, PointType};

/// One icon's geometry, already in font units (y up, baseline at 0)
#[derive(Debug, Clone, PartialEq)]
pub struct IconOutline {
    pub path: BezPath,
    pub advance: f64,
}

impl IconOutline {
    pub fn is_empty(&self) -> bool {
        self.path.elements().is_empty()
    }
}

/// Parse an icon SVG and map every filled path into font units
pub fn icon_outline(svg_data: &[u8], meta: &FontMetadata) -> Result<IconOutline, usvg::Error> {
    let tree = usvg::Tree::from_data(svg_data, &usvg::Options::default())?;
    let size = tree.size();
    let (width, height) = (size.width() as f64, size.height() as f64);

    let scale = if meta.normalize && height > 0.0 {
        meta.font_height / height
    } else {
        1.0
    };
    // SVG is y-down from the top of the canvas, fonts are y-up from the baseline
    let to_font_units = Affine::new([scale, 0.0, 0.0, -scale, 0.0, height * scale - meta.descent]);

    let mut path = BezPath::new();
    collect_filled_paths(tree.root(), &mut path);
    path.apply_affine(to_font_units);

    Ok(IconOutline {
        path: round_path(&path),
        advance: (width * scale).round(),
    })
}

fn collect_filled_paths(group: &usvg::Group, out: &mut BezPath) {
    for node in group.children() {
        match node {
            usvg::Node::Group(group) => collect_filled_paths(group, out),
            usvg::Node::Path(path) => {
                if path.fill().is_none() || !path.is_visible() {
                    tracing::debug!("Skipping unfilled path '{}'", path.id());
                    continue;
                }
                let transform = path.abs_transform();
                let affine = Affine::new([
                    transform.sx as f64,
                    transform.ky as f64,
                    transform.kx as f64,
                    transform.sy as f64,
                    transform.tx as f64,
                    transform.ty as f64,
                ]);
                let mut local = to_bez_path(path.data());
                local.apply_affine(affine);
                for el in local.elements() {
                    out.push(*el);
                }
            }
            _ => {
                tracing::debug!("Ignoring non-path SVG node '{}'", node.id());
            }
        }
    }
}

fn to_bez_path(data: &usvg::tiny_skia_path::Path) -> BezPath {
    use usvg::tiny_skia_path::PathSegment;

    let mut path = BezPath::new();
    for segment in data.segments() {
        match segment {
            PathSegment::MoveTo(p) => path.move_to((p.x as f64, p.y as f64)),
            PathSegment::LineTo(p) => path.line_to((p.x as f64, p.y as f64)),
            PathSegment::QuadTo(c, p) => {
                path.quad_to((c.x as f64, c.y as f64), (p.x as f64, p.y as f64))
            }
            PathSegment::CubicTo(c1, c2, p) => path.curve_to(
                (c1.x as f64, c1.y as f64),
                (c2.x as f64, c2.y as f64),
                (p.x as f64, p.y as f64),
            ),
            PathSegment::Close => path.close_path(),
        }
    }
    path
}

fn round_point(p: Point) -> Point {
    Point::new((p.x * 100.0).round() / 100.0, (p.y * 100.0).round() / 100.0)
}

/// Round every coordinate to two decimals
pub fn round_path(path: &BezPath) -> BezPath {
    path.elements()
        .iter()
        .map(|el| match *el {
            PathEl::MoveTo(p) => PathEl::MoveTo(round_point(p)),
            PathEl::LineTo(p) => PathEl::LineTo(round_point(p)),
            PathEl::QuadTo(c, p) => PathEl::QuadTo(round_point(c), round_point(p)),
            PathEl::CurveTo(c1, c2, p) => {
                PathEl::CurveTo(round_point(c1), round_point(c2), round_point(p))
            }
            PathEl::ClosePath => PathEl::ClosePath,
        })
        .collect()
}

fn on_curve(p: Point, typ: PointType) -> ContourPoint {
    ContourPoint::new(p.x, p.y, typ, false, None, None)
}

fn off_curve(p: Point) -> ContourPoint {
    ContourPoint::new(p.x, p.y, PointType::OffCurve, false, None, None)
}

fn same_position(a: &ContourPoint, b: &ContourPoint) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

/// Close a contour in UFO terms
///
/// A closed contour has no `Move` point: the segment arriving back at the
/// start decides the first point's type, and its off-curve points wrap
/// around to the end of the list.
fn close_contour(mut points: Vec<ContourPoint>) -> Option<Contour> {
    if points.len() < 2 {
        return None;
    }
    let last_is_start = points
        .last()
        .map(|last| last.typ != PointType::OffCurve && same_position(last, &points[0]))
        .unwrap_or(false);
    if last_is_start {
        if let Some(last) = points.pop() {
            points[0].typ = last.typ;
        }
    } else {
        points[0].typ = PointType::Line;
    }
    if points.len() < 2 {
        return None;
    }
    Some(Contour::new(points, None))
}

/// Convert a font-unit path into UFO contours
pub fn bezpath_to_contours(path: &BezPath) -> Vec<Contour> {
    let mut contours = Vec::new();
    let mut points: Vec<ContourPoint> = Vec::new();

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                // An unclosed subpath stays open
                if points.len() > 1 {
                    contours.push(Contour::new(std::mem::take(&mut points), None));
                }
                points.clear();
                points.push(on_curve(p, PointType::Move));
            }
            PathEl::LineTo(p) => points.push(on_curve(p, PointType::Line)),
            PathEl::QuadTo(c, p) => {
                points.push(off_curve(c));
                points.push(on_curve(p, PointType::QCurve));
            }
            PathEl::CurveTo(c1, c2, p) => {
                points.push(off_curve(c1));
                points.push(off_curve(c2));
                points.push(on_curve(p, PointType::Curve));
            }
            PathEl::ClosePath => {
                if let Some(contour) = close_contour(std::mem::take(&mut points)) {
                    contours.push(contour);
                }
            }
        }
    }
    if points.len() > 1 {
        contours.push(Contour::new(points, None));
    }
    contours
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24">
        <path d="M0 0 H24 V24 H0 Z" fill="black"/>
        <path d="M2 2 H4" stroke="black" fill="none"/>
    </svg>"#;

    #[test]
    fn normalized_icon_fills_the_em_box() {
        let meta = FontMetadata::new("Icons");
        let outline = icon_outline(SQUARE.as_bytes(), &meta).unwrap();
        assert_eq!(outline.advance, 1000.0);

        let bbox = kurbo::Shape::bounding_box(&outline.path);
        assert_eq!(bbox.x0, 0.0);
        assert_eq!(bbox.x1, 1000.0);
        assert_eq!(bbox.y0, -200.0);
        assert_eq!(bbox.y1, 800.0);
    }

    #[test]
    fn unnormalized_icon_keeps_its_units() {
        let mut meta = FontMetadata::new("Icons");
        meta.normalize = false;
        let outline = icon_outline(SQUARE.as_bytes(), &meta).unwrap();
        assert_eq!(outline.advance, 24.0);
        let bbox = kurbo::Shape::bounding_box(&outline.path);
        assert_eq!(bbox.y1, 24.0 - 200.0);
    }

    #[test]
    fn malformed_svg_is_rejected() {
        let meta = FontMetadata::new("Icons");
        assert!(icon_outline(b"<svg", &meta).is_err());
    }

    #[test]
    fn closed_square_becomes_one_line_contour() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((100.0, 0.0));
        path.line_to((100.0, 100.0));
        path.line_to((0.0, 100.0));
        path.close_path();

        let contours = bezpath_to_contours(&path);
        assert_eq!(contours.len(), 1);
        let points = &contours[0].points;
        assert_eq!(points.len(), 4);
        assert!(points.iter().all(|p| p.typ == PointType::Line));
    }

    #[test]
    fn curve_back_to_start_wraps_off_curves() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((100.0, 0.0));
        path.curve_to((100.0, 50.0), (50.0, 100.0), (0.0, 0.0));
        path.close_path();

        let contours = bezpath_to_contours(&path);
        let types: Vec<_> = contours[0].points.iter().map(|p| p.typ.clone()).collect();
        assert_eq!(
            types,
            [
                PointType::Curve,
                PointType::Line,
                PointType::OffCurve,
                PointType::OffCurve
            ]
        );
    }

    #[test]
    fn open_subpath_keeps_move_point() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));

        let contours = bezpath_to_contours(&path);
        assert_eq!(contours[0].points[0].typ, PointType::Move);
    }

    #[test]
    fn rounding_keeps_two_decimals() {
        let mut path = BezPath::new();
        path.move_to((1.23456, -7.891));
        let rounded = round_path(&path);
        assert_eq!(rounded.elements()[0], PathEl::MoveTo(Point::new(1.23, -7.89)));
    }
}
