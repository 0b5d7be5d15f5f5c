use serde::Serialize;

use crate::models::nesting::Layout;
use crate::models::optimization::Optimization;

/// One row of `GET /api/optimizations/:id/export?format=cutting_list`:
/// a flat, spreadsheet-friendly view of every placed piece.
#[derive(Debug, Serialize)]
pub struct CuttingListRow {
    pub id: String,
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: u32,
}

#[derive(Debug, Serialize)]
pub struct CuttingList {
    pub sheet_width: f64,
    pub sheet_height: f64,
    pub rows: Vec<CuttingListRow>,
}

pub fn cutting_list(layout: &Layout) -> CuttingList {
    CuttingList {
        sheet_width: layout.sheet_width,
        sheet_height: layout.sheet_height,
        rows: layout
            .placed
            .iter()
            .map(|p| CuttingListRow {
                id: p.id.clone(),
                label: p.label.clone(),
                x: p.x,
                y: p.y,
                width: p.width,
                height: p.height,
                rotation: p.rotation,
            })
            .collect(),
    }
}

/// Minimal SVG rendering: one `<rect>` per placed piece, y-axis flipped so the
/// sheet's bottom-left origin matches the nesting engine's coordinate system.
pub fn to_svg(layout: &Layout) -> String {
    let mut doc = String::new();
    doc.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {} {}\">\n",
        layout.sheet_width, layout.sheet_height
    ));
    doc.push_str(&format!(
        "  <rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"black\"/>\n",
        layout.sheet_width, layout.sheet_height
    ));

    for piece in &layout.placed {
        let (w, h) = piece.footprint();
        let y = layout.sheet_height - piece.y - h;
        doc.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#cfe8ff\" stroke=\"#1a5fb4\"><title>{}</title></rect>\n",
            piece.x,
            y,
            w,
            h,
            piece.label.as_deref().unwrap_or(&piece.id)
        ));
    }

    doc.push_str("</svg>\n");
    doc
}

/// Minimal ASCII DXF: one closed `LWPOLYLINE` per piece outline on layer
/// `PIECES`, plus the sheet boundary on layer `SHEET`. Enough for a CAM
/// import to verify placement; not a full DXF feature set.
pub fn to_dxf(layout: &Layout) -> String {
    let mut out = String::new();
    out.push_str("0\nSECTION\n2\nENTITIES\n");

    write_polyline(&mut out, "SHEET", &rectangle_points(0.0, 0.0, layout.sheet_width, layout.sheet_height));

    for piece in &layout.placed {
        let (w, h) = piece.footprint();
        write_polyline(&mut out, "PIECES", &rectangle_points(piece.x, piece.y, w, h));
    }

    out.push_str("0\nENDSEC\n0\nEOF\n");
    out
}

fn rectangle_points(x: f64, y: f64, w: f64, h: f64) -> [(f64, f64); 4] {
    [(x, y), (x + w, y), (x + w, y + h), (x, y + h)]
}

fn write_polyline(out: &mut String, layer: &str, points: &[(f64, f64); 4]) {
    out.push_str("0\nLWPOLYLINE\n8\n");
    out.push_str(layer);
    out.push_str("\n90\n4\n70\n1\n");
    for (x, y) in points {
        out.push_str(&format!("10\n{x}\n20\n{y}\n"));
    }
}

pub fn optimization_json(optimization: &Optimization) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(optimization)
}
