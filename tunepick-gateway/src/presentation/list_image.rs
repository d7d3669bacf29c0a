//! SVG-based search result table rendered to PNG.
//!
//! Builds an SVG table from a track list and rasterizes it via resvg,
//! using a dark theme that reads well inline in chat clients.

use std::fmt::Write;
use std::sync::LazyLock;

use resvg::tiny_skia;
use resvg::usvg;
use tracing::warn;

use tunepick_core::Track;

// ---------------------------------------------------------------------------
// Render scale: generate a 2× SVG for crisp images on HiDPI clients
// ---------------------------------------------------------------------------
const SCALE: f32 = 2.0;

// ---------------------------------------------------------------------------
// Layout (logical pixels, multiplied by SCALE at rasterization)
// ---------------------------------------------------------------------------
const FONT_SIZE: f32 = 14.0;
/// Average advance of a narrow glyph at FONT_SIZE. Wide (CJK) glyphs count twice.
const CHAR_WIDTH: f32 = 8.4;
const ROW_HEIGHT: f32 = 36.0;
const CELL_PAD_X: f32 = 14.0;
const CORNER_RADIUS: f32 = 10.0;
const HEADER_ACCENT_HEIGHT: f32 = 3.0;

/// Longest cell text per column, in display columns, before truncation.
const MAX_CELL_COLUMNS: [usize; 5] = [3, 36, 24, 24, 6];
const HEADERS: [&str; 5] = ["#", "Title", "Artist", "Album", "Time"];

// ---------------------------------------------------------------------------
// Color palette
// ---------------------------------------------------------------------------
const BG_COLOR: &str = "#2B2D31";
const HEADER_BG: &str = "#1E1F22";
const HEADER_ACCENT: &str = "#1DB954";
const ZEBRA_EVEN: &str = "#2B2D31";
const ZEBRA_ODD: &str = "#2E3035";
const TEXT_COLOR: &str = "#D2D5D9";
const INDEX_COLOR: &str = "#1DB954";
const HEADER_TEXT: &str = "#FFFFFF";
const BORDER_COLOR: &str = "#3B3D44";

const FONT_FAMILY: &str =
    "'Inter', 'Noto Sans CJK SC', 'Microsoft YaHei', 'Segoe UI', 'Arial', sans-serif";

static SVG_OPTIONS: LazyLock<usvg::Options> = LazyLock::new(|| {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt
});

/// Eagerly initialize the system font database.
///
/// The underlying `LazyLock` scans every font file on the system, which can
/// block for seconds on large font collections. Call this at startup from a
/// blocking context so the first list render does not stall the runtime.
pub fn init_fonts() {
    LazyLock::force(&SVG_OPTIONS);
}

/// Render a numbered track table to PNG bytes.
///
/// Returns `None` for an empty list or when rasterization fails.
pub fn render_png(tracks: &[Track]) -> Option<Vec<u8>> {
    if tracks.is_empty() {
        return None;
    }

    let svg = build_svg(&table_rows(tracks));
    match rasterize(&svg) {
        Ok(png) => Some(png),
        Err(e) => {
            warn!("Result list render failed: {e}");
            None
        }
    }
}

fn table_rows(tracks: &[Track]) -> Vec<[String; 5]> {
    let mut rows = Vec::with_capacity(tracks.len() + 1);
    rows.push(HEADERS.map(str::to_string));
    for (i, track) in tracks.iter().enumerate() {
        let mut cells = [
            (i + 1).to_string(),
            track.title.clone(),
            track.artist.clone(),
            track.album.clone(),
            track.duration_label(),
        ];
        for (col, cell) in cells.iter_mut().enumerate() {
            *cell = truncate_columns(cell, MAX_CELL_COLUMNS[col]);
        }
        rows.push(cells);
    }
    rows
}

fn build_svg(rows: &[[String; 5]]) -> String {
    let col_count = HEADERS.len();
    let mut col_cols = [2usize; 5];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            col_cols[i] = col_cols[i].max(display_columns(cell));
        }
    }
    let col_px: Vec<f32> = col_cols
        .iter()
        .map(|&n| n as f32 * CHAR_WIDTH + 2.0 * CELL_PAD_X)
        .collect();

    let w = col_px.iter().sum::<f32>().ceil();
    let h = (rows.len() as f32 * ROW_HEIGHT + HEADER_ACCENT_HEIGHT).ceil();
    let pw = (w * SCALE).ceil();
    let ph = (h * SCALE).ceil();

    let mut s = String::with_capacity(4096);

    let _ = write!(
        s,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{pw}" height="{ph}" viewBox="0 0 {w} {h}">"#,
    );
    let _ = write!(
        s,
        r#"<defs><clipPath id="list-clip"><rect width="{w}" height="{h}" rx="{CORNER_RADIUS}"/></clipPath></defs>"#,
    );
    let _ = write!(s, r#"<g clip-path="url(#list-clip)">"#);
    let _ = write!(s, r#"<rect width="{w}" height="{h}" fill="{BG_COLOR}"/>"#);
    let _ = write!(
        s,
        r#"<rect width="{w}" height="{ROW_HEIGHT}" fill="{HEADER_BG}"/>"#,
    );
    let _ = write!(
        s,
        r#"<rect y="{ROW_HEIGHT}" width="{w}" height="{HEADER_ACCENT_HEIGHT}" fill="{HEADER_ACCENT}"/>"#,
    );

    let data_top = ROW_HEIGHT + HEADER_ACCENT_HEIGHT;
    for i in 1..rows.len() {
        let fill = if i % 2 == 0 { ZEBRA_ODD } else { ZEBRA_EVEN };
        let ry = data_top + (i - 1) as f32 * ROW_HEIGHT;
        let _ = write!(
            s,
            r#"<rect y="{ry}" width="{w}" height="{ROW_HEIGHT}" fill="{fill}"/>"#,
        );
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let is_header = row_idx == 0;
        let weight = if is_header { "600" } else { "400" };
        let row_top = if is_header {
            0.0
        } else {
            data_top + (row_idx - 1) as f32 * ROW_HEIGHT
        };
        let baseline_y = row_top + ROW_HEIGHT * 0.62;

        let mut col_x = 0.0_f32;
        for (col_idx, cell) in row.iter().enumerate().take(col_count) {
            let fill = match (is_header, col_idx) {
                (true, _) => HEADER_TEXT,
                (false, 0) => INDEX_COLOR,
                _ => TEXT_COLOR,
            };
            let tx = col_x + CELL_PAD_X;
            let escaped = xml_escape(cell);
            let _ = write!(
                s,
                r#"<text x="{tx}" y="{baseline_y}" font-family="{FONT_FAMILY}" font-size="{FONT_SIZE}" fill="{fill}" font-weight="{weight}">{escaped}</text>"#,
            );
            col_x += col_px[col_idx];
        }
    }

    let _ = write!(
        s,
        r#"</g><rect width="{w}" height="{h}" rx="{CORNER_RADIUS}" fill="none" stroke="{BORDER_COLOR}" stroke-width="1"/>"#,
    );
    s.push_str("</svg>");
    s
}

fn rasterize(svg_str: &str) -> Result<Vec<u8>, String> {
    let tree = usvg::Tree::from_data(svg_str.as_bytes(), &SVG_OPTIONS)
        .map_err(|e| format!("SVG parse: {e}"))?;

    let size = tree.size().to_int_size();
    let mut pixmap =
        tiny_skia::Pixmap::new(size.width(), size.height()).ok_or("pixmap allocation failed")?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|e| format!("PNG encode: {e}"))
}

fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1FAFF
        | 0x20000..=0x3FFFD)
}

fn display_columns(input: &str) -> usize {
    input.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
}

fn truncate_columns(input: &str, max: usize) -> String {
    if display_columns(input) <= max {
        return input.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in input.chars() {
        let width = if is_wide(ch) { 2 } else { 1 };
        if used + width + 1 > max {
            break;
        }
        out.push(ch);
        used += width;
    }
    out.push('…');
    out
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks() -> Vec<Track> {
        vec![
            Track::new("1", "Sunny Day", "Jay Chou", 269, "Yeh Hui-Mei"),
            Track::new("2", "Rock & Roll", "<Band>", 61, ""),
        ]
    }

    #[test]
    fn empty_list_returns_none() {
        assert!(render_png(&[]).is_none());
    }

    #[test]
    fn rows_are_numbered_from_one() {
        let rows = table_rows(&tracks());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "#");
        assert_eq!(rows[1][0], "1");
        assert_eq!(rows[2][0], "2");
        assert_eq!(rows[1][4], "4:29");
    }

    #[test]
    fn svg_escapes_cell_text() {
        let svg = build_svg(&table_rows(&tracks()));
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Rock &amp; Roll"));
        assert!(svg.contains("&lt;Band&gt;"));
    }

    #[test]
    fn rendered_png_has_magic_bytes() {
        // Text needs system fonts; the table itself rasterizes without them.
        if let Some(bytes) = render_png(&tracks()) {
            assert_eq!(&bytes[..4], b"\x89PNG");
        }
    }

    #[test]
    fn wide_chars_count_double() {
        assert_eq!(display_columns("abc"), 3);
        assert_eq!(display_columns("晴天"), 4);
    }

    #[test]
    fn truncation_respects_display_width() {
        assert_eq!(truncate_columns("short", 10), "short");
        assert_eq!(truncate_columns("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_columns("晴天晴天晴天", 5), "晴天…");
    }

    #[test]
    fn xml_special_chars_escaped() {
        assert_eq!(xml_escape("a<b>&\"c"), "a&lt;b&gt;&amp;&quot;c");
    }
}
