use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use rcore::silhouette::{
    Almond, AnySilhouette, Arrow, Asterisk, Astroid, CornerRadii, Cross, Direction, Donut, Lauburu,
    MultiRoundRectangle, Rays, RegularPolygon, RoundPin, Silhouette, Star, Surface, SvgSurface,
    svg_document,
};
use std::fs;
use tracing_subscriber::EnvFilter;

/// Grid cell size, padding included.
const CELL: f64 = 120.0;
const PADDING: f64 = 20.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo xtask <command>");
        eprintln!("Commands:");
        eprintln!("  gallery [out_dir]    Render every shape family to SVG (default: target/gallery)");
        std::process::exit(1);
    }

    match args[1].as_str() {
        "gallery" => {
            let out_dir = args
                .get(2)
                .map(Utf8PathBuf::from)
                .unwrap_or_else(|| Utf8PathBuf::from("target/gallery"));
            if let Err(e) = gallery(&out_dir) {
                eprintln!("gallery failed: {e}");
                std::process::exit(1);
            }
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            std::process::exit(1);
        }
    }
}

/// A shape placed at `(column, row)` of a family grid.
struct Cell {
    column: usize,
    row: usize,
    shape: AnySilhouette,
}

fn cell(column: usize, row: usize, shape: impl Into<AnySilhouette>) -> Cell {
    Cell {
        column,
        row,
        shape: shape.into(),
    }
}

fn gallery(out_dir: &Utf8Path) -> std::io::Result<()> {
    fs::create_dir_all(out_dir)?;

    let families: [(&str, fn() -> Vec<Cell>); 12] = [
        ("almond", almond),
        ("arrow", arrow),
        ("asterisk", asterisk),
        ("astroid", astroid),
        ("cross", cross),
        ("donut", donut),
        ("lauburu", lauburu),
        ("multiround_rectangle", multiround_rectangle),
        ("rays", rays),
        ("regular_polygon", regular_polygon),
        ("roundpin", roundpin),
        ("star", star),
    ];

    families.par_iter().try_for_each(|(name, build)| {
        let document = render_family(name, build());
        let path = out_dir.join(format!("shape_{name}.svg"));
        fs::write(&path, document)?;
        tracing::info!(%path, "wrote shape family");
        Ok(())
    })
}

fn render_family(name: &str, cells: Vec<Cell>) -> String {
    let columns = cells.iter().map(|c| c.column + 1).max().unwrap_or(0);
    let rows = cells.iter().map(|c| c.row + 1).max().unwrap_or(0);

    let elements: Vec<String> = cells
        .into_iter()
        .enumerate()
        .filter_map(|(index, mut cell)| {
            cell.shape.set_translate(
                PADDING + cell.column as f64 * CELL,
                PADDING + cell.row as f64 * CELL,
            );
            let outline = cell.shape.shape()?;
            let mut surface = SvgSurface::new(format!("{name}-{index}"));
            surface.present(outline, cell.shape.appearance(), cell.shape.style_class());
            surface.element().map(str::to_owned)
        })
        .collect();

    tracing::debug!(name, shapes = elements.len(), "family rendered");
    svg_document(
        PADDING + columns as f64 * CELL,
        PADDING + rows as f64 * CELL,
        &elements,
    )
}

// ============================================================================
// Families
// ============================================================================

fn almond() -> Vec<Cell> {
    vec![cell(0, 0, Almond::new(50.0, 50.0, 50.0))]
}

fn arrow() -> Vec<Cell> {
    vec![
        cell(0, 0, Arrow::new(0.0, 0.0, 100.0, 100.0)),
        cell(1, 0, Arrow::with_ratios(0.0, 0.0, 100.0, 100.0, 0.1, 0.5)),
        cell(2, 0, Arrow::with_ratios(0.0, 0.0, 100.0, 100.0, 0.5, 0.2)),
    ]
}

fn asterisk() -> Vec<Cell> {
    let mut cells = Vec::new();
    for (row, roundness) in [0.0, 1.0].into_iter().enumerate() {
        for (column, beams) in (2..=6).enumerate() {
            cells.push(cell(
                column,
                row,
                Asterisk::with_beams(50.0, 50.0, 50.0, 20.0, beams, roundness),
            ));
        }
    }
    cells
}

fn astroid() -> Vec<Cell> {
    vec![cell(0, 0, Astroid::new(50.0, 50.0, 50.0))]
}

fn cross() -> Vec<Cell> {
    [0.0, 0.5, 1.0]
        .into_iter()
        .enumerate()
        .map(|(column, roundness)| cell(column, 0, Cross::with_roundness(50.0, 50.0, 50.0, 20.0, roundness)))
        .collect()
}

fn donut() -> Vec<Cell> {
    [0, 3, 4, 5, 6, 7]
        .into_iter()
        .enumerate()
        .map(|(column, sides)| cell(column, 0, Donut::new(50.0, 50.0, 50.0, 20.0, sides)))
        .collect()
}

fn lauburu() -> Vec<Cell> {
    vec![
        cell(0, 0, Lauburu::new(50.0, 50.0, 50.0)),
        cell(1, 0, Lauburu::with_direction(50.0, 50.0, 50.0, Direction::Anticlockwise)),
    ]
}

fn multiround_rectangle() -> Vec<Cell> {
    let corners = [
        (0, 0, CornerRadii::uniform(0.0)),
        (1, 0, CornerRadii::uniform(10.0)),
        (2, 0, CornerRadii::per_corner(10.0, 0.0, 0.0, 0.0)),
        (3, 0, CornerRadii::per_corner(0.0, 10.0, 0.0, 0.0)),
        (4, 0, CornerRadii::per_corner(0.0, 0.0, 10.0, 0.0)),
        (5, 0, CornerRadii::per_corner(0.0, 0.0, 0.0, 10.0)),
        (0, 1, CornerRadii::per_corner(10.0, 10.0, 0.0, 0.0)),
        (1, 1, CornerRadii::per_corner(0.0, 0.0, 10.0, 10.0)),
        (2, 1, CornerRadii::per_corner(0.0, 10.0, 10.0, 0.0)),
        (3, 1, CornerRadii::per_corner(10.0, 0.0, 0.0, 10.0)),
        (4, 1, CornerRadii::per_corner(10.0, 0.0, 10.0, 0.0)),
        (5, 1, CornerRadii::per_corner(0.0, 10.0, 0.0, 10.0)),
    ];
    corners
        .into_iter()
        .map(|(column, row, radii)| cell(column, row, MultiRoundRectangle::new(25.0, 25.0, 50.0, 50.0, radii)))
        .collect()
}

fn rays() -> Vec<Cell> {
    let mut cells = Vec::new();
    let variants = [(0.25, false), (0.5, false), (0.75, false), (0.25, true), (0.5, true), (0.75, true)];
    for (row, (extent, rounded)) in variants.into_iter().enumerate() {
        for (column, beams) in (2..=6).enumerate() {
            cells.push(cell(
                column,
                row,
                Rays::with_extent(50.0, 50.0, 50.0, beams, extent, rounded),
            ));
        }
    }
    cells
}

fn regular_polygon() -> Vec<Cell> {
    (3..=8)
        .enumerate()
        .map(|(column, sides)| cell(column, 0, RegularPolygon::new(50.0, 50.0, 50.0, sides)))
        .collect()
}

fn roundpin() -> Vec<Cell> {
    [100.0, 70.0, 40.0]
        .into_iter()
        .enumerate()
        .map(|(column, height)| cell(column, 0, RoundPin::with_height(50.0, 50.0, 50.0, height)))
        .collect()
}

fn star() -> Vec<Cell> {
    (2..=7)
        .enumerate()
        .map(|(column, sides)| cell(column, 0, Star::new(50.0, 50.0, 50.0, 20.0, sides)))
        .collect()
}
