//! Example: Quote an STL file, then preview it in the terminal
//!
//! Usage: cargo run --example load_stl -- path/to/file.stl

use std::env;
use std::fs;
use std::io;
use std::path::Path;

use printquote_core::{Catalogs, Mesh, OrderDraft, ParsedModel};
use printquote_terminal::TerminalApp;

fn demo_cube() -> OrderDraft {
    let points = Mesh::cube(40.0)
        .triangles
        .iter()
        .flat_map(|t| t.vertices.iter().map(|v| v.position.cast::<f64>()))
        .collect();
    OrderDraft::new("cube.stl", 684, ParsedModel::from_points(points))
}

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let draft = match args.get(1) {
        Some(stl_path) => {
            println!("Loading STL file: {}", stl_path);
            let data = fs::read(stl_path)?;
            let name = Path::new(stl_path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            OrderDraft::from_upload(&name, &data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        }
        None => {
            eprintln!("Usage: {} <stl-file>", args[0]);
            eprintln!("\nNo STL file provided, using a 40 mm cube...");
            demo_cube()
        }
    };

    let catalogs = Catalogs::builtin();
    let quote = draft.estimate(&catalogs);
    let dims = draft.model().dimensions();
    println!(
        "{}: {} triangles, {:.2} x {:.2} x {:.2} mm, {:.0} mm³",
        draft.file_name(),
        draft.model().triangle_count(),
        dims.x,
        dims.y,
        dims.z,
        draft.model().volume()
    );
    println!(
        "PLA, standard quality, 20% infill: {} ({:.1} g, ~{} h)",
        quote.price, quote.weight_grams, quote.estimated_hours
    );
    println!("Starting terminal viewer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let palette = catalogs.materials.default_material().colors.clone();
    let mut app = TerminalApp::new(draft.model(), palette, draft.file_name())?;
    app.run()
}
