use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use kintree::fonts::CosmicTextMeasure;
use kintree::render::{render_tree, wrap_svg};
use kintree::{Dataset, Palette, TreeConfig, TreeView};
use resvg::usvg;
use std::path::{Path, PathBuf};
use tiny_skia::{Pixmap, Transform};

/// Genealogy tree renderer
#[derive(Parser, Debug)]
#[command(name = "kintree")]
#[command(version)]
#[command(about = "Render a family tree from JSON to SVG, PNG or PDF", long_about = None)]
struct Args {
    /// Input JSON file with people and relationships (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (extension determines format: .svg, .png or .pdf)
    #[arg(short, long, value_name = "OUTPUT")]
    output: PathBuf,

    /// Color palette: a built-in name (light, dark, sepia) or a TOML/YAML file
    #[arg(short, long, value_name = "THEME")]
    theme: Option<String>,

    /// Layout configuration overrides (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Person id to mark as the selected primary
    #[arg(long, value_name = "ID")]
    select: Option<String>,

    /// Person id to compare against the selected primary (draws the kinship
    /// path and label)
    #[arg(long, value_name = "ID", requires = "select")]
    compare: Option<String>,

    /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// Print shell completions to stdout and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> Result<(), String> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        let mut command = Args::command();
        clap_complete::generate(shell, &mut command, "kintree", &mut std::io::stdout());
        return Ok(());
    }

    let palette = load_palette(args.theme.as_deref())?;
    let config = load_config(args.config.as_deref())?;

    let raw = if args.input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(&args.input)
            .map_err(|e| format!("Failed to read input file: {}", e))?
    };
    let dataset: Dataset =
        serde_json::from_str(&raw).map_err(|e| format!("Failed to parse input JSON: {}", e))?;

    let mut view = TreeView::from_dataset(&dataset, config);
    if let Some(id) = &args.select {
        view.select(id);
        if let Some(other) = &args.compare {
            view.compare(other);
        }
    }

    let mut measure = CosmicTextMeasure::new()?;
    let (inner, width, height) = render_tree(&view, &palette, &mut measure);
    let svg = wrap_svg(&inner, width, height, &palette);

    let output_ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .ok_or("Output file has no extension")?
        .to_ascii_lowercase();

    match output_ext.as_str() {
        "svg" => {
            std::fs::write(&args.output, &svg)
                .map_err(|e| format!("Failed to write SVG: {}", e))?;
            eprintln!("SVG saved to: {}", args.output.display());
        }
        "png" => {
            let png_data = svg_to_png(&svg, args.png_scale)?;
            std::fs::write(&args.output, png_data)
                .map_err(|e| format!("Failed to write PNG: {}", e))?;
            eprintln!("PNG saved to: {}", args.output.display());
        }
        "pdf" => {
            let pdf_data = svg_to_pdf(&svg)?;
            std::fs::write(&args.output, pdf_data)
                .map_err(|e| format!("Failed to write PDF: {}", e))?;
            eprintln!("PDF saved to: {}", args.output.display());
        }
        _ => {
            return Err(format!(
                "Unsupported output format: .{} (use .svg, .png or .pdf)",
                output_ext
            ));
        }
    }

    Ok(())
}

fn load_palette(theme: Option<&str>) -> Result<Palette, String> {
    let Some(theme) = theme else {
        return Ok(Palette::default());
    };
    let path = Path::new(theme);
    if path.exists() && path.is_file() {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read theme file: {}", e))?;
        Palette::from_file_content(&content)
    } else {
        Palette::from_builtin(theme)
    }
}

fn load_config(path: Option<&Path>) -> Result<TreeConfig, String> {
    let Some(path) = path else {
        return Ok(TreeConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file: {}", e))?;
    TreeConfig::from_toml(&content)
}

fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, String> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("Invalid --png-scale value: {}", scale));
    }

    let mut opts = usvg::Options::default();
    {
        let fontdb = opts.fontdb_mut();
        fontdb.load_system_fonts();

        let local_fonts = Path::new("fonts");
        if local_fonts.is_dir() {
            fontdb.load_fonts_dir(local_fonts);
        }

        if let Some(family) = pick_sans_family(fontdb.faces().flat_map(|face| {
            face.families.iter().map(|(family, _)| family.clone())
        })) {
            fontdb.set_sans_serif_family(&family);
            fontdb.set_serif_family(&family);
        }
    }

    let tree =
        usvg::Tree::from_str(svg, &opts).map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let svg_width = (tree.size().width() * scale).ceil() as u32;
    let svg_height = (tree.size().height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(svg_width, svg_height).ok_or("Failed to create pixmap")?;
    let transform = Transform::from_scale(scale, scale);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| format!("Failed to encode PNG: {}", e))
}

fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, String> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();

    let local_fonts = Path::new("fonts");
    if local_fonts.is_dir() {
        fontdb.load_fonts_dir(local_fonts);
    }

    if let Some(family) = pick_sans_family(fontdb.faces().flat_map(|face| {
        face.families.iter().map(|(family, _)| family.clone())
    })) {
        fontdb.set_sans_serif_family(&family);
        fontdb.set_serif_family(&family);
    }

    let opts = svg2pdf::usvg::Options {
        fontdb: std::sync::Arc::new(fontdb),
        ..Default::default()
    };

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| format!("Failed to parse SVG: {}", e))?;

    // Keep text as paths so PDFs stay readable when font embedding fails.
    let options = svg2pdf::ConversionOptions {
        embed_text: false,
        ..Default::default()
    };
    let page_options = svg2pdf::PageOptions::default();

    svg2pdf::to_pdf(&tree, options, page_options)
        .map_err(|e| format!("Failed to convert SVG to PDF: {}", e))
}

/// Prefer an installed family with "sans" in its name, else the first family
/// seen, so generic `sans-serif` text resolves on minimal font setups.
fn pick_sans_family(families: impl Iterator<Item = String>) -> Option<String> {
    let mut first: Option<String> = None;
    for family in families {
        if family.to_ascii_lowercase().contains("sans") {
            return Some(family);
        }
        if first.is_none() {
            first = Some(family);
        }
    }
    first
}
