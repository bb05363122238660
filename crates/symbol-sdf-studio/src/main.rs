mod raster;
mod scene;

use anyhow::Context;
use symbol_sdf::logging::{init_logging, LoggingConfig};
use symbol_sdf::{draw_passes, Color, SymbolDraw};

use raster::Canvas;

const WIDTH: u32 = 280;
const HEIGHT: u32 = 200;

struct Args {
    output: String,
    overdraw: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args { output: "symbols.png".to_owned(), overdraw: false };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--overdraw" => args.overdraw = true,
            flag if flag.starts_with("--") => anyhow::bail!("unknown flag {flag}"),
            path => args.output = path.to_owned(),
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());
    let args = parse_args()?;

    let atlas = scene::build_atlas().context("building sdf atlas")?;
    let layers = scene::build_scene(WIDTH, HEIGHT, &atlas, args.overdraw);
    let mut canvas = Canvas::new(WIDTH, HEIGHT, Color::from_straight(0.12, 0.12, 0.14, 1.0));

    for layer in &layers {
        let is_text = layer.uniforms.tile_props.is_text();
        for pass in draw_passes(&layer.uniforms.evaluated, &layer.specialization, is_text) {
            let uniforms = layer.uniforms.for_pass(pass);
            let draw = SymbolDraw::new(&uniforms, &layer.specialization);
            let corners = draw.transform_all(&layer.vertices);
            let shaded = canvas.draw_quads(&draw, &corners, &atlas);
            log::info!("{} {:?}: {} vertices, {} fragments", layer.name, pass, corners.len(), shaded);
        }
    }

    image::save_buffer(
        &args.output,
        &canvas.to_rgba8(),
        canvas.width(),
        canvas.height(),
        image::ExtendedColorType::Rgba8,
    )
    .with_context(|| format!("writing {}", args.output))?;

    log::info!("wrote {}", args.output);
    Ok(())
}
