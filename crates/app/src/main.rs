//! Entry point for Duopose.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use asset::TextureData;
use clap::Parser;
use platform::{ObjectAsset, ViewerOptions};

mod cli;

use cli::{Cli, Command, ViewArgs};

fn load_object(label: &str, mesh: &Path, texture: Option<&Path>) -> Result<ObjectAsset> {
    let meshes = asset::load_3ds_from_path(mesh)?;
    if meshes.is_empty() {
        log::warn!("{} contains no drawable meshes", mesh.display());
    }
    let texture = match texture {
        Some(path) => TextureData::load_png(path)?,
        None => TextureData::solid([255, 255, 255, 255]),
    };
    Ok(ObjectAsset {
        label: label.to_owned(),
        meshes,
        texture,
    })
}

fn view(args: ViewArgs) -> Result<()> {
    let motion = args.motion().context("Invalid motion settings")?;
    let projection = args.projection().context("Invalid projection settings")?;
    let head = load_object("head", &args.head, args.head_texture.as_deref())?;
    let body = load_object("body", &args.body, args.body_texture.as_deref())?;
    let (width, height) = args.size;
    let backends = args.gpu_backend.backends();
    log::info!("Starting Duopose. Backend: {backends:?}, window_size={width}x{height}");

    platform::run_viewer(ViewerOptions {
        head,
        body,
        motion,
        projection,
        backends,
        width,
        height,
    })
}

fn inspect(files: &[PathBuf]) -> Result<()> {
    for file in files {
        let path = file.as_path();
        let meshes = asset::load_3ds_from_path(path)?;
        println!("{}: {} meshes", path.display(), meshes.len());
        for m in &meshes {
            print!("  {:<16} {:>7} triangles", m.name(), m.triangle_count());
            match m.bounds() {
                Some((min, max)) => println!("  bounds {min:?} .. {max:?}"),
                None => println!(),
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::View(args) => view(args)?,
        Command::Inspect { files } => inspect(&files)?,
    }

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
