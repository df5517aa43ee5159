use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use corelib::{CoreResult, MotionConfig, PinchConvention, ProjectionConfig};

#[derive(Parser, Debug)]
#[command(
    name = "duopose",
    about = "Two-object 3DS viewer with smoothed pointer and pinch control",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a window with a head and a body object
    View(ViewArgs),
    /// Parse 3DS files and print per-object statistics
    Inspect {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
pub struct ViewArgs {
    /// 3DS file for the fast-following object
    pub head: PathBuf,
    /// 3DS file for the slow-following object
    pub body: PathBuf,
    /// PNG texture for the head (defaults to white)
    #[arg(long)]
    pub head_texture: Option<PathBuf>,
    /// PNG texture for the body (defaults to white)
    #[arg(long)]
    pub body_texture: Option<PathBuf>,
    /// Fraction of the remaining rotation the head closes per frame
    #[arg(long)]
    pub head_rate: Option<f32>,
    /// Fraction of the remaining rotation the body closes per frame
    #[arg(long)]
    pub body_rate: Option<f32>,
    /// Degrees of rotation per unit of normalized pointer position
    #[arg(long)]
    pub rotation_scale: Option<f32>,
    /// Depth change per pixel of pinch distance change
    #[arg(long)]
    pub pinch_sensitivity: Option<f32>,
    #[arg(long, value_enum, default_value_t = PinchArg::Approach)]
    pub pinch_convention: PinchArg,
    /// Initial depth of both objects (negative is in front of the camera)
    #[arg(long, allow_negative_numbers = true)]
    pub depth: Option<f32>,
    /// Vertical field of view in degrees
    #[arg(long)]
    pub fov: Option<f32>,
    /// Window size, e.g. 1280x720
    #[arg(long, value_parser = parse_size, default_value = "1280x720")]
    pub size: (u32, u32),
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    pub gpu_backend: BackendArg,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinchArg {
    /// Spreading the fingers brings the objects closer
    Approach,
    /// Spreading the fingers pushes the objects away
    Recede,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendArg {
    Auto,
    #[value(alias = "vk")]
    Vulkan,
    #[value(alias = "d3d12")]
    Dx12,
    #[value(alias = "mtl")]
    Metal,
    #[value(alias = "opengl", alias = "gles")]
    Gl,
}

impl BackendArg {
    pub fn backends(self) -> wgpu::Backends {
        match self {
            BackendArg::Auto => wgpu::Backends::all(),
            BackendArg::Vulkan => wgpu::Backends::VULKAN,
            BackendArg::Dx12 => wgpu::Backends::DX12,
            BackendArg::Metal => wgpu::Backends::METAL,
            BackendArg::Gl => wgpu::Backends::GL,
        }
    }
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    if w == 0 || h == 0 {
        return Err("size must be non-zero".into());
    }
    Ok((w, h))
}

impl ViewArgs {
    /// Defaults overridden by whatever was given on the command line, validated.
    pub fn motion(&self) -> CoreResult<MotionConfig> {
        let d = MotionConfig::default();
        let motion = MotionConfig {
            rotation_scale: self.rotation_scale.unwrap_or(d.rotation_scale),
            pinch_sensitivity: self.pinch_sensitivity.unwrap_or(d.pinch_sensitivity),
            pinch_convention: match self.pinch_convention {
                PinchArg::Approach => PinchConvention::SpreadApproaches,
                PinchArg::Recede => PinchConvention::SpreadRecedes,
            },
            head_rate: self.head_rate.unwrap_or(d.head_rate),
            body_rate: self.body_rate.unwrap_or(d.body_rate),
            initial_depth: self.depth.unwrap_or(d.initial_depth),
            ..d
        };
        motion.validate()?;
        Ok(motion)
    }

    pub fn projection(&self) -> CoreResult<ProjectionConfig> {
        let d = ProjectionConfig::default();
        let projection = ProjectionConfig {
            fov_y_deg: self.fov.unwrap_or(d.fov_y_deg),
            ..d
        };
        projection.validate()?;
        Ok(projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn view(args: &[&str]) -> ViewArgs {
        let argv = ["duopose", "view", "head.3ds", "body.3ds"]
            .into_iter()
            .chain(args.iter().copied());
        match Cli::try_parse_from(argv).unwrap().command {
            Command::View(v) => v,
            other => panic!("expected view, got {other:?}"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn view_defaults() {
        let v = view(&[]);
        assert_eq!(v.size, (1280, 720));
        assert_eq!(v.gpu_backend, BackendArg::Auto);
        assert_eq!(v.motion().unwrap(), MotionConfig::default());
        assert_eq!(v.projection().unwrap(), ProjectionConfig::default());
    }

    #[test]
    fn overrides_reach_the_configs() {
        let v = view(&[
            "--head-rate",
            "0.5",
            "--depth",
            "-8",
            "--pinch-convention",
            "recede",
            "--fov",
            "60",
            "--size",
            "640X480",
            "--gpu-backend",
            "vk",
        ]);
        let m = v.motion().unwrap();
        assert_eq!(m.head_rate, 0.5);
        assert_eq!(m.initial_depth, -8.0);
        assert_eq!(m.pinch_convention, PinchConvention::SpreadRecedes);
        assert_eq!(v.projection().unwrap().fov_y_deg, 60.0);
        assert_eq!(v.size, (640, 480));
        assert_eq!(v.gpu_backend.backends(), wgpu::Backends::VULKAN);
    }

    #[test]
    fn out_of_range_rate_fails_validation() {
        assert!(view(&["--body-rate", "1.5"]).motion().is_err());
    }

    #[test]
    fn bad_sizes_are_rejected() {
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("1280").is_err());
        assert_eq!(parse_size("800x600"), Ok((800, 600)));
    }

    #[test]
    fn inspect_needs_a_file() {
        assert!(Cli::try_parse_from(["duopose", "inspect"]).is_err());
    }
}
