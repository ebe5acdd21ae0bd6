use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use splatview_render::{
    GraphicsContext, RecordingContext, StaticCamera, UniformValue, init_cube_renderer,
    render_cube,
};
use splatview_shader::{ShaderCustomization, ShaderTemplate, Zone, compose, zone_content};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "splatview-cli", about = "CLI tool for splatview shader and cube operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Print the composed shader source
    Compose {
        /// Shader customization file (.yaml, .yml or .json)
        #[arg(short, long)]
        customization: Option<PathBuf>,
        /// Which stage to print
        #[arg(short, long, value_enum, default_value_t = Stage::Both)]
        stage: Stage,
    },
    /// Print the final content of every injection zone
    Zones {
        /// Shader customization file (.yaml, .yml or .json)
        #[arg(short, long)]
        customization: Option<PathBuf>,
    },
    /// Build and render the cube against the recording backend and print
    /// every GPU call
    DryRun {
        /// Shader customization file (.yaml, .yml or .json)
        #[arg(short, long)]
        customization: Option<PathBuf>,
        /// Number of frames to render
        #[arg(short, long, default_value = "1")]
        frames: u32,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Stage {
    Vertex,
    Fragment,
    Both,
}

fn load_customization(path: Option<&Path>) -> anyhow::Result<ShaderCustomization> {
    match path {
        Some(path) => ShaderCustomization::load(path)
            .with_context(|| format!("failed to load customization {}", path.display())),
        None => Ok(ShaderCustomization::default()),
    }
}

fn dry_run(customization: &ShaderCustomization, frames: u32) -> anyhow::Result<()> {
    let ctx = RecordingContext::new();
    let camera = StaticCamera::default();

    let build = init_cube_renderer(&ctx, &camera, Some(customization));
    let build_calls = ctx.take_calls();
    println!("-- build ({} calls)", build_calls.len());
    for (i, call) in build_calls.iter().enumerate() {
        println!("{i:4}  {call}");
    }
    let mut cube = build.context("cube build failed")?;

    for frame in 0..frames {
        ctx.viewport(0, 0, 1280, 720);
        ctx.clear([0.1, 0.1, 0.12, 1.0]);
        // Missing uniforms are logged once and skipped, as on a real driver.
        cube.set_uniform(&ctx, "uTime", UniformValue::Float(frame as f32 / 60.0));
        cube.set_uniform(&ctx, "uBrightness", UniformValue::Float(1.0));
        render_cube(&ctx, &cube, &camera);

        let calls = ctx.take_calls();
        println!("-- frame {frame} ({} calls)", calls.len());
        for (i, call) in calls.iter().enumerate() {
            println!("{i:4}  {call}");
        }
    }

    cube.destroy(&ctx);
    println!(
        "-- teardown: live programs={}, buffers={}, shaders={}",
        ctx.live_programs(),
        ctx.live_buffers(),
        ctx.live_shaders()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("splatview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", splatview_common::crate_info());
            println!("shader: {}", splatview_shader::crate_info());
            println!("render: {}", splatview_render::crate_info());
        }
        Commands::Compose {
            customization,
            stage,
        } => {
            let custom = load_customization(customization.as_deref())?;
            let composed = compose(&ShaderTemplate::cube(), &custom)?;
            if !composed.defines_color_correction() {
                tracing::warn!("color correction zone does not define applyColorCorrection");
            }
            if stage != Stage::Fragment {
                println!("// ---- vertex ----");
                println!("{}", composed.vertex);
            }
            if stage != Stage::Vertex {
                println!("// ---- fragment ----");
                println!("{}", composed.fragment);
            }
        }
        Commands::Zones { customization } => {
            let custom = load_customization(customization.as_deref())?;
            let composed = compose(&ShaderTemplate::cube(), &custom)?;
            for zone in Zone::ALL {
                let origin = if custom.get(zone).is_some() {
                    "custom"
                } else {
                    "default"
                };
                println!("== {zone} ({origin})");
                let content = zone_content(&composed.fragment, zone)?;
                if content.is_empty() {
                    println!("   <empty>");
                }
                for line in content.lines() {
                    println!("   {line}");
                }
            }
        }
        Commands::DryRun {
            customization,
            frames,
        } => {
            let custom = load_customization(customization.as_deref())?;
            dry_run(&custom, frames)?;
        }
    }

    Ok(())
}
