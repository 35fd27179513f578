use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use magmesh::assembly::{self, AirParams, BuildOptions};
use magmesh::geometry;
use magmesh::kernel::{MeshAlgo2d, PlanarKernel, Session};
use magmesh::meshsize;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgoArg {
    MeshAdapt,
    Automatic,
    Initial,
    Delaunay,
    FrontalDelaunay,
    Bamg,
}

impl From<AlgoArg> for MeshAlgo2d {
    fn from(arg: AlgoArg) -> Self {
        match arg {
            AlgoArg::MeshAdapt => Self::MeshAdapt,
            AlgoArg::Automatic => Self::Automatic,
            AlgoArg::Initial => Self::Initial,
            AlgoArg::Delaunay => Self::Delaunay,
            AlgoArg::FrontalDelaunay => Self::FrontalDelaunay,
            AlgoArg::Bamg => Self::Bamg,
        }
    }
}

/// Builds a tagged 2D model from a magnet description, optionally meshing it.
#[derive(Parser)]
#[command(name = "magmesh", version)]
struct Cli {
    /// Geometry description (YAML)
    input: PathBuf,

    /// Generate the mesh and write it to the working directory
    #[arg(long)]
    mesh: bool,

    /// Surround the model with air: radial and axial padding ratios
    #[arg(long, num_args = 2, value_names = ["R_RATIO", "Z_RATIO"])]
    air: Option<Vec<f64>>,

    /// Model slit widths as finite cuts instead of zero-width lines
    #[arg(long)]
    thickslit: bool,

    /// Meshing algorithm override
    #[arg(long, value_enum)]
    algo: Option<AlgoArg>,

    /// Unit scaling applied before generation (0.001 for mm input, m output)
    #[arg(long, default_value_t = 1.0)]
    scaling: f64,

    /// Working directory for the size policy and the mesh; defaults to the
    /// geometry file's directory
    #[arg(long)]
    wd: Option<PathBuf>,

    /// Uniform characteristic length overriding the per-region defaults
    #[arg(long)]
    lc: Option<f64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "build failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> magmesh::Result<()> {
    let magnet = geometry::load(&cli.input)?;
    let options = BuildOptions {
        air: cli.air.as_ref().map(|v| AirParams {
            r_ratio: v[0],
            z_ratio: v[1],
        }),
        thick_slits: cli.thickslit,
    };

    let mut session = Session::new(PlanarKernel::new());
    let assembly = assembly::build(&mut session, &magnet, &options)?;

    let wd = cli.wd.clone().unwrap_or_else(|| {
        cli.input
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf)
    });
    let mut defaults = assembly.default_policy();
    if let Some(lc) = cli.lc {
        for spec in defaults.sizes.values_mut() {
            *spec = meshsize::SizeSpec::from_lc(lc);
        }
    }
    let mut policy = meshsize::load_or_default(&wd, assembly.with_air, defaults)?;
    if let Some(algo) = cli.algo {
        policy.algo = MeshAlgo2d::from(algo);
    }

    meshsize::compose(
        &mut session,
        &assembly.registry,
        &policy,
        &assembly.channel_boxes,
    )?;
    session.set_scaling(cli.scaling);

    if cli.mesh {
        let stats = session.generate()?;
        info!(nodes = stats.nodes, elements = stats.elements, "mesh generated");
        let out = wd.join(format!("{}.msh", assembly.name));
        session.write(&out)?;
        info!(path = %out.display(), "mesh written");
    }
    Ok(())
}
