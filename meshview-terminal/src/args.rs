use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use meshview_core::ModelKind;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Mesh file shown as model 4 (`.obj` is read as OBJ, anything else as PLY).
    pub mesh: Option<PathBuf>,

    /// Model shown at start-up; defaults to `file` when a mesh is given.
    #[arg(short, long, value_enum)]
    pub model: Option<ModelArg>,

    /// Start with directional shading instead of high-visibility colours.
    #[arg(short, long)]
    pub directional: bool,

    /// Write log output to this file while the viewer runs.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelArg {
    Example,
    Generated,
    Indexed,
    File,
}

impl From<ModelArg> for ModelKind {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Example => ModelKind::Example,
            ModelArg::Generated => ModelKind::Generated,
            ModelArg::Indexed => ModelKind::IndexedData,
            ModelArg::File => ModelKind::File,
        }
    }
}

impl Args {
    pub fn initial_model(&self) -> ModelKind {
        match (self.model, &self.mesh) {
            (Some(model), _) => model.into(),
            (None, Some(_)) => ModelKind::File,
            (None, None) => ModelKind::Example,
        }
    }
}
