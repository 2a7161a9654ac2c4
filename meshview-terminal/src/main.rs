/// meshview - view OBJ and PLY meshes in the terminal
///
/// Controls:
///   - Home/End or mouse drag: Orbit the camera
///   - Arrows, W/S: Move the model
///   - Q/E: Stretch along x
///   - A/D: Turn the model
///   - R: Animate the camera
///   - T: Toggle shading mode
///   - 1-4: Triangle, cone, tetrahedron, mesh file
///   - ESC / Ctrl-C: Quit
use std::fs::File;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use anyhow::{ensure, Context};
use clap::Parser;
use env_logger::{Env, Target};
use log::LevelFilter;
use meshview_terminal::{ShadingMode, TerminalApp, ViewState};

mod args;

use args::Args;

/// Log sink that holds records until the terminal is restored
#[derive(Clone, Default)]
struct DeferredLog(Arc<Mutex<Vec<u8>>>);

impl DeferredLog {
    fn flush_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let buffer = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log buffer poisoned"))?;
        out.write_all(&buffer)
    }
}

impl Write for DeferredLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log buffer poisoned"))?;
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Logger for the in-memory sink; held at `warn` so a long session cannot grow it unbounded.
fn deferred_logger(sink: DeferredLog) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .target(Target::Pipe(Box::new(sink)));
    builder
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // The alternate screen owns stdout/stderr while the viewer runs.
    let deferred = DeferredLog::default();
    match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file '{}'", path.display()))?;
            env_logger::Builder::from_env(Env::default().default_filter_or("info"))
                .target(Target::Pipe(Box::new(file)))
                .init();
        }
        None => deferred_logger(deferred.clone()).init(),
    }

    if let Some(path) = &args.mesh {
        ensure!(path.is_file(), "mesh file '{}' does not exist", path.display());
    }

    let shading = if args.directional {
        ShadingMode::Directional
    } else {
        ShadingMode::HighVisibility
    };
    let state = ViewState::new(args.initial_model(), shading);

    let mut app = TerminalApp::new(state, args.mesh.clone()).context("cannot open terminal")?;
    let result = app.run().context("terminal viewer failed");

    deferred.flush_to(&mut io::stderr())?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log, Record};

    #[test]
    fn test_deferred_sink_keeps_only_warnings() {
        let sink = DeferredLog::default();
        let logger = deferred_logger(sink.clone()).build();
        assert_eq!(logger.filter(), LevelFilter::Warn);

        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("ear at 3"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("zero-area triangle"))
                .build(),
        );
        logger.flush();

        let mut out = Vec::new();
        sink.flush_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("zero-area triangle"));
        assert!(!text.contains("ear at 3"));
    }
}
