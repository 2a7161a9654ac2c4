/// Terminal mesh viewer built on a character-cell rasterizer
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use log::{info, warn};
use meshview_core::models::reference_plane;
use meshview_core::{load_model, Mesh, ModelKind};
use nalgebra::Matrix4;
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub mod renderer;
pub mod state;

pub use renderer::AsciiRenderer;
pub use state::{handle_event, ShadingMode, ViewState};

const CONTROLS: &str =
    "Home/End orbit | Arrows/W/S move | Q/E scale | A/D turn | R animate | T shading | 1-4 model | Esc quit";

/// Main application struct for terminal mesh viewing
pub struct TerminalApp {
    state: ViewState,
    mesh_path: Option<PathBuf>,
    mesh: Mesh,
    plane: Mesh,
    renderer: AsciiRenderer,
    status: String,
    last_update: Instant,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(state: ViewState, mesh_path: Option<PathBuf>) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(state, mesh_path, width as usize, height as usize))
    }

    pub fn with_size(
        state: ViewState,
        mesh_path: Option<PathBuf>,
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            state,
            mesh_path,
            mesh: Mesh::new(),
            plane: reference_plane(),
            renderer: AsciiRenderer::new(width, height),
            status: String::new(),
            last_update: Instant::now(),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.state.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.apply(&event);
            }

            self.update();
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    /// Feed one terminal event into the viewer.
    pub fn apply(&mut self, event: &Event) {
        if let Event::Resize(width, height) = *event {
            self.renderer.resize(width as usize, height as usize);
        }
        handle_event(&mut self.state, event);
    }

    fn update(&mut self) {
        let now = Instant::now();
        self.state.advance(now - self.last_update);
        self.last_update = now;

        if self.state.model_changed {
            self.reload_model();
        }
    }

    /// Load the selected model; on failure the previous mesh stays on screen.
    pub fn reload_model(&mut self) {
        self.state.model_changed = false;
        let kind = self.state.model;
        let path = match kind {
            ModelKind::File => self.mesh_path.as_deref(),
            _ => None,
        };

        match load_model(kind, path) {
            Ok(mesh) => {
                info!("showing {} ({} triangles)", kind, mesh.triangle_count());
                self.status = match (kind, path) {
                    (ModelKind::File, None) => {
                        "No mesh file given, showing the example triangle".to_string()
                    }
                    (ModelKind::File, Some(path)) => format!(
                        "{}: {} triangles",
                        path.display(),
                        mesh.triangle_count()
                    ),
                    _ => format!("{}: {} triangles", kind, mesh.triangle_count()),
                };
                self.mesh = mesh;
            }
            Err(err) => {
                warn!("failed to load {}: {}", kind, err);
                self.status = format!("Load failed, keeping previous mesh: {}", err);
            }
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let camera = self.state.camera;
        let shading = self.state.shading;

        self.renderer.clear();
        self.renderer
            .render_mesh(&self.plane, &Matrix4::identity(), &camera, shading);
        self.renderer
            .render_mesh(&self.mesh, &self.state.transform.matrix(), &camera, shading);

        // Output to terminal
        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let eye = camera.eye_position();
        let lines = [
            format!(
                "meshview | FPS: {:.1} | {} | {} shading | camera ({:.2}, {:.2}, {:.2}){}",
                self.fps,
                self.state.model,
                shading,
                eye.x,
                eye.y,
                eye.z,
                if self.state.animating { " | animating" } else { "" }
            ),
            self.status.clone(),
            CONTROLS.to_string(),
        ];
        for (row, line) in lines.iter().enumerate() {
            queue!(
                stdout,
                cursor::MoveTo(0, row as u16),
                Clear(ClearType::CurrentLine),
                SetForegroundColor(Color::Yellow),
                Print(line),
                ResetColor
            )?;
        }

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use meshview_core::models::example_triangle;
    use std::io::Write;

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn test_first_update_loads_model() {
        let mut app = TerminalApp::with_size(ViewState::default(), None, 40, 20);
        assert!(app.mesh().vertices().is_empty());
        app.update();
        assert_eq!(app.mesh(), &example_triangle());
        assert!(!app.state().model_changed);
    }

    #[test]
    fn test_selecting_model_reloads() {
        let mut app = TerminalApp::with_size(ViewState::default(), None, 40, 20);
        app.update();
        app.apply(&key('2'));
        app.update();
        assert_eq!(app.mesh().triangle_count(), 80);
        assert!(app.status().contains("80 triangles"));
    }

    #[test]
    fn test_failed_load_keeps_previous_mesh() {
        let mut file = tempfile_with(b"ply\nformat binary_big_endian 1.0\nend_header\n");
        file.flush().unwrap();

        let mut app = TerminalApp::with_size(
            ViewState::default(),
            Some(file.path().to_path_buf()),
            40,
            20,
        );
        app.update();
        app.apply(&key('4'));
        app.update();

        assert_eq!(app.state().model, ModelKind::File);
        assert_eq!(app.mesh(), &example_triangle());
        assert!(app.status().starts_with("Load failed"));
    }

    #[test]
    fn test_resize_rebuilds_buffer() {
        let mut app = TerminalApp::with_size(ViewState::default(), None, 40, 20);
        app.apply(&Event::Resize(100, 30));
        assert_eq!(app.renderer.width(), 100);
        assert_eq!(app.renderer.height(), 30);
    }

    fn tempfile_with(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".ply").tempfile().unwrap();
        file.write_all(contents).unwrap();
        file
    }
}
