/// Viewer state and the input events that drive it
use std::f32::consts::PI;
use std::fmt;
use std::time::Duration;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use meshview_core::transform::{ROTATION_STEP, SCALE_STEP, TRANSLATION_STEP};
use meshview_core::{ModelKind, ModelTransform, OrbitCamera};

/// Camera yaw change per Home/End press
pub const ORBIT_STEP: f32 = 0.05 * PI;
/// Radians of orbit per terminal cell dragged
pub const DRAG_SENSITIVITY: f32 = 0.005;
/// Yaw change per second while animating
pub const ANIMATION_SPEED: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingMode {
    /// Each triangle gets one of a few distinct colours
    HighVisibility,
    /// Lambert shading from a fixed light
    Directional,
}

impl ShadingMode {
    pub fn toggled(self) -> Self {
        match self {
            ShadingMode::HighVisibility => ShadingMode::Directional,
            ShadingMode::Directional => ShadingMode::HighVisibility,
        }
    }
}

impl fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShadingMode::HighVisibility => f.write_str("high visibility"),
            ShadingMode::Directional => f.write_str("directional light"),
        }
    }
}

/// Everything the viewer's input can change
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub model: ModelKind,
    /// Set when `model` changed and the mesh must be reloaded.
    pub model_changed: bool,
    pub shading: ShadingMode,
    pub camera: OrbitCamera,
    pub transform: ModelTransform,
    pub dragging: bool,
    pub last_mouse: Option<(u16, u16)>,
    pub animating: bool,
    pub running: bool,
}

impl ViewState {
    pub fn new(model: ModelKind, shading: ShadingMode) -> Self {
        Self {
            model,
            model_changed: true,
            shading,
            camera: OrbitCamera::new(),
            transform: ModelTransform::new(),
            dragging: false,
            last_mouse: None,
            animating: false,
            running: true,
        }
    }

    pub fn select_model(&mut self, model: ModelKind) {
        if self.model != model {
            self.model = model;
            self.model_changed = true;
        }
    }

    /// Advance the camera animation by `elapsed`.
    pub fn advance(&mut self, elapsed: Duration) {
        if self.animating {
            self.camera.orbit(-ANIMATION_SPEED * elapsed.as_secs_f32(), 0.0);
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(ModelKind::Example, ShadingMode::HighVisibility)
    }
}

/// Apply one terminal event to the view state
pub fn handle_event(state: &mut ViewState, event: &Event) {
    match event {
        Event::Key(key) => handle_key(state, key),
        Event::Mouse(mouse) => handle_mouse(state, mouse),
        _ => {}
    }
}

fn handle_key(state: &mut ViewState, key: &KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    let transform = &mut state.transform;
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => state.running = false,
        KeyCode::Esc => state.running = false,
        KeyCode::Home => state.camera.orbit(-ORBIT_STEP, 0.0),
        KeyCode::End => state.camera.orbit(ORBIT_STEP, 0.0),
        KeyCode::Up => transform.translate(0.0, TRANSLATION_STEP, 0.0),
        KeyCode::Down => transform.translate(0.0, -TRANSLATION_STEP, 0.0),
        KeyCode::Left => transform.translate(-TRANSLATION_STEP, 0.0, 0.0),
        KeyCode::Right => transform.translate(TRANSLATION_STEP, 0.0, 0.0),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => transform.translate(0.0, 0.0, TRANSLATION_STEP),
            's' => transform.translate(0.0, 0.0, -TRANSLATION_STEP),
            'q' => transform.scale_x(-SCALE_STEP),
            'e' => transform.scale_x(SCALE_STEP),
            'a' => transform.rotate_y(ROTATION_STEP),
            'd' => transform.rotate_y(-ROTATION_STEP),
            'r' => state.animating = !state.animating,
            't' => state.shading = state.shading.toggled(),
            '1'..='4' => {
                let slot = c as usize - '1' as usize;
                state.select_model(ModelKind::ALL[slot]);
            }
            _ => {}
        },
        _ => {}
    }
}

fn handle_mouse(state: &mut ViewState, mouse: &MouseEvent) {
    let position = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            state.dragging = true;
            state.last_mouse = Some(position);
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if let Some((x, y)) = state.last_mouse {
                let dx = f32::from(mouse.column) - f32::from(x);
                let dy = f32::from(mouse.row) - f32::from(y);
                state
                    .camera
                    .orbit(dx * DRAG_SENSITIVITY, dy * DRAG_SENSITIVITY);
            }
            state.dragging = true;
            state.last_mouse = Some(position);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            state.dragging = false;
            state.last_mouse = None;
        }
        _ => {}
    }
}
