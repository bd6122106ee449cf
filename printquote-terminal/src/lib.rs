//! Terminal-based model viewer built on the ASCII rasterizer

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use printquote_core::{ColorOption, ParsedModel, ViewportEvent, ViewportState};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::debug;

pub mod renderer;

pub use renderer::{AsciiRenderer, TerminalSurface};

/// Approximate pixel size of one terminal cell, so drag sensitivity matches a pointer
const CELL_WIDTH_PX: f32 = 8.0;
const CELL_HEIGHT_PX: f32 = 16.0;

/// Wheel delta reported per scroll notch
const SCROLL_DELTA: f32 = 100.0;

/// What a terminal event asks the app to do
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Viewport(ViewportEvent),
    NextColor,
    Quit,
}

/// Map a terminal event onto an app action; `None` for events we ignore
pub fn translate(event: &Event) -> Option<Action> {
    match event {
        Event::Key(KeyEvent { code, kind, .. }) if *kind != KeyEventKind::Release => match code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('c') => Some(Action::NextColor),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::Viewport(ViewportEvent::Wheel {
                delta_y: -SCROLL_DELTA,
            })),
            KeyCode::Char('-') => Some(Action::Viewport(ViewportEvent::Wheel { delta_y: SCROLL_DELTA })),
            _ => None,
        },
        Event::Mouse(MouseEvent { kind, column, row, .. }) => {
            let x = f32::from(*column) * CELL_WIDTH_PX;
            let y = f32::from(*row) * CELL_HEIGHT_PX;
            let event = match kind {
                MouseEventKind::Down(MouseButton::Left) => ViewportEvent::PointerDown { x, y },
                MouseEventKind::Drag(MouseButton::Left) => ViewportEvent::PointerMove { x, y },
                MouseEventKind::Up(_) => ViewportEvent::PointerUp,
                MouseEventKind::ScrollDown => ViewportEvent::Wheel { delta_y: SCROLL_DELTA },
                MouseEventKind::ScrollUp => ViewportEvent::Wheel { delta_y: -SCROLL_DELTA },
                _ => return None,
            };
            Some(Action::Viewport(event))
        }
        Event::Resize(width, height) => Some(Action::Viewport(ViewportEvent::Resize {
            width: u32::from(*width),
            height: u32::from(*height),
        })),
        Event::FocusLost => Some(Action::Viewport(ViewportEvent::PointerLeave)),
        _ => None,
    }
}

/// Raw mode, alternate screen and mouse capture, undone on drop
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = Self;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide, EnableMouseCapture)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}

/// Main application struct for the interactive terminal viewport
pub struct TerminalApp {
    viewport: ViewportState,
    renderer: AsciiRenderer,
    palette: Vec<ColorOption>,
    color_index: usize,
    title: String,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Viewer for `model`; the first palette entry is the initial surface color
    pub fn new(model: &ParsedModel, palette: Vec<ColorOption>, title: impl Into<String>) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(model, palette, title, width, height))
    }

    pub fn with_size(
        model: &ParsedModel,
        palette: Vec<ColorOption>,
        title: impl Into<String>,
        width: u16,
        height: u16,
    ) -> Self {
        let mut viewport = ViewportState::new(u32::from(width), u32::from(height));
        viewport.load(model);
        if let Some(color) = palette.first() {
            viewport.set_color(&color.hex_code);
        }

        Self {
            viewport,
            renderer: AsciiRenderer::new(usize::from(width), usize::from(height)),
            palette,
            color_index: 0,
            title: title.into(),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Name of the color currently on display
    pub fn color_name(&self) -> Option<&str> {
        self.palette.get(self.color_index).map(|c| c.name.as_str())
    }

    pub fn run(&mut self) -> io::Result<()> {
        let _guard = TerminalGuard::enter()?;
        self.main_loop()
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                if let Some(action) = translate(&event) {
                    self.apply(action);
                }
            }

            // Render (advances auto-rotation)
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

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::NextColor => {
                if self.palette.is_empty() {
                    return;
                }
                self.color_index = (self.color_index + 1) % self.palette.len();
                let color = &self.palette[self.color_index];
                debug!(color = %color.name, "switching surface color");
                self.viewport.handle(ViewportEvent::Color(color.hex_code.clone()));
            }
            Action::Viewport(event) => {
                if let ViewportEvent::Resize { width, height } = event {
                    self.renderer.resize(width as usize, height as usize);
                }
                self.viewport.handle(event);
            }
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        let mut surface = TerminalSurface {
            renderer: &mut self.renderer,
            writer: &mut stdout,
        };
        self.viewport.render(&mut surface)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "{} | {} | FPS: {:.1} | Drag=Rotate Scroll/+/-=Zoom C=Color Q=Quit",
                self.title,
                self.color_name().unwrap_or("-"),
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use printquote_core::{Catalogs, Mesh, Rgb};

    fn cube_model() -> ParsedModel {
        let points = Mesh::cube(10.0)
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter().map(|v| v.position.cast::<f64>()))
            .collect();
        ParsedModel::from_points(points)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn pla_app() -> TerminalApp {
        let catalogs = Catalogs::builtin();
        let palette = catalogs.materials.resolve("pla").colors.clone();
        TerminalApp::with_size(&cube_model(), palette, "cube.stl", 80, 24)
    }

    #[test]
    fn test_mouse_maps_to_pointer_pixels() {
        assert_eq!(
            translate(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 2)),
            Some(Action::Viewport(ViewportEvent::PointerDown { x: 80.0, y: 32.0 }))
        );
        assert_eq!(
            translate(&mouse(MouseEventKind::ScrollDown, 0, 0)),
            Some(Action::Viewport(ViewportEvent::Wheel { delta_y: 100.0 }))
        );
        assert_eq!(translate(&mouse(MouseEventKind::Moved, 3, 3)), None);
    }

    #[test]
    fn test_keys() {
        assert_eq!(translate(&key('q')), Some(Action::Quit));
        assert_eq!(translate(&key('c')), Some(Action::NextColor));
        assert_eq!(translate(&key('x')), None);
    }

    #[test]
    fn test_drag_rotates_model() {
        let mut app = pla_app();
        for event in [
            mouse(MouseEventKind::Down(MouseButton::Left), 10, 10),
            mouse(MouseEventKind::Drag(MouseButton::Left), 15, 10),
        ] {
            app.apply(translate(&event).unwrap());
        }
        assert!(app.viewport().is_dragging());
        let yaw = app.viewport().rotation().unwrap().yaw();
        assert!((yaw - 0.4).abs() < 1e-5);

        app.apply(translate(&mouse(MouseEventKind::Up(MouseButton::Left), 15, 10)).unwrap());
        assert!(!app.viewport().is_dragging());
    }

    #[test]
    fn test_color_cycle_wraps() {
        let mut app = pla_app();
        assert_eq!(app.color_name(), Some("White"));
        assert_eq!(app.viewport().color(), Rgb::WHITE);

        let count = app.palette.len();
        app.apply(Action::NextColor);
        assert_ne!(app.viewport().color(), Rgb::WHITE);
        for _ in 1..count {
            app.apply(Action::NextColor);
        }
        assert_eq!(app.color_name(), Some("White"));
    }

    #[test]
    fn test_resize_and_quit() {
        let mut app = pla_app();
        app.apply(translate(&Event::Resize(120, 40)).unwrap());
        assert_eq!(app.viewport().size().width, 120);
        assert!(app.is_running());
        app.apply(Action::Quit);
        assert!(!app.is_running());
    }
}
