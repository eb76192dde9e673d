// Wayland integration module
// Owns the display session: connection, window, shm presentation and event loop

use crate::app::SessionState;
use crate::error::ViewerError;
use crate::image_loader;
use crate::rasterizer::{paste_image, Point};
use crate::surface::Surface;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState},
    delegate_compositor, delegate_keyboard, delegate_output, delegate_registry, delegate_seat,
    delegate_shm, delegate_xdg_shell, delegate_xdg_window,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    seat::{
        keyboard::{KeyEvent, KeyboardHandler, Keysym, Modifiers},
        Capability, SeatHandler, SeatState,
    },
    shell::{
        xdg::{
            window::{Window, WindowConfigure, WindowDecorations, WindowHandler},
            XdgShell,
        },
        WaylandSurface,
    },
    shm::{
        slot::{Buffer, SlotPool},
        Shm, ShmHandler,
    },
};
use std::path::Path;
use wayland_client::{
    globals::registry_queue_init,
    protocol::{wl_keyboard, wl_output, wl_seat, wl_shm, wl_surface},
    Connection, QueueHandle,
};

/// Window title and app id
pub const APP_NAME: &str = "pixview";

/// Wayland-side state of a running session
struct ViewerApp {
    registry_state: RegistryState,
    seat_state: SeatState,
    output_state: OutputState,
    shm: Shm,

    state: SessionState,

    // Released in this order when the session closes
    surface: Option<Surface>,
    buffer: Option<Buffer>,
    pool: Option<SlotPool>,
    window: Option<Window>,
}

impl ViewerApp {
    /// Copy the whole surface into a fresh shm buffer and show it
    fn present(&mut self) {
        let (Some(surface), Some(pool), Some(window)) =
            (self.surface.as_ref(), self.pool.as_mut(), self.window.as_ref())
        else {
            return;
        };

        let width = surface.width() as i32;
        let height = surface.height() as i32;
        let stride = surface.stride() as i32;
        let len = surface.as_bytes().len();

        if pool.len() < len {
            if let Err(e) = pool.resize(len) {
                error!("Failed to resize pool to {} bytes: {}", len, e);
                return;
            }
        }

        let (buffer, canvas) =
            match pool.create_buffer(width, height, stride, wl_shm::Format::Xrgb8888) {
                Ok(buf) => buf,
                Err(e) => {
                    error!("Failed to create buffer {}x{}: {}", width, height, e);
                    return;
                }
            };

        if !blit(surface, canvas) {
            error!(
                "Buffer size mismatch: canvas {} bytes, surface {} bytes",
                canvas.len(),
                len
            );
            return;
        }

        let wl_surface = window.wl_surface();
        if let Err(e) = buffer.attach_to(wl_surface) {
            error!("Failed to attach buffer: {}", e);
            return;
        }
        wl_surface.damage_buffer(0, 0, width, height);
        wl_surface.commit();
        debug!("Presented {}x{} frame", width, height);

        self.buffer = Some(buffer);
    }

    /// Enter `Closed` and drop session resources in acquisition-reverse order
    fn release(&mut self) {
        if self.state.is_running() {
            if let Err(e) = self.state.advance(SessionState::Closed) {
                warn!("{}", e);
            }
        }
        self.surface = None;
        self.buffer = None;
        self.pool = None;
        self.window = None;
        debug!("Session resources released");
    }
}

/// Copy surface bytes into a canvas of exactly the same size
fn blit(surface: &Surface, canvas: &mut [u8]) -> bool {
    let src = surface.as_bytes();
    if canvas.len() != src.len() {
        return false;
    }
    canvas.copy_from_slice(src);
    true
}

impl CompositorHandler for ViewerApp {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_factor: i32,
    ) {
        debug!("Scale factor changed");
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
        debug!("Transform changed");
    }

    fn frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
    }

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }
}

impl OutputHandler for ViewerApp {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("New output detected");
    }

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("Output updated");
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("Output destroyed");
    }
}

impl WindowHandler for ViewerApp {
    fn request_close(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _window: &Window) {
        info!("Window close requested");
        if let Err(e) = self.state.advance(SessionState::Closed) {
            warn!("{}", e);
        }
    }

    fn configure(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _window: &Window,
        configure: WindowConfigure,
        _serial: u32,
    ) {
        // Every configure is treated as an expose: repaint the whole window
        debug!("Window configured: {:?}", configure.new_size);
        self.present();
    }
}

impl SeatHandler for ViewerApp {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seat_state
    }

    fn new_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {
        debug!("New seat");
    }

    fn new_capability(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        debug!("New capability: {:?}", capability);

        if capability == Capability::Keyboard {
            if let Err(e) = self.seat_state.get_keyboard(qh, &seat, None) {
                error!("Failed to get keyboard: {}", e);
            }
        }
    }

    fn remove_capability(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _seat: wl_seat::WlSeat,
        _capability: Capability,
    ) {
        debug!("Capability removed");
    }

    fn remove_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {
        debug!("Seat removed");
    }
}

impl KeyboardHandler for ViewerApp {
    fn enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
        _raw: &[u32],
        _keysyms: &[Keysym],
    ) {
        debug!("Keyboard entered surface");
    }

    fn leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
    ) {
        debug!("Keyboard left surface");
    }

    fn press_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        event: KeyEvent,
    ) {
        // Key presses are subscribed to but have no action
        debug!("Key pressed: {:?}", event.keysym);
    }

    fn release_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        _event: KeyEvent,
    ) {
    }

    fn update_modifiers(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        _modifiers: Modifiers,
        _layout: u32,
    ) {
    }
}

impl ShmHandler for ViewerApp {
    fn shm_state(&mut self) -> &mut Shm {
        &mut self.shm
    }
}

impl ProvidesRegistryState for ViewerApp {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    registry_handlers![OutputState, SeatState];
}

// Delegate macros
delegate_compositor!(ViewerApp);
delegate_output!(ViewerApp);
delegate_seat!(ViewerApp);
delegate_keyboard!(ViewerApp);
delegate_shm!(ViewerApp);
delegate_xdg_shell!(ViewerApp);
delegate_xdg_window!(ViewerApp);
delegate_registry!(ViewerApp);

/// Show the PNG at `image_path` until the window is closed
pub fn run(image_path: &Path) -> Result<()> {
    let mut state = SessionState::Uninitialized;

    info!("Connecting to Wayland display");
    let conn = Connection::connect_to_env()
        .map_err(|e| ViewerError::DisplayUnavailable(e.to_string()))?;
    state.advance(SessionState::Connected)?;

    // A failed decode ends the session before any window is created
    let image = image_loader::decode(image_path)?;
    let (width, height) = image.dimensions();

    let (globals, mut event_queue) =
        registry_queue_init(&conn).context("Failed to initialize registry")?;
    let qh = event_queue.handle();

    let compositor_state =
        CompositorState::bind(&globals, &qh).context("Failed to bind compositor")?;
    let xdg_shell = XdgShell::bind(&globals, &qh).context("Failed to bind xdg shell")?;
    let shm = Shm::bind(&globals, &qh).context("Failed to bind shm")?;

    let mut surface = Surface::new(width, height)?;
    paste_image(&mut surface, &image, Point::ORIGIN);
    info!("Rendered {} points onto {}x{} surface", image.count(), width, height);

    let pool = SlotPool::new(surface.as_bytes().len(), &shm).context("Failed to create slot pool")?;

    let wl_surface = compositor_state.create_surface(&qh);
    let window = xdg_shell.create_window(wl_surface, WindowDecorations::RequestServer, &qh);
    window.set_title(APP_NAME);
    window.set_app_id(APP_NAME);
    window.set_min_size(Some((width, height)));
    window.set_max_size(Some((width, height)));

    // Commit the surface to trigger the first configure
    window.commit();

    let mut app = ViewerApp {
        registry_state: RegistryState::new(&globals),
        seat_state: SeatState::new(&globals, &qh),
        output_state: OutputState::new(&globals, &qh),
        shm,
        state,
        surface: Some(surface),
        buffer: None,
        pool: Some(pool),
        window: Some(window),
    };
    app.state.advance(SessionState::Running)?;

    info!("Starting event loop ({}x{} window)", width, height);
    while app.state.is_running() {
        if let Err(e) = event_queue.blocking_dispatch(&mut app) {
            warn!("Lost connection to compositor: {}", e);
            break;
        }
    }

    app.release();
    drop(app);
    drop(event_queue);
    drop(conn);
    info!("Disconnected from Wayland display");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blit_copies_matching_sizes() {
        let mut surface = Surface::new(2, 1).unwrap();
        surface.set_pixel(1, 0, 1, 2, 3);
        let mut canvas = vec![0xAA; 8];

        assert!(blit(&surface, &mut canvas));
        assert_eq!(canvas, vec![0, 0, 0, 0, 3, 2, 1, 0]);
    }

    #[test]
    fn blit_rejects_mismatched_canvas() {
        let surface = Surface::new(2, 2).unwrap();
        let mut canvas = vec![0xAA; 12];

        assert!(!blit(&surface, &mut canvas));
        assert!(canvas.iter().all(|&b| b == 0xAA));
    }
}
