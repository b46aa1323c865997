use windows::core::PCWSTR;
use windows::Win32::Foundation::HWND;

use crate::command_line::SampleCommandLine;
use crate::error::MyResult;

/// Trait for DirectX samples that provides a common interface
/// for initialization, rendering, and window management.
pub trait Sample: Sized {
    /// The name of the window class registered for this sample.
    const CLASS_NAME: PCWSTR;

    /// Creates a new sample instance with the given command line arguments.
    /// No window exists yet, so device creation belongs in `bind_to_window`.
    fn new(command_line: &SampleCommandLine) -> MyResult<Self>;

    fn bind_to_window(&mut self, hwnd: HWND) -> MyResult<()>;

    /// Called once per frame before `render` with the clamped frame time in seconds.
    fn update(&mut self, _delta: f32) {}

    fn render(&mut self) -> MyResult<()> {
        Ok(())
    }

    fn on_key_down(&mut self, _key: u8) {}

    fn on_key_up(&mut self, _key: u8) {}

    /// New client area size. Only sent once `bind_to_window` has succeeded.
    fn on_resize(&mut self, _width: u32, _height: u32) -> MyResult<()> {
        Ok(())
    }

    fn on_destroy(&mut self) {}

    fn title(&self) -> String {
        "DXSample".into()
    }

    fn window_size(&self) -> (i32, i32) {
        (800, 600)
    }
}
