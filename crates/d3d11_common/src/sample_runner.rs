use tracing::error;
use tracing::info;
use widestring::U16CString;
use windows::core::PCWSTR;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Gdi::HBRUSH;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::command_line::build_command_line;
use crate::command_line::SampleCommandLine;
use crate::dx_sample::Sample;
use crate::error::MyResult;
use crate::frame_clock::FrameClock;

/// Runs a sample with the process command line until its window closes.
pub fn run_sample<S: Sample>() -> MyResult<()> {
    run_sample_with::<S>(&build_command_line())
}

pub fn run_sample_with<S: Sample>(command_line: &SampleCommandLine) -> MyResult<()> {
    let instance = unsafe { GetModuleHandleW(None)? };

    let wc = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wndproc::<S>),
        hInstance: instance.into(),
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW)? },
        lpszClassName: S::CLASS_NAME,
        hbrBackground: HBRUSH::default(),
        ..Default::default()
    };
    let atom = unsafe { RegisterClassExW(&wc) };
    if atom == 0 {
        return Err(eyre::eyre!("failed to register the window class").into());
    }

    let mut sample = Box::new(S::new(command_line)?);

    let (width, height) = sample.window_size();
    let mut window_rect = RECT {
        left: 0,
        top: 0,
        right: width,
        bottom: height,
    };
    unsafe { AdjustWindowRect(&mut window_rect, WS_OVERLAPPEDWINDOW, false)? };

    let mut title = sample.title();
    if command_line.use_warp_device {
        title.push_str(" (WARP)");
    }
    let title = U16CString::from_str_truncate(title);

    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            S::CLASS_NAME,
            PCWSTR(title.as_ptr()),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            window_rect.right - window_rect.left,
            window_rect.bottom - window_rect.top,
            None,
            None,
            Some(instance.into()),
            None,
        )
    }?;

    // The window has no sample attached yet, so messages sent while the
    // device is created go to the default procedure.
    if let Err(e) = sample.bind_to_window(hwnd) {
        unsafe { _ = DestroyWindow(hwnd) };
        return Err(e);
    }

    // From here on the sample is only reached through this pointer, both by
    // the loop and by the window procedure. WM_DESTROY detaches it before
    // WM_QUIT ends the loop.
    let sample_ptr = Box::into_raw(sample);
    unsafe {
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, sample_ptr as isize);
        _ = ShowWindow(hwnd, SW_SHOW);
    }
    info!("Window shown, entering message loop");

    let mut clock = FrameClock::default();
    loop {
        let mut message = MSG::default();
        if unsafe { PeekMessageW(&mut message, None, 0, 0, PM_REMOVE) }.into() {
            if message.message == WM_QUIT {
                break;
            }
            unsafe {
                _ = TranslateMessage(&message);
                DispatchMessageW(&message);
            }
        } else {
            let sample = unsafe { &mut *sample_ptr };
            sample.update(clock.tick());
            if let Err(e) = sample.render() {
                error!("Render error: {e:?}");
            }
        }
    }

    let mut sample = unsafe { Box::from_raw(sample_ptr) };
    sample.on_destroy();
    Ok(())
}

fn handle_message<S: Sample>(sample: &mut S, message: u32, wparam: WPARAM, lparam: LPARAM) -> bool {
    match message {
        WM_KEYDOWN => {
            sample.on_key_down(wparam.0 as u8);
            true
        }
        WM_KEYUP => {
            sample.on_key_up(wparam.0 as u8);
            true
        }
        WM_SIZE => {
            let width = (lparam.0 & 0xffff) as u32;
            let height = ((lparam.0 >> 16) & 0xffff) as u32;
            if let Err(e) = sample.on_resize(width, height) {
                error!("Resize error: {e:?}");
            }
            true
        }
        // Keep the screen saver, monitor power-down and the Alt menu from
        // interrupting rendering.
        WM_SYSCOMMAND => matches!(
            (wparam.0 & 0xfff0) as u32,
            SC_SCREENSAVE | SC_MONITORPOWER | SC_KEYMENU
        ),
        _ => false,
    }
}

extern "system" fn wndproc<S: Sample>(
    window: HWND,
    message: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if message == WM_DESTROY {
        unsafe {
            SetWindowLongPtrW(window, GWLP_USERDATA, 0);
            PostQuitMessage(0);
        }
        return LRESULT(0);
    }

    let user_data = unsafe { GetWindowLongPtrW(window, GWLP_USERDATA) };
    let handled = match std::ptr::NonNull::<S>::new(user_data as *mut S) {
        Some(mut sample) => handle_message(unsafe { sample.as_mut() }, message, wparam, lparam),
        // Messages before the sample is attached or after WM_DESTROY.
        None => false,
    };

    if handled {
        LRESULT(0)
    } else {
        unsafe { DefWindowProcW(window, message, wparam, lparam) }
    }
}
