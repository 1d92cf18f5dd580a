// src/platform/win32.rs
#![allow(non_snake_case)] // Allow non-snake case for Win32 types

//! Win32 window backend.
//!
//! Win32 delivers `WM_CLOSE` by calling the window procedure directly, never
//! through the thread queue. The procedure therefore re-posts it as a
//! registered private message whose id is the close token, and `poll` sees it
//! in the queue exactly like X11 sees `WM_DELETE_WINDOW`. Classification then
//! goes through the same [`drain_events`] as every other backend.

use crate::error::{PlatformError, Result};
use crate::event::{drain_events, CloseToken, PollStatus, WindowEvent};
use crate::platform::{validate_dimensions, NativeSurface, PlatformWindow};
use crate::renderer::PixelBuffer;
use log::{debug, error, info, trace};
use std::ffi::OsStr;
use std::iter::once;
use std::mem;
use std::os::windows::ffi::OsStrExt;
use std::ptr;
use winapi::ctypes::c_void;
use winapi::shared::minwindef::{FALSE, HINSTANCE, LPARAM, LRESULT, UINT, WPARAM};
use winapi::shared::windef::{HDC, HWND, RECT};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::libloaderapi::GetModuleHandleW;
use winapi::um::wingdi::{
    SetDIBitsToDevice, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, RGBQUAD,
};
use winapi::um::winuser::{
    AdjustWindowRect, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetDC,
    GetWindowLongPtrW, LoadCursorW, PeekMessageW, PostMessageW, RegisterClassW,
    RegisterWindowMessageW, ReleaseDC, SetWindowLongPtrW, ShowWindow, TranslateMessage,
    UnregisterClassW, UpdateWindow, CS_HREDRAW, CS_OWNDC, CS_VREDRAW, CW_USEDEFAULT,
    GWLP_USERDATA, IDC_ARROW, MSG, PM_REMOVE, SW_SHOW, WM_CLOSE, WM_KEYDOWN, WM_SYSKEYDOWN,
    WNDCLASSW, WS_OVERLAPPEDWINDOW,
};

const CLASS_NAME: &str = "SoftframeWindowClass";
const CLOSE_MESSAGE_NAME: &str = "Softframe.CloseRequest";

fn wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(once(0)).collect()
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: UINT,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_CLOSE {
        // Stored by `open` once the message id is registered.
        let close_message = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as UINT;
        if close_message != 0 {
            PostMessageW(hwnd, close_message, close_message as WPARAM, 0);
            return 0;
        }
    }
    DefWindowProcW(hwnd, msg, wparam, lparam)
}

/// The registered window class, unregistered on drop.
#[derive(Debug)]
struct RegisteredClass {
    name: Vec<u16>,
    instance: HINSTANCE,
}

impl RegisteredClass {
    fn register(instance: HINSTANCE) -> Result<Self> {
        let name = wide(CLASS_NAME);
        // SAFETY: every pointer in the class description outlives the call;
        // `name` is kept alive in the returned value for UnregisterClassW.
        let atom = unsafe {
            let class = WNDCLASSW {
                style: CS_HREDRAW | CS_VREDRAW | CS_OWNDC,
                lpfnWndProc: Some(window_proc),
                cbClsExtra: 0,
                cbWndExtra: 0,
                hInstance: instance,
                hIcon: ptr::null_mut(),
                hCursor: LoadCursorW(ptr::null_mut(), IDC_ARROW),
                hbrBackground: ptr::null_mut(),
                lpszMenuName: ptr::null(),
                lpszClassName: name.as_ptr(),
            };
            RegisterClassW(&class)
        };
        if atom == 0 {
            return Err(PlatformError::WindowCreation(format!(
                "RegisterClassW failed (error {})",
                last_error()
            )));
        }
        debug!("Window class '{}' registered", CLASS_NAME);
        Ok(Self { name, instance })
    }
}

impl Drop for RegisteredClass {
    fn drop(&mut self) {
        debug!("Unregistering window class '{}'", CLASS_NAME);
        // SAFETY: the class was registered with this name and instance.
        unsafe {
            UnregisterClassW(self.name.as_ptr(), self.instance);
        }
    }
}

/// A created window, destroyed on drop.
#[derive(Debug)]
struct ManagedHwnd(HWND);

impl Drop for ManagedHwnd {
    fn drop(&mut self) {
        debug!("Destroying window {:p}", self.0);
        // SAFETY: the handle came from CreateWindowExW and is destroyed only here.
        unsafe {
            DestroyWindow(self.0);
        }
    }
}

/// The window's device context, released on drop.
#[derive(Debug)]
struct ManagedDc {
    hwnd: HWND,
    hdc: HDC,
}

impl Drop for ManagedDc {
    fn drop(&mut self) {
        debug!("Releasing device context {:p}", self.hdc);
        // SAFETY: hdc was obtained from GetDC(hwnd) and is released only here.
        unsafe {
            ReleaseDC(self.hwnd, self.hdc);
        }
    }
}

fn last_error() -> u32 {
    // SAFETY: reads thread-local error state only.
    unsafe { GetLastError() }
}

fn to_i32(value: u32, what: &str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| PlatformError::WindowCreation(format!("{} {} is out of range", what, value)))
}

/// A shown top-level window with its device context.
#[derive(Debug)]
pub struct Win32Window {
    // Drop order: DC, window, class.
    dc: ManagedDc,
    window: ManagedHwnd,
    _class: RegisteredClass,
    close_message: UINT,
    width: u32,
    height: u32,
}

impl PlatformWindow for Win32Window {
    type Surface = Win32Surface;

    fn open(width: u32, height: u32, title: &str) -> Result<Self> {
        validate_dimensions(width, height)?;
        info!("Opening Win32 window '{}' ({}x{})", title, width, height);

        // SAFETY: a null module name yields the handle of the running executable.
        let instance = unsafe { GetModuleHandleW(ptr::null()) };
        if instance.is_null() {
            return Err(PlatformError::Connection(format!(
                "GetModuleHandleW failed (error {})",
                last_error()
            )));
        }

        let class = RegisteredClass::register(instance)?;

        // Grow the outer rectangle so the client area is exactly width x height.
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: to_i32(width, "width")?,
            bottom: to_i32(height, "height")?,
        };
        // SAFETY: rect is a valid, writable RECT.
        unsafe {
            AdjustWindowRect(&mut rect, WS_OVERLAPPEDWINDOW, FALSE);
        }

        let title = wide(title);
        // SAFETY: class and title strings are NUL-terminated and outlive the call.
        let hwnd = unsafe {
            CreateWindowExW(
                0,
                class.name.as_ptr(),
                title.as_ptr(),
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                rect.right - rect.left,
                rect.bottom - rect.top,
                ptr::null_mut(),
                ptr::null_mut(),
                instance,
                ptr::null_mut(),
            )
        };
        if hwnd.is_null() {
            return Err(PlatformError::WindowCreation(format!(
                "CreateWindowExW failed (error {})",
                last_error()
            )));
        }
        let window = ManagedHwnd(hwnd);

        let close_name = wide(CLOSE_MESSAGE_NAME);
        // SAFETY: close_name is NUL-terminated.
        let close_message = unsafe { RegisterWindowMessageW(close_name.as_ptr()) };
        if close_message == 0 {
            return Err(PlatformError::WindowCreation(format!(
                "RegisterWindowMessageW failed (error {})",
                last_error()
            )));
        }
        // SAFETY: hwnd is live; the procedure only reads this slot.
        unsafe {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, close_message as _);
        }
        debug!("Close message registered as {:#x}", close_message);

        // SAFETY: hwnd is live.
        let hdc = unsafe { GetDC(hwnd) };
        if hdc.is_null() {
            return Err(PlatformError::WindowCreation(
                "GetDC returned no device context".to_string(),
            ));
        }
        let dc = ManagedDc { hwnd, hdc };

        // SAFETY: hwnd is live.
        unsafe {
            ShowWindow(hwnd, SW_SHOW);
            UpdateWindow(hwnd);
        }
        info!("Win32 window {:p} shown", hwnd);

        Ok(Self {
            dc,
            window,
            _class: class,
            close_message,
            width,
            height,
        })
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn close_token(&self) -> CloseToken {
        CloseToken::new(self.close_message as u64)
    }

    fn poll(&mut self) -> PollStatus {
        let close_message = self.close_message;
        let queued = std::iter::from_fn(|| {
            let mut msg: MSG = unsafe { mem::zeroed() };
            // SAFETY: msg is writable; PM_REMOVE without a wait flag never blocks.
            if unsafe { PeekMessageW(&mut msg, ptr::null_mut(), 0, 0, PM_REMOVE) } == 0 {
                return None;
            }
            let event = translate_message(&msg, close_message);
            if !matches!(event, WindowEvent::CloseRequest { .. }) {
                // SAFETY: msg was just filled by PeekMessageW.
                unsafe {
                    TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
            Some(event)
        });
        drain_events(queued, self.close_token())
    }

    fn create_surface(&self, buffer: PixelBuffer) -> Result<Win32Surface> {
        if buffer.width() != self.width || buffer.height() != self.height {
            return Err(PlatformError::Surface(format!(
                "buffer is {}x{} but the window is {}x{}",
                buffer.width(),
                buffer.height(),
                self.width,
                self.height
            )));
        }
        Win32Surface::create(buffer)
    }

    fn blit(&self, surface: &Win32Surface) {
        let width = surface.buffer.width();
        let height = surface.buffer.height();
        trace!("SetDIBitsToDevice {}x{} to window {:p}", width, height, self.window.0);
        // SAFETY: the DC is live; bits and header describe the same buffer.
        let lines = unsafe {
            SetDIBitsToDevice(
                self.dc.hdc,
                0,
                0,
                width,
                height,
                0,
                0,
                0,
                height,
                surface.buffer.as_ptr() as *const c_void,
                &surface.info,
                DIB_RGB_COLORS,
            )
        };
        if lines == 0 {
            error!("SetDIBitsToDevice failed (error {})", last_error());
        }
    }
}

fn translate_message(msg: &MSG, close_message: UINT) -> WindowEvent {
    match msg.message {
        WM_KEYDOWN | WM_SYSKEYDOWN => WindowEvent::KeyPress,
        m if m == close_message => WindowEvent::CloseRequest {
            token: CloseToken::new(msg.wParam as u64),
        },
        _ => WindowEvent::Other,
    }
}

/// A top-down 32-bpp DIB description over the owned [`PixelBuffer`].
///
/// GDI reads the pixels straight from the buffer on every blit; there is no
/// GDI object to free, so dropping the surface releases the buffer only.
pub struct Win32Surface {
    info: BITMAPINFO,
    buffer: PixelBuffer,
}

impl Win32Surface {
    fn create(buffer: PixelBuffer) -> Result<Self> {
        let as_i32 = |v: u32| {
            i32::try_from(v)
                .map_err(|_| PlatformError::Surface(format!("dimension {} exceeds DIB limits", v)))
        };
        let width = as_i32(buffer.width())?;
        let height = as_i32(buffer.height())?;

        let header = BITMAPINFOHEADER {
            biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: width,
            // Negative height: rows run top to bottom, matching the buffer.
            biHeight: -height,
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB,
            biSizeImage: 0,
            biXPelsPerMeter: 0,
            biYPelsPerMeter: 0,
            biClrUsed: 0,
            biClrImportant: 0,
        };
        let info = BITMAPINFO {
            bmiHeader: header,
            bmiColors: [RGBQUAD {
                rgbBlue: 0,
                rgbGreen: 0,
                rgbRed: 0,
                rgbReserved: 0,
            }],
        };
        debug!("DIB view over {}x{} buffer", width, height);
        Ok(Self { info, buffer })
    }
}

impl NativeSurface for Win32Surface {
    fn pixels(&self) -> &[u32] {
        self.buffer.as_slice()
    }

    fn pixels_mut(&mut self) -> &mut [u32] {
        self.buffer.as_mut_slice()
    }
}
