//! Window listing through the Win32 API.

use log::debug;
use windows::Win32::Foundation::{BOOL, E_ACCESSDENIED, ERROR_ACCESS_DENIED, HWND, LPARAM, TRUE};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetClassNameW, GetWindowTextW, IsWindowVisible,
};

use super::{Enumeration, WindowInfo, WindowSystem};
use crate::error::EnumerationError;

pub struct Win32Windows;

unsafe extern "system" fn collect_handle(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let handles = &mut *(lparam.0 as *mut Vec<HWND>);
    handles.push(hwnd);
    TRUE
}

fn utf16_text(buf: &[u16], len: i32) -> String {
    let len = usize::try_from(len).unwrap_or(0).min(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

fn describe(hwnd: HWND) -> WindowInfo {
    let mut class_buf = [0u16; 256];
    let class_len = unsafe { GetClassNameW(hwnd, &mut class_buf) };

    let mut title_buf = [0u16; 512];
    let title_len = unsafe { GetWindowTextW(hwnd, &mut title_buf) };

    let visible = unsafe { IsWindowVisible(hwnd) }.as_bool();

    WindowInfo {
        handle: hwnd.0 as usize as u64,
        title: utf16_text(&title_buf, title_len),
        class_name: utf16_text(&class_buf, class_len),
        visible,
    }
}

impl WindowSystem for Win32Windows {
    fn enumerate(&self) -> Enumeration {
        let mut handles: Vec<HWND> = Vec::new();
        let result = unsafe {
            EnumWindows(
                Some(collect_handle),
                LPARAM(&mut handles as *mut Vec<HWND> as isize),
            )
        };

        let windows: Vec<WindowInfo> = handles.into_iter().map(describe).collect();
        debug!("EnumWindows returned {} top-level windows", windows.len());

        let error = result.err().map(|e| {
            let code = e.code();
            if code == E_ACCESSDENIED || code == ERROR_ACCESS_DENIED.to_hresult() {
                EnumerationError::PermissionDenied(e.to_string())
            } else {
                EnumerationError::Failed(e.to_string())
            }
        });

        Enumeration { windows, error }
    }
}
