//! Primary display capture (Windows only)

use crate::error::{JarvisError, Result};
use std::path::Path;
use win_screenshot::capture::capture_display;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC,
    GetDIBits, ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS,
    HDC, SRCCOPY,
};
use windows::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN};

/// Captured RGBA frame
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Screenshot {
    /// Encode to the format implied by the file extension
    pub fn save(self, path: &Path) -> Result<()> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| JarvisError::CaptureError("Pixel buffer does not match size".into()))?;
        img.save(path)?;
        Ok(())
    }
}

/// Capture the primary display.
///
/// Uses the Graphics Capture path first and falls back to a GDI blit.
pub fn capture_screen() -> Result<Screenshot> {
    match capture_display() {
        Ok(buf) => Ok(Screenshot {
            width: buf.width,
            height: buf.height,
            data: buf.pixels,
        }),
        Err(e) => {
            log::debug!("Display capture failed ({:?}), falling back to GDI", e);
            capture_screen_gdi()
        }
    }
}

fn capture_screen_gdi() -> Result<Screenshot> {
    unsafe {
        let desktop = HWND(std::ptr::null_mut());
        let hdc_screen = GetDC(desktop);
        if hdc_screen.is_invalid() {
            return Err(JarvisError::CaptureError("Failed to get screen DC".into()));
        }
        let width = GetSystemMetrics(SM_CXSCREEN);
        let height = GetSystemMetrics(SM_CYSCREEN);
        let result = blit_to_rgba(hdc_screen, width, height);
        let _ = ReleaseDC(desktop, hdc_screen);
        result
    }
}

/// Copy `width` x `height` pixels from `hdc_src` into an RGBA buffer
unsafe fn blit_to_rgba(hdc_src: HDC, width: i32, height: i32) -> Result<Screenshot> {
    if width <= 0 || height <= 0 {
        return Err(JarvisError::CaptureError(format!(
            "Invalid screen size {}x{}",
            width, height
        )));
    }

    let hdc_mem = CreateCompatibleDC(hdc_src);
    if hdc_mem.is_invalid() {
        return Err(JarvisError::CaptureError("Failed to create compatible DC".into()));
    }
    let hbitmap = CreateCompatibleBitmap(hdc_src, width, height);
    if hbitmap.is_invalid() {
        let _ = DeleteDC(hdc_mem);
        return Err(JarvisError::CaptureError("Failed to create bitmap".into()));
    }
    let previous = SelectObject(hdc_mem, hbitmap);

    let mut pixels: Vec<u8> = vec![0; (width * height * 4) as usize];
    let copied = BitBlt(hdc_mem, 0, 0, width, height, hdc_src, 0, 0, SRCCOPY).is_ok() && {
        let mut info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                // negative height: top-down rows
                biHeight: -height,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };
        GetDIBits(
            hdc_mem,
            hbitmap,
            0,
            height as u32,
            Some(pixels.as_mut_ptr() as *mut _),
            &mut info,
            DIB_RGB_COLORS,
        ) != 0
    };

    SelectObject(hdc_mem, previous);
    let _ = DeleteObject(hbitmap);
    let _ = DeleteDC(hdc_mem);

    if !copied {
        return Err(JarvisError::CaptureError("GDI screen copy failed".into()));
    }

    // BGRA -> RGBA
    for px in pixels.chunks_exact_mut(4) {
        px.swap(0, 2);
        px[3] = 255;
    }

    Ok(Screenshot {
        width: width as u32,
        height: height as u32,
        data: pixels,
    })
}
