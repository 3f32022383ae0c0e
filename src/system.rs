use anyhow::Result;

/// Synthetic pointer input, as needed for a nudge.
pub trait Cursor {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;
    fn move_by(&mut self, dx: i32, dy: i32) -> Result<()>;
    fn release_left(&mut self) -> Result<()>;
}

/// The real pointer of the current desktop session.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCursor;

#[cfg(target_os = "macos")]
mod imp {
    use anyhow::{anyhow, Result};
    use core_graphics::display::CGDisplay;
    use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGMouseButton};
    use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
    use core_graphics::geometry::CGPoint;

    fn source() -> Result<CGEventSource> {
        CGEventSource::new(CGEventSourceStateID::HIDSystemState)
            .map_err(|_| anyhow!("Could not create a HID event source"))
    }

    fn location() -> Result<CGPoint> {
        let event = CGEvent::new(source()?).map_err(|_| anyhow!("Could not read cursor position"))?;
        Ok(event.location())
    }

    fn post(kind: CGEventType, at: CGPoint) -> Result<()> {
        let event = CGEvent::new_mouse_event(source()?, kind, at, CGMouseButton::Left)
            .map_err(|_| anyhow!("Could not create mouse event"))?;
        event.post(CGEventTapLocation::HID);
        Ok(())
    }

    pub fn move_to(x: i32, y: i32) -> Result<()> {
        CGDisplay::warp_mouse_cursor_position(CGPoint::new(x as f64, y as f64))
            .map_err(|err| anyhow!("Could not warp cursor (CGError {})", err))
    }

    pub fn move_by(dx: i32, dy: i32) -> Result<()> {
        let from = location()?;
        post(
            CGEventType::MouseMoved,
            CGPoint::new(from.x + dx as f64, from.y + dy as f64),
        )
    }

    pub fn release_left() -> Result<()> {
        post(CGEventType::LeftMouseUp, location()?)
    }
}

#[cfg(windows)]
mod imp {
    use anyhow::{bail, Result};
    use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
        mouse_event, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MOVE,
    };
    use windows_sys::Win32::UI::WindowsAndMessaging::SetCursorPos;

    pub fn move_to(x: i32, y: i32) -> Result<()> {
        // SAFETY: plain Win32 call with no pointer arguments.
        if unsafe { SetCursorPos(x, y) } == 0 {
            bail!("SetCursorPos({}, {}) failed", x, y);
        }
        Ok(())
    }

    pub fn move_by(dx: i32, dy: i32) -> Result<()> {
        // SAFETY: plain Win32 call with no pointer arguments.
        unsafe { mouse_event(MOUSEEVENTF_MOVE, dx, dy, 0, 0) };
        Ok(())
    }

    pub fn release_left() -> Result<()> {
        // SAFETY: plain Win32 call with no pointer arguments.
        unsafe { mouse_event(MOUSEEVENTF_LEFTUP, 0, 0, 0, 0) };
        Ok(())
    }
}

#[cfg(not(any(target_os = "macos", windows)))]
mod imp {
    // No synthetic input backend here (e.g. when developing on Linux); the
    // jiggler loop fails on its first nudge.
    use anyhow::{bail, Result};

    pub fn move_to(_x: i32, _y: i32) -> Result<()> {
        bail!("Synthetic mouse input is not supported on this platform")
    }

    pub fn move_by(_dx: i32, _dy: i32) -> Result<()> {
        bail!("Synthetic mouse input is not supported on this platform")
    }

    pub fn release_left() -> Result<()> {
        bail!("Synthetic mouse input is not supported on this platform")
    }
}

impl Cursor for SystemCursor {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        imp::move_to(x, y)
    }

    fn move_by(&mut self, dx: i32, dy: i32) -> Result<()> {
        imp::move_by(dx, dy)
    }

    fn release_left(&mut self) -> Result<()> {
        imp::release_left()
    }
}

#[cfg(test)]
pub mod testing {
    use super::Cursor;
    use anyhow::{bail, Result};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CursorCall {
        MoveTo(i32, i32),
        MoveBy(i32, i32),
        ReleaseLeft,
    }

    /// Records every call; clones share the same log.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingCursor {
        calls: Arc<Mutex<Vec<CursorCall>>>,
        fail: bool,
    }

    impl RecordingCursor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<CursorCall> {
            self.calls.lock().clone()
        }

        pub fn nudges(&self) -> usize {
            self.calls
                .lock()
                .iter()
                .filter(|call| **call == CursorCall::ReleaseLeft)
                .count()
        }

        fn record(&self, call: CursorCall) -> Result<()> {
            if self.fail {
                bail!("no display available");
            }
            self.calls.lock().push(call);
            Ok(())
        }
    }

    impl Cursor for RecordingCursor {
        fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
            self.record(CursorCall::MoveTo(x, y))
        }

        fn move_by(&mut self, dx: i32, dy: i32) -> Result<()> {
            self.record(CursorCall::MoveBy(dx, dy))
        }

        fn release_left(&mut self) -> Result<()> {
            self.record(CursorCall::ReleaseLeft)
        }
    }
}
