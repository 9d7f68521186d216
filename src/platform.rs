//! Capabilities the core needs from its host: user messages, clipboard
//! access and relaunching the application.

use std::process::Command;

use tracing::info;

use crate::error::{Error, Result};

/// Shows a modal message to the user.
pub trait Notifier {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Brings the application back up with freshly loaded state.
pub trait Restarter {
    fn request_restart(&self) -> Result<()>;
}

pub trait ClipboardSink {
    fn set_text(&self, text: &str) -> Result<()>;
}

/// Launches a new instance of the running executable, then exits this one.
#[derive(Debug, Default)]
pub struct ProcessRestarter;

impl Restarter for ProcessRestarter {
    fn request_restart(&self) -> Result<()> {
        let exe = std::env::current_exe().map_err(|e| Error::Restart(e.to_string()))?;
        let cwd = std::env::current_dir().map_err(|e| Error::Restart(e.to_string()))?;
        Command::new(&exe)
            .current_dir(cwd)
            .spawn()
            .map_err(|e| Error::Restart(format!("{}: {}", exe.display(), e)))?;
        info!(exe = %exe.display(), "relaunched, exiting current instance");
        std::process::exit(0);
    }
}

/// System clipboard through `arboard`.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    #[cfg(target_os = "linux")]
    fn set_text(&self, text: &str) -> Result<()> {
        use arboard::SetExtLinux;

        // X11/Wayland clipboards are served by their owner; keep it alive
        // until another client takes the selection.
        let text = text.to_string();
        std::thread::spawn(move || match arboard::Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set().wait().text(text) {
                    tracing::error!("clipboard write failed: {}", e);
                }
            }
            Err(e) => tracing::error!("clipboard unavailable: {}", e),
        });
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn set_text(&self, text: &str) -> Result<()> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| Error::Clipboard(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::cell::{Cell, RefCell};

    use super::*;

    #[derive(Default)]
    pub struct RecordingNotifier {
        pub infos: RefCell<Vec<String>>,
        pub errors: RefCell<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn info(&self, message: &str) {
            self.infos.borrow_mut().push(message.to_string());
        }

        fn error(&self, message: &str) {
            self.errors.borrow_mut().push(message.to_string());
        }
    }

    #[derive(Default)]
    pub struct CountingRestarter {
        pub restarts: Cell<usize>,
    }

    impl Restarter for CountingRestarter {
        fn request_restart(&self) -> Result<()> {
            self.restarts.set(self.restarts.get() + 1);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MemoryClipboard {
        pub contents: RefCell<Option<String>>,
    }

    impl ClipboardSink for MemoryClipboard {
        fn set_text(&self, text: &str) -> Result<()> {
            *self.contents.borrow_mut() = Some(text.to_string());
            Ok(())
        }
    }
}
