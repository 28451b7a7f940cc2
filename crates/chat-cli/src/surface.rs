//! Presentation surface that writes the conversation to stdout.

use std::io::Write;

use chrono::Local;
use wc_client::{PresentationSurface, Role};

pub struct TerminalSurface {
    typing: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self { typing: false }
    }

    fn label(role: Role) -> &'static str {
        match role {
            Role::User => "you",
            Role::Assistant => "assistant",
            Role::System => "*",
        }
    }
}

impl PresentationSurface for TerminalSurface {
    fn append_message(&mut self, role: Role, text: &str) {
        self.hide_typing();
        let mut out = std::io::stdout().lock();
        let _ = writeln!(
            out,
            "[{}] {}> {}",
            Local::now().format("%H:%M"),
            Self::label(role),
            text
        );
    }

    fn show_typing(&mut self, label: &str) {
        if self.typing {
            return;
        }
        self.typing = true;
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "… {label}");
        let _ = out.flush();
    }

    fn hide_typing(&mut self) {
        if !self.typing {
            return;
        }
        self.typing = false;
        // Carriage return + clear line.
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\r\x1b[2K");
        let _ = out.flush();
    }
}
