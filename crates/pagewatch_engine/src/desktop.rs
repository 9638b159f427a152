use std::io;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[async_trait::async_trait]
pub trait DesktopNotifier: Send + Sync {
    async fn notify(&self, title: &str, subtitle: &str, body: &str) -> io::Result<()>;
}

#[async_trait::async_trait]
pub trait ClipboardWriter: Send + Sync {
    async fn set_text(&self, text: &str) -> io::Result<()>;
}

/// Notifications through the platform helper: `osascript` on macOS,
/// `notify-send` elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNotifier;

impl SystemNotifier {
    /// Notifier for the current desktop session, if there is one.
    pub fn detect() -> Option<Self> {
        has_desktop_session().then_some(Self)
    }
}

#[async_trait::async_trait]
impl DesktopNotifier for SystemNotifier {
    async fn notify(&self, title: &str, subtitle: &str, body: &str) -> io::Result<()> {
        let mut command = if cfg!(target_os = "macos") {
            let script = format!(
                "display notification \"{}\" with title \"{}\" subtitle \"{}\" sound name \"Ping\"",
                applescript_escape(body),
                applescript_escape(title),
                applescript_escape(subtitle),
            );
            let mut command = Command::new("osascript");
            command.arg("-e").arg(script);
            command
        } else {
            let mut command = Command::new("notify-send");
            command.arg(title).arg(format!("{subtitle}\n{body}"));
            command
        };
        run(&mut command, None).await
    }
}

/// Clipboard through `pbcopy` on macOS, `wl-copy` under Wayland and `xclip`
/// otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn detect() -> Option<Self> {
        has_desktop_session().then_some(Self)
    }
}

#[async_trait::async_trait]
impl ClipboardWriter for SystemClipboard {
    async fn set_text(&self, text: &str) -> io::Result<()> {
        let mut command = if cfg!(target_os = "macos") {
            Command::new("pbcopy")
        } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            Command::new("wl-copy")
        } else {
            let mut command = Command::new("xclip");
            command.args(["-selection", "clipboard"]);
            command
        };
        run(&mut command, Some(text)).await
    }
}

async fn run(command: &mut Command, stdin: Option<&str>) -> io::Result<()> {
    command
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let mut child = command.spawn()?;
    if let (Some(text), Some(mut pipe)) = (stdin, child.stdin.take()) {
        pipe.write_all(text.as_bytes()).await?;
        // Closing stdin lets the helper finish.
        drop(pipe);
    }
    let status = child.wait().await?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("helper exited with {status}")))
    }
}

/// macOS always has one; elsewhere an X11 or Wayland display must be set.
fn has_desktop_session() -> bool {
    if cfg!(target_os = "macos") {
        return true;
    }
    cfg!(any(target_os = "linux", target_os = "freebsd"))
        && (std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some())
}

fn applescript_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
