use crate::{AppError, AppResult, BoothCommand, controller::BoothView};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    sync::{mpsc, watch},
};
use tracing::{debug, info, instrument};

const HELP: &str = "commands: start | register <name> | <email> | <phone> | stop | retake | upload | home | status | settings | quit";

/// Turn one console line into a command.
///
/// Registration fields are separated by `|` so names may contain spaces.
pub fn parse_command(line: &str) -> Option<BoothCommand> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));

    let command = match word.to_ascii_lowercase().as_str() {
        "start" => BoothCommand::Start,
        "register" => {
            let mut fields = rest.split('|').map(str::trim);
            let (Some(name), Some(email), Some(phone), None) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                return None;
            };
            BoothCommand::SubmitRegistration {
                name: name.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
            }
        }
        "stop" => BoothCommand::StopRecording,
        "retake" => BoothCommand::Retake,
        "upload" => BoothCommand::Upload,
        "home" => BoothCommand::Home,
        "status" => BoothCommand::Status,
        "settings" => BoothCommand::OpenSettings,
        "quit" | "exit" => BoothCommand::Shutdown,
        _ => return None,
    };

    Some(command)
}

/// One status line per view change.
pub fn render_view(view: &BoothView) -> String {
    let mut line = format!("[{}]", view.screen);

    if !view.capture_ready {
        line.push_str(" camera not ready");
    }
    for field in &view.invalid_fields {
        line.push_str(&format!(" | {}", field));
    }
    if let Some(message) = &view.message {
        line.push_str(&format!(" | {}", message));
    }
    if let Some(path) = &view.edited_path {
        line.push_str(&format!(" | video: {}", path.display()));
    }
    if let Some(link) = &view.download_link {
        line.push_str(&format!(" | link: {}", link));
    }
    if let Some(path) = &view.qr_path {
        line.push_str(&format!(" | qr: {}", path.display()));
    }

    line
}

/// Line-oriented front end: stdin in, view changes out.
pub struct Console {
    command_tx: mpsc::Sender<BoothCommand>,
    view_rx: watch::Receiver<BoothView>,
}

impl Console {
    /// Console feeding `command_tx` and rendering `view_rx`.
    pub fn new(command_tx: mpsc::Sender<BoothCommand>, view_rx: watch::Receiver<BoothView>) -> Self {
        Self {
            command_tx,
            view_rx,
        }
    }

    /// Run on the process's stdin and stdout.
    pub async fn run(self, shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        self.run_with(tokio::io::stdin(), tokio::io::stdout(), shutdown_rx)
            .await
    }

    /// Run until shutdown. End of input stops reading but keeps rendering.
    #[instrument(skip_all)]
    pub async fn run_with<R, W>(
        mut self,
        input: R,
        mut output: W,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> AppResult<()>
    where
        R: tokio::io::AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(input).lines();
        let mut input_open = true;

        write_line(&mut output, HELP).await?;
        let first = render_view(&self.view_rx.borrow_and_update());
        write_line(&mut output, &first).await?;

        loop {
            tokio::select! {
                line = lines.next_line(), if input_open => {
                    match line? {
                        Some(line) if line.trim().is_empty() => {}
                        Some(line) => match parse_command(&line) {
                            Some(command) => {
                                debug!(command = ?command, "Console command");
                                self.command_tx.send(command).await.map_err(|e| {
                                    AppError::ChannelSendFailed {
                                        message: format!("Failed to send command: {}", e),
                                        location: ErrorLocation::from(Location::caller()),
                                    }
                                })?;
                            }
                            None => write_line(&mut output, HELP).await?,
                        },
                        None => {
                            info!("Console input closed");
                            input_open = false;
                        }
                    }
                }

                changed = self.view_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let rendered = render_view(&self.view_rx.borrow_and_update());
                    write_line(&mut output, &rendered).await?;
                }

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        Ok(())
    }
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> AppResult<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
