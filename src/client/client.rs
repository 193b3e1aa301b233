//! WebSocket client implementation.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::protocol::ClientMessage;
use crate::session::{AttemptSession, SessionEvent, Status};
use crate::terminal;

use super::app::ClientApp;
use super::ui;

/// Take a quiz: connect to the service, open an attempt, run the TUI.
pub async fn run(
    quiz_id: String,
    host: String,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("ws://{}:{}", host, port);
    log::info!("connecting to {}", url);

    let (ws_stream, _) = match tokio_tungstenite::connect_async(&url).await {
        Ok(result) => result,
        Err(e) => {
            return Err(format!("Failed to connect to quiz service: {}", e).into());
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Outbound requests from the session go through this channel.
    let (outbox_tx, mut outbox_rx) = mpsc::unbounded_channel::<ClientMessage>();

    tokio::spawn(async move {
        while let Some(msg) = outbox_rx.recv().await {
            let json = serde_json::to_string(&msg).unwrap();
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Responses and timer events both land in the session's event channel.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<SessionEvent>();

    let inbound_tx = event_tx.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.next().await {
            let event = match msg {
                Ok(Message::Text(text)) => match serde_json::from_str(text.as_str()) {
                    Ok(server_msg) => SessionEvent::Server(server_msg),
                    Err(_) => continue,
                },
                Ok(Message::Close(_)) => SessionEvent::ConnectionLost {
                    reason: "Connection closed by server".to_string(),
                },
                Err(e) => SessionEvent::ConnectionLost {
                    reason: format!("Connection error: {}", e),
                },
                _ => continue,
            };

            let ended = matches!(event, SessionEvent::ConnectionLost { .. });
            if inbound_tx.send(event).is_err() || ended {
                break;
            }
        }
    });

    let session = AttemptSession::open(quiz_id, outbox_tx, event_tx);
    let app = ClientApp::new(session);

    run_tui(app, event_rx).await?;

    recv_task.abort();
    Ok(())
}

/// Run the client TUI.
async fn run_tui(
    mut app: ClientApp,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = terminal::init()?;

    loop {
        // Drain everything that arrived since the last frame.
        while let Ok(event) = events.try_recv() {
            app.apply(event);
        }

        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle input with a timeout so ticks keep flowing.
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if handle_input(&mut app, key.code) {
                    break;
                }
            }
        }
    }

    app.session.teardown();
    terminal::restore()?;
    Ok(())
}

/// Handle keyboard input. Returns true if the app should exit.
fn handle_input(app: &mut ClientApp, key: KeyCode) -> bool {
    match app.session.status() {
        Status::InProgress => match key {
            KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
            KeyCode::Enter | KeyCode::Char(' ') => app.record_highlighted(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => app.go_next(),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => app.go_previous(),
            KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            _ => {}
        },
        Status::Failed => match key {
            KeyCode::Char('r') | KeyCode::Char('R') => app.session.retry_submit(),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return true,
            _ => {}
        },
        Status::Loading | Status::Submitting => {
            if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
                return true;
            }
        }
        Status::Submitted | Status::LoadFailed => {
            if matches!(
                key,
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc | KeyCode::Enter
            ) {
                return true;
            }
        }
    }

    false
}
