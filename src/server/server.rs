//! WebSocket server implementation.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;

use crate::data::load_quiz_bank;
use crate::protocol::{ClientMessage, ServerMessage};

use super::state::ServerState;

/// Shared service state wrapped in Arc<Mutex> for async access.
type SharedState = Arc<Mutex<ServerState>>;

/// Run the quiz service.
pub async fn run<P: AsRef<Path>>(
    port: u16,
    quizzes_path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let quizzes = load_quiz_bank(quizzes_path)?;
    log::info!("loaded {} quizzes", quizzes.len());

    let state = Arc::new(Mutex::new(ServerState::new(quizzes)));

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    log::info!("listening on {}", addr);

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tokio::spawn(handle_connection(stream, peer, Arc::clone(&state)));
            }
            Err(e) => {
                log::error!("failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(stream: TcpStream, peer: SocketAddr, state: SharedState) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            log::warn!("WebSocket handshake with {} failed: {}", peer, e);
            return;
        }
    };
    log::info!("client connected from {}", peer);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Channel for replies to this client.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Forward replies from the channel to the WebSocket.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = serde_json::to_string(&msg).unwrap();
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Process incoming requests.
    while let Some(msg) = ws_receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) => break,
            Err(_) => break,
            _ => continue,
        };

        let client_msg: ClientMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("ignoring malformed message from {}: {}", peer, e);
                continue;
            }
        };

        handle_client_message(client_msg, &state, &tx).await;
    }

    log::info!("client {} disconnected", peer);
    send_task.abort();
}

/// Handle a single client request and queue the reply.
async fn handle_client_message(
    msg: ClientMessage,
    state: &SharedState,
    tx: &mpsc::UnboundedSender<ServerMessage>,
) {
    let mut state = state.lock().await;

    let reply = match msg {
        ClientMessage::FetchQuiz { quiz_id } => match state.quiz(&quiz_id) {
            Some(quiz) => ServerMessage::Quiz { quiz: quiz.clone() },
            None => {
                log::warn!("quiz {:?} not found", quiz_id);
                ServerMessage::QuizNotFound { quiz_id }
            }
        },
        ClientMessage::OpenAttempt { quiz_id } => match state.open_attempt(&quiz_id) {
            Some(attempt_id) => {
                log::info!("opened attempt {} for quiz {:?}", attempt_id, quiz_id);
                ServerMessage::AttemptOpened { attempt_id }
            }
            None => {
                log::warn!("cannot open attempt: quiz {:?} not found", quiz_id);
                ServerMessage::QuizNotFound { quiz_id }
            }
        },
        ClientMessage::SubmitAttempt {
            attempt_id,
            answers,
        } => match state.submit(attempt_id, &answers) {
            Ok(grade) => {
                log::info!(
                    "graded attempt {}: {}/{}",
                    attempt_id,
                    grade.score,
                    grade.total
                );
                ServerMessage::SubmitAck {
                    attempt_id,
                    score: grade.score,
                    total: grade.total,
                }
            }
            Err(e) => {
                log::warn!("submission rejected: {}", e);
                ServerMessage::SubmitRejected {
                    reason: e.to_string(),
                }
            }
        },
    };

    let _ = tx.send(reply);
}
