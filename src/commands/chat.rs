use crate::gateway::GatewayError;
use crate::session::models::Message;
use crate::AppState;
use tracing::Instrument;

/// Longest chat input accepted, in characters.
pub const MAX_INPUT_CHARS: usize = 1000;

/// Trims the raw input and caps it at `MAX_INPUT_CHARS`. `None` when blank.
pub fn normalize_input(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_INPUT_CHARS).collect())
}

/// Sends one chat turn and records the outcome in the transcript.
///
/// Returns the assistant message that was appended, or `None` when the input
/// was ignored (blank, or a request is already in flight).
pub async fn send_message(state: &mut AppState, input: &str) -> Option<Message> {
    let text = normalize_input(input)?;
    // Only reachable from hosts that share the state across tasks; the REPL
    // awaits each command before reading the next line.
    if state.session.flags.is_loading {
        tracing::debug!("chat request already in flight, ignoring input");
        return None;
    }

    // 1. No processed file: answer locally
    let Some(upload_id) = state.session.upload_id().map(str::to_string) else {
        let reply = Message::assistant(GatewayError::Precondition.user_message());
        state.session.append_message(reply.clone());
        return Some(reply);
    };

    // 2. Ask the gateway with the current history window as context
    let user_msg = Message::user(text);
    let history = state.session.history_entries();
    state.session.flags.is_loading = true;
    let span = tracing::info_span!("chat", session = %state.id, %upload_id);
    let result = state
        .gateway
        .submit_chat_turn(&user_msg.content, &upload_id, &history)
        .instrument(span)
        .await;
    state.session.flags.is_loading = false;

    // 3. Record the turn, or the user line plus a classified error
    match result {
        Ok(answer) => {
            let reply = Message::assistant(answer);
            state.session.record_turn(user_msg, reply.clone());
            Some(reply)
        }
        Err(e) => {
            tracing::warn!(kind = ?e.kind(), error = %e, "chat turn failed");
            let reply = Message::assistant(e.user_message());
            state.session.append_message(user_msg);
            state.session.append_message(reply.clone());
            Some(reply)
        }
    }
}
