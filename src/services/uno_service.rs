use time::OffsetDateTime;
use tracing::info;

use crate::{
    dto::{
        uno::{
            ChatView, GameOverPayload, GameStartedPayload, HandPayload, KickedPayload,
            ReconnectedPayload, SessionCreatedPayload, UnoStatePayload,
        },
        ws::{ServerMessage, UnoJoinPayload},
    },
    error::GameError,
    services::hub::Outbound,
    state::{
        ConnectionId,
        uno::{
            card::Color,
            engine::{PlayOutcome, Removal},
            phase::EndReason,
            player::{Player, PlayerId},
            session::UnoSession,
        },
    },
};

/// Table snapshot for everyone.
pub fn state_update(session: &UnoSession, chat_snapshot: usize) -> Outbound {
    Outbound::everyone(ServerMessage::UnoStateUpdate(Box::new(
        UnoStatePayload::snapshot(session, chat_snapshot),
    )))
}

fn hand_of(player: &Player) -> Outbound {
    Outbound::to(
        player.connection,
        ServerMessage::UnoYourHand(HandPayload {
            hand: player.hand.clone(),
        }),
    )
}

fn own_hand(session: &UnoSession, connection: ConnectionId) -> Option<Outbound> {
    session.player_for(connection).map(hand_of)
}

fn game_over(session: &UnoSession) -> Outbound {
    let engine = session.engine();
    Outbound::everyone(ServerMessage::UnoGameOver(GameOverPayload {
        winner: engine.winner().map(str::to_string),
        reason: engine
            .end_reason()
            .and_then(EndReason::describe)
            .map(str::to_string),
    }))
}

/// Seat the connection. The session token only ever goes to the joiner.
pub fn join(
    session: &mut UnoSession,
    connection: ConnectionId,
    payload: UnoJoinPayload,
    now: OffsetDateTime,
    chat_snapshot: usize,
) -> Vec<Outbound> {
    let outcome = session.join(
        connection,
        payload.player_name.as_deref(),
        payload.session_token.as_deref(),
        now,
    );

    let mut outbound = Vec::with_capacity(3);
    if outcome.reconnected {
        let name = session
            .player_for(connection)
            .map(|player| player.name.clone())
            .unwrap_or_default();
        outbound.push(Outbound::to(
            connection,
            ServerMessage::UnoReconnected(ReconnectedPayload {
                session_token: outcome.session_token,
                message: format!("Welcome back, {name}!"),
            }),
        ));
    } else {
        outbound.push(Outbound::to(
            connection,
            ServerMessage::UnoSessionCreated(SessionCreatedPayload {
                session_token: outcome.session_token,
            }),
        ));
    }
    outbound.extend(own_hand(session, connection));
    outbound.push(state_update(session, chat_snapshot));
    outbound
}

/// Deal a round and hand every player their cards.
pub fn start(session: &mut UnoSession, chat_snapshot: usize) -> Result<Vec<Outbound>, GameError> {
    let top_card = session.start()?;

    let mut outbound = vec![Outbound::everyone(ServerMessage::UnoGameStarted(
        GameStartedPayload {
            top_card,
            current_player: session.current_player().map(|player| player.name.clone()),
        },
    ))];
    outbound.extend(
        session
            .roster()
            .iter()
            .filter(|player| player.connected)
            .map(hand_of),
    );
    outbound.push(state_update(session, chat_snapshot));
    Ok(outbound)
}

/// Play a card for the connection's player.
pub fn play_card(
    session: &mut UnoSession,
    connection: ConnectionId,
    card_index: usize,
    now: OffsetDateTime,
    chat_snapshot: usize,
) -> Result<Vec<Outbound>, GameError> {
    let outcome = session.play_card(connection, card_index, now)?;

    let mut outbound: Vec<Outbound> = own_hand(session, connection).into_iter().collect();
    if let PlayOutcome::Won { .. } = outcome {
        outbound.push(game_over(session));
    }
    outbound.push(state_update(session, chat_snapshot));
    Ok(outbound)
}

/// Draw for the connection's player.
pub fn draw_card(
    session: &mut UnoSession,
    connection: ConnectionId,
    now: OffsetDateTime,
    chat_snapshot: usize,
) -> Result<Vec<Outbound>, GameError> {
    session.draw_card(connection, now)?;

    let mut outbound: Vec<Outbound> = own_hand(session, connection).into_iter().collect();
    outbound.push(state_update(session, chat_snapshot));
    Ok(outbound)
}

/// Declare the pending wild color.
pub fn choose_color(
    session: &mut UnoSession,
    connection: ConnectionId,
    color: Color,
    now: OffsetDateTime,
    chat_snapshot: usize,
) -> Result<Vec<Outbound>, GameError> {
    session.choose_color(connection, color, now)?;
    Ok(vec![state_update(session, chat_snapshot)])
}

/// Post a chat line.
pub fn chat(
    session: &mut UnoSession,
    connection: ConnectionId,
    text: &str,
    now: OffsetDateTime,
) -> Result<Vec<Outbound>, GameError> {
    let message = session.chat(connection, text, now)?;
    Ok(vec![Outbound::everyone(ServerMessage::UnoChatUpdate(
        ChatView::from(&message),
    ))])
}

fn removal_messages(session: &UnoSession, removals: &[Removal]) -> Vec<Outbound> {
    if removals.iter().any(|removal| removal.round_ended) {
        vec![game_over(session)]
    } else {
        Vec::new()
    }
}

/// Remove a player on a moderator's request.
pub fn kick(
    session: &mut UnoSession,
    player_id: PlayerId,
    chat_snapshot: usize,
) -> Result<Vec<Outbound>, GameError> {
    let removal = session.kick(player_id)?;

    let mut outbound = vec![Outbound::to(
        removal.player.connection,
        ServerMessage::UnoKicked(KickedPayload {
            message: "You have been removed from the table.".into(),
        }),
    )];
    outbound.extend(removal_messages(session, std::slice::from_ref(&removal)));
    outbound.push(state_update(session, chat_snapshot));
    Ok(outbound)
}

/// Send the table snapshot and the requester's own hand to the requester.
pub fn state_request(
    session: &UnoSession,
    connection: ConnectionId,
    chat_snapshot: usize,
) -> Vec<Outbound> {
    let mut outbound = vec![Outbound::to(
        connection,
        ServerMessage::UnoStateUpdate(Box::new(UnoStatePayload::snapshot(
            session,
            chat_snapshot,
        ))),
    )];
    outbound.extend(own_hand(session, connection));
    outbound
}

/// Back to the lobby; remaining players get their emptied hands.
pub fn reset(
    session: &mut UnoSession,
    keep_players: bool,
    chat_snapshot: usize,
) -> Result<Vec<Outbound>, GameError> {
    session.reset(keep_players)?;

    let mut outbound: Vec<Outbound> = session
        .roster()
        .iter()
        .filter(|player| player.connected)
        .map(hand_of)
        .collect();
    outbound.push(state_update(session, chat_snapshot));
    Ok(outbound)
}

/// React to a closed socket. Nothing is sent when it held no seat.
pub fn disconnect(
    session: &mut UnoSession,
    connection: ConnectionId,
    now: OffsetDateTime,
    chat_snapshot: usize,
) -> Vec<Outbound> {
    match session.disconnect(connection, now) {
        Some(_) => vec![state_update(session, chat_snapshot)],
        None => Vec::new(),
    }
}

/// Purge timed-out players and tell everyone.
pub fn sweep(session: &mut UnoSession, now: OffsetDateTime, chat_snapshot: usize) -> Vec<Outbound> {
    let removals = session.sweep(now);
    if removals.is_empty() {
        return Vec::new();
    }

    info!(removed = removals.len(), "disconnect sweep removed players");
    let mut outbound = removal_messages(session, &removals);
    outbound.push(state_update(session, chat_snapshot));
    outbound
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{
        services::hub::Recipient,
        state::{rng::RandomSource, uno::session::UnoSettings},
    };

    fn session() -> UnoSession {
        UnoSession::new(UnoSettings::default(), RandomSource::seeded(21))
    }

    fn join_as(session: &mut UnoSession, name: &str) -> (ConnectionId, Vec<Outbound>) {
        let conn = Uuid::new_v4();
        let outbound = join(
            session,
            conn,
            UnoJoinPayload {
                player_name: Some(name.into()),
                session_token: None,
            },
            OffsetDateTime::UNIX_EPOCH,
            15,
        );
        (conn, outbound)
    }

    #[test]
    fn session_token_is_only_sent_to_the_joiner() {
        let mut session = session();
        let (conn, outbound) = join_as(&mut session, "Ana");

        for message in &outbound {
            let json = serde_json::to_string(&message.message).unwrap();
            let token = &session.player_for(conn).unwrap().session_token;
            if json.contains(token.as_str()) {
                assert_eq!(message.recipient, Recipient::Connection(conn));
            }
        }
        assert!(matches!(
            outbound[0].message,
            ServerMessage::UnoSessionCreated(_)
        ));
        assert_eq!(outbound.last().unwrap().recipient, Recipient::Everyone);
    }

    #[test]
    fn start_sends_every_hand_privately() {
        let mut session = session();
        let (ana, _) = join_as(&mut session, "Ana");
        let (ben, _) = join_as(&mut session, "Ben");

        let outbound = start(&mut session, 15).unwrap();
        assert!(matches!(outbound[0].message, ServerMessage::UnoGameStarted(_)));
        let hands: Vec<Recipient> = outbound
            .iter()
            .filter(|o| matches!(o.message, ServerMessage::UnoYourHand(_)))
            .map(|o| o.recipient)
            .collect();
        assert_eq!(
            hands,
            [Recipient::Connection(ana), Recipient::Connection(ben)]
        );
    }

    #[test]
    fn kick_notifies_the_kicked_connection_and_ends_thin_rounds() {
        let mut session = session();
        join_as(&mut session, "Ana");
        let (ben, _) = join_as(&mut session, "Ben");
        start(&mut session, 15).unwrap();
        let ben_id = session.player_for(ben).unwrap().id;

        let outbound = kick(&mut session, ben_id, 15).unwrap();
        assert_eq!(outbound[0].recipient, Recipient::Connection(ben));
        assert!(matches!(outbound[0].message, ServerMessage::UnoKicked(_)));

        let ServerMessage::UnoGameOver(over) = &outbound[1].message else {
            panic!("expected uno-game-over");
        };
        assert_eq!(over.winner, None);
        assert_eq!(over.reason.as_deref(), Some("not enough players"));
    }

    #[test]
    fn sweep_is_silent_when_nobody_expires() {
        let mut session = session();
        join_as(&mut session, "Ana");
        assert!(sweep(&mut session, OffsetDateTime::UNIX_EPOCH, 15).is_empty());
    }
}
