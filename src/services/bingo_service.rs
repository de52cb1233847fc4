use tracing::info;

use crate::{
    dto::{
        bingo::{
            BallDrawnPayload, BingoAnnouncedPayload, CardAssignedPayload, CardValidatedPayload,
            GameResetPayload, GameStatePayload, LineAnnouncedPayload, PlayerJoinedPayload,
            ValidationView,
        },
        ws::{
            AnnounceBingoPayload, AnnounceLinePayload, RequestCardPayload, ServerMessage,
            ValidateCardPayload,
        },
    },
    error::GameError,
    services::hub::Outbound,
    state::{
        ConnectionId,
        bingo::session::{BingoSession, CardRequest},
    },
};

/// Hand a card to the requester; a newly issued card is announced to everyone.
pub fn request_card(
    session: &mut BingoSession,
    connection: ConnectionId,
    payload: RequestCardPayload,
) -> Result<Vec<Outbound>, GameError> {
    let assignment = session.request_card(
        connection,
        CardRequest {
            player_name: payload.player_name,
            serial_number: payload.serial_number,
            game_id: payload.game_id,
        },
    )?;

    let mut outbound = vec![Outbound::to(
        connection,
        ServerMessage::CardAssigned(CardAssignedPayload {
            game_id: session.game_id().to_string(),
            card: (&assignment.card).into(),
        }),
    )];
    if assignment.issued {
        outbound.push(Outbound::everyone(ServerMessage::PlayerJoined(
            PlayerJoinedPayload {
                active_cards: session.active_cards(),
            },
        )));
    }
    Ok(outbound)
}

/// Draw a ball and announce it.
pub fn draw_ball(session: &mut BingoSession) -> Result<Vec<Outbound>, GameError> {
    let ball = session.draw_ball()?;
    info!(ball, drawn = session.drawn_balls().len(), "ball drawn");
    Ok(vec![Outbound::everyone(ServerMessage::BallDrawn(
        BallDrawnPayload {
            ball,
            drawn_balls: session.drawn_balls().to_vec(),
        },
    ))])
}

/// Start a new bingo game.
pub fn reset_game(session: &mut BingoSession) -> Vec<Outbound> {
    session.reset();
    vec![Outbound::everyone(ServerMessage::GameReset(
        GameResetPayload {
            game_id: session.game_id().to_string(),
            qr_code_url: session.qr_code_url().map(str::to_string),
        },
    ))]
}

/// Report a card's match status to the requester.
pub fn validate_card(
    session: &BingoSession,
    connection: ConnectionId,
    payload: ValidateCardPayload,
) -> Result<Vec<Outbound>, GameError> {
    let validated = session.validate(&payload.serial_number)?;
    Ok(vec![Outbound::to(
        connection,
        ServerMessage::CardValidated(CardValidatedPayload {
            validation: ValidationView::from(&validated),
        }),
    )])
}

/// Announce a line claim, flagged with whether the card backs it up.
pub fn announce_line(
    session: &BingoSession,
    payload: AnnounceLinePayload,
) -> Result<Vec<Outbound>, GameError> {
    let validated = session.validate(&payload.serial_number)?;
    let verified = validated.validation.confirms_lines(&payload.lines);
    info!(serial = %payload.serial_number, verified, "line announced");
    Ok(vec![Outbound::everyone(ServerMessage::LineAnnounced(
        LineAnnouncedPayload {
            player_name: payload.player_name,
            serial_number: payload.serial_number,
            lines: payload.lines,
            verified,
        },
    ))])
}

/// Announce a bingo claim, flagged with whether the card backs it up.
pub fn announce_bingo(
    session: &BingoSession,
    payload: AnnounceBingoPayload,
) -> Result<Vec<Outbound>, GameError> {
    let validated = session.validate(&payload.serial_number)?;
    let verified = validated.validation.has_bingo;
    info!(serial = %payload.serial_number, verified, "bingo announced");
    Ok(vec![Outbound::everyone(ServerMessage::BingoAnnounced(
        BingoAnnouncedPayload {
            player_name: payload.player_name,
            serial_number: payload.serial_number,
            verified,
        },
    ))])
}

/// Send the current game snapshot to one connection.
pub fn game_state(session: &BingoSession, connection: ConnectionId) -> Vec<Outbound> {
    vec![Outbound::to(
        connection,
        ServerMessage::GameState(GameStatePayload::from(session)),
    )]
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{services::hub::Recipient, state::rng::RandomSource};

    fn session() -> BingoSession {
        BingoSession::new(RandomSource::seeded(8))
    }

    #[test]
    fn new_card_is_announced_but_recovered_card_is_not() {
        let mut session = session();
        let conn = Uuid::new_v4();
        let outbound = request_card(&mut session, conn, RequestCardPayload::default()).unwrap();
        assert_eq!(outbound.len(), 2);
        assert_eq!(outbound[0].recipient, Recipient::Connection(conn));
        assert!(matches!(outbound[0].message, ServerMessage::CardAssigned(_)));
        assert_eq!(outbound[1].recipient, Recipient::Everyone);
        assert!(matches!(
            outbound[1].message,
            ServerMessage::PlayerJoined(PlayerJoinedPayload { active_cards: 1 })
        ));

        let again = request_card(&mut session, conn, RequestCardPayload::default()).unwrap();
        assert_eq!(again.len(), 1);
    }

    #[test]
    fn unverified_announcements_are_still_broadcast() {
        let mut session = session();
        let conn = Uuid::new_v4();
        request_card(&mut session, conn, RequestCardPayload::default()).unwrap();
        let serial = session.serial_for(conn).unwrap().to_string();

        let outbound = announce_line(
            &session,
            AnnounceLinePayload {
                player_name: "Ana".into(),
                serial_number: serial.clone(),
                lines: vec![0],
            },
        )
        .unwrap();
        assert_eq!(outbound[0].recipient, Recipient::Everyone);
        let ServerMessage::LineAnnounced(payload) = &outbound[0].message else {
            panic!("expected line-announced");
        };
        assert!(!payload.verified);

        let outbound = announce_bingo(
            &session,
            AnnounceBingoPayload {
                player_name: "Ana".into(),
                serial_number: serial,
            },
        )
        .unwrap();
        let ServerMessage::BingoAnnounced(payload) = &outbound[0].message else {
            panic!("expected bingo-announced");
        };
        assert!(!payload.verified);
    }

    #[test]
    fn full_card_verifies_bingo() {
        let mut session = session();
        let conn = Uuid::new_v4();
        request_card(&mut session, conn, RequestCardPayload::default()).unwrap();
        let serial = session.serial_for(conn).unwrap().to_string();
        for _ in 0..90 {
            session.draw_ball().unwrap();
        }

        let outbound = announce_bingo(
            &session,
            AnnounceBingoPayload {
                player_name: "Ana".into(),
                serial_number: serial,
            },
        )
        .unwrap();
        let ServerMessage::BingoAnnounced(payload) = &outbound[0].message else {
            panic!("expected bingo-announced");
        };
        assert!(payload.verified);
    }

    #[test]
    fn announcing_an_unknown_card_is_not_found() {
        let session = session();
        let err = announce_bingo(
            &session,
            AnnounceBingoPayload {
                player_name: "Ana".into(),
                serial_number: "0000".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));
    }
}
