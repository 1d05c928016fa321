//! Per-connection session state and request dispatch.
//!
//! One `Session` exists per accepted connection. It owns the
//! authentication state and the identity bound to that connection, and
//! mediates every request from the connection into the room registry.

use log::{debug, info, warn};
use shared::protocol::{AuthError, Message, RoomAction, RoomError, RoomId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::auth::Authenticator;
use crate::registry::{RoomRegistry, SessionId};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Protocol violations that make the connection untrustworthy. The
/// handler closes the socket; no state has been mutated.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("received a response message where a request was expected")]
    UnexpectedMessage,
    #[error("room request is missing its required room id")]
    MissingRoomId,
}

pub struct Session {
    id: SessionId,
    registry: Arc<RoomRegistry>,
    authenticator: Arc<dyn Authenticator>,
    username: Option<String>,
    current_room: Option<RoomId>,
}

impl Session {
    pub fn new(registry: Arc<RoomRegistry>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            registry,
            authenticator,
            username: None,
            current_room: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Handles one request and produces exactly one response. `Err` is
    /// reserved for protocol violations that must close the connection.
    pub async fn handle_message(&mut self, message: Message) -> Result<Message, SessionError> {
        match message {
            Message::LoginRequest { username, password } => Ok(self.login(username, &password)),
            Message::RoomRequest { action, room_id } => self.room_action(action, room_id).await,
            Message::LoginResponse { .. } | Message::RoomResponse { .. } => {
                Err(SessionError::UnexpectedMessage)
            }
        }
    }

    /// Binds a username to this session exactly once.
    fn login(&mut self, username: String, password: &str) -> Message {
        if self.username.is_some() {
            warn!("session {} attempted a second login", self.id);
            return Message::login_err(AuthError::AlreadyAuthenticated);
        }

        match self.authenticator.verify(&username, password) {
            Ok(()) => {
                info!("session {} authenticated as {:?}", self.id, username);
                self.username = Some(username);
                Message::login_ok()
            }
            Err(error) => {
                warn!("session {} failed login: {}", self.id, error);
                Message::login_err(error)
            }
        }
    }

    async fn room_action(
        &mut self,
        action: RoomAction,
        room_id: Option<RoomId>,
    ) -> Result<Message, SessionError> {
        let Some(username) = self.username.clone() else {
            return Ok(Message::room_err(RoomError::Unauthenticated));
        };

        match action {
            RoomAction::CreateRoom => {
                // A session occupies at most one room.
                self.leave_current_room().await;
                let info = self.registry.create_room(self.id, &username).await;
                self.current_room = Some(info.room_id.clone());
                Ok(Message::room_ok(info))
            }
            RoomAction::JoinRoom => {
                let room_id = room_id.ok_or(SessionError::MissingRoomId)?;
                if self.current_room.as_deref() == Some(room_id.as_str()) {
                    return Ok(Message::room_err(RoomError::AlreadyMember));
                }
                match self.registry.join_room(self.id, &username, &room_id).await {
                    Ok(info) => {
                        // The previous membership is released only once
                        // the new one is secured; a rejected join leaves
                        // the registry exactly as it was.
                        if let Some(previous) = self.current_room.replace(room_id) {
                            self.registry.leave_room(self.id, &previous).await;
                        }
                        Ok(Message::room_ok(info))
                    }
                    Err(error) => Ok(Message::room_err(error)),
                }
            }
            RoomAction::StartGame => {
                let room_id = room_id.ok_or(SessionError::MissingRoomId)?;
                match self.registry.start_game(self.id, &room_id).await {
                    Ok(info) => Ok(Message::room_ok(info)),
                    Err(error) => Ok(Message::room_err(error)),
                }
            }
        }
    }

    async fn leave_current_room(&mut self) {
        if let Some(room_id) = self.current_room.take() {
            self.registry.leave_room(self.id, &room_id).await;
        }
    }

    /// Releases any room membership held by this session. Invoked from
    /// the connection handler's single exit path; `take` keeps it
    /// idempotent regardless.
    pub async fn on_disconnect(&mut self) {
        debug!("session {} disconnected", self.id);
        self.leave_current_room().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AllowAny;
    use crate::registry::RoomConfig;
    use shared::protocol::{RoomInfo, RoomState};

    struct RejectAll;

    impl Authenticator for RejectAll {
        fn verify(&self, _username: &str, _password: &str) -> Result<(), AuthError> {
            Err(AuthError::InvalidCredentials)
        }
    }

    fn session_with(registry: &Arc<RoomRegistry>) -> Session {
        Session::new(Arc::clone(registry), Arc::new(AllowAny))
    }

    fn registry() -> Arc<RoomRegistry> {
        Arc::new(RoomRegistry::new(RoomConfig::default()))
    }

    async fn login(session: &mut Session, username: &str) {
        let response = session
            .handle_message(Message::LoginRequest {
                username: username.to_string(),
                password: "123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response, Message::login_ok());
    }

    async fn create(session: &mut Session) -> RoomInfo {
        match session
            .handle_message(Message::RoomRequest {
                action: RoomAction::CreateRoom,
                room_id: None,
            })
            .await
            .unwrap()
        {
            Message::RoomResponse {
                room_info: Some(info),
                ..
            } => info,
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[tokio::test]
    async fn login_binds_username_once() {
        let registry = registry();
        let mut session = session_with(&registry);

        login(&mut session, "player1").await;
        assert_eq!(session.username(), Some("player1"));

        let second = session
            .handle_message(Message::LoginRequest {
                username: "player2".to_string(),
                password: "123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(second, Message::login_err(AuthError::AlreadyAuthenticated));
        assert_eq!(session.username(), Some("player1"));
    }

    #[tokio::test]
    async fn rejected_login_leaves_session_unauthenticated() {
        let registry = registry();
        let mut session = Session::new(Arc::clone(&registry), Arc::new(RejectAll));

        let response = session
            .handle_message(Message::LoginRequest {
                username: "player1".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response, Message::login_err(AuthError::InvalidCredentials));
        assert_eq!(session.username(), None);
    }

    #[tokio::test]
    async fn unauthenticated_room_request_creates_nothing() {
        let registry = registry();
        let mut session = session_with(&registry);

        let response = session
            .handle_message(Message::RoomRequest {
                action: RoomAction::CreateRoom,
                room_id: None,
            })
            .await
            .unwrap();

        assert_eq!(response, Message::room_err(RoomError::Unauthenticated));
        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn create_join_start_lifecycle() {
        let registry = registry();
        let mut owner = session_with(&registry);
        let mut joiner = session_with(&registry);

        login(&mut owner, "player1").await;
        login(&mut joiner, "player2").await;

        let room = create(&mut owner).await;
        assert_eq!(room.state, RoomState::Waiting);
        assert_eq!(room.members, vec!["player1"]);

        let joined = joiner
            .handle_message(Message::RoomRequest {
                action: RoomAction::JoinRoom,
                room_id: Some(room.room_id.clone()),
            })
            .await
            .unwrap();
        match joined {
            Message::RoomResponse {
                success: true,
                room_info: Some(info),
                ..
            } => assert_eq!(info.members, vec!["player1", "player2"]),
            other => panic!("unexpected response {:?}", other),
        }

        let started = owner
            .handle_message(Message::RoomRequest {
                action: RoomAction::StartGame,
                room_id: Some(room.room_id.clone()),
            })
            .await
            .unwrap();
        match started {
            Message::RoomResponse {
                success: true,
                room_info: Some(info),
                ..
            } => assert_eq!(info.state, RoomState::Playing),
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_owner_start_is_rejected() {
        let registry = registry();
        let mut owner = session_with(&registry);
        let mut joiner = session_with(&registry);

        login(&mut owner, "player1").await;
        login(&mut joiner, "player2").await;
        let room = create(&mut owner).await;
        joiner
            .handle_message(Message::RoomRequest {
                action: RoomAction::JoinRoom,
                room_id: Some(room.room_id.clone()),
            })
            .await
            .unwrap();

        let response = joiner
            .handle_message(Message::RoomRequest {
                action: RoomAction::StartGame,
                room_id: Some(room.room_id.clone()),
            })
            .await
            .unwrap();

        assert_eq!(response, Message::room_err(RoomError::NotOwner));
        assert_eq!(
            registry.room(&room.room_id).await.unwrap().state,
            RoomState::Waiting
        );
    }

    #[tokio::test]
    async fn creating_again_leaves_the_previous_room() {
        let registry = registry();
        let mut session = session_with(&registry);
        login(&mut session, "player1").await;

        let first = create(&mut session).await;
        let second = create(&mut session).await;

        assert_ne!(first.room_id, second.room_id);
        // The first room emptied out and was evicted.
        assert!(registry.room(&first.room_id).await.is_none());
        assert!(registry.room(&second.room_id).await.is_some());
    }

    #[tokio::test]
    async fn joining_another_room_releases_the_previous_one() {
        let registry = registry();
        let mut owner = session_with(&registry);
        let mut mover = session_with(&registry);
        login(&mut owner, "player1").await;
        login(&mut mover, "player2").await;

        let target = create(&mut owner).await;
        let abandoned = create(&mut mover).await;

        let response = mover
            .handle_message(Message::RoomRequest {
                action: RoomAction::JoinRoom,
                room_id: Some(target.room_id.clone()),
            })
            .await
            .unwrap();

        match response {
            Message::RoomResponse {
                success: true,
                room_info: Some(info),
                ..
            } => assert_eq!(info.members, vec!["player1", "player2"]),
            other => panic!("unexpected response {:?}", other),
        }
        // The sole-member room the mover left behind was evicted.
        assert!(registry.room(&abandoned.room_id).await.is_none());
    }

    #[tokio::test]
    async fn failed_join_keeps_the_current_room() {
        let registry = registry();
        let mut session = session_with(&registry);
        login(&mut session, "player1").await;
        let room = create(&mut session).await;

        let response = session
            .handle_message(Message::RoomRequest {
                action: RoomAction::JoinRoom,
                room_id: Some("9999".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(response, Message::room_err(RoomError::NotFound));
        let info = registry.room(&room.room_id).await.unwrap();
        assert_eq!(info.members, vec!["player1"]);
    }

    #[tokio::test]
    async fn disconnect_releases_room_membership() {
        let registry = registry();
        let mut session = session_with(&registry);
        login(&mut session, "player1").await;
        let room = create(&mut session).await;

        session.on_disconnect().await;

        assert!(registry.room(&room.room_id).await.is_none());
        // A second disconnect is harmless.
        session.on_disconnect().await;
    }

    #[tokio::test]
    async fn join_without_room_id_is_a_protocol_violation() {
        let registry = registry();
        let mut session = session_with(&registry);
        login(&mut session, "player1").await;

        let result = session
            .handle_message(Message::RoomRequest {
                action: RoomAction::JoinRoom,
                room_id: None,
            })
            .await;

        assert!(matches!(result, Err(SessionError::MissingRoomId)));
        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn response_messages_from_clients_are_rejected() {
        let registry = registry();
        let mut session = session_with(&registry);

        let result = session.handle_message(Message::login_ok()).await;
        assert!(matches!(result, Err(SessionError::UnexpectedMessage)));
    }

    #[tokio::test]
    async fn session_ids_are_unique() {
        let registry = registry();
        let a = session_with(&registry);
        let b = session_with(&registry);
        assert_ne!(a.id(), b.id());
    }
}
