use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};

use super::store::{Departure, SessionStore};
use crate::{
    dictionary::{Verdict, WordValidator},
    game::{CellOutcome, CellUpdate, GameEngine, GameOver, WordOutcome},
    models::{GameType, RoomSummary, WordPath},
    websocket::{
        broadcast::{Broadcaster, ConnectionId},
        messages::{ClientMessage, ServerMessage},
    },
};

/// Capacity of the sequencer's inbox
pub const COMMAND_QUEUE_SIZE: usize = 1024;

pub type CommandSender = mpsc::Sender<Command>;

/// Everything that may touch room state, applied one at a time
#[derive(Debug)]
pub enum Command {
    Client {
        conn: ConnectionId,
        message: ClientMessage,
    },
    Disconnect {
        conn: ConnectionId,
    },
    Directory {
        reply: oneshot::Sender<Vec<RoomSummary>>,
    },
    /// A word submission whose dictionary check has finished
    WordValidated(ValidatedWord),
}

#[derive(Debug)]
pub struct ValidatedWord {
    pub conn: ConnectionId,
    pub room: String,
    pub word: String,
    pub path: WordPath,
    pub player: String,
    pub verdict: Verdict,
}

/// The last room a connection joined, and as whom
#[derive(Debug, Clone)]
struct Membership {
    username: String,
    room: String,
}

pub fn command_channel() -> (CommandSender, mpsc::Receiver<Command>) {
    mpsc::channel(COMMAND_QUEUE_SIZE)
}

/// Single owner of the room registry. Player actions are applied in arrival
/// order; dictionary lookups run on their own tasks and come back through
/// the same inbox to commit.
pub struct Sequencer {
    store: SessionStore,
    engine: GameEngine,
    broadcaster: Arc<Broadcaster>,
    validator: Arc<WordValidator>,
    memberships: HashMap<ConnectionId, Membership>,
    commands: mpsc::Receiver<Command>,
    continuations: mpsc::WeakSender<Command>,
}

impl Sequencer {
    pub fn new(
        store: SessionStore,
        engine: GameEngine,
        broadcaster: Arc<Broadcaster>,
        validator: Arc<WordValidator>,
        commands: mpsc::Receiver<Command>,
        continuations: &CommandSender,
    ) -> Self {
        Self {
            store,
            engine,
            broadcaster,
            validator,
            memberships: HashMap::new(),
            commands,
            continuations: continuations.downgrade(),
        }
    }

    /// Process commands until every sender is gone
    pub async fn run(mut self) {
        tracing::info!("Session sequencer started");
        while self.process_next().await {}
        tracing::info!("Session sequencer stopped");
    }

    /// Wait for and apply one command. Returns false once the inbox is closed.
    pub async fn process_next(&mut self) -> bool {
        match self.commands.recv().await {
            Some(command) => {
                self.handle(command);
                true
            }
            None => false,
        }
    }

    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Client { conn, message } => self.handle_client(conn, message),
            Command::Disconnect { conn } => self.disconnect(conn),
            Command::Directory { reply } => {
                let _ = reply.send(self.store.list_rooms());
            }
            Command::WordValidated(validated) => self.commit_word(validated),
        }
    }

    fn handle_client(&mut self, conn: ConnectionId, message: ClientMessage) {
        match message {
            ClientMessage::GetActiveRooms => {
                let rooms = self.store.list_rooms();
                self.broadcaster
                    .send_to(conn, ServerMessage::ActiveRooms { rooms });
            }
            ClientMessage::JoinRoom {
                room,
                username,
                game_type,
            } => self.join_room(conn, room, username, game_type),
            ClientMessage::CellUpdate {
                room,
                row,
                col,
                value,
                player,
            } => self.cell_update(
                &room,
                CellUpdate {
                    row,
                    col,
                    value,
                    player,
                },
            ),
            ClientMessage::WordSubmit {
                room,
                word,
                path,
                player,
            } => self.submit_word(conn, room, word, path, player),
            ClientMessage::SendMessage { room, payload } => {
                let relay = ServerMessage::ChatMessage {
                    room: room.clone(),
                    payload,
                };
                self.broadcaster.send_to_room_except(&room, conn, &relay);
            }
        }
    }

    fn join_room(
        &mut self,
        conn: ConnectionId,
        room_id: String,
        username: String,
        game_type: GameType,
    ) {
        self.broadcaster.subscribe(&room_id, conn);
        self.memberships.insert(
            conn,
            Membership {
                username: username.clone(),
                room: room_id.clone(),
            },
        );

        let running = self.store.create_or_get_room(&room_id, game_type).game_type;
        if running != game_type {
            tracing::debug!(
                "{} asked for a {:?} room but {} runs {:?}",
                username,
                game_type,
                room_id,
                running
            );
        }
        let Some(room) = self.store.add_player(&room_id, &username) else {
            return;
        };

        self.broadcaster.send_to(
            conn,
            ServerMessage::RoomJoined {
                room: room.id.clone(),
                game_type: room.game_type,
                game_state: room.game_state.clone(),
                players: room.players.clone(),
            },
        );
        self.broadcaster.send_to_room(
            &room_id,
            &ServerMessage::PlayersUpdate {
                players: room.players.clone(),
            },
        );
        self.broadcaster.send_to_room(
            &room_id,
            &ServerMessage::LeaderboardUpdate {
                leaderboard: room.leaderboard.clone(),
            },
        );

        tracing::info!("{} joined room: {}", username, room_id);
        self.broadcast_directory();
    }

    fn cell_update(&mut self, room_id: &str, update: CellUpdate) {
        let Some(room) = self.store.room_mut(room_id) else {
            tracing::debug!("Dropping cell update for unknown room {}", room_id);
            return;
        };

        let outcome = match self.engine.apply_cell_update(room, &update, Utc::now()) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!("Dropping cell update in room {}: {}", room_id, e);
                return;
            }
        };

        self.broadcaster.send_to_room(
            room_id,
            &ServerMessage::GameUpdate {
                game_state: room.game_state.clone(),
            },
        );

        if let CellOutcome::Solved { points, game_over } = outcome {
            tracing::info!(
                "{} solved the sudoku in room {} for {} points",
                update.player,
                room_id,
                points
            );
            self.broadcaster.send_to_room(
                room_id,
                &ServerMessage::LeaderboardUpdate {
                    leaderboard: room.leaderboard.clone(),
                },
            );
            self.announce_game_over(room_id, game_over);
        }
    }

    fn submit_word(
        &mut self,
        conn: ConnectionId,
        room: String,
        word: String,
        path: WordPath,
        player: String,
    ) {
        match self.store.room(&room) {
            Some(existing) if existing.game_type == GameType::WordGrid => {}
            _ => {
                tracing::debug!("Dropping word submission for room {}", room);
                return;
            }
        }

        let Some(continuations) = self.continuations.upgrade() else {
            return;
        };
        let validator = self.validator.clone();
        let word = WordValidator::normalize(&word);

        // The lookup may be slow; the room is re-checked when the result comes back
        tokio::spawn(async move {
            let verdict = validator.validate(&word).await;
            let validated = ValidatedWord {
                conn,
                room,
                word,
                path,
                player,
                verdict,
            };
            if continuations
                .send(Command::WordValidated(validated))
                .await
                .is_err()
            {
                tracing::debug!("Sequencer stopped before a word result was committed");
            }
        });
    }

    fn commit_word(&mut self, validated: ValidatedWord) {
        let ValidatedWord {
            conn,
            room: room_id,
            word,
            path,
            player,
            verdict,
        } = validated;

        if let Verdict::Fallback { error, .. } = &verdict {
            self.broadcaster.send_to(
                conn,
                ServerMessage::WordValidationError {
                    word: word.clone(),
                    error: error.clone(),
                },
            );
        }
        if !verdict.is_valid() {
            self.broadcaster
                .send_to(conn, ServerMessage::WordInvalid { word });
            return;
        }

        let Some(room) = self.store.room_mut(&room_id) else {
            tracing::debug!("Room {} closed before {:?} was committed", room_id, word);
            return;
        };

        match self.engine.commit_word(room, &word, path, &player) {
            Err(e) => {
                tracing::debug!("Dropping word {:?} in room {}: {}", word, room_id, e);
            }
            Ok(WordOutcome::AlreadyFound) => {
                self.broadcaster
                    .send_to(conn, ServerMessage::WordAlreadyFound { word });
            }
            Ok(WordOutcome::Accepted { points, game_over }) => {
                tracing::info!(
                    "{} found {:?} in room {} for {} points",
                    player,
                    word,
                    room_id,
                    points
                );
                self.broadcaster.send_to_room(
                    &room_id,
                    &ServerMessage::GameUpdate {
                        game_state: room.game_state.clone(),
                    },
                );
                self.broadcaster.send_to_room(
                    &room_id,
                    &ServerMessage::LeaderboardUpdate {
                        leaderboard: room.leaderboard.clone(),
                    },
                );
                if let Some(game_over) = game_over {
                    self.announce_game_over(&room_id, game_over);
                }
            }
        }
    }

    fn announce_game_over(&self, room_id: &str, game_over: GameOver) {
        tracing::info!("Game over in room {}, winner: {:?}", room_id, game_over.winner);
        self.broadcaster.send_to_room(
            room_id,
            &ServerMessage::GameOver {
                winner: game_over.winner,
            },
        );
    }

    fn disconnect(&mut self, conn: ConnectionId) {
        let Some(Membership { username, room }) = self.memberships.remove(&conn) else {
            return;
        };

        match self.store.remove_player(&room, &username) {
            Departure::NotMember => return,
            Departure::Left { remaining } => {
                self.broadcaster.send_to_room(
                    &room,
                    &ServerMessage::PlayersUpdate { players: remaining },
                );
            }
            Departure::RoomClosed => {
                self.broadcaster
                    .send_to_room(&room, &ServerMessage::PlayersUpdate { players: vec![] });
                self.broadcaster.close_room(&room);
                tracing::debug!("{} rooms remain active", self.store.len());
            }
        }

        tracing::info!("{} left room: {}", username, room);
        self.broadcast_directory();
    }

    fn broadcast_directory(&self) {
        self.broadcaster.send_to_all(&ServerMessage::ActiveRooms {
            rooms: self.store.list_rooms(),
        });
    }
}
