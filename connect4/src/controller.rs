use tracing::{debug, info, warn};

use crate::{
    check_win, Board, FaultResolution, MoveError, PlayerId, SuggestionFailure, SuggestionRequest,
    COLS,
};

/// How a round ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Winner(PlayerId),
    Draw,
}

/// The coarse status of the current round.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    InProgress,
    Won(PlayerId),
    Draw,
}

/// Rounds won per player, indexed by [`PlayerId::index()`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Scores(pub [u32; 2]);

impl Scores {
    pub fn of(&self, player: PlayerId) -> u32 {
        self.0[player.index()]
    }
}

/// Who provides the moves for a seat.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlayerKind {
    /// Moves arrive through [`TurnController::request_move()`].
    Human,
    /// Moves are requested with [`TurnController::begin_automated_turn()`].
    Automated,
}

/// Where the turn state machine currently stands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TurnState {
    AwaitingMove(PlayerId),
    /// A suggestion request for this player is outstanding.
    AwaitingSuggestion(PlayerId),
    Evaluating,
    RoundOver(Outcome),
    /// The round is over and acknowledged, waiting for a reset.
    Idle,
}

/// Everything that describes a match at a given moment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    turn: PlayerId,
    scores: Scores,
    phase: Phase,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: PlayerId::P1,
            scores: Scores::default(),
            phase: Phase::InProgress,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> PlayerId {
        self.turn
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Notifications for the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PieceDropped {
        row: usize,
        column: usize,
        player: PlayerId,
    },
    TurnChanged(PlayerId),
    RoundOver { outcome: Outcome, scores: Scores },
    Reset,
}

/// Receives the [`GameEvent`]s of a [`TurnController`].
pub trait Observer {
    fn notify(&mut self, event: &GameEvent);
}

/// An observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn notify(&mut self, _event: &GameEvent) {}
}

impl Observer for Vec<GameEvent> {
    fn notify(&mut self, event: &GameEvent) {
        self.push(event.clone());
    }
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn notify(&mut self, event: &GameEvent) {
        (**self).notify(event)
    }
}

/// How many unusable automated answers are tolerated per turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FaultPolicy {
    /// Failed attempts after which the turn is forfeited. Values below 1
    /// are treated as 1.
    pub max_attempts: u32,
}

impl Default for FaultPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// Handle for the one outstanding suggestion request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuggestionTicket {
    pub id: u64,
    pub player: PlayerId,
    pub request: SuggestionRequest,
}

/// A piece that was placed on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub player: PlayerId,
    pub row: usize,
    pub column: usize,
    /// Set if this placement ended the round.
    pub outcome: Option<Outcome>,
}

/// Sequences the turns of a match.
///
/// The controller exclusively owns the [`GameState`]; all mutation goes
/// through its methods. Input that arrives while the controller is not
/// waiting for it is ignored with an error and leaves the state untouched.
pub struct TurnController<O: Observer = NoopObserver> {
    game: GameState,
    status: TurnState,
    seats: [PlayerKind; 2],
    policy: FaultPolicy,
    /// Failed automated attempts in the current turn.
    failed_attempts: u32,
    /// The id of the outstanding suggestion request, if any.
    outstanding: Option<u64>,
    next_ticket: u64,
    observer: O,
}

impl<O: Observer> TurnController<O> {
    /// Starts a match. `seats[0]` is P1, who moves first.
    pub fn new(seats: [PlayerKind; 2], policy: FaultPolicy, observer: O) -> Self {
        Self {
            game: GameState::new(),
            status: TurnState::AwaitingMove(PlayerId::P1),
            seats,
            policy,
            failed_attempts: 0,
            outstanding: None,
            next_ticket: 1,
            observer,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.game
    }

    pub fn status(&self) -> TurnState {
        self.status
    }

    pub fn board(&self) -> &Board {
        &self.game.board
    }

    pub fn seat(&self, player: PlayerId) -> PlayerKind {
        self.seats[player.index()]
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// A human player wants to drop a piece into `column`.
    ///
    /// Panics if `column` is not in `0..COLS`.
    pub fn request_move(&mut self, column: usize) -> Result<Placement, MoveError> {
        assert!(column < COLS, "column index {} out of range", column);
        let TurnState::AwaitingMove(player) = self.status else {
            return Err(MoveError::NotAwaitingMove);
        };
        if self.seat(player) != PlayerKind::Human {
            return Err(MoveError::NotHumanTurn { turn: player });
        }
        let row = self
            .game
            .board
            .drop_piece(column)
            .map_err(MoveError::ColumnFull)?;
        Ok(self.apply(player, row, column))
    }

    /// Opens a suggestion request if an automated player is to move.
    ///
    /// Returns `None` when no automated move is due, which includes the case
    /// that a request is already outstanding.
    pub fn begin_automated_turn(&mut self) -> Option<SuggestionTicket> {
        let TurnState::AwaitingMove(player) = self.status else {
            return None;
        };
        if self.seat(player) != PlayerKind::Automated {
            return None;
        }
        let id = self.next_ticket;
        self.next_ticket += 1;
        self.outstanding = Some(id);
        self.status = TurnState::AwaitingSuggestion(player);
        debug!(ticket = id, %player, "Requesting automated move");
        Some(SuggestionTicket {
            id,
            player,
            request: SuggestionRequest::new(&self.game.board, player),
        })
    }

    /// Resolves the outstanding suggestion request with a column.
    ///
    /// The column is checked against the current board. An unusable column
    /// is counted as a failed attempt and the board stays as it is.
    pub fn provide_automated_move(
        &mut self,
        ticket: u64,
        column: usize,
    ) -> Result<Placement, MoveError> {
        let player = self.check_ticket(ticket)?;
        let failure = if column >= COLS {
            SuggestionFailure::ColumnOutOfRange { column }
        } else {
            match self.game.board.drop_piece(column) {
                Ok(row) => {
                    self.outstanding = None;
                    return Ok(self.apply(player, row, column));
                }
                Err(err) => SuggestionFailure::ColumnFull(err),
            }
        };
        let resolution = self.record_fault(player, &failure);
        Err(MoveError::SuggestionRejected {
            failure,
            resolution,
        })
    }

    /// Resolves the outstanding suggestion request with a failure.
    pub fn automated_move_failed(
        &mut self,
        ticket: u64,
        failure: SuggestionFailure,
    ) -> Result<FaultResolution, MoveError> {
        let player = self.check_ticket(ticket)?;
        Ok(self.record_fault(player, &failure))
    }

    /// Moves a finished round to [`TurnState::Idle`]. Returns false if the
    /// round is not over.
    pub fn acknowledge_round_over(&mut self) -> bool {
        if let TurnState::RoundOver(_) = self.status {
            self.status = TurnState::Idle;
            true
        } else {
            false
        }
    }

    /// Clears the board and starts a new round with P1 to move. Scores are
    /// kept.
    ///
    /// Accepted in every state. An outstanding suggestion request becomes
    /// stale.
    pub fn reset(&mut self) {
        self.game.board.reset();
        self.game.turn = PlayerId::P1;
        self.game.phase = Phase::InProgress;
        self.outstanding = None;
        self.failed_attempts = 0;
        self.status = TurnState::AwaitingMove(PlayerId::P1);
        debug!("Board reset");
        self.observer.notify(&GameEvent::Reset);
        self.observer.notify(&GameEvent::TurnChanged(PlayerId::P1));
    }

    /// Like [`Self::reset()`], but also sets the scores back to zero.
    pub fn new_match(&mut self) {
        self.game.scores = Scores::default();
        self.reset();
    }

    fn check_ticket(&self, ticket: u64) -> Result<PlayerId, MoveError> {
        match self.status {
            TurnState::AwaitingSuggestion(player) if self.outstanding == Some(ticket) => Ok(player),
            TurnState::AwaitingSuggestion(_) => Err(MoveError::StaleTicket { ticket }),
            _ if ticket < self.next_ticket => Err(MoveError::StaleTicket { ticket }),
            _ => Err(MoveError::NotAwaitingMove),
        }
    }

    fn record_fault(&mut self, player: PlayerId, failure: &SuggestionFailure) -> FaultResolution {
        self.outstanding = None;
        self.failed_attempts += 1;
        if self.failed_attempts >= self.policy.max_attempts.max(1) {
            warn!(%player, %failure, attempts = self.failed_attempts, "Turn forfeited");
            self.pass_turn(player.other());
            FaultResolution::Forfeited
        } else {
            warn!(%player, %failure, attempt = self.failed_attempts, "Automated move failed, asking again");
            self.status = TurnState::AwaitingMove(player);
            FaultResolution::Retry {
                attempt: self.failed_attempts,
            }
        }
    }

    fn pass_turn(&mut self, next: PlayerId) {
        self.failed_attempts = 0;
        self.game.turn = next;
        self.status = TurnState::AwaitingMove(next);
        self.observer.notify(&GameEvent::TurnChanged(next));
    }

    // Places the piece and evaluates the result. The caller has validated
    // that (row, column) is the landing cell.
    fn apply(&mut self, player: PlayerId, row: usize, column: usize) -> Placement {
        self.status = TurnState::Evaluating;
        self.game.board.place(row, column, player);
        debug!(%player, row, column, "Piece dropped");
        self.observer
            .notify(&GameEvent::PieceDropped { row, column, player });

        let outcome = if check_win(&self.game.board, row, column) {
            self.game.scores.0[player.index()] += 1;
            self.game.phase = Phase::Won(player);
            Some(Outcome::Winner(player))
        } else if self.game.board.is_full() {
            self.game.phase = Phase::Draw;
            Some(Outcome::Draw)
        } else {
            None
        };

        match outcome {
            Some(outcome) => {
                self.failed_attempts = 0;
                self.status = TurnState::RoundOver(outcome);
                info!(?outcome, scores = ?self.game.scores.0, "Round over");
                self.observer.notify(&GameEvent::RoundOver {
                    outcome,
                    scores: self.game.scores,
                });
            }
            None => self.pass_turn(player.other()),
        }

        Placement {
            player,
            row,
            column,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, ColumnFull, ROWS};

    // Fills the board without four in a row, alternating from P1.
    const DRAW_SEQUENCE: [usize; 42] = [
        4, 3, 6, 0, 1, 4, 5, 5, 1, 1, 5, 0, 1, 6, 0, 1, 5, 5, 1, 0, 4, 6, 3, 2, 6, 6, 0, 4, 6, 5,
        2, 0, 4, 2, 4, 2, 2, 2, 3, 3, 3, 3,
    ];

    fn humans() -> TurnController<Vec<GameEvent>> {
        TurnController::new(
            [PlayerKind::Human, PlayerKind::Human],
            FaultPolicy::default(),
            Vec::new(),
        )
    }

    fn against_bot() -> TurnController<Vec<GameEvent>> {
        TurnController::new(
            [PlayerKind::Human, PlayerKind::Automated],
            FaultPolicy::default(),
            Vec::new(),
        )
    }

    #[test]
    fn initial_state() {
        let ctl = humans();
        assert_eq!(ctl.status(), TurnState::AwaitingMove(PlayerId::P1));
        assert_eq!(ctl.state().turn(), PlayerId::P1);
        assert_eq!(ctl.state().phase(), Phase::InProgress);
        assert_eq!(ctl.state().scores(), Scores([0, 0]));
        assert_eq!(ctl.board().occupied_count(), 0);
    }

    #[test]
    fn turns_alternate() {
        let mut ctl = humans();
        let placement = ctl.request_move(3).unwrap();
        assert_eq!(
            placement,
            Placement {
                player: PlayerId::P1,
                row: 5,
                column: 3,
                outcome: None
            }
        );
        assert_eq!(ctl.state().turn(), PlayerId::P2);
        assert_eq!(ctl.status(), TurnState::AwaitingMove(PlayerId::P2));
        ctl.request_move(3).unwrap();
        assert_eq!(ctl.state().turn(), PlayerId::P1);
        assert_eq!(ctl.board().get(4, 3), Cell::Occupied(PlayerId::P2));
        assert_eq!(
            ctl.observer()[..],
            [
                GameEvent::PieceDropped {
                    row: 5,
                    column: 3,
                    player: PlayerId::P1
                },
                GameEvent::TurnChanged(PlayerId::P2),
                GameEvent::PieceDropped {
                    row: 4,
                    column: 3,
                    player: PlayerId::P2
                },
                GameEvent::TurnChanged(PlayerId::P1),
            ]
        );
    }

    #[test]
    fn vertical_win_in_column_three() {
        let mut ctl = humans();
        for _ in 0..3 {
            ctl.request_move(3).unwrap();
            ctl.request_move(0).unwrap();
        }
        let placement = ctl.request_move(3).unwrap();
        assert_eq!(placement.row, 2);
        assert_eq!(placement.outcome, Some(Outcome::Winner(PlayerId::P1)));
        assert_eq!(ctl.state().phase(), Phase::Won(PlayerId::P1));
        assert_eq!(ctl.state().scores(), Scores([1, 0]));
        assert_eq!(
            ctl.status(),
            TurnState::RoundOver(Outcome::Winner(PlayerId::P1))
        );
        assert_eq!(
            ctl.observer().last(),
            Some(&GameEvent::RoundOver {
                outcome: Outcome::Winner(PlayerId::P1),
                scores: Scores([1, 0])
            })
        );
    }

    #[test]
    fn horizontal_win_on_bottom_row() {
        let mut ctl = humans();
        for column in 0..3 {
            ctl.request_move(column).unwrap();
            ctl.request_move(6).unwrap();
        }
        let placement = ctl.request_move(3).unwrap();
        assert_eq!((placement.row, placement.column), (5, 3));
        assert_eq!(placement.outcome, Some(Outcome::Winner(PlayerId::P1)));
    }

    #[test]
    fn moves_after_the_round_are_ignored() {
        let mut ctl = humans();
        for _ in 0..3 {
            ctl.request_move(3).unwrap();
            ctl.request_move(0).unwrap();
        }
        ctl.request_move(3).unwrap();
        let board = *ctl.board();
        assert_eq!(ctl.request_move(4), Err(MoveError::NotAwaitingMove));
        assert!(ctl.acknowledge_round_over());
        assert_eq!(ctl.status(), TurnState::Idle);
        assert_eq!(ctl.request_move(4), Err(MoveError::NotAwaitingMove));
        assert_eq!(*ctl.board(), board);
        assert!(!ctl.acknowledge_round_over());
    }

    #[test]
    fn full_board_is_a_draw() {
        let mut ctl = humans();
        let (last, rest) = DRAW_SEQUENCE.split_last().unwrap();
        for &column in rest {
            assert_eq!(ctl.request_move(column).unwrap().outcome, None);
        }
        let placement = ctl.request_move(*last).unwrap();
        assert_eq!(placement.outcome, Some(Outcome::Draw));
        assert_eq!(ctl.state().phase(), Phase::Draw);
        assert_eq!(ctl.status(), TurnState::RoundOver(Outcome::Draw));
        assert_eq!(ctl.state().scores(), Scores([0, 0]));
        assert!(ctl.board().is_full());
    }

    #[test]
    fn full_column_is_ignored_for_humans() {
        let mut ctl = humans();
        for _ in 0..ROWS {
            ctl.request_move(0).unwrap();
        }
        let turn = ctl.state().turn();
        let events = ctl.observer().len();
        assert_eq!(
            ctl.request_move(0),
            Err(MoveError::ColumnFull(ColumnFull { column: 0 }))
        );
        assert_eq!(ctl.state().turn(), turn);
        assert_eq!(ctl.status(), TurnState::AwaitingMove(turn));
        assert_eq!(ctl.board().occupied_count(), ROWS);
        assert_eq!(ctl.observer().len(), events);
    }

    #[test]
    fn human_input_is_ignored_on_automated_turn() {
        let mut ctl = against_bot();
        ctl.request_move(0).unwrap();
        assert_eq!(
            ctl.request_move(1),
            Err(MoveError::NotHumanTurn {
                turn: PlayerId::P2
            })
        );
        let ticket = ctl.begin_automated_turn().unwrap();
        assert_eq!(ctl.request_move(1), Err(MoveError::NotAwaitingMove));
        ctl.provide_automated_move(ticket.id, 1).unwrap();
        assert_eq!(ctl.board().occupied_count(), 2);
    }

    #[test]
    fn automated_turn() {
        let mut ctl = against_bot();
        assert_eq!(ctl.begin_automated_turn(), None);
        ctl.request_move(2).unwrap();

        let ticket = ctl.begin_automated_turn().unwrap();
        assert_eq!(ticket.player, PlayerId::P2);
        assert_eq!(ticket.request.player, 2);
        assert_eq!(ticket.request.board, ctl.board().to_grid());
        assert_eq!(ctl.status(), TurnState::AwaitingSuggestion(PlayerId::P2));
        // Only one request at a time
        assert_eq!(ctl.begin_automated_turn(), None);

        let placement = ctl.provide_automated_move(ticket.id, 2).unwrap();
        assert_eq!((placement.row, placement.player), (4, PlayerId::P2));
        assert_eq!(ctl.status(), TurnState::AwaitingMove(PlayerId::P1));
        assert_eq!(
            ctl.provide_automated_move(ticket.id, 3),
            Err(MoveError::StaleTicket { ticket: ticket.id })
        );
    }

    #[test]
    fn full_column_suggestion_does_not_corrupt_the_board() {
        let mut ctl = against_bot();
        for _ in 0..3 {
            ctl.request_move(0).unwrap();
            let ticket = ctl.begin_automated_turn().unwrap();
            ctl.provide_automated_move(ticket.id, 0).unwrap();
        }
        assert!(ctl.board().is_column_full(0));
        ctl.request_move(1).unwrap();
        let board = *ctl.board();

        let ticket = ctl.begin_automated_turn().unwrap();
        let err = ctl.provide_automated_move(ticket.id, 0).unwrap_err();
        assert_eq!(
            err,
            MoveError::SuggestionRejected {
                failure: SuggestionFailure::ColumnFull(ColumnFull { column: 0 }),
                resolution: FaultResolution::Retry { attempt: 1 },
            }
        );
        assert_eq!(*ctl.board(), board);
        assert_eq!(ctl.board().occupied_count(), ROWS + 1);
        // The same player is asked again
        assert_eq!(ctl.status(), TurnState::AwaitingMove(PlayerId::P2));
        let ticket = ctl.begin_automated_turn().unwrap();
        let err = ctl.provide_automated_move(ticket.id, 7).unwrap_err();
        assert!(matches!(
            err,
            MoveError::SuggestionRejected {
                failure: SuggestionFailure::ColumnOutOfRange { column: 7 },
                resolution: FaultResolution::Retry { attempt: 2 },
            }
        ));
        let ticket = ctl.begin_automated_turn().unwrap();
        ctl.provide_automated_move(ticket.id, 1).unwrap();
        assert_eq!(ctl.board().occupied_count(), ROWS + 2);
    }

    #[test]
    fn turn_is_forfeited_after_repeated_failures() {
        let mut ctl = TurnController::new(
            [PlayerKind::Human, PlayerKind::Automated],
            FaultPolicy { max_attempts: 2 },
            Vec::new(),
        );
        ctl.request_move(3).unwrap();
        let ticket = ctl.begin_automated_turn().unwrap();
        assert_eq!(
            ctl.automated_move_failed(ticket.id, SuggestionFailure::Timeout),
            Ok(FaultResolution::Retry { attempt: 1 })
        );
        let ticket = ctl.begin_automated_turn().unwrap();
        assert_eq!(
            ctl.automated_move_failed(ticket.id, SuggestionFailure::NoMoveAvailable),
            Ok(FaultResolution::Forfeited)
        );
        assert_eq!(ctl.state().turn(), PlayerId::P1);
        assert_eq!(ctl.status(), TurnState::AwaitingMove(PlayerId::P1));
        assert_eq!(ctl.board().occupied_count(), 1);
        assert_eq!(
            ctl.observer().last(),
            Some(&GameEvent::TurnChanged(PlayerId::P1))
        );

        // The attempt counter starts over on the next automated turn
        ctl.request_move(3).unwrap();
        let ticket = ctl.begin_automated_turn().unwrap();
        assert_eq!(
            ctl.automated_move_failed(ticket.id, SuggestionFailure::Timeout),
            Ok(FaultResolution::Retry { attempt: 1 })
        );
    }

    #[test]
    fn reset_keeps_scores_and_invalidates_tickets() {
        let mut ctl = against_bot();
        for _ in 0..3 {
            ctl.request_move(3).unwrap();
            let ticket = ctl.begin_automated_turn().unwrap();
            ctl.provide_automated_move(ticket.id, 0).unwrap();
        }
        ctl.request_move(3).unwrap();
        assert_eq!(ctl.state().scores(), Scores([1, 0]));
        assert!(ctl.acknowledge_round_over());

        ctl.reset();
        assert_eq!(ctl.board().occupied_count(), 0);
        assert_eq!(ctl.state().turn(), PlayerId::P1);
        assert_eq!(ctl.state().phase(), Phase::InProgress);
        assert_eq!(ctl.status(), TurnState::AwaitingMove(PlayerId::P1));
        assert_eq!(ctl.state().scores(), Scores([1, 0]));
        assert_eq!(
            ctl.observer()[ctl.observer().len() - 2..],
            [GameEvent::Reset, GameEvent::TurnChanged(PlayerId::P1)]
        );

        // A request issued before a reset can't be answered after it
        ctl.request_move(5).unwrap();
        let stale = ctl.begin_automated_turn().unwrap();
        ctl.reset();
        ctl.request_move(5).unwrap();
        let fresh = ctl.begin_automated_turn().unwrap();
        assert_eq!(
            ctl.provide_automated_move(stale.id, 5),
            Err(MoveError::StaleTicket { ticket: stale.id })
        );
        assert_eq!(ctl.board().occupied_count(), 1);
        ctl.provide_automated_move(fresh.id, 5).unwrap();
    }

    #[test]
    fn new_match_clears_scores() {
        let mut ctl = humans();
        for _ in 0..3 {
            ctl.request_move(3).unwrap();
            ctl.request_move(0).unwrap();
        }
        ctl.request_move(3).unwrap();
        ctl.new_match();
        assert_eq!(ctl.state().scores(), Scores([0, 0]));
        assert_eq!(ctl.status(), TurnState::AwaitingMove(PlayerId::P1));
        assert_eq!(ctl.board().occupied_count(), 0);
    }
}
