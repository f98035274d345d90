use connect4::{
    FaultResolution, MoveError, Observer, Outcome, PlayerId, PlayerKind, SuggestionFailure,
    SuggestionRequest, TurnController, TurnState, COLS,
};
use tracing::{debug, info, warn};

use crate::player::MoveSource;
use crate::recording::Recorder;

pub enum RoundResult {
    Finished(Outcome),
    /// Both players forfeited their turns one after the other without a
    /// piece being placed in between.
    Abandoned,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MatchScore {
    pub wins: [usize; 2],
    pub draws: usize,
    pub abandoned: usize,
}

enum TurnProgress {
    Placed,
    Retry,
    Forfeited,
}

/// Plays the current round of `controller` to the end.
///
/// Returns an error only if a human's input fails or the controller is not
/// in a playable state. Automated players that misbehave lose their turn
/// through the controller's fault policy.
pub async fn play_round<O: Observer>(
    controller: &mut TurnController<O>,
    sources: &mut [Box<dyn MoveSource>; 2],
    recorder: &mut Option<Recorder>,
) -> anyhow::Result<RoundResult> {
    // Inform the players about the new round, so that they can reset their state
    for player in PlayerId::ALL {
        let source = &mut sources[player.index()];
        let limit = source.timeout();
        let announcement = source.new_round(player);
        let result = match limit {
            Some(limit) => tokio::time::timeout(limit, announcement).await,
            None => Ok(announcement.await),
        };
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(player = source.name(), %err, "Could not announce the new round")
            }
            Err(_) => warn!(player = source.name(), "New round was not acknowledged in time"),
        }
    }

    let mut forfeits_in_a_row = 0;
    let result = loop {
        let player = match controller.status() {
            TurnState::RoundOver(outcome) => break RoundResult::Finished(outcome),
            TurnState::AwaitingMove(player) => player,
            state => anyhow::bail!("Cannot play a round in state {:?}", state),
        };
        let source = sources[player.index()].as_mut();
        match controller.seat(player) {
            PlayerKind::Human => {
                human_turn(controller, source, player).await?;
                forfeits_in_a_row = 0;
            }
            PlayerKind::Automated => match automated_turn(controller, source, recorder).await? {
                TurnProgress::Placed => forfeits_in_a_row = 0,
                TurnProgress::Retry => {}
                TurnProgress::Forfeited => {
                    forfeits_in_a_row += 1;
                    if forfeits_in_a_row >= 2 {
                        warn!("Both players forfeited, abandoning the round");
                        break RoundResult::Abandoned;
                    }
                }
            },
        }
    };

    if let Some(recorder) = recorder {
        let path = recorder.write_round_recording()?;
        debug!(path = %path.display(), "Recorded round");
    }
    Ok(result)
}

/// Plays `num_rounds` rounds. Scores carry over from round to round.
pub async fn play_match<O: Observer>(
    controller: &mut TurnController<O>,
    sources: &mut [Box<dyn MoveSource>; 2],
    num_rounds: usize,
    recorder: &mut Option<Recorder>,
) -> anyhow::Result<MatchScore> {
    let mut match_score = MatchScore::default();

    for round_idx in 0..num_rounds {
        if round_idx > 0 {
            controller.reset();
        }
        match play_round(controller, sources, recorder).await? {
            RoundResult::Finished(Outcome::Winner(player)) => {
                info!(winner = sources[player.index()].name(), round_idx);
                match_score.wins[player.index()] += 1;
            }
            RoundResult::Finished(Outcome::Draw) => {
                info!(round_idx, "Draw");
                match_score.draws += 1;
            }
            RoundResult::Abandoned => {
                info!(round_idx, "Round abandoned");
                match_score.abandoned += 1;
            }
        }
        controller.acknowledge_round_over();
    }

    Ok(match_score)
}

async fn human_turn<O: Observer>(
    controller: &mut TurnController<O>,
    source: &mut dyn MoveSource,
    player: PlayerId,
) -> anyhow::Result<()> {
    loop {
        let request = SuggestionRequest::new(controller.board(), player);
        let Some(column) = source.choose_column(&request).await? else {
            anyhow::bail!("{} did not choose a column", source.name());
        };
        if column >= COLS {
            println!("There is no column {}", column + 1);
            continue;
        }
        match controller.request_move(column) {
            Ok(_) => return Ok(()),
            Err(MoveError::ColumnFull(_)) => {
                println!("Column {} is full, choose another one", column + 1)
            }
            Err(err) => return Err(err.into()),
        }
    }
}

async fn automated_turn<O: Observer>(
    controller: &mut TurnController<O>,
    source: &mut dyn MoveSource,
    recorder: &mut Option<Recorder>,
) -> anyhow::Result<TurnProgress> {
    let Some(ticket) = controller.begin_automated_turn() else {
        anyhow::bail!("No automated move is due");
    };

    let limit = source.timeout();
    let call = source.choose_column(&ticket.request);
    let answer = match limit {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(answer) => answer.map_err(|err| err.to_failure()),
            Err(_) => Err(SuggestionFailure::Timeout),
        },
        None => call.await.map_err(|err| err.to_failure()),
    };
    if let Some(recorder) = recorder {
        recorder.store_exchange(source.name(), &ticket.request, &answer);
    }

    let resolution = match answer {
        Ok(Some(column)) => match controller.provide_automated_move(ticket.id, column) {
            Ok(_) => return Ok(TurnProgress::Placed),
            Err(MoveError::SuggestionRejected { resolution, .. }) => resolution,
            Err(err) => return Err(err.into()),
        },
        Ok(None) => {
            controller.automated_move_failed(ticket.id, SuggestionFailure::NoMoveAvailable)?
        }
        Err(failure) => controller.automated_move_failed(ticket.id, failure)?,
    };
    Ok(match resolution {
        FaultResolution::Retry { .. } => TurnProgress::Retry,
        FaultResolution::Forfeited => TurnProgress::Forfeited,
    })
}
