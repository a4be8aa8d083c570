//! Plays one table through the manager until its hand quota is reached.

use anyhow::{Error, bail};
use holdem_tables::{
    game::{Action, Chips, OutboundMessage, Phase, PlayerId, TableEvent, TableId},
    table::{TableManager, TableResponse},
};
use rand::{SeedableRng, rngs::StdRng};

use crate::bot::Bot;

/// Buffered updates per bot before the table starts dropping them
const SUBSCRIBER_CAPACITY: usize = 64;

#[derive(Debug)]
pub struct TableSummary {
    pub table_id: TableId,
    pub hands_played: u64,
    pub chip_leader: Option<(String, Chips)>,
    pub total_chips: Chips,
    pub updates_received: usize,
    pub errors_received: usize,
}

/// Seat `players` bots at `table_id` and play up to `hands` hands.
pub async fn run_table(
    manager: TableManager,
    table_id: TableId,
    players: usize,
    hands: u64,
    seed: Option<u64>,
) -> Result<TableSummary, Error> {
    let player_ids: Vec<PlayerId> = (0..players)
        .map(|i| PlayerId::new(&format!("{table_id}-p{}", i + 1)))
        .collect();
    let Some(host) = player_ids.first().cloned() else {
        bail!("table {table_id} has no players");
    };

    let mut listeners = Vec::with_capacity(players);
    for (i, player_id) in player_ids.iter().enumerate() {
        let join = TableEvent::PlayerJoined {
            player_id: player_id.clone(),
            nickname: format!("Bot {}", i + 1),
        };
        let response = manager.send_event(&table_id, join).await?;
        if !response.is_success() {
            bail!("{} could not join table {}: {:?}", player_id, table_id, response);
        }

        let mut receiver = manager
            .subscribe(&table_id, player_id.clone(), SUBSCRIBER_CAPACITY)
            .await?;
        listeners.push(tokio::spawn(async move {
            let (mut updates, mut errors) = (0usize, 0usize);
            while let Some(message) = receiver.recv().await {
                match message {
                    OutboundMessage::GameStateUpdate(_) => updates += 1,
                    OutboundMessage::GameError(_) => errors += 1,
                }
            }
            (updates, errors)
        }));
    }

    let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let mut bot = Bot::new(rng);

    let mut response = manager
        .send_event(&table_id, TableEvent::StartTable { player_id: host.clone() })
        .await?;
    while response != TableResponse::GameOver {
        let state = manager.get_table_state(&table_id).await?;
        response = match state.phase {
            Phase::Showdown if state.hand_count >= hands => break,
            Phase::Showdown => {
                let next = TableEvent::RequestNextHand {
                    player_id: host.clone(),
                };
                manager.send_event(&table_id, next).await?
            }
            phase if phase.is_betting() => {
                let Some(observer) = manager.get_view(&table_id, host.clone()).await? else {
                    bail!("{host} lost its seat at table {table_id}");
                };
                let Some(actor) = observer.action_to else {
                    bail!("nobody to act at table {table_id} during {phase}");
                };
                let Some(view) = manager.get_view(&table_id, actor.clone()).await? else {
                    bail!("{actor} is not seated at table {table_id}");
                };
                let action = bot.decide_action(&view);
                let response = manager
                    .send_event(
                        &table_id,
                        TableEvent::PlayerAction {
                            player_id: actor.clone(),
                            action,
                        },
                    )
                    .await?;
                if response.is_success() {
                    response
                } else {
                    log::warn!("{} {:?} refused: {:?}, folding", actor, action, response);
                    let fold = TableEvent::PlayerAction {
                        player_id: actor,
                        action: Action::Fold,
                    };
                    manager.send_event(&table_id, fold).await?
                }
            }
            _ => break,
        };
    }

    let state = manager.get_table_state(&table_id).await?;
    let chip_leader = manager
        .get_view(&table_id, host)
        .await?
        .and_then(|view| {
            view.seats
                .into_iter()
                .max_by_key(|seat| seat.chips)
                .map(|seat| (seat.nickname, seat.chips))
        });

    manager.close_table(&table_id).await?;

    let (mut updates_received, mut errors_received) = (0, 0);
    for listener in listeners {
        let (updates, errors) = listener.await?;
        updates_received += updates;
        errors_received += errors;
    }

    Ok(TableSummary {
        table_id,
        hands_played: state.hand_count,
        chip_leader,
        total_chips: state.total_chips,
        updates_received,
        errors_received,
    })
}
