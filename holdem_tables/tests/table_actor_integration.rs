/// Integration tests for tables running behind the TableManager
///
/// Every test talks to spawned table actors only through the manager and the
/// per-player subscription channels.
use holdem_tables::{
    game::{Action, HandView, OutboundMessage, Phase, PlayerId, TableEvent, TableId, TableView},
    table::{ManagerError, TableConfig, TableManager, TableResponse},
};
use tokio::sync::mpsc::Receiver;

async fn table_with(manager: &TableManager, players: &[&str]) -> TableId {
    let config = TableConfig {
        name: "Integration Table".to_string(),
        seed: Some(7),
        ..TableConfig::default()
    };
    let table_id = manager.create_table(config).await.unwrap();
    for name in players {
        let join = TableEvent::PlayerJoined {
            player_id: PlayerId::from(*name),
            nickname: name.to_string(),
        };
        assert_eq!(
            manager.send_event(&table_id, join).await.unwrap(),
            TableResponse::Success
        );
    }
    table_id
}

async fn next_view(receiver: &mut Receiver<OutboundMessage>) -> TableView {
    match receiver.recv().await {
        Some(OutboundMessage::GameStateUpdate(view)) => view,
        other => panic!("expected a state update, got {other:?}"),
    }
}

// === Lifecycle ===

#[tokio::test]
async fn test_create_list_and_close() {
    let manager = TableManager::new();
    let first = table_with(&manager, &["a", "b"]).await;
    let second = table_with(&manager, &[]).await;
    assert_ne!(first, second);
    assert_eq!(manager.active_table_count().await, 2);

    let tables = manager.list_tables().await;
    assert_eq!(tables.len(), 2);
    let meta = tables.iter().find(|t| t.id == first).unwrap();
    assert_eq!(meta.name, "Integration Table");
    assert_eq!(meta.player_count, 2);
    assert_eq!(meta.phase, Phase::WaitingForPlayers);
    assert_eq!((meta.small_blind, meta.big_blind), (10, 20));

    manager.close_table(&first).await.unwrap();
    assert_eq!(manager.active_table_count().await, 1);
    assert_eq!(
        manager.close_table(&first).await,
        Err(ManagerError::TableNotFound(first.clone()))
    );
    assert!(matches!(
        manager.send_event(&first, TableEvent::StartTable { player_id: "a".into() }).await,
        Err(ManagerError::TableNotFound(_))
    ));
}

#[tokio::test]
async fn test_invalid_config_is_refused() {
    let manager = TableManager::new();
    let config = TableConfig {
        small_blind: 20,
        big_blind: 10,
        ..TableConfig::default()
    };
    assert!(matches!(
        manager.create_table(config).await,
        Err(ManagerError::InvalidConfig(_))
    ));
    assert_eq!(manager.active_table_count().await, 0);
}

// === Fan-out ===

#[tokio::test]
async fn test_subscribers_receive_redacted_views() {
    let manager = TableManager::new();
    let table_id = table_with(&manager, &["a", "b", "c"]).await;

    let mut receivers = Vec::new();
    for name in ["a", "b", "c"] {
        let mut receiver = manager.subscribe(&table_id, name.into(), 16).await.unwrap();
        // Seated players get a snapshot on subscribe.
        let snapshot = next_view(&mut receiver).await;
        assert_eq!(snapshot.phase, Phase::WaitingForPlayers);
        receivers.push(receiver);
    }

    let response = manager
        .send_event(&table_id, TableEvent::StartTable { player_id: "b".into() })
        .await
        .unwrap();
    assert!(response.is_success());

    for (seat, receiver) in receivers.iter_mut().enumerate() {
        let view = next_view(receiver).await;
        assert_eq!(view.phase, Phase::Preflop);
        assert_eq!(view.pot, 30);
        assert_eq!(view.action_to, Some("a".into()));
        assert!(matches!(&view.seats[seat].hand, HandView::Cards(cards) if cards.len() == 2));
        let hidden = view
            .seats
            .iter()
            .filter(|s| s.hand == HandView::Hidden)
            .count();
        assert_eq!(hidden, 2);
    }
}

#[tokio::test]
async fn test_rejection_reaches_only_the_actor() {
    let manager = TableManager::new();
    let table_id = table_with(&manager, &["a", "b"]).await;
    manager
        .send_event(&table_id, TableEvent::StartTable { player_id: "a".into() })
        .await
        .unwrap();

    let mut a = manager.subscribe(&table_id, "a".into(), 16).await.unwrap();
    let mut b = manager.subscribe(&table_id, "b".into(), 16).await.unwrap();
    next_view(&mut a).await;
    next_view(&mut b).await;

    let response = manager
        .send_event(
            &table_id,
            TableEvent::PlayerAction {
                player_id: "b".into(),
                action: Action::Call,
            },
        )
        .await
        .unwrap();
    assert_eq!(response, TableResponse::NotYourTurn);

    assert_eq!(
        b.recv().await,
        Some(OutboundMessage::GameError("not your turn".to_string()))
    );
    assert!(a.try_recv().is_err());
}

#[tokio::test]
async fn test_raw_json_actions() {
    let manager = TableManager::new();
    let table_id = table_with(&manager, &["a", "b"]).await;
    let mut b = manager.subscribe(&table_id, "b".into(), 16).await.unwrap();
    next_view(&mut b).await;

    let response = manager
        .send_raw(&table_id, r#"{"type":"START_TABLE","payload":{"player_id":"a"}}"#)
        .await
        .unwrap();
    assert_eq!(response, TableResponse::Success);
    assert_eq!(next_view(&mut b).await.phase, Phase::Preflop);

    let response = manager.send_raw(&table_id, "{ not json").await.unwrap();
    assert_eq!(response, TableResponse::Ignored);

    let response = manager
        .send_raw(
            &table_id,
            r#"{"type":"PLAYER_ACTION","payload":{"player_id":"a","action":{"type":"BET","amount":-5}}}"#,
        )
        .await
        .unwrap();
    assert!(matches!(response, TableResponse::InvalidAction(_)));

    let response = manager
        .send_raw(
            &table_id,
            r#"{"type":"PLAYER_ACTION","payload":{"player_id":"a","action":{"type":"FOLD"}}}"#,
        )
        .await
        .unwrap();
    assert_eq!(response, TableResponse::Success);

    let view = next_view(&mut b).await;
    assert_eq!(view.phase, Phase::Showdown);
    assert_eq!(view.winners.len(), 1);
    assert_eq!(view.winners[0].player_id, PlayerId::from("b"));
}

// === State Queries ===

#[tokio::test]
async fn test_state_and_views_track_the_hand() {
    let manager = TableManager::new();
    let table_id = table_with(&manager, &["a", "b"]).await;
    manager
        .send_event(&table_id, TableEvent::StartTable { player_id: "a".into() })
        .await
        .unwrap();

    let state = manager.get_table_state(&table_id).await.unwrap();
    assert_eq!(state.phase, Phase::Preflop);
    assert_eq!(state.pot_size, 30);
    assert_eq!(state.hand_count, 1);
    assert_eq!(state.total_chips, 2000);
    assert_eq!(state.players, vec!["a".to_string(), "b".to_string()]);

    assert!(manager.get_view(&table_id, "zed".into()).await.unwrap().is_none());
    let view = manager.get_view(&table_id, "a".into()).await.unwrap().unwrap();
    assert_eq!(view.my_player_id, PlayerId::from("a"));

    manager
        .send_event(
            &table_id,
            TableEvent::PlayerAction {
                player_id: "a".into(),
                action: Action::Fold,
            },
        )
        .await
        .unwrap();
    let response = manager
        .send_event(&table_id, TableEvent::RequestNextHand { player_id: "b".into() })
        .await
        .unwrap();
    assert!(response.is_success());
    assert_eq!(manager.get_table_state(&table_id).await.unwrap().hand_count, 2);
}

#[tokio::test]
async fn test_busted_table_reports_game_over() {
    let manager = TableManager::new();
    let table_id = table_with(&manager, &["a"]).await;
    let mut a = manager.subscribe(&table_id, "a".into(), 16).await.unwrap();
    next_view(&mut a).await;

    let response = manager
        .send_event(&table_id, TableEvent::StartTable { player_id: "a".into() })
        .await
        .unwrap();
    assert_eq!(response, TableResponse::GameOver);
    assert_eq!(next_view(&mut a).await.phase, Phase::GameOver);
    assert!(matches!(a.recv().await, Some(OutboundMessage::GameError(_))));
}

#[tokio::test]
async fn test_close_ends_subscriptions() {
    let manager = TableManager::new();
    let table_id = table_with(&manager, &["a", "b"]).await;
    let mut a = manager.subscribe(&table_id, "a".into(), 16).await.unwrap();
    next_view(&mut a).await;

    manager.close_table(&table_id).await.unwrap();
    assert_eq!(a.recv().await, None);
}

#[tokio::test]
async fn test_unsubscribed_player_stops_receiving() {
    let manager = TableManager::new();
    let table_id = table_with(&manager, &["a", "b"]).await;
    let mut a = manager.subscribe(&table_id, "a".into(), 16).await.unwrap();
    let mut b = manager.subscribe(&table_id, "b".into(), 16).await.unwrap();
    next_view(&mut a).await;
    next_view(&mut b).await;

    manager.unsubscribe(&table_id, "a".into()).await.unwrap();
    let response = manager
        .send_event(&table_id, TableEvent::StartTable { player_id: "b".into() })
        .await
        .unwrap();
    assert!(response.is_success());

    assert_eq!(next_view(&mut b).await.phase, Phase::Preflop);
    assert_eq!(a.recv().await, None);
}
