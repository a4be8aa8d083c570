//! Per-recipient redacted snapshots of a table.

use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeSeq};

use super::{
    entities::{Card, Chips, Phase, PlayerId, SeatIndex, Winner},
    table::{Table, TableId},
};

const HIDDEN: &str = "?";
const FOLDED: &str = "FOLDED";

/// What a recipient may know about one seat's hole cards.
///
/// Serialized as a list of strings: `["?", "?"]`, `["FOLDED"]`, card tokens,
/// or `[]` for a seat that was not dealt in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HandView {
    Hidden,
    Folded,
    Cards(Vec<Card>),
    NotDealt,
}

impl Serialize for HandView {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Hidden => [HIDDEN, HIDDEN].serialize(serializer),
            Self::Folded => [FOLDED].serialize(serializer),
            Self::NotDealt => serializer.serialize_seq(Some(0))?.end(),
            Self::Cards(cards) => cards.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for HandView {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tokens = Vec::<String>::deserialize(deserializer)?;
        match tokens.as_slice() {
            [] => Ok(Self::NotDealt),
            [only] if only == FOLDED => Ok(Self::Folded),
            tokens if tokens.iter().all(|t| t == HIDDEN) => Ok(Self::Hidden),
            tokens => tokens
                .iter()
                .map(|t| t.parse::<Card>().map_err(serde::de::Error::custom))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Cards),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatView {
    pub seat: SeatIndex,
    pub player_id: PlayerId,
    pub nickname: String,
    pub chips: Chips,
    pub bet_in_round: Chips,
    pub folded: bool,
    pub all_in: bool,
    pub connected: bool,
    pub is_dealer: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
    pub hand: HandView,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableView {
    pub table_id: TableId,
    pub community_cards: Vec<Card>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub min_raise: Chips,
    pub phase: Phase,
    pub last_action: Option<String>,
    pub action_to: Option<PlayerId>,
    pub winners: Vec<Winner>,
    pub my_player_id: PlayerId,
    pub seats: Vec<SeatView>,
}

/// Snapshot of `table` as seen from `recipient`'s seat.
///
/// The recipient always sees their own hole cards. Anyone else's are shown
/// only at showdown, and only for seats that did not fold.
pub fn project(table: &Table, recipient: SeatIndex) -> TableView {
    let hand = table.hand();
    let phase = table.phase();
    let seats = table
        .seats()
        .iter()
        .enumerate()
        .map(|(idx, seat)| {
            let Some(player) = hand.and_then(|hand| hand.players.get(idx)) else {
                return SeatView {
                    seat: idx,
                    player_id: seat.player_id.clone(),
                    nickname: seat.nickname.clone(),
                    chips: seat.chips,
                    bet_in_round: 0,
                    folded: false,
                    all_in: false,
                    connected: seat.connected,
                    is_dealer: hand.is_none() && table.button() == Some(idx),
                    is_small_blind: false,
                    is_big_blind: false,
                    hand: HandView::NotDealt,
                };
            };

            let hand_view = if player.hole.is_empty() {
                HandView::NotDealt
            } else if idx == recipient || (phase == Phase::Showdown && !player.folded) {
                HandView::Cards(player.hole.clone())
            } else if phase == Phase::Showdown {
                HandView::Folded
            } else {
                HandView::Hidden
            };
            let positions = hand.map(|h| (h.dealer_idx, h.small_blind_idx, h.big_blind_idx));

            SeatView {
                seat: idx,
                player_id: seat.player_id.clone(),
                nickname: seat.nickname.clone(),
                chips: player.chips,
                bet_in_round: player.bet_in_round,
                folded: player.folded,
                all_in: player.all_in,
                connected: seat.connected,
                is_dealer: positions.is_some_and(|(d, _, _)| d == idx),
                is_small_blind: positions.is_some_and(|(_, sb, _)| sb == idx),
                is_big_blind: positions.is_some_and(|(_, _, bb)| bb == idx),
                hand: hand_view,
            }
        })
        .collect();

    let my_player_id = table
        .seats()
        .get(recipient)
        .map(|seat| seat.player_id.clone())
        .unwrap_or_else(|| PlayerId::new(""));

    TableView {
        table_id: table.id().clone(),
        community_cards: hand.map(|h| h.board.clone()).unwrap_or_default(),
        pot: hand.map_or(0, |h| h.pot),
        current_bet: hand.map_or(0, |h| h.current_bet),
        min_raise: hand.map_or(table.config().big_blind, |h| h.min_raise),
        phase,
        last_action: table.last_action().map(str::to_string),
        action_to: hand
            .and_then(|h| h.action_idx)
            .and_then(|idx| table.seats().get(idx))
            .map(|seat| seat.player_id.clone()),
        winners: hand.map(|h| h.winners.clone()).unwrap_or_default(),
        my_player_id,
        seats,
    }
}

/// One snapshot per connected seat.
pub fn project_all(table: &Table) -> Vec<(PlayerId, TableView)> {
    table
        .seats()
        .iter()
        .enumerate()
        .filter(|(_, seat)| seat.connected)
        .map(|(idx, seat)| (seat.player_id.clone(), project(table, idx)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{game::entities::Action, table::TableConfig};

    fn started_table(players: &[&str]) -> Table {
        let mut table = Table::new(TableConfig {
            seed: Some(3),
            ..TableConfig::default()
        });
        for name in players {
            table.seat_player((*name).into(), name).unwrap();
        }
        table.start_table().unwrap();
        table
    }

    #[test]
    fn test_own_cards_visible_others_hidden() {
        let table = started_table(&["a", "b", "c"]);
        let view = project(&table, 1);
        assert_eq!(view.my_player_id, PlayerId::from("b"));
        assert!(matches!(&view.seats[1].hand, HandView::Cards(cards) if cards.len() == 2));
        assert_eq!(view.seats[0].hand, HandView::Hidden);
        assert_eq!(view.seats[2].hand, HandView::Hidden);
        assert_eq!(view.phase, Phase::Preflop);
        assert_eq!(view.action_to, Some(PlayerId::from("a")));
        assert!(view.seats[0].is_dealer);
        assert!(view.seats[1].is_small_blind);
        assert!(view.seats[2].is_big_blind);
    }

    #[test]
    fn test_hidden_cards_never_serialized() {
        let table = started_table(&["a", "b"]);
        let hole = table.hand().unwrap().players[1].hole.clone();
        let json = serde_json::to_string(&project(&table, 0)).unwrap();
        for card in hole {
            assert!(!json.contains(&format!("\"{card}\"")));
        }
        assert!(json.contains(r#"["?","?"]"#));
    }

    #[test]
    fn test_showdown_reveals_contenders_only() {
        let mut table = started_table(&["a", "b", "c"]);
        table.take_action(&"a".into(), Action::Fold).unwrap();
        table.take_action(&"b".into(), Action::Call).unwrap();
        table.take_action(&"c".into(), Action::Check).unwrap();
        for _ in 0..3 {
            table.take_action(&"b".into(), Action::Check).unwrap();
            table.take_action(&"c".into(), Action::Check).unwrap();
        }
        assert_eq!(table.phase(), Phase::Showdown);

        let view = project(&table, 1);
        assert_eq!(view.seats[0].hand, HandView::Folded);
        assert!(matches!(view.seats[2].hand, HandView::Cards(_)));
        assert_eq!(view.community_cards.len(), 5);
        assert!(!view.winners.is_empty());

        let folded_view = project(&table, 0);
        assert!(matches!(folded_view.seats[0].hand, HandView::Cards(_)));
    }

    #[test]
    fn test_views_only_for_connected_seats() {
        let mut table = started_table(&["a", "b", "c"]);
        table.disconnect(&"c".into()).unwrap();
        let views = project_all(&table);
        let recipients: Vec<PlayerId> = views.into_iter().map(|(id, _)| id).collect();
        assert_eq!(recipients, vec![PlayerId::from("a"), PlayerId::from("b")]);
    }

    #[test]
    fn test_hand_view_wire_format() {
        assert_eq!(serde_json::to_string(&HandView::Folded).unwrap(), r#"["FOLDED"]"#);
        assert_eq!(serde_json::to_string(&HandView::NotDealt).unwrap(), "[]");
        let view: HandView = serde_json::from_str(r#"["Ah","Kd"]"#).unwrap();
        assert_eq!(view, HandView::Cards(vec!["Ah".parse().unwrap(), "Kd".parse().unwrap()]));
        let view: HandView = serde_json::from_str(r#"["?","?"]"#).unwrap();
        assert_eq!(view, HandView::Hidden);
    }

    #[test]
    fn test_idle_table_view() {
        let mut table = Table::new(TableConfig::default());
        table.seat_player("a".into(), "alice").unwrap();
        let view = project(&table, 0);
        assert_eq!(view.phase, Phase::WaitingForPlayers);
        assert_eq!(view.seats[0].chips, 1000);
        assert_eq!(view.seats[0].hand, HandView::NotDealt);
        assert_eq!(view.pot, 0);
        assert_eq!(view.action_to, None);
    }
}
