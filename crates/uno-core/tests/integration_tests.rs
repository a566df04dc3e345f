//! Integration tests for the table controller.
//!
//! These tests drive complete turns through the controller, standing in for
//! both the game service and the timer runtime.

use uno_core::*;
use uuid::Uuid;

fn seat(id: &str, automated: bool, hand_size: u32) -> Seat {
    Seat {
        id: id.to_string(),
        name: if automated {
            format!("CPU{}", id)
        } else {
            "You".to_string()
        },
        automated,
        hand_size,
    }
}

/// A snapshot with the local hand and seat `active` to move
fn table(hand: Vec<Card>, top: Card, color: Color, active: usize) -> GameSnapshot {
    GameSnapshot {
        id: Uuid::from_u128(0xC0FFEE),
        lifecycle: Lifecycle::Playing,
        active_color: color,
        top_card: top,
        rotation: Rotation::Clockwise,
        active_seat_index: active,
        winner_id: None,
        seats: vec![
            seat("0", false, hand.len() as u32),
            seat("1", true, 5),
            seat("2", true, 5),
            seat("3", true, 5),
        ],
        my_hand: hand,
        last_action: None,
    }
}

/// Stand-in runtime: keeps the timers the controller asked for
#[derive(Default)]
struct Harness {
    timers: Vec<Ticket>,
    requests: Vec<Command>,
}

impl Harness {
    fn run(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Schedule { ticket, .. } => {
                    self.timers.retain(|t| t.slot != ticket.slot);
                    self.timers.push(ticket);
                }
                Command::Cancel { slot } => self.timers.retain(|t| t.slot != slot),
                other => self.requests.push(other),
            }
        }
    }

    fn take_timer(&mut self, slot: TimerSlot) -> Option<Ticket> {
        let pos = self.timers.iter().position(|t| t.slot == slot)?;
        Some(self.timers.remove(pos))
    }

    fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
        self.requests.iter().filter(|c| pred(c)).count()
    }
}

#[test]
fn test_full_turn_cycle() {
    let mut controller = Controller::with_seed(Timings::default(), 1);
    let mut harness = Harness::default();

    harness.run(controller.start());
    assert_eq!(harness.requests, vec![Command::StartSession]);

    // CPU1 opens the game
    let opening = table(
        vec![
            Card::number(Color::Red, 7),
            Card::number(Color::Blue, 7),
            Card::action(Color::Green, Rank::Skip),
        ],
        Card::number(Color::Red, 5),
        Color::Red,
        1,
    );
    harness.run(controller.on_reply(Request::Start, Ok(opening.clone())));
    assert!(controller.view().playable.iter().all(|p| !p));

    let pacing = harness.take_timer(TimerSlot::AutomatedTurn).unwrap();
    harness.run(controller.on_timer(pacing));
    assert_eq!(harness.count(|c| *c == Command::AutomatedTurn), 1);

    // The service moves every CPU and hands the turn back
    let mut my_turn = opening.clone();
    my_turn.active_seat_index = 0;
    harness.run(controller.on_reply(Request::AutomatedTurn, Ok(my_turn)));
    assert!(harness.take_timer(TimerSlot::AutomatedTurn).is_none());
    assert_eq!(controller.view().playable, vec![true, false, false]);

    // Stack the sevens
    harness.run(controller.click(0));
    assert_eq!(
        controller.view().selection,
        Selection::StackChoice { group: vec![0, 1] }
    );
    harness.run(controller.choose_stack(StackChoice::All));
    assert_eq!(
        harness.requests.last(),
        Some(&Command::Play {
            indices: vec![0, 1],
            declared_color: None
        })
    );

    // Down to one card: the window opens and the shout plays
    let mut after = table(
        vec![Card::action(Color::Green, Rank::Skip)],
        Card::number(Color::Blue, 7),
        Color::Blue,
        1,
    );
    after.last_action = Some(LastAction {
        actor_id: "0".to_string(),
        kind: ActionKind::Play,
        card: Some(Card::number(Color::Blue, 7)),
    });
    harness.run(controller.on_reply(Request::Play, Ok(after)));

    let view = controller.view();
    assert!(view.declaration_open);
    assert!(view.effects.contains(&VisualEffect::OneCardLeft {
        seat: "0".to_string()
    }));
    assert!(harness.take_timer(TimerSlot::DeclarationCountdown).is_some());
    assert!(harness.take_timer(TimerSlot::AutomatedTurn).is_some());

    harness.run(controller.declare());
    assert_eq!(controller.view().notice.as_deref(), Some("SAFE!"));
    assert_eq!(
        harness.count(|c| matches!(c, Command::Draw { .. })),
        0,
        "A timely declaration never draws"
    );
}

#[test]
fn test_forgotten_declaration_draws_once() {
    let mut controller = Controller::with_seed(Timings::default(), 2);
    let mut harness = Harness::default();

    let start = table(
        vec![Card::number(Color::Red, 2), Card::number(Color::Yellow, 9)],
        Card::number(Color::Red, 5),
        Color::Red,
        0,
    );
    harness.run(controller.on_reply(Request::Start, Ok(start)));
    harness.run(controller.click(0));

    let after = table(
        vec![Card::number(Color::Yellow, 9)],
        Card::number(Color::Red, 2),
        Color::Red,
        0,
    );
    harness.run(controller.on_reply(Request::Play, Ok(after)));

    let countdown = harness.take_timer(TimerSlot::DeclarationCountdown).unwrap();
    harness.run(controller.on_timer(countdown));
    // A duplicate delivery of the same fire
    harness.run(controller.on_timer(countdown));
    // The player reacts too late
    harness.run(controller.declare());

    let penalty = Command::Draw {
        reason: DrawReason::Penalty,
    };
    assert_eq!(harness.count(|c| *c == penalty), 1);
    assert_eq!(
        controller.view().notice.as_deref(),
        Some("Forgot UNO! +1 penalty")
    );

    let notice = harness.take_timer(TimerSlot::DeclarationNotice).unwrap();
    harness.run(controller.on_timer(notice));
    assert_eq!(controller.view().notice, None);
    assert_eq!(controller.declaration().state(), DeclarationState::Closed);
}

#[test]
fn test_reopened_window_keeps_one_countdown() {
    let mut controller = Controller::with_seed(Timings::default(), 3);
    let mut harness = Harness::default();

    let start = table(
        vec![Card::number(Color::Red, 2), Card::number(Color::Red, 3)],
        Card::number(Color::Red, 5),
        Color::Red,
        0,
    );
    harness.run(controller.on_reply(Request::Start, Ok(start)));

    let one_left = table(
        vec![Card::number(Color::Red, 3)],
        Card::number(Color::Red, 2),
        Color::Red,
        0,
    );
    let first = controller.on_reply(Request::Play, Ok(one_left.clone()));
    let first_ticket = first
        .iter()
        .find_map(|c| match c {
            Command::Schedule { ticket, .. } if ticket.slot == TimerSlot::DeclarationCountdown => {
                Some(*ticket)
            }
            _ => None,
        })
        .unwrap();
    harness.run(first);

    // Another play reply lands before the first countdown fires
    harness.run(controller.on_reply(Request::Play, Ok(one_left)));
    let live: Vec<_> = harness
        .timers
        .iter()
        .filter(|t| t.slot == TimerSlot::DeclarationCountdown)
        .collect();
    assert_eq!(live.len(), 1);

    // The superseded fire is ignored, the live one expires
    harness.run(controller.on_timer(first_ticket));
    assert!(controller.view().declaration_open);
    let live = harness.take_timer(TimerSlot::DeclarationCountdown).unwrap();
    harness.run(controller.on_timer(live));
    assert_eq!(harness.count(|c| matches!(c, Command::Draw { .. })), 1);
}

#[test]
fn test_stray_poll_yields_one_automated_request() {
    let mut controller = Controller::with_seed(Timings::default(), 4);
    let mut harness = Harness::default();

    let cpu_turn = table(vec![], Card::number(Color::Red, 5), Color::Red, 2);
    harness.run(controller.on_reply(Request::Start, Ok(cpu_turn.clone())));
    let stale = *harness.timers.first().unwrap();

    harness.run(controller.refresh());
    harness.run(controller.on_reply(Request::Refresh, Ok(cpu_turn)));

    // Both the old and the new timer "fire"
    harness.run(controller.on_timer(stale));
    let live = harness.take_timer(TimerSlot::AutomatedTurn).unwrap();
    harness.run(controller.on_timer(live));

    assert_eq!(harness.count(|c| *c == Command::AutomatedTurn), 1);
}

#[test]
fn test_wild_submission_carries_color() {
    let mut controller = Controller::with_seed(Timings::default(), 5);
    let mut harness = Harness::default();

    let start = table(
        vec![Card::wild(Rank::Wild), Card::number(Color::Blue, 1)],
        Card::number(Color::Red, 5),
        Color::Red,
        0,
    );
    harness.run(controller.on_reply(Request::Start, Ok(start)));
    harness.run(controller.click(0));
    assert!(harness.requests.is_empty());

    harness.run(controller.choose_color(Color::Green));
    assert_eq!(
        harness.requests,
        vec![Command::Play {
            indices: vec![0],
            declared_color: Some(Color::Green)
        }]
    );
}

#[test]
fn test_failed_draw_keeps_last_good_snapshot() {
    let mut controller = Controller::with_seed(Timings::default(), 6);
    let mut harness = Harness::default();

    let start = table(
        vec![Card::number(Color::Blue, 1)],
        Card::number(Color::Red, 5),
        Color::Red,
        0,
    );
    harness.run(controller.on_reply(Request::Start, Ok(start.clone())));
    harness.run(controller.draw());
    assert_eq!(
        harness.requests,
        vec![Command::Draw {
            reason: DrawReason::Manual
        }]
    );

    harness.run(controller.on_reply(
        Request::Draw(DrawReason::Manual),
        Err(ServiceError::Rejected { reason: None }),
    ));
    let view = controller.view();
    assert_eq!(view.snapshot, Some(start));
    assert_eq!(view.error.as_deref(), Some("Cannot draw"));
    assert!(harness.take_timer(TimerSlot::ErrorToast).is_some());
}
