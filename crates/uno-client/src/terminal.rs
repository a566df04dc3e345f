//! Line-based terminal front end.

use crate::runtime::{Input, RuntimeHandle};
use std::fmt::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use uno_core::{Color, Rotation, Selection, SessionView, StackChoice};

pub const HELP: &str = "\
Commands:
  start            begin a new game
  play N | N       play hand card N
  all | one        play the whole stack or just the clicked card
  color C | C      declare a color for a wild (red, blue, green, yellow)
  cancel           abandon the pending selection
  draw             draw a card
  uno              press the UNO button
  refresh          fetch the current state
  quit             leave";

/// Parse one line of player input
pub fn parse_command(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("Type 'help' for commands".to_string());
    };
    let head = head.to_ascii_lowercase();

    let input = match head.as_str() {
        "start" | "new" => Input::Start,
        "refresh" => Input::Refresh,
        "draw" => Input::Draw,
        "uno" => Input::Declare,
        "all" => Input::ChooseStack(StackChoice::All),
        "one" => Input::ChooseStack(StackChoice::ClickedOnly),
        "cancel" => Input::CancelSelection,
        "quit" | "exit" => Input::Shutdown,
        "play" => {
            let index = words.next().ok_or("Usage: play N")?;
            Input::Click(parse_index(index)?)
        }
        "color" => {
            let name = words.next().ok_or("Usage: color red|blue|green|yellow")?;
            Input::ChooseColor(parse_color(name)?)
        }
        other => {
            if let Ok(index) = other.parse::<usize>() {
                Input::Click(index)
            } else if let Some(color) = Color::parse(other) {
                Input::ChooseColor(color)
            } else {
                return Err(format!("Unknown command: {}", other));
            }
        }
    };
    Ok(input)
}

fn parse_index(word: &str) -> Result<usize, String> {
    word.parse()
        .map_err(|_| format!("Not a card number: {}", word))
}

fn parse_color(word: &str) -> Result<Color, String> {
    Color::parse(word).ok_or_else(|| format!("Not a color: {}", word))
}

/// Render a view as plain text
pub fn render(view: &SessionView) -> String {
    let mut out = String::new();

    let Some(snapshot) = &view.snapshot else {
        out.push_str("No game in progress. Type 'start'.\n");
        push_messages(&mut out, view);
        return out;
    };

    let rotation = match snapshot.rotation {
        Rotation::Clockwise => "clockwise",
        Rotation::CounterClockwise => "counter-clockwise",
    };
    let _ = writeln!(
        out,
        "== Top: {} | Color: {} | {} ==",
        snapshot.top_card, snapshot.active_color, rotation
    );

    for (i, seat) in snapshot.seats.iter().enumerate() {
        let marker = if i == snapshot.active_seat_index { " <" } else { "" };
        let _ = writeln!(out, "  {:<6} {:>2} cards{}", seat.name, seat.hand_size, marker);
    }

    out.push_str("Hand:");
    for (i, card) in snapshot.my_hand.iter().enumerate() {
        let mark = if view.playable.get(i).copied().unwrap_or(false) {
            "*"
        } else {
            ""
        };
        let _ = write!(out, " [{}] {}{}", i, card, mark);
    }
    out.push('\n');

    match &view.selection {
        Selection::Idle => {}
        Selection::StackChoice { group } => {
            let _ = writeln!(
                out,
                "Play all {} matching cards ('all') or just the one you picked ('one')?",
                group.len()
            );
        }
        Selection::ColorPick { .. } => out.push_str("Pick a color: red, blue, green, yellow\n"),
    }

    if view.declaration_open {
        out.push_str(">>> Type 'uno' now! <<<\n");
    }
    for effect in &view.effects {
        let _ = writeln!(out, "~ {}", effect.caption());
    }
    push_messages(&mut out, view);
    if let Some(winner) = &view.winner {
        let _ = writeln!(out, "Game over. {} wins!", winner);
    }
    out
}

fn push_messages(out: &mut String, view: &SessionView) {
    if let Some(error) = &view.error {
        let _ = writeln!(out, "! {}", error);
    }
    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "{}", notice);
    }
}

/// Feed stdin lines to the runtime until EOF or `quit`
pub async fn read_commands(handle: RuntimeHandle) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);

    while let Some(line) = lines.next_line().await? {
        if line.trim().eq_ignore_ascii_case("help") {
            println!("{}", HELP);
            continue;
        }
        match parse_command(&line) {
            Ok(input) => {
                let quit = matches!(input, Input::Shutdown);
                if !handle.send(input) || quit {
                    break;
                }
            }
            Err(message) => println!("{}", message),
        }
    }

    debug!("Input closed");
    handle.send(Input::Shutdown);
    Ok(())
}

/// Print every published view
pub async fn print_views(handle: RuntimeHandle) {
    let mut views = handle.views();
    loop {
        let text = render(&views.borrow_and_update());
        println!("{}", text);
        if views.changed().await.is_err() {
            break;
        }
    }
}
