use std::fmt::Write;

use sapper_core::{GameSession, MineItemUI, MineMapUI, RankTable, format_elapsed};

fn item_char(item: MineItemUI) -> char {
    use MineItemUI::*;
    match item {
        Hidden | BlinkAnimation => '#',
        HiddenHover => '+',
        Flagged => 'F',
        Uncertain => '?',
        OpenedBoom => '*',
        OpenedCount(0) | RevealAnimation(0) => '.',
        OpenedCount(count) | RevealAnimation(count) => char::from(b'0' + count.min(9)),
    }
}

/// Board as text with column and row labels, animations shown in their end state.
pub(crate) fn draw_map(map: &MineMapUI) -> String {
    let mut out = String::from("    ");
    for x in 0..map.width {
        let _ = write!(out, "{:>2}", x % 100);
    }
    out.push('\n');
    for (y, row) in map.rows().enumerate() {
        let _ = write!(out, "{y:>3} ");
        for &item in row {
            out.push(' ');
            out.push(item_char(item));
        }
        out.push('\n');
    }
    out
}

pub(crate) fn draw_status(session: &GameSession) -> String {
    let state = if session.is_won() {
        " | cleared!"
    } else if session.is_lost() {
        " | boom"
    } else if session.is_paused() {
        " | paused"
    } else {
        ""
    };
    let tap = if session.tap_is_flag() { "flag" } else { "dig" };
    format!(
        "{} | {} | mines left: {} | tap: {tap}{state}",
        session.config().level,
        session.time_string(),
        session.mines_remaining(),
    )
}

pub(crate) fn draw_ranking(table: &RankTable, highlight: Option<usize>) -> String {
    if table.is_empty() {
        return "  no records yet\n".to_string();
    }
    let mut out = String::new();
    for (position, item) in table.items().iter().enumerate() {
        let marker = if highlight == Some(position) { " <" } else { "" };
        let _ = writeln!(
            out,
            "  {}. {}{marker}",
            position + 1,
            format_elapsed(item.elapsed_millis)
        );
    }
    out
}
