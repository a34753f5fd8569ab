// vim: set ai et ts=4 sw=4 sts=4:
use ansi_term::{ANSIString, Colour, Style};

use super::puzzle::Puzzle;
use super::util::{ralign, ralign_joined_coloreds, lalign_colored};

// grid lines are drawn every Nth row and column for readability
const SUBDIVISION: usize = 5;
const DONE_HINT_COLOR: Colour = Colour::Fixed(241); // grey

fn hint_style(line_done: bool) -> Style {
    match line_done {
        true  => DONE_HINT_COLOR.normal(),
        false => Style::new(),
    }
}

/// Renders the board with its hints: column hints stacked on top, row hints
/// right-aligned on the left, the grid boxed with subdivision lines. Hints
/// of fully determined lines are greyed out when color is on.
pub fn ascii(puzzle: &Puzzle, emit_color: bool) -> String {
    let row_prefixes: Vec<Vec<ANSIString>> = (0..puzzle.height())
        .map(|y| {
            let style = hint_style(puzzle.row(y).unknown_count() == 0);
            puzzle.row_hints()[y].iter()
                                 .map(|h| style.paint(h.to_string()))
                                 .collect()
        })
        .collect();

    let prefix_len = row_prefixes.iter()
                                 .map(|parts| {
                                     let glyphs: usize = parts.iter().map(|p| p.len()).sum();
                                     glyphs + parts.len().saturating_sub(1)
                                 })
                                 .max()
                                 .unwrap_or(0);
    let max_col_hints = puzzle.col_hints().iter()
                                          .map(|hints| hints.len())
                                          .max()
                                          .unwrap_or(0);

    let mut result = String::new();
    for i in (0..max_col_hints).rev() {
        result.push_str(&fmt_header(puzzle, i, prefix_len, emit_color));
    }

    result.push_str(&fmt_line(
        &ralign("", prefix_len),
        "\u{2554}", "\u{2557}", "\u{2564}",
        &(0..puzzle.width()).map(|_| String::from("\u{2550}\u{2550}\u{2550}"))
                            .collect::<Vec<_>>(),
    ));
    for y in 0..puzzle.height() {
        result.push_str(&fmt_line(
            &ralign_joined_coloreds(&row_prefixes[y], prefix_len, emit_color),
            "\u{2551}", "\u{2551}", "\u{2502}",
            &puzzle.row(y).to_vec()
                          .iter()
                          .map(|cell| format!(" {} ", cell.fmt_visual()))
                          .collect::<Vec<_>>(),
        ));
        if (y + 1) % SUBDIVISION == 0 && y + 1 < puzzle.height() {
            result.push_str(&fmt_line(
                &ralign("", prefix_len),
                "\u{255F}", "\u{2562}", "\u{253C}",
                &(0..puzzle.width()).map(|_| String::from("\u{2500}\u{2500}\u{2500}"))
                                    .collect::<Vec<_>>(),
            ));
        }
    }
    result.push_str(&fmt_line(
        &ralign("", prefix_len),
        "\u{255A}", "\u{255D}", "\u{2567}",
        &(0..puzzle.width()).map(|_| String::from("\u{2550}\u{2550}\u{2550}"))
                            .collect::<Vec<_>>(),
    ));
    result
}

fn fmt_line(prefix: &str,
            left_delim: &str,
            right_delim: &str,
            columnwise_separator: &str,
            content_parts: &[String])
    -> String
{
    let mut result = format!("{} {}", prefix, left_delim);
    for (idx, part) in content_parts.iter().enumerate() {
        result.push_str(part);
        if (idx + 1) % SUBDIVISION == 0 && idx + 1 < content_parts.len() {
            result.push_str(columnwise_separator);
        }
    }
    result.push_str(right_delim);
    result.push('\n');
    result
}

// one stacked line of column hints, bottom-aligned above each column
fn fmt_header(puzzle: &Puzzle, line_idx: usize, prefix_len: usize, emit_color: bool)
    -> String
{
    let mut content_parts = Vec::<String>::new();
    for x in 0..puzzle.width() {
        let hints = &puzzle.col_hints()[x];
        let part = if line_idx < hints.len() {
            let style = hint_style(puzzle.column(x).unknown_count() == 0);
            let colored = style.paint(hints[hints.len()-1-line_idx].to_string());
            format!(" {}", lalign_colored(&colored, 2, emit_color))
        } else {
            format!(" {:-2}", " ")
        };
        content_parts.push(part);
    }
    fmt_line(&ralign("", prefix_len), " ", " ", " ", &content_parts)
}
