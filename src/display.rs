use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::cards::{Card, Suit};
use crate::request::EquityReport;

pub fn equity_bar(equity: f64, width: usize) -> String {
    let filled = (equity * width as f64) as usize;
    let filled = filled.min(width);
    let bar: String = "\u{2588}".repeat(filled) + &"\u{2591}".repeat(width - filled);
    let pct = format!("{:.1}%", equity * 100.0);

    if equity >= 0.6 {
        format!("{} {}", bar.green(), pct)
    } else if equity >= 0.4 {
        format!("{} {}", bar.yellow(), pct)
    } else {
        format!("{} {}", bar.red(), pct)
    }
}

pub fn board_display(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|card| {
            let rank = card.rank.to_char();
            let symbol = card.suit.symbol();
            match card.suit {
                Suit::Spades => format!("{}{}", rank, symbol).white().to_string(),
                Suit::Hearts => format!("{}{}", rank, symbol).red().to_string(),
                Suit::Diamonds => format!("{}{}", rank, symbol).blue().to_string(),
                Suit::Clubs => format!("{}{}", rank, symbol).green().to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn equity_table(report: &EquityReport) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![
        Cell::new("Player"),
        Cell::new("Hand"),
        Cell::new("Win").set_alignment(CellAlignment::Right),
        Cell::new("Split").set_alignment(CellAlignment::Right),
    ];
    if report.double_board {
        header.push(Cell::new("Scoop").set_alignment(CellAlignment::Right));
    }
    header.push(Cell::new("Equity"));
    table.set_header(header);

    for (i, p) in report.players.iter().enumerate() {
        let label = format!("P{}", i + 1);
        if p.folded {
            let mut row = vec![
                Cell::new(label),
                Cell::new(format!("{} (folded)", p.hand).dimmed().to_string()),
                Cell::new("-").set_alignment(CellAlignment::Right),
                Cell::new("-").set_alignment(CellAlignment::Right),
            ];
            if report.double_board {
                row.push(Cell::new("-").set_alignment(CellAlignment::Right));
            }
            row.push(Cell::new("-"));
            table.add_row(row);
            continue;
        }

        let mut row = vec![
            Cell::new(label.bold().to_string()),
            Cell::new(&p.hand),
            Cell::new(format!("{:.1}%", p.win_fraction * 100.0))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}%", p.split_fraction * 100.0))
                .set_alignment(CellAlignment::Right),
        ];
        if report.double_board {
            let scoop = p.scoop_fraction.unwrap_or(0.0);
            row.push(
                Cell::new(format!("{:.1}%", scoop * 100.0)).set_alignment(CellAlignment::Right),
            );
        }
        row.push(Cell::new(equity_bar(p.equity(), 20)));
        table.add_row(row);
    }

    table.to_string()
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}
