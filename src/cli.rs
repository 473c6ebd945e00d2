use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cards::{parse_board, parse_hand};
use crate::display::{board_display, equity_table, print_error};
use crate::error::PloResult;
use crate::hand_evaluator::evaluate_omaha;
use crate::orchestrator::{calculate_equity, SimOptions};
use crate::request::{PlayerHand, SimulationRequest};

#[derive(Parser)]
#[command(
    name = "plo",
    version,
    about = "PLO equity calculator — Monte Carlo simulation for single and double-board pots."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate per-player equity for up to 8 PLO hands
    Equity {
        /// A 4-card hole hand, e.g. "AsKsQdJd" (repeat per player)
        #[arg(long = "hand", required = true)]
        hands: Vec<String>,

        /// Community cards already dealt (0-5), e.g. "Kd8c7h"
        #[arg(long, default_value = "")]
        board: String,

        /// Second board for a double-board bomb pot
        #[arg(long)]
        board2: Option<String>,

        /// Known dead cards excluded from sampling
        #[arg(long, default_value = "")]
        dead: String,

        /// 1-based player numbers whose hands folded (cards stay dead)
        #[arg(long, value_delimiter = ',')]
        folded: Vec<usize>,

        /// Requested trial count (the planner derives the effective count)
        #[arg(short = 'n', long, default_value_t = 100_000)]
        iterations: u64,

        /// Bias the planner toward a fast, lower-precision answer
        #[arg(long)]
        quick: bool,

        /// Fixed RNG seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Emit the report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Suppress the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Evaluate one PLO hand on a fully dealt 5-card board
    Eval {
        /// The 4-card hole hand
        #[arg(long)]
        hand: String,

        /// Exactly 5 community cards
        #[arg(long)]
        board: String,
    },
}

fn run_equity(
    hands: &[String],
    board: &str,
    board2: Option<&str>,
    dead: &str,
    folded: &[usize],
    iterations: u64,
    quick: bool,
    seed: Option<u64>,
    json: bool,
    no_progress: bool,
) -> PloResult<()> {
    let mut player_hands = Vec::new();
    for (i, notation) in hands.iter().enumerate() {
        let cards = parse_hand(notation)?;
        if folded.contains(&(i + 1)) {
            player_hands.push(PlayerHand::folded(cards));
        } else {
            player_hands.push(PlayerHand::new(cards));
        }
    }

    let mut request = match board2 {
        Some(b2) => SimulationRequest::double_board(
            player_hands,
            parse_board(board)?,
            parse_board(b2)?,
            iterations,
        ),
        None => SimulationRequest::single_board(player_hands, parse_board(board)?, iterations),
    };
    request.dead_cards = parse_board(dead)?;
    request.quick = quick;

    let mut options = SimOptions {
        seed,
        ..SimOptions::default()
    };

    let bar = if json || no_progress || request.is_fully_resolved() {
        None
    } else {
        let bar = ProgressBar::new(iterations);
        bar.set_style(
            ProgressStyle::with_template("  {bar:30.cyan/dim} {pos}/{len} trials")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(Arc::new(bar))
    };
    if let Some(bar) = &bar {
        let bar = Arc::clone(bar);
        options.progress = Some(Arc::new(move |done, total| {
            bar.set_length(total);
            bar.set_position(done);
        }));
    }

    let report = calculate_equity(&request, &options);
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    let report = report?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    if request.is_double_board() {
        println!("  Top:    {}", board_display(&request.boards[0]));
        println!("  Bottom: {}", board_display(&request.boards[1]));
    } else if !request.boards[0].is_empty() {
        println!("  Board: {}", board_display(&request.boards[0]));
    }
    println!("{}", equity_table(&report));
    println!(
        "  {} trials{}",
        report.trials.to_string().bold(),
        if request.is_fully_resolved() {
            " (board fully dealt, exact showdown)"
        } else {
            ""
        }
    );
    println!();
    Ok(())
}

fn run_eval(hand: &str, board: &str) -> PloResult<()> {
    let hole = parse_hand(hand)?;
    let board = parse_board(board)?;
    let score = evaluate_omaha(&hole, &board)?;
    println!();
    println!("  Hand:  {}", board_display(&hole));
    println!("  Board: {}", board_display(&board));
    println!("  Best:  {}", score.to_string().bold());
    println!();
    Ok(())
}

pub fn run() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Equity {
            hands,
            board,
            board2,
            dead,
            folded,
            iterations,
            quick,
            seed,
            json,
            no_progress,
        } => run_equity(
            hands,
            board,
            board2.as_deref(),
            dead,
            folded,
            *iterations,
            *quick,
            *seed,
            *json,
            *no_progress,
        ),
        Commands::Eval { hand, board } => run_eval(hand, board),
    };

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
