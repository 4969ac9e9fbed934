use anyhow::{bail, Context, Result};
use chess_agents::{
    choose_move, evaluate_with, AlphaBetaAgent, Agent, Objective, RandomAgent, SearchConfig,
};
use chess_core::{color_name, Color, File, Game, Piece, Position, Rank, Square};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Alpha-beta chess search and evaluation", long_about = None)]
struct Cli {
    /// TOML file with search settings and evaluation weights
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Turn debugging information on (-vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Prints the static evaluation of a position
    Eval {
        /// Position in FEN, the start position if omitted
        fen: Option<String>,
    },

    /// Searches a position and prints the chosen move
    Search {
        /// Position in FEN, the start position if omitted
        fen: Option<String>,

        /// Plies to search, overrides the config file
        #[arg(short, long)]
        depth: Option<u8>,

        /// Prefer low scores at the root
        #[arg(long, conflicts_with = "maximize")]
        minimize: bool,

        /// Prefer high scores at the root
        #[arg(long)]
        maximize: bool,
    },

    /// Plays a game between two agents from the start position
    Selfplay {
        #[arg(long, value_enum, default_value_t = AgentKind::Alphabeta)]
        white: AgentKind,

        #[arg(long, value_enum, default_value_t = AgentKind::Random)]
        black: AgentKind,

        /// Plies to search, overrides the config file
        #[arg(short, long)]
        depth: Option<u8>,

        /// Stops the game after this many moves by both sides
        #[arg(long, default_value_t = 200)]
        max_moves: usize,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum AgentKind {
    Alphabeta,
    Random,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>, depth: Option<u8>) -> Result<SearchConfig> {
    let mut config = match path {
        Some(path) => SearchConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SearchConfig::default(),
    };
    if let Some(depth) = depth {
        config.depth = depth;
    }
    Ok(config)
}

fn parse_position(fen: Option<&str>) -> Result<Position> {
    match fen {
        Some(fen) => Position::from_fen(fen).context("parsing position"),
        None => Ok(Position::new()),
    }
}

fn display_board(position: &Position) {
    println!("\n  a b c d e f g h");
    println!("  ---------------");

    for rank in Rank::ALL.iter().rev() {
        let label = *rank as usize + 1;
        print!("{label} ");

        for file in File::ALL {
            let symbol = match position.piece_at(Square::new(file, *rank)) {
                Some((color, piece)) => piece_symbol(color, piece),
                None => '.',
            };
            print!("{symbol} ");
        }

        println!("| {label}");
    }

    println!("  ---------------");
    println!("  a b c d e f g h\n");
    println!("{} to move", color_name(position.side_to_move()));
}

fn piece_symbol(color: Color, piece: Piece) -> char {
    match (piece, color) {
        (Piece::King, Color::White) => '♔',
        (Piece::Queen, Color::White) => '♕',
        (Piece::Rook, Color::White) => '♖',
        (Piece::Bishop, Color::White) => '♗',
        (Piece::Knight, Color::White) => '♘',
        (Piece::Pawn, Color::White) => '♙',
        (Piece::King, Color::Black) => '♚',
        (Piece::Queen, Color::Black) => '♛',
        (Piece::Rook, Color::Black) => '♜',
        (Piece::Bishop, Color::Black) => '♝',
        (Piece::Knight, Color::Black) => '♞',
        (Piece::Pawn, Color::Black) => '♟',
    }
}

fn make_agent(kind: AgentKind, config: &SearchConfig) -> Box<dyn Agent> {
    match kind {
        AgentKind::Alphabeta => Box::new(AlphaBetaAgent::new(config.clone())),
        AgentKind::Random => Box::new(RandomAgent::new()),
    }
}

fn run_eval(fen: Option<&str>, config: &SearchConfig) -> Result<()> {
    let position = parse_position(fen)?;
    display_board(&position);
    println!("FEN: {position}");
    println!(
        "Evaluation: {:.2} (positive favors White)",
        evaluate_with(&position, &config.weights)
    );
    Ok(())
}

fn run_search(
    fen: Option<&str>,
    objective: Option<Objective>,
    config: &SearchConfig,
) -> Result<()> {
    let position = parse_position(fen)?;
    let objective = objective.unwrap_or_else(|| Objective::for_side(position.side_to_move()));

    display_board(&position);
    println!("Searching depth {} ({objective})...", config.depth);

    let start = Instant::now();
    let outcome = choose_move(&position, config.depth, objective, config);
    let elapsed = start.elapsed();

    match &outcome.move_text {
        Some(text) => println!("Best move: {text}"),
        None => println!("Best move: none"),
    }
    println!("Score: {:.2}", outcome.score);
    println!("Nodes expanded: {}", outcome.stats.nodes_expanded);
    println!("Cutoffs: {}", outcome.stats.cutoffs);
    println!("Time: {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_selfplay(
    white: AgentKind,
    black: AgentKind,
    max_moves: usize,
    config: &SearchConfig,
) -> Result<()> {
    let mut white = make_agent(white, config);
    let mut black = make_agent(black, config);
    let mut game = Game::new();

    println!("{} (White) vs {} (Black)", white.name(), black.name());

    while !game.is_over() && game.history().len() < 2 * max_moves {
        let position = game.position().clone();
        let agent = match position.side_to_move() {
            Color::White => &mut white,
            Color::Black => &mut black,
        };

        let Some(mv) = agent.best_move(&position) else {
            bail!("{} returned no move in {position}", agent.name());
        };
        let text = position.move_text(mv);
        game.play(mv)
            .with_context(|| format!("{} played {text}", agent.name()))?;

        let ply = game.history().len();
        if ply % 2 == 1 {
            print!("{}. {text} ", (ply + 1) / 2);
        } else {
            println!("{text}");
        }
    }
    println!();

    display_board(game.position());
    match game.outcome() {
        Some(outcome) => println!("{outcome}"),
        None => println!("Stopped after {max_moves} moves"),
    }
    info!(plies = game.history().len(), "game finished");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!("Command line {cli:?}");

    match &cli.command {
        Cmd::Eval { fen } => {
            let config = load_config(cli.config.as_ref(), None)?;
            run_eval(fen.as_deref(), &config)
        }
        Cmd::Search {
            fen,
            depth,
            minimize,
            maximize,
        } => {
            let config = load_config(cli.config.as_ref(), *depth)?;
            let objective = match (minimize, maximize) {
                (true, _) => Some(Objective::Minimize),
                (_, true) => Some(Objective::Maximize),
                _ => None,
            };
            run_search(fen.as_deref(), objective, &config)
        }
        Cmd::Selfplay {
            white,
            black,
            depth,
            max_moves,
        } => {
            let config = load_config(cli.config.as_ref(), *depth)?;
            run_selfplay(*white, *black, *max_moves, &config)
        }
    }
}
