//! Demo CLI: runs `best_move` from the initial position for a fixed number
//! of plies, printing the board and search stats after each move.

use brandubh_zero::{
    Brandubh, Error, Piece, Position, SearchParams, Side, Termination, UniformEvaluator,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Self-play a Brandubh game with an untrained evaluator")]
struct Args {
    /// Simulations per move.
    #[arg(short, long, default_value_t = 200)]
    simulations: u32,

    /// Move sampling temperature (0.0 = always pick the most-visited move).
    #[arg(short, long, default_value_t = 0.0)]
    temperature: f32,

    /// Stop after this many plies even if the game hasn't ended.
    #[arg(short = 'p', long, default_value_t = 60)]
    max_plies: usize,

    /// RNG seed for move sampling.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn render_board(pos: &Position) -> String {
    let mut output = String::new();
    for row in 0..7 {
        for col in 0..7 {
            let ch = match pos.cell(row, col) {
                Piece::Empty if brandubh_zero::board::is_corner(row, col) => '+',
                Piece::Empty => '.',
                Piece::Attacker => 'A',
                Piece::Defender => 'd',
                Piece::King => 'K',
            };
            output.push(ch);
            output.push(' ');
        }
        output.push('\n');
    }
    output
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut engine = Brandubh::new(UniformEvaluator, SearchParams::default());
    let mut pos = Position::initial();
    let mut side = Side::Attacker;
    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::seed_from_u64(args.seed);

    for ply in 0..args.max_plies {
        println!("ply {ply}, {side:?} to move");
        println!("{}", render_board(&pos));

        if pos.is_terminal() != Termination::NotOver {
            println!("game over: {:?}", pos.is_terminal());
            break;
        }

        let (mv, data) = match engine.best_move(&pos, side, args.simulations, args.temperature, &mut rng) {
            Ok(choice) => choice,
            Err(Error::NoLegalMoves) => {
                println!("{side:?} has no legal moves");
                break;
            }
            Err(e) => panic!("evaluator never fails for UniformEvaluator: {e}"),
        };
        let visits = data
            .visit_counts
            .get(&brandubh_zero::encode(mv))
            .copied()
            .unwrap_or(0);
        let root_visits = engine
            .tree()
            .map(|t| t.get(t.root()).visits())
            .unwrap_or(0);
        println!("playing {mv} (visits {visits}/{root_visits})");

        pos = pos.apply(side, mv).expect("best_move always returns a legal move");
        side = side.opponent();
    }
}
