use crate::models::game_move::GameMove;
use crate::models::room::{Coord, Symbol};

const DIRECTIONS: [(i64, i64); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Square grid rebuilt from a room's move log. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Symbol>>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Board {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Replays moves in the order given. Moves outside the board are skipped.
    pub fn from_moves(size: usize, moves: &[GameMove]) -> Self {
        let mut board = Board::new(size);
        for game_move in moves {
            board.place(game_move.coord(), game_move.symbol);
        }
        board
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, coord: Coord) -> Option<Symbol> {
        if coord.x >= self.size || coord.y >= self.size {
            return None;
        }
        self.cells[coord.y * self.size + coord.x]
    }

    pub fn place(&mut self, coord: Coord, symbol: Symbol) -> bool {
        if coord.x >= self.size || coord.y >= self.size {
            return false;
        }
        self.cells[coord.y * self.size + coord.x] = Some(symbol);
        true
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    fn step(&self, coord: Coord, dx: i64, dy: i64) -> Option<Coord> {
        let x = coord.x as i64 + dx;
        let y = coord.y as i64 + dy;
        let size = self.size as i64;
        if x < 0 || y < 0 || x >= size || y >= size {
            return None;
        }
        Some(Coord {
            x: x as usize,
            y: y as usize,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub winner: Option<Symbol>,
    pub winning_line: Option<Vec<Coord>>,
}

impl Evaluation {
    fn none() -> Self {
        Evaluation {
            winner: None,
            winning_line: None,
        }
    }
}

#[derive(Clone, Default)]
pub struct RulesService;

impl RulesService {
    pub fn new() -> Self {
        RulesService
    }

    /// Checks whether the stone at `last_move` completes a run of `run_length`.
    ///
    /// For each axis the contiguous run through `last_move` is collected in board
    /// order. When it reaches `run_length` the returned line is the window of
    /// exactly `run_length` cells centred on `last_move` as far as the run allows,
    /// so overlines still report a line of the configured length.
    pub fn evaluate(&self, board: &Board, last_move: Coord, run_length: usize) -> Evaluation {
        let symbol = match board.get(last_move) {
            Some(symbol) => symbol,
            None => return Evaluation::none(),
        };
        if run_length == 0 {
            return Evaluation::none();
        }

        for (dx, dy) in DIRECTIONS {
            let mut backward = Vec::new();
            let mut cursor = last_move;
            while let Some(next) = board.step(cursor, -dx, -dy) {
                if board.get(next) != Some(symbol) {
                    break;
                }
                backward.push(next);
                cursor = next;
            }

            let idx = backward.len();
            let mut run: Vec<Coord> = backward.into_iter().rev().collect();
            run.push(last_move);

            cursor = last_move;
            while let Some(next) = board.step(cursor, dx, dy) {
                if board.get(next) != Some(symbol) {
                    break;
                }
                run.push(next);
                cursor = next;
            }

            if run.len() >= run_length {
                let max_start = run.len() - run_length;
                let start = idx.saturating_sub((run_length - 1) / 2).min(max_start);
                return Evaluation {
                    winner: Some(symbol),
                    winning_line: Some(run[start..start + run_length].to_vec()),
                };
            }
        }

        Evaluation::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn c(x: usize, y: usize) -> Coord {
        Coord { x, y }
    }

    fn board_with(size: usize, cells: &[(usize, usize)], symbol: Symbol) -> Board {
        let mut board = Board::new(size);
        for &(x, y) in cells {
            board.place(c(x, y), symbol);
        }
        board
    }

    #[rstest]
    #[case::horizontal((1, 0), (3, 7))]
    #[case::vertical((0, 1), (7, 3))]
    #[case::diagonal((1, 1), (2, 2))]
    #[case::anti_diagonal((1, -1), (2, 12))]
    fn test_exact_run_wins_in_every_direction(
        #[case] direction: (i64, i64),
        #[case] origin: (usize, usize),
    ) {
        let cells: Vec<(usize, usize)> = (0..5)
            .map(|i| {
                (
                    (origin.0 as i64 + direction.0 * i) as usize,
                    (origin.1 as i64 + direction.1 * i) as usize,
                )
            })
            .collect();
        let board = board_with(15, &cells, Symbol::X);
        let last = cells[2];

        let evaluation = RulesService::new().evaluate(&board, c(last.0, last.1), 5);

        assert_eq!(evaluation.winner, Some(Symbol::X));
        let line = evaluation.winning_line.unwrap();
        assert_eq!(line.len(), 5);
        for (x, y) in cells {
            assert!(line.contains(&c(x, y)));
        }
    }

    #[test]
    fn test_four_in_a_row_is_not_a_win() {
        let board = board_with(15, &[(0, 0), (1, 0), (2, 0), (3, 0)], Symbol::O);

        let evaluation = RulesService::new().evaluate(&board, c(3, 0), 5);

        assert_eq!(evaluation, Evaluation::none());
    }

    #[test]
    fn test_overline_window_is_centred_on_last_move() {
        // Six in a row on y = 4, x = 2..=7; last stone at run index 3 (x = 5).
        let cells: Vec<(usize, usize)> = (2..=7).map(|x| (x, 4)).collect();
        let board = board_with(15, &cells, Symbol::X);

        let evaluation = RulesService::new().evaluate(&board, c(5, 4), 5);

        let expected: Vec<Coord> = (3..=7).map(|x| c(x, 4)).collect();
        assert_eq!(evaluation.winning_line, Some(expected));
    }

    #[test]
    fn test_overline_window_clamps_at_run_start() {
        let cells: Vec<(usize, usize)> = (0..7).map(|x| (x, 0)).collect();
        let board = board_with(15, &cells, Symbol::O);

        let evaluation = RulesService::new().evaluate(&board, c(0, 0), 5);

        let expected: Vec<Coord> = (0..5).map(|x| c(x, 0)).collect();
        assert_eq!(evaluation.winning_line, Some(expected));
    }

    #[test]
    fn test_overline_window_clamps_at_run_end() {
        let cells: Vec<(usize, usize)> = (0..7).map(|x| (x, 0)).collect();
        let board = board_with(15, &cells, Symbol::O);

        let evaluation = RulesService::new().evaluate(&board, c(6, 0), 5);

        let expected: Vec<Coord> = (2..7).map(|x| c(x, 0)).collect();
        assert_eq!(evaluation.winning_line, Some(expected));
    }

    #[test]
    fn test_opponent_stones_break_the_run() {
        let mut board = board_with(15, &[(0, 0), (1, 0), (3, 0), (4, 0), (5, 0)], Symbol::X);
        board.place(c(2, 0), Symbol::O);

        let evaluation = RulesService::new().evaluate(&board, c(3, 0), 5);

        assert_eq!(evaluation.winner, None);
    }

    #[test]
    fn test_empty_cell_evaluates_to_nothing() {
        let board = Board::new(15);

        assert_eq!(
            RulesService::new().evaluate(&board, c(7, 7), 5),
            Evaluation::none()
        );
    }

    #[test]
    fn test_board_from_moves_and_full() {
        let moves = vec![
            GameMove::new("r", 0, 0, Symbol::X, "a"),
            GameMove::new("r", 1, 0, Symbol::O, "b"),
            GameMove::new("r", 0, 1, Symbol::X, "a"),
            GameMove::new("r", 1, 1, Symbol::O, "b"),
        ];

        let board = Board::from_moves(2, &moves);

        assert_eq!(board.get(c(1, 0)), Some(Symbol::O));
        assert!(board.is_full());
        assert!(!Board::new(2).is_full());
    }

    proptest! {
        #[test]
        fn prop_exact_horizontal_run_wins_from_any_stone(
            x0 in 0usize..11,
            y in 0usize..15,
            pick in 0usize..5,
        ) {
            let cells: Vec<(usize, usize)> = (x0..x0 + 5).map(|x| (x, y)).collect();
            let board = board_with(15, &cells, Symbol::X);

            let evaluation = RulesService::new().evaluate(&board, c(x0 + pick, y), 5);

            let expected: Vec<Coord> = cells.iter().map(|&(x, y)| c(x, y)).collect();
            prop_assert_eq!(evaluation.winner, Some(Symbol::X));
            prop_assert_eq!(evaluation.winning_line, Some(expected));
        }

        #[test]
        fn prop_winning_line_always_has_run_length_and_contains_last(
            len in 5usize..10,
            pick_seed in 0usize..100,
        ) {
            let cells: Vec<(usize, usize)> = (0..len).map(|i| (i, i)).collect();
            let board = board_with(15, &cells, Symbol::O);
            let pick = pick_seed % len;

            let evaluation = RulesService::new().evaluate(&board, c(pick, pick), 5);

            let line = evaluation.winning_line.unwrap();
            prop_assert_eq!(line.len(), 5);
            prop_assert!(line.contains(&c(pick, pick)));
        }
    }
}
