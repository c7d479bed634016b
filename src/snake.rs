use std::collections::VecDeque;

use crossterm::event::KeyCode;

use crate::error::GameError;
use crate::{Coords, TermInt};
use Direction::*;
use MoveResult::*;

pub const INITIAL_SNAKE_LENGTH: usize = 3;

pub const EMPTY_CHAR: char = ' ';
pub const SNAKE_CHAR: char = '*';

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    /// Maps WASD (either case) and the arrow keys to a direction.
    pub fn from_key(key: KeyCode) -> Option<Direction> {
        match key {
            KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Some(Up),
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(Left),
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Some(Down),
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Some(Right),
            _ => None,
        }
    }

    fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Collision {
    Wall,
    SelfCollision,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MoveResult {
    Moved { new_head: Coords, old_tail: Coords },
    Crashed(Collision),
}

impl MoveResult {
    pub fn is_moved(&self) -> bool {
        matches!(self, Moved { .. })
    }
}

#[derive(Clone, Debug)]
pub struct GameState {
    width: TermInt,
    height: TermInt,
    direction: Direction,
    // Head first, tail last
    snake: VecDeque<Coords>,
}

impl GameState {
    /// Places a horizontal snake with its head in the middle of the grid,
    /// body trailing to the left, heading right.
    pub fn new(height: TermInt, width: TermInt) -> Result<Self, GameError> {
        // The tail sits two cells left of the centre column
        if (width / 2) < (INITIAL_SNAKE_LENGTH - 1) as TermInt || height == 0 {
            return Err(GameError::GridTooSmall { width, height });
        }

        let head = ((width / 2) as i32, (height / 2) as i32);
        let snake = (0..INITIAL_SNAKE_LENGTH as i32)
            .map(|i| (head.0 - i, head.1))
            .collect();

        Ok(GameState { width, height, direction: Right, snake })
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn body(&self) -> &VecDeque<Coords> {
        &self.snake
    }

    pub fn head(&self) -> Coords {
        self.snake[0]
    }

    /// Unrecognised keys and `None` are ignored. Reversing is allowed; it
    /// shows up as a self collision on the next step.
    pub fn set_direction(&mut self, key: Option<KeyCode>) {
        if let Some(dir) = key.and_then(Direction::from_key) {
            if dir != self.direction {
                log::debug!("direction {:?} -> {:?}", self.direction, dir);
            }
            self.direction = dir;
        }
    }

    pub fn step(&mut self) -> MoveResult {
        let (dx, dy) = self.direction.delta();
        let old_head = self.head();
        let new_head = (old_head.0 + dx, old_head.1 + dy);

        if new_head.0 < 0 || new_head.1 < 0 ||
           new_head.0 >= self.width as i32 || new_head.1 >= self.height as i32 {
            return Crashed(Collision::Wall);
        }

        // The tail counts as occupied even though it would move away this tick
        if self.snake.contains(&new_head) {
            return Crashed(Collision::SelfCollision);
        }

        let old_tail = self.snake.back().copied().unwrap_or(old_head);
        self.snake.push_front(new_head);
        self.snake.pop_back();

        Moved { new_head, old_tail }
    }

    pub fn grid(&self) -> Vec<Vec<char>> {
        let mut board = vec![vec![EMPTY_CHAR; self.width as usize]; self.height as usize];

        for &(x, y) in &self.snake {
            board[y as usize][x as usize] = SNAKE_CHAR;
        }

        board
    }
}

/// Joins each row's characters, rows separated by newlines.
pub fn grid_to_string(grid: &[Vec<char>]) -> String {
    grid.iter()
        .map(|row| row.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(state: &GameState) -> Vec<Coords> {
        state.body().iter().copied().collect()
    }

    #[test]
    fn test_initial_placement() {
        for &(h, w) in &[(10, 10), (7, 4), (1, 20), (11, 5)] {
            let state = GameState::new(h, w).unwrap();
            let (x, y) = ((w / 2) as i32, (h / 2) as i32);
            assert_eq!(body_of(&state), vec![(x, y), (x - 1, y), (x - 2, y)]);
            assert_eq!(state.direction(), Right);
        }
    }

    #[test]
    fn test_rejects_tiny_grids() {
        assert_eq!(
            GameState::new(10, 3).unwrap_err(),
            GameError::GridTooSmall { width: 3, height: 10 }
        );
        assert!(GameState::new(10, 2).is_err());
        assert!(GameState::new(0, 10).is_err());
    }

    #[test]
    fn test_set_direction_filters_keys() {
        let mut state = GameState::new(10, 10).unwrap();

        state.set_direction(None);
        assert_eq!(state.direction(), Right);
        state.set_direction(Some(KeyCode::Char('x')));
        assert_eq!(state.direction(), Right);
        state.set_direction(Some(KeyCode::Enter));
        assert_eq!(state.direction(), Right);

        state.set_direction(Some(KeyCode::Char('w')));
        assert_eq!(state.direction(), Up);
        state.set_direction(Some(KeyCode::Char('w')));
        assert_eq!(state.direction(), Up);
        state.set_direction(Some(KeyCode::Left));
        assert_eq!(state.direction(), Left);
        state.set_direction(Some(KeyCode::Char('S')));
        assert_eq!(state.direction(), Down);
    }

    #[test]
    fn test_step_moves_head_and_drops_tail() {
        let mut state = GameState::new(10, 10).unwrap();
        let old_tail = *state.body().back().unwrap();

        let res = state.step();

        assert_eq!(res, Moved { new_head: (6, 5), old_tail });
        assert_eq!(body_of(&state), vec![(6, 5), (5, 5), (4, 5)]);
        assert!(!state.body().contains(&old_tail));

        state.set_direction(Some(KeyCode::Char('s')));
        assert!(state.step().is_moved());
        assert_eq!(body_of(&state), vec![(6, 6), (6, 5), (5, 5)]);
    }

    #[test]
    fn test_wall_collision_leaves_snake_alone() {
        let mut state = GameState::new(10, 10).unwrap();
        for _ in 0..4 {
            assert!(state.step().is_moved());
        }
        assert_eq!(state.head(), (9, 5));
        let before = body_of(&state);

        assert_eq!(state.step(), Crashed(Collision::Wall));
        assert_eq!(body_of(&state), before);
    }

    #[test]
    fn test_walls_on_every_side() {
        for (key, steps) in [('w', 5), ('s', 4)] {
            let mut state = GameState::new(10, 10).unwrap();
            state.set_direction(Some(KeyCode::Char(key)));
            for _ in 0..steps {
                assert!(state.step().is_moved());
            }
            assert_eq!(state.step(), Crashed(Collision::Wall));
        }

        let mut state = GameState::new(10, 10).unwrap();
        state.set_direction(Some(KeyCode::Char('s')));
        state.step();
        state.set_direction(Some(KeyCode::Char('a')));
        for _ in 0..5 {
            assert!(state.step().is_moved());
        }
        assert_eq!(state.head(), (0, 6));
        assert_eq!(state.step(), Crashed(Collision::Wall));
    }

    #[test]
    fn test_reversal_is_self_collision() {
        let mut state = GameState::new(10, 10).unwrap();
        let before = body_of(&state);

        state.set_direction(Some(KeyCode::Char('a')));
        assert_eq!(state.step(), Crashed(Collision::SelfCollision));
        assert_eq!(body_of(&state), before);
    }

    #[test]
    fn test_moving_onto_tail_is_a_collision() {
        // Three segments can never put the tail next to the head, so coil a
        // longer body by hand: the tail sits directly left of the head.
        let mut state = GameState::new(10, 10).unwrap();
        state.snake = VecDeque::from(vec![(5, 5), (5, 6), (4, 6), (4, 5)]);
        state.direction = Up;
        let before = body_of(&state);

        state.set_direction(Some(KeyCode::Char('a')));
        assert_eq!(state.step(), Crashed(Collision::SelfCollision));
        assert_eq!(body_of(&state), before);

        state.set_direction(Some(KeyCode::Char('w')));
        assert_eq!(state.step(), Moved { new_head: (5, 4), old_tail: (4, 5) });
        assert_eq!(state.body().len(), 4);
    }

    #[test]
    fn test_length_holds_around_a_loop() {
        let mut state = GameState::new(10, 10).unwrap();

        for key in ['s', 's', 'a', 'a', 'w', 'w', 'd', 'd'] {
            let tail = *state.body().back().unwrap();
            state.set_direction(Some(KeyCode::Char(key)));
            match state.step() {
                Moved { new_head, old_tail } => {
                    assert_eq!(old_tail, tail);
                    assert_eq!(state.head(), new_head);
                    assert!(!state.body().contains(&old_tail));
                },
                Crashed(c) => panic!("unexpected {:?} after {:?}", c, key),
            }
            assert_eq!(state.body().len(), INITIAL_SNAKE_LENGTH);
        }
    }

    #[test]
    fn test_grid_is_pure() {
        let state = GameState::new(6, 8).unwrap();
        assert_eq!(state.grid(), state.grid());
        assert_eq!(state.grid().len(), 6);
        assert!(state.grid().iter().all(|row| row.len() == 8));
    }

    #[test]
    fn test_grid_end_to_end() {
        let mut state = GameState::new(10, 10).unwrap();
        let expect = |cols: &[usize]| -> String {
            let mut rows = vec![" ".repeat(10); 10];
            rows[5] = (0..10).map(|c| if cols.contains(&c) { '*' } else { ' ' }).collect();
            rows.join("\n")
        };

        assert_eq!(grid_to_string(&state.grid()), expect(&[3, 4, 5]));
        assert!(state.step().is_moved());
        assert_eq!(grid_to_string(&state.grid()), expect(&[4, 5, 6]));
    }

    #[test]
    fn test_stepping_right_fails_once_at_the_edge() {
        let width = 13;
        let mut state = GameState::new(7, width).unwrap();
        let mut moves = 0;

        let collision = loop {
            match state.step() {
                Moved { .. } => moves += 1,
                Crashed(c) => break c,
            }
        };

        assert_eq!(collision, Collision::Wall);
        assert_eq!(state.head().0, width as i32 - 1);
        assert_eq!(moves, (width - 1 - width / 2) as usize);
    }

    #[test]
    fn test_grid_to_string_shape() {
        let grid = vec![vec!['a', 'b'], vec![' ', '*']];
        assert_eq!(grid_to_string(&grid), "ab\n *");
        assert_eq!(grid_to_string(&[]), "");
    }
}
