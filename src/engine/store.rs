//! Holder of the current generation

use crate::error::{LifeError, LifeResult};
use crate::game_of_life::Grid;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// A published generation
#[derive(Debug, Clone)]
pub struct Frame {
    /// Ticks applied since the grid was last replaced by a user action
    pub generation: u64,
    pub grid: Arc<Grid>,
}

/// Shared store for the engine's current grid.
///
/// Every write swaps in a whole new `Arc<Grid>` under a single lock
/// acquisition, so readers only ever see complete generations.
#[derive(Debug)]
pub struct GridStore {
    current: RwLock<Frame>,
    subscribers: Mutex<Vec<Sender<Frame>>>,
}

impl GridStore {
    pub fn new(grid: Grid) -> Self {
        Self {
            current: RwLock::new(Frame {
                generation: 0,
                grid: Arc::new(grid),
            }),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Current grid; never changes underneath the caller
    pub fn snapshot(&self) -> Arc<Grid> {
        Arc::clone(&self.frame().grid)
    }

    pub fn frame(&self) -> Frame {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn generation(&self) -> u64 {
        self.frame().generation
    }

    pub fn dimensions(&self) -> (usize, usize) {
        let grid = self.snapshot();
        (grid.rows(), grid.cols())
    }

    /// Replace the grid wholesale and restart the generation count
    pub fn replace(&self, grid: Grid) -> LifeResult<Frame> {
        self.write_with(|frame| {
            check_dimensions(&frame.grid, &grid)?;
            Ok(Frame {
                generation: 0,
                grid: Arc::new(grid),
            })
        })
    }

    /// Derive a new grid from the current one, keeping the generation count
    pub fn modify<F>(&self, f: F) -> LifeResult<Frame>
    where
        F: FnOnce(&Grid) -> LifeResult<Grid>,
    {
        self.write_with(|frame| {
            let next = f(frame.grid.as_ref())?;
            check_dimensions(&frame.grid, &next)?;
            Ok(Frame {
                generation: frame.generation,
                grid: Arc::new(next),
            })
        })
    }

    /// Publish the result of one tick
    pub fn publish_next(&self, grid: Grid) -> LifeResult<Frame> {
        self.write_with(|frame| {
            check_dimensions(&frame.grid, &grid)?;
            Ok(Frame {
                generation: frame.generation + 1,
                grid: Arc::new(grid),
            })
        })
    }

    /// Receive every frame published after this call
    pub fn subscribe(&self) -> Receiver<Frame> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sender);
        receiver
    }

    fn write_with<F>(&self, f: F) -> LifeResult<Frame>
    where
        F: FnOnce(&Frame) -> LifeResult<Frame>,
    {
        let frame = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            let next = f(&*current)?;
            *current = next.clone();
            next
        };
        self.notify(&frame);
        Ok(frame)
    }

    fn notify(&self, frame: &Frame) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        // dropped receivers are pruned here
        subscribers.retain(|sender| sender.send(frame.clone()).is_ok());
    }
}

fn check_dimensions(current: &Grid, next: &Grid) -> LifeResult<()> {
    if current.rows() != next.rows() || current.cols() != next.cols() {
        return Err(LifeError::DimensionMismatch {
            expected_rows: current.rows(),
            expected_cols: current.cols(),
            rows: next.rows(),
            cols: next.cols(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_of_life::{step, Cell};

    #[test]
    fn test_snapshot_survives_replacement() {
        let store = GridStore::new(Grid::with_alive(3, 3, &[(1, 1)]).unwrap());
        let before = store.snapshot();

        store.replace(Grid::new(3, 3).unwrap()).unwrap();

        assert_eq!(before.get(1, 1), Ok(Cell::Alive));
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_generation_counting() {
        let blinker = Grid::with_alive(5, 5, &[(2, 1), (2, 2), (2, 3)]).unwrap();
        let store = GridStore::new(blinker);

        let frame = store.publish_next(step(&store.snapshot())).unwrap();
        assert_eq!(frame.generation, 1);
        store.publish_next(step(&store.snapshot())).unwrap();
        assert_eq!(store.generation(), 2);

        store.modify(|grid| grid.toggled(0, 0)).unwrap();
        assert_eq!(store.generation(), 2);

        store.replace(Grid::new(5, 5).unwrap()).unwrap();
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_dimensions_are_fixed() {
        let store = GridStore::new(Grid::new(4, 4).unwrap());
        let err = store.replace(Grid::new(4, 5).unwrap()).unwrap_err();
        assert_eq!(
            err,
            LifeError::DimensionMismatch { expected_rows: 4, expected_cols: 4, rows: 4, cols: 5 }
        );
        assert_eq!(store.dimensions(), (4, 4));
    }

    #[test]
    fn test_failed_modify_leaves_grid_alone() {
        let store = GridStore::new(Grid::new(2, 2).unwrap());
        assert!(store.modify(|grid| grid.toggled(5, 5)).is_err());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_subscribers_receive_frames() {
        let store = GridStore::new(Grid::new(3, 3).unwrap());
        let receiver = store.subscribe();
        let dropped = store.subscribe();
        drop(dropped);

        store.modify(|grid| grid.toggled(0, 0)).unwrap();
        let frame = receiver.try_recv().unwrap();
        assert_eq!(frame.generation, 0);
        assert_eq!(frame.grid.living_cells(), vec![(0, 0)]);
        assert_eq!(store.subscribers.lock().unwrap().len(), 1);
    }
}
