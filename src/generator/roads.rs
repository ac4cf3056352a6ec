//! Road routing over the node grid using Dijkstra's algorithm.
//!
//! Roads grow from a start tile to the nearest tile already marked as path,
//! never leaving the start's region. The search state is (tile, incoming
//! direction) so the smoothing rules can forbid sharp zig-zags without
//! losing routes that approach a tile from another side.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use super::node::{Direction, NodeGrid, NodeType};

/// Cost of an orthogonal step.
const GROUND_PENALTY: u32 = 100;
/// Diagonal steps cost one and a half orthogonal steps.
const DIAGONAL_PENALTY: u32 = GROUND_PENALTY * 3 / 2;
/// How far past the first destination the search keeps looking for a better one.
const SEARCH_MARGIN: u32 = GROUND_PENALTY * 2;
/// Joining an existing road diagonally looks worse than joining it head-on.
const DIAGONAL_JOIN_PENALTY: u32 = GROUND_PENALTY / 2;

/// Direction slots per tile: eight incoming directions plus "no move yet".
const SLOTS: usize = 9;
const START_SLOT: usize = 8;

/// Node for Dijkstra's priority queue
#[derive(Clone, Copy)]
struct PathNode {
    state: usize,
    cost: u32,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.state == other.state
    }
}

impl Eq for PathNode {}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; ties resolved by state for reproducible routes
        other.cost.cmp(&self.cost).then_with(|| other.state.cmp(&self.state))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SearchRules {
    smooth: bool,
}

fn slot_of(direction: Direction) -> usize {
    Direction::ALL.iter().position(|&d| d == direction).unwrap_or(START_SLOT)
}

/// Moves that would draw a sharp corner right after `previous`.
fn is_sharp_turn(previous: Direction, next: Direction) -> bool {
    if previous.is_diagonal() && next.is_diagonal() && previous != next {
        return true;
    }
    previous == Direction::Bottom && matches!(next, Direction::Left | Direction::Right)
}

fn is_traversable(node_type: NodeType) -> bool {
    matches!(node_type, NodeType::Open | NodeType::Path | NodeType::Coast)
}

/// Route from `start` to the nearest road tile of its region.
///
/// Returns the tiles from the reached road tile back to `start`, both included,
/// or an empty list when no road is reachable.
pub fn find_path_to_nearest_road(grid: &NodeGrid, start: i32) -> Vec<i32> {
    search(grid, start, SearchRules { smooth: true })
}

/// Whether any road tile of the start's region can be reached.
pub fn is_connected_to_road(grid: &NodeGrid, start: i32) -> bool {
    !search(grid, start, SearchRules { smooth: false }).is_empty()
}

/// Stream course from a coast tile up to the nearest road. Streams may bend freely.
pub fn find_stream_path(grid: &NodeGrid, start: i32) -> Vec<i32> {
    search(grid, start, SearchRules { smooth: false })
}

/// Stamp a routed path as road.
pub fn mark_path(grid: &mut NodeGrid, path: &[i32]) {
    for &index in path {
        if grid.node(index).node_type != NodeType::Path {
            grid.set_type(index, NodeType::Path);
        }
    }
}

/// Shortest route to a road tile of the start's region that may also cut
/// through border tiles. Used when a connector has no open ground behind it.
///
/// Same shape as [`find_path_to_nearest_road`]: road tile first, `start` last.
pub fn carve_path_to_nearest_road(grid: &NodeGrid, start: i32) -> Vec<i32> {
    let region = grid.node(start).region;
    let mut came_from: Vec<Option<i32>> = vec![None; grid.len()];
    let mut seen = vec![false; grid.len()];
    let mut queue = VecDeque::new();
    seen[start as usize] = true;
    queue.push_back(start);

    while let Some(index) = queue.pop_front() {
        if index != start && grid.node(index).node_type == NodeType::Path {
            let mut path = vec![index];
            let mut current = came_from[index as usize];
            while let Some(previous) = current {
                path.push(previous);
                current = came_from[previous as usize];
            }
            return path;
        }

        for direction in Direction::ALL {
            let Some(next) = grid.neighbor(index, direction) else {
                continue;
            };
            let node = grid.node(next);
            if seen[next as usize]
                || node.region != region
                || !matches!(node.node_type, NodeType::Open | NodeType::Path | NodeType::Coast | NodeType::Border)
            {
                continue;
            }
            seen[next as usize] = true;
            came_from[next as usize] = Some(index);
            queue.push_back(next);
        }
    }

    Vec::new()
}

fn search(grid: &NodeGrid, start: i32, rules: SearchRules) -> Vec<i32> {
    let start_node = *grid.node(start);
    if start_node.node_type == NodeType::Path {
        return vec![start];
    }

    let region = start_node.region;
    let action_start = start_node.node_type == NodeType::Action;

    let state_count = grid.len() * SLOTS;
    let mut cost_map = vec![u32::MAX; state_count];
    let mut came_from: Vec<Option<usize>> = vec![None; state_count];
    let mut pq = BinaryHeap::new();

    let start_state = start as usize * SLOTS + START_SLOT;
    cost_map[start_state] = 0;
    pq.push(PathNode { state: start_state, cost: 0 });

    // Best destination so far as (score, state)
    let mut best: Option<(u32, usize)> = None;

    while let Some(PathNode { state, cost }) = pq.pop() {
        if cost > cost_map[state] {
            continue;
        }
        if let Some((best_score, _)) = best {
            if cost > best_score + SEARCH_MARGIN {
                break;
            }
        }

        let index = (state / SLOTS) as i32;
        let slot = state % SLOTS;
        let incoming = Direction::ALL.get(slot).copied();

        if index != start && grid.node(index).node_type == NodeType::Path {
            let join_penalty = if incoming.map_or(false, Direction::is_diagonal) { DIAGONAL_JOIN_PENALTY } else { 0 };
            let score = cost + join_penalty;
            if best.map_or(true, |(best_score, _)| score < best_score) {
                best = Some((score, state));
            }
            continue;
        }

        for direction in Direction::ALL {
            if index == start
                && action_start
                && !matches!(direction, Direction::Left | Direction::Right | Direction::Bottom)
            {
                continue;
            }
            if rules.smooth {
                if let Some(previous) = incoming {
                    if is_sharp_turn(previous, direction) {
                        continue;
                    }
                }
            }

            let Some(next) = grid.neighbor(index, direction) else {
                continue;
            };
            let node = grid.node(next);
            if node.region != region || !is_traversable(node.node_type) {
                continue;
            }

            let step = if direction.is_diagonal() { DIAGONAL_PENALTY } else { GROUND_PENALTY };
            let new_cost = cost + step;
            let next_state = next as usize * SLOTS + slot_of(direction);
            if new_cost < cost_map[next_state] {
                cost_map[next_state] = new_cost;
                came_from[next_state] = Some(state);
                pq.push(PathNode { state: next_state, cost: new_cost });
            }
        }
    }

    let Some((_, destination)) = best else {
        return Vec::new();
    };

    // Reconstruct destination -> start
    let mut path = Vec::new();
    let mut states = Vec::new();
    let mut current = Some(destination);
    while let Some(state) = current {
        path.push((state / SLOTS) as i32);
        states.push(state);
        current = came_from[state];
    }

    // The state right after the start carries the first move.
    if states.len() >= 2 {
        let first_move = Direction::ALL.get(states[states.len() - 2] % SLOTS).copied();
        if matches!(first_move, Some(Direction::BottomLeft | Direction::BottomRight)) {
            if let Some(below) = grid.neighbor(start, Direction::Bottom) {
                let node = grid.node(below);
                if node.region == region && is_traversable(node.node_type) && !path.contains(&below) {
                    path.insert(path.len() - 1, below);
                }
            }
        }
    }

    path
}
