use checkers_core::{legal_moves, piece_moves, Color, Grid, Move, MoveList, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::evaluation::{Evaluator, ScoringMode, LOSS, WIN};

// Search parameters
pub const MAX_SEARCH_DEPTH: u8 = 12; // Deepest lookahead, in turns
const MIN_SEARCH_DEPTH: u8 = 1; // Always look at least one turn ahead

type NodeId = usize;

// One decision point of the turn being searched: the step picked there and,
// when that step is a capture the same piece must continue, the follow-up decision.
#[derive(Debug, Clone, Copy, Default)]
struct DecisionNode {
    chosen: Option<Move>,
    continuation: Option<NodeId>,
}

// Arena of decision points, reset for every root search
#[derive(Debug, Default)]
struct DecisionGraph {
    nodes: Vec<DecisionNode>,
}

impl DecisionGraph {
    fn clear(&mut self) {
        self.nodes.clear();
    }

    fn add(&mut self) -> NodeId {
        self.nodes.push(DecisionNode::default());
        self.nodes.len() - 1
    }

    fn chosen(&self, node: NodeId) -> Option<Move> {
        self.nodes[node].chosen
    }

    fn record(&mut self, node: NodeId, mv: Move, continuation: Option<NodeId>) {
        self.nodes[node] = DecisionNode {
            chosen: Some(mv),
            continuation,
        };
    }

    // Walks the chosen steps from `root` until a decision has no continuation
    fn line(&self, root: NodeId) -> Vec<Move> {
        let mut line = Vec::new();
        let mut current = Some(root);
        while let Some(node) = current.and_then(|id| self.nodes.get(id)) {
            let Some(mv) = node.chosen else {
                break;
            };
            line.push(mv);
            current = node.continuation;
        }
        line
    }
}

/// Counters from the most recent root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchStats {
    /// Positions visited below the root.
    pub nodes: u64,
    /// Value of the chosen turn for the side to move, `-ln` of its material ratio.
    pub score: f64,
    /// Depth actually searched after clamping.
    pub depth: u8,
}

impl Default for SearchStats {
    fn default() -> Self {
        Self {
            nodes: 0,
            score: LOSS,
            depth: 0,
        }
    }
}

/// Depth-limited negamax over whole turns.
///
/// A turn is one simple move or a chain of captures by a single piece. Each
/// capture step is searched as its own decision at the same depth, and the
/// depth only drops when the move passes to the other side.
pub struct Searcher {
    evaluator: Evaluator,
    rng: Option<StdRng>,
    graph: DecisionGraph,
    stats: SearchStats,
}

impl Searcher {
    pub fn new(evaluator: Evaluator) -> Self {
        Self {
            evaluator,
            rng: None,
            graph: DecisionGraph::default(),
            stats: SearchStats::default(),
        }
    }

    /// Shuffles move order with `rng`, so equally scored turns are picked at random.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Finds the best complete turn for `side`: the first move followed by every
    /// forced continuation capture, in order. Empty when `side` cannot move.
    pub fn best_turn_sequence(&mut self, grid: &Grid, side: Color, max_depth: u8) -> Vec<Move> {
        let depth = max_depth.clamp(MIN_SEARCH_DEPTH, MAX_SEARCH_DEPTH);
        self.graph.clear();
        self.stats = SearchStats {
            depth,
            ..SearchStats::default()
        };

        let root = self.graph.add();
        let score = self.root_search(grid, side, None, depth, root);
        self.stats.score = score;

        let line = self.graph.line(root);
        log::debug!(
            "{:?} searched depth {} over {} nodes, score {:.4}, turn of {} step(s)",
            side,
            depth,
            self.stats.nodes,
            score,
            line.len()
        );
        line
    }

    /// Full-window value of `grid` for `side`, looking `depth` turns ahead.
    pub fn alpha_beta(&mut self, grid: &Grid, side: Color, depth: u8) -> f64 {
        self.alpha_beta_from(grid, side, None, depth, LOSS, WIN)
    }

    // Root of the tree: every move is searched with a full window so the
    // recorded choice at each decision node is exact. Stops early once a
    // forced win is found. Unlike `alpha_beta_from` there is no caller-supplied
    // bound: the only cutoff is the fixed `WIN` ceiling.
    fn root_search(
        &mut self,
        grid: &Grid,
        side: Color,
        from: Option<Position>,
        depth: u8,
        node: NodeId,
    ) -> f64 {
        let moves = self.generate(grid, side, from);
        let mut best = LOSS;

        for mv in &moves {
            let after = grid.after(mv);
            let (score, continuation) = if continues_capturing(&after, mv) {
                let child = self.graph.add();
                let score = self.root_search(&after, side, Some(mv.to), depth, child);
                (score, Some(child))
            } else {
                let score =
                    -self.alpha_beta_from(&after, side.opponent(), None, depth - 1, LOSS, WIN);
                (score, None)
            };

            if self.graph.chosen(node).is_none() || score > best {
                best = score;
                self.graph.record(node, *mv, continuation);
            }
            if best >= WIN {
                break;
            }
        }

        best
    }

    // Negamax with alpha-beta pruning. `from` pins the search to a single piece
    // that is in the middle of a capture chain; such a step keeps the side,
    // the depth and the window.
    fn alpha_beta_from(
        &mut self,
        grid: &Grid,
        side: Color,
        from: Option<Position>,
        depth: u8,
        mut alpha: f64,
        beta: f64,
    ) -> f64 {
        self.stats.nodes += 1;

        if depth == 0 {
            return self.evaluator.utility(grid, side);
        }

        let moves = self.generate(grid, side, from);
        if moves.is_empty() {
            // A side that cannot move has lost
            return match from {
                None => LOSS,
                Some(_) => self.evaluator.utility(grid, side),
            };
        }

        let mut best = LOSS;
        for mv in &moves {
            let after = grid.after(mv);
            let score = if continues_capturing(&after, mv) {
                self.alpha_beta_from(&after, side, Some(mv.to), depth, alpha, beta)
            } else {
                -self.alpha_beta_from(&after, side.opponent(), None, depth - 1, -beta, -alpha)
            };

            best = best.max(score);
            alpha = alpha.max(score);
            if beta <= alpha {
                break;
            }
        }

        best
    }

    fn generate(&mut self, grid: &Grid, side: Color, from: Option<Position>) -> MoveList {
        let mut moves = match from {
            Some(at) => piece_moves(grid, at),
            None => legal_moves(grid, side),
        };
        if let Some(rng) = self.rng.as_mut() {
            moves.as_mut_slice().shuffle(rng);
        }
        moves
    }
}

// A capture whose piece can capture again from its landing cell must continue
fn continues_capturing(after: &Grid, mv: &Move) -> bool {
    mv.is_capture() && piece_moves(after, mv.to).has_captures()
}

/// Best turn for `side` with deterministic move order and default weights for `mode`.
pub fn best_turn_sequence(grid: &Grid, side: Color, max_depth: u8, mode: ScoringMode) -> Vec<Move> {
    Searcher::new(Evaluator::new(mode)).best_turn_sequence(grid, side, max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkers_core::Piece;

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col).unwrap()
    }

    #[test]
    fn decision_graph_follows_continuations() {
        let mut graph = DecisionGraph::default();
        let root = graph.add();
        let child = graph.add();
        let first = Move::capture(pos(6, 1), pos(4, 3), pos(5, 2));
        let second = Move::capture(pos(4, 3), pos(2, 5), pos(3, 4));

        graph.record(child, second, None);
        graph.record(root, first, Some(child));
        assert_eq!(graph.line(root), vec![first, second]);

        // Re-recording the root drops the old continuation
        let quiet = Move::new(pos(5, 0), pos(4, 1));
        graph.record(root, quiet, None);
        assert_eq!(graph.line(root), vec![quiet]);
    }

    #[test]
    fn empty_graph_yields_empty_line() {
        let mut graph = DecisionGraph::default();
        let root = graph.add();
        assert!(graph.line(root).is_empty());
    }

    #[test]
    fn depth_is_clamped() {
        let mut grid = Grid::empty();
        grid.set(pos(5, 0), Some(Piece::man(Color::White)));
        grid.set(pos(0, 7), Some(Piece::man(Color::Black)));

        let mut searcher = Searcher::new(Evaluator::default());
        let line = searcher.best_turn_sequence(&grid, Color::White, 0);
        assert_eq!(line.len(), 1);
        assert_eq!(searcher.stats().depth, 1);

        searcher.best_turn_sequence(&grid, Color::White, 200);
        assert_eq!(searcher.stats().depth, MAX_SEARCH_DEPTH);
    }

    #[test]
    fn nodes_are_counted() {
        let mut searcher = Searcher::new(Evaluator::default());
        searcher.best_turn_sequence(&Grid::starting(), Color::White, 2);
        // Seven replies for each of seven openings, plus their parents
        assert_eq!(searcher.stats().nodes, 7 + 7 * 7);
    }
}
