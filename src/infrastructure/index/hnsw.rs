//! Hierarchical navigable small-world graph over index positions
//!
//! The graph stores only topology. Vectors live in the owning index and are passed in
//! by slice, addressed by insertion position. Scores are dot products of prepared
//! vectors, so higher is closer for both supported metrics.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use crate::domain::embedding::dot_product;

const MAX_LEVEL: u8 = 16;

#[derive(Debug, Clone, Copy)]
struct Scored {
    score: f32,
    id: usize,
}

impl PartialEq for Scored {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scored {}

impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scored {
    // Equal scores prefer the earlier insert
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.id.cmp(&self.id))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct HnswGraph {
    m: usize,
    m_max0: usize,
    ef_construction: usize,
    level_mult: f64,
    /// node -> layer -> neighbour ids
    neighbors: Vec<Vec<Vec<usize>>>,
    entry_point: Option<usize>,
    level_max: u8,
    rng_state: u64,
}

impl HnswGraph {
    pub fn new(m: usize, ef_construction: usize) -> Self {
        let m = m.max(2);
        Self {
            m,
            m_max0: m * 2,
            ef_construction: ef_construction.max(m),
            level_mult: 1.0 / (m as f64).ln(),
            neighbors: Vec::new(),
            entry_point: None,
            level_max: 0,
            rng_state: 42,
        }
    }

    /// Build a graph over every vector, in order
    pub fn build(m: usize, ef_construction: usize, vectors: &[Vec<f32>]) -> Self {
        let mut graph = Self::new(m, ef_construction);
        for _ in 0..vectors.len() {
            graph.insert(vectors);
        }
        graph
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Link the next position (`self.len()`) into the graph
    pub fn insert(&mut self, vectors: &[Vec<f32>]) {
        let id = self.neighbors.len();
        let level = self.select_level();
        self.neighbors.push(vec![Vec::new(); level as usize + 1]);

        let Some(mut entry) = self.entry_point else {
            self.entry_point = Some(id);
            self.level_max = level;
            return;
        };

        let target = &vectors[id];

        for layer in ((level + 1)..=self.level_max).rev() {
            entry = self.greedy_closest(entry, target, layer, vectors);
        }

        for layer in (0..=level.min(self.level_max)).rev() {
            let found = self.search_layer(entry, target, self.ef_construction, layer, vectors);
            let limit = if layer == 0 { self.m_max0 } else { self.m };

            let selected: Vec<usize> = found.iter().take(self.m).map(|s| s.id).collect();
            for &neighbor in &selected {
                self.connect(id, neighbor, layer);
                self.connect(neighbor, id, layer);
                self.prune(neighbor, layer, limit, vectors);
            }

            if let Some(best) = found.first() {
                entry = best.id;
            }
        }

        if level > self.level_max {
            self.entry_point = Some(id);
            self.level_max = level;
        }
    }

    /// Approximate nearest neighbours of `query`, best first
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        ef: usize,
        vectors: &[Vec<f32>],
    ) -> Vec<(usize, f32)> {
        let Some(mut entry) = self.entry_point else {
            return Vec::new();
        };

        for layer in (1..=self.level_max).rev() {
            entry = self.greedy_closest(entry, query, layer, vectors);
        }

        self.search_layer(entry, query, ef.max(k), 0, vectors)
            .into_iter()
            .take(k)
            .map(|s| (s.id, s.score))
            .collect()
    }

    fn select_level(&mut self) -> u8 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let uniform = ((self.rng_state >> 40) as f64 / (1u64 << 24) as f64).max(1e-9);
        let level = (-uniform.ln() * self.level_mult).floor();
        (level as u8).min(MAX_LEVEL)
    }

    fn greedy_closest(&self, start: usize, target: &[f32], layer: u8, vectors: &[Vec<f32>]) -> usize {
        let mut current = start;
        let mut best = dot_product(&vectors[current], target);

        loop {
            let mut changed = false;
            for &neighbor in self.layer(current, layer) {
                let score = dot_product(&vectors[neighbor], target);
                if score > best {
                    best = score;
                    current = neighbor;
                    changed = true;
                }
            }
            if !changed {
                return current;
            }
        }
    }

    /// Beam search within one layer; results sorted best first
    fn search_layer(
        &self,
        entry: usize,
        target: &[f32],
        ef: usize,
        layer: u8,
        vectors: &[Vec<f32>],
    ) -> Vec<Scored> {
        let mut visited = HashSet::new();
        let mut candidates: BinaryHeap<Scored> = BinaryHeap::new();
        let mut results: BinaryHeap<Reverse<Scored>> = BinaryHeap::new();

        let start = Scored {
            score: dot_product(&vectors[entry], target),
            id: entry,
        };
        visited.insert(entry);
        candidates.push(start);
        results.push(Reverse(start));

        while let Some(candidate) = candidates.pop() {
            if let Some(Reverse(worst)) = results.peek() {
                if results.len() >= ef && candidate < *worst {
                    break;
                }
            }

            for &neighbor in self.layer(candidate.id, layer) {
                if !visited.insert(neighbor) {
                    continue;
                }

                let scored = Scored {
                    score: dot_product(&vectors[neighbor], target),
                    id: neighbor,
                };
                let admit = results.len() < ef
                    || results.peek().is_some_and(|Reverse(worst)| scored > *worst);

                if admit {
                    candidates.push(scored);
                    results.push(Reverse(scored));
                    if results.len() > ef {
                        results.pop();
                    }
                }
            }
        }

        let mut found: Vec<Scored> = results.into_iter().map(|Reverse(s)| s).collect();
        found.sort_by(|a, b| b.cmp(a));
        found
    }

    fn layer(&self, id: usize, layer: u8) -> &[usize] {
        self.neighbors[id]
            .get(layer as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn connect(&mut self, from: usize, to: usize, layer: u8) {
        if let Some(list) = self.neighbors[from].get_mut(layer as usize) {
            if !list.contains(&to) {
                list.push(to);
            }
        }
    }

    /// Keep the `limit` closest neighbours of `id` on `layer`
    fn prune(&mut self, id: usize, layer: u8, limit: usize, vectors: &[Vec<f32>]) {
        let current = self.layer(id, layer);
        if current.len() <= limit {
            return;
        }

        let origin = &vectors[id];
        let mut scored: Vec<Scored> = current
            .iter()
            .map(|&n| Scored {
                score: dot_product(&vectors[n], origin),
                id: n,
            })
            .collect();
        scored.sort_by(|a, b| b.cmp(a));
        scored.truncate(limit);

        self.neighbors[id][layer as usize] = scored.into_iter().map(|s| s.id).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::normalize;

    fn pseudo_random_vectors(n: usize, dims: usize, seed: u64) -> Vec<Vec<f32>> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                let mut v: Vec<f32> = (0..dims)
                    .map(|_| {
                        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                        ((state >> 33) as f32 / (1u64 << 31) as f32) - 0.5
                    })
                    .collect();
                normalize(&mut v);
                v
            })
            .collect()
    }

    fn exact_top(query: &[f32], vectors: &[Vec<f32>], k: usize) -> Vec<usize> {
        let mut scored: Vec<Scored> = vectors
            .iter()
            .enumerate()
            .map(|(id, v)| Scored { score: dot_product(v, query), id })
            .collect();
        scored.sort_by(|a, b| b.cmp(a));
        scored.into_iter().take(k).map(|s| s.id).collect()
    }

    #[test]
    fn test_level_distribution() {
        let mut graph = HnswGraph::new(16, 100);
        let mut levels = [0u32; MAX_LEVEL as usize + 1];

        for _ in 0..10_000 {
            levels[graph.select_level() as usize] += 1;
        }

        assert!(levels[0] > 8_000);
        assert!(levels[0] > levels[1]);
    }

    #[test]
    fn test_self_query_finds_itself() {
        let vectors = pseudo_random_vectors(400, 16, 7);
        let graph = HnswGraph::build(16, 200, &vectors);

        let hits = vectors
            .iter()
            .enumerate()
            .filter(|(id, v)| graph.search(v, 1, 64, &vectors).first().map(|h| h.0) == Some(*id))
            .count();

        assert!(hits >= 390, "self recall {}/400", hits);
    }

    #[test]
    fn test_recall_against_exact() {
        let vectors = pseudo_random_vectors(500, 12, 99);
        let queries = pseudo_random_vectors(20, 12, 1234);
        let graph = HnswGraph::build(16, 200, &vectors);

        let mut overlap = 0;
        for query in &queries {
            let exact = exact_top(query, &vectors, 10);
            let approx: Vec<usize> = graph.search(query, 10, 64, &vectors).iter().map(|h| h.0).collect();
            overlap += approx.iter().filter(|id| exact.contains(id)).count();
        }

        assert!(overlap >= 180, "recall {}/200", overlap);
    }

    #[test]
    fn test_results_sorted_and_bounded() {
        let vectors = pseudo_random_vectors(100, 8, 3);
        let graph = HnswGraph::build(8, 50, &vectors);

        let results = graph.search(&vectors[5], 10, 32, &vectors);

        assert_eq!(results.len(), 10);
        assert!(results.windows(2).all(|w| w[0].1 >= w[1].1));
        assert_eq!(graph.len(), 100);
    }

    #[test]
    fn test_empty_graph() {
        let graph = HnswGraph::new(16, 200);
        assert!(graph.search(&[1.0, 0.0], 5, 10, &[]).is_empty());
    }
}
