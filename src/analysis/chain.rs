//! Chain extraction from the bond graph

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, SeedCount, TypePair};
use crate::simulation::World;

/// A bonded run of agents, linear or circular, read at one seed.
///
/// `strengths[i]` and `ages[i]` describe the bond from link `i` to the next
/// one; the last link of a linear chain repeats its predecessor's values,
/// the last link of a circular chain describes the bond closing the ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub links: Vec<AgentId>,
    pub kinds: Vec<TypePair>,
    pub strengths: Vec<f64>,
    pub ages: Vec<u64>,
    pub circular: bool,
    /// Seed at which the chain was read
    pub seed: SeedCount,
}

/// Per-chain summary figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainStats {
    pub length: usize,
    pub circular: bool,
    pub avg_strength: f64,
    pub max_strength: f64,
    pub min_strength: f64,
    pub avg_age: f64,
    pub max_age: u64,
    pub min_age: u64,
    pub match_type_pct: f64,
    pub type_list: String,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Share (in percent) of consecutive links where the product of one
    /// feeds the next
    pub fn match_type_pct(&self) -> f64 {
        if self.kinds.len() <= 1 {
            return 0.0;
        }
        let matches = self
            .kinds
            .windows(2)
            .filter(|pair| pair[0].feeds(pair[1]))
            .count();
        matches as f64 * 100.0 / (self.kinds.len() - 1) as f64
    }

    /// Dotted type sequence, e.g. `AB.BC.CA`
    pub fn type_list(&self) -> String {
        self.kinds
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn stats(&self) -> ChainStats {
        let n = self.strengths.len().max(1) as f64;
        ChainStats {
            length: self.len(),
            circular: self.circular,
            avg_strength: self.strengths.iter().sum::<f64>() / n,
            max_strength: self.strengths.iter().copied().fold(f64::NAN, f64::max).max(0.0),
            min_strength: self.strengths.iter().copied().fold(f64::NAN, f64::min).max(0.0),
            avg_age: self.ages.iter().sum::<u64>() as f64 / self.ages.len().max(1) as f64,
            max_age: self.ages.iter().copied().max().unwrap_or(0),
            min_age: self.ages.iter().copied().min().unwrap_or(0),
            match_type_pct: self.match_type_pct(),
            type_list: self.type_list(),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.stats();
        write!(
            f,
            "Size:{:3},{}, Strength:{:04.1}({:04.1},{:03.1}), Age:{:8}({:8},{:8}). matchPct:{:04.1} {}",
            s.length,
            s.circular,
            s.avg_strength,
            s.max_strength,
            s.min_strength,
            s.avg_age as u64,
            s.max_age,
            s.min_age,
            s.match_type_pct,
            s.type_list,
        )
    }
}

/// Chains found in one pass, plus the agents left out of all of them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainExtraction {
    /// Longest first
    pub chains: Vec<Chain>,
    pub unclaimed: Vec<AgentId>,
}

/// Recover chains from the bond graph.
///
/// Chain ends (degree 1) are walked first; remaining degree-2 agents are
/// then used as entry points for pure rings. Chains shorter than
/// `min_length` agents are dropped and their agents reported as unclaimed.
pub fn extract_chains(world: &World, min_length: usize) -> ChainExtraction {
    let count = world.agents().len();
    let mut claimed = vec![false; count];
    let mut chains = Vec::new();

    for entry_degree in [1, 2] {
        for index in 0..count {
            let agent = &world.agents()[index];
            if claimed[index] || agent.degree() != entry_degree {
                continue;
            }
            let chain = walk_chain(world, agent.id, &mut claimed);
            if chain.len() >= min_length {
                chains.push(chain);
            }
        }
    }

    chains.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut in_chain = vec![false; count];
    for chain in &chains {
        for link in &chain.links {
            in_chain[link.index()] = true;
        }
    }
    let unclaimed = (0..count)
        .filter(|&i| !in_chain[i])
        .map(|i| AgentId(i as u32))
        .collect();

    ChainExtraction { chains, unclaimed }
}

/// Follow unclaimed neighbors from `start` until the run ends or closes
fn walk_chain(world: &World, start: AgentId, claimed: &mut [bool]) -> Chain {
    let seed = world.seed_count();
    let mut links = vec![start];
    claimed[start.index()] = true;
    let mut current = start;

    loop {
        let next = world.agent(current).and_then(|agent| {
            agent
                .neighbors()
                .find(|n| n.index() < claimed.len() && !claimed[n.index()])
        });
        match next {
            Some(next) => {
                claimed[next.index()] = true;
                links.push(next);
                current = next;
            }
            None => break,
        }
    }

    let circular = links.len() >= 3
        && world
            .agent(current)
            .map_or(false, |agent| agent.has_neighbor(start));

    let mut strengths = Vec::with_capacity(links.len());
    let mut ages = Vec::with_capacity(links.len());
    for (i, &link) in links.iter().enumerate() {
        let toward = match links.get(i + 1) {
            Some(&next) => Some(next),
            None if circular => Some(start),
            None => None,
        };
        let bond = toward.and_then(|t| world.agent(link).and_then(|a| a.bond_to(t)));
        match bond {
            Some(bond) => {
                strengths.push(bond.strength(seed));
                ages.push(bond.age(seed));
            }
            None => {
                strengths.push(strengths.last().copied().unwrap_or(0.0));
                ages.push(ages.last().copied().unwrap_or(0));
            }
        }
    }

    if links.len() > 50 {
        tracing::warn!(length = links.len(), %start, "suspiciously long chain");
    }

    let kinds = links
        .iter()
        .filter_map(|&id| world.agent(id).map(|a| a.kind))
        .collect();

    Chain {
        links,
        kinds,
        strengths,
        ages,
        circular,
        seed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WorldConfig;
    use crate::core::types::ResourceType::{self, A, B, C, D};
    use crate::spatial::Coordinates;

    fn lab() -> World {
        let mut config = WorldConfig::default();
        config.space.size = 16;
        config.population.agents = 0;
        config.population.particles = 0;
        World::empty(config).unwrap()
    }

    fn put(world: &mut World, x: i32, y: i32, input: ResourceType, output: ResourceType) -> AgentId {
        world
            .place_agent(Coordinates::new([x, y]), TypePair::new(input, output))
            .unwrap()
    }

    #[test]
    fn test_linear_chain_from_end() {
        let mut world = lab();
        let a = put(&mut world, 1, 1, A, B);
        let b = put(&mut world, 2, 1, B, C);
        let c = put(&mut world, 3, 1, C, D);
        let loner = put(&mut world, 9, 9, D, A);
        world.bond_agents(b, c);
        world.bond_agents(a, b);

        let found = extract_chains(&world, 3);
        assert_eq!(found.chains.len(), 1);
        let chain = &found.chains[0];
        assert!(!chain.circular);
        assert_eq!(chain.links, vec![a, b, c]);
        assert_eq!(chain.type_list(), "AB.BC.CD");
        assert_eq!(chain.match_type_pct(), 100.0);
        assert_eq!(chain.strengths.len(), 3);
        assert_eq!(chain.strengths[2], chain.strengths[1]);
        assert_eq!(found.unclaimed, vec![loner]);
    }

    #[test]
    fn test_ring_detected_from_degree_two_entry() {
        let mut world = lab();
        let a = put(&mut world, 1, 1, A, B);
        let b = put(&mut world, 2, 1, B, C);
        let c = put(&mut world, 2, 2, C, A);
        let d = put(&mut world, 1, 2, A, D);
        world.bond_agents(a, b);
        world.bond_agents(b, c);
        world.bond_agents(c, d);
        world.bond_agents(d, a);

        let found = extract_chains(&world, 3);
        assert_eq!(found.chains.len(), 1);
        let ring = &found.chains[0];
        assert!(ring.circular);
        assert_eq!(ring.len(), 4);
        assert!(found.unclaimed.is_empty());
        // AB.BC.CA.AD feeds at every step
        assert!((ring.match_type_pct() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_chains_discarded_and_unclaimed() {
        let mut world = lab();
        let a = put(&mut world, 1, 1, A, B);
        let b = put(&mut world, 2, 1, B, A);
        world.bond_agents(a, b);

        let found = extract_chains(&world, 3);
        assert!(found.chains.is_empty());
        assert_eq!(found.unclaimed, vec![a, b]);

        let found = extract_chains(&world, 2);
        assert_eq!(found.chains.len(), 1);
        assert!(!found.chains[0].circular);
    }

    #[test]
    fn test_sorted_longest_first() {
        let mut world = lab();
        let short: Vec<AgentId> = (0..3).map(|x| put(&mut world, x, 0, A, B)).collect();
        let long: Vec<AgentId> = (0..5).map(|x| put(&mut world, x, 5, B, C)).collect();
        for pair in short.windows(2).chain(long.windows(2)) {
            world.bond_agents(pair[0], pair[1]);
        }
        let found = extract_chains(&world, 3);
        let lengths: Vec<usize> = found.chains.iter().map(|c| c.len()).collect();
        assert_eq!(lengths, vec![5, 3]);
    }

    #[test]
    fn test_strengths_follow_links() {
        let mut world = lab();
        let a = put(&mut world, 1, 1, A, B);
        let b = put(&mut world, 2, 1, B, C);
        let c = put(&mut world, 3, 1, C, A);
        world.bond_agents(a, b);
        world.bond_agents(b, c);
        world.reinforce_bond(b, c);
        world.reinforce_bond(b, c);

        let chain = &extract_chains(&world, 3).chains[0];
        assert_eq!(chain.links[0], a);
        assert!((chain.strengths[0] - 0.5).abs() < 1e-12);
        assert!((chain.strengths[1] - 1.5).abs() < 1e-12);
        let stats = chain.stats();
        assert!((stats.max_strength - 1.5).abs() < 1e-12);
        assert!((stats.min_strength - 0.5).abs() < 1e-12);
        assert_eq!(stats.max_age, 0);
    }

    #[test]
    fn test_match_pct_partial() {
        let chain = Chain {
            links: vec![AgentId(0), AgentId(1), AgentId(2)],
            kinds: vec![
                TypePair::new(A, B),
                TypePair::new(C, D),
                TypePair::new(D, A),
            ],
            strengths: vec![0.5; 3],
            ages: vec![1; 3],
            circular: false,
            seed: 1,
        };
        assert!((chain.match_type_pct() - 50.0).abs() < 1e-12);
        assert!(chain.to_string().starts_with("Size:  3,false"));
    }
}
