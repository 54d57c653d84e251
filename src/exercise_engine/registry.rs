use std::collections::BTreeMap;
use std::fmt;

use crate::exercise_engine::{
    builder::TopicInfo,
    context::GenerationContext,
    error::{EngineError, Result},
    models::Exercise,
    topics::{arithmetic, generic, number_theory, probability},
};

pub type GeneratorFn = fn(&mut GenerationContext<'_>) -> Result<Exercise>;

#[derive(Clone, Copy)]
pub struct TopicEntry {
    pub info: TopicInfo,
    pub generator: GeneratorFn,
}

impl fmt::Debug for TopicEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopicEntry").field("info", &self.info).finish_non_exhaustive()
    }
}

/// Topic ID to generator table.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    topics: BTreeMap<u32, TopicEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Every bespoke topic plus the 56..=85 generic block.
    pub fn standard() -> Self {
        let mut registry = Registry::new();
        registry
            .register(arithmetic::BASIC_OPERATIONS,           arithmetic::generate_basic_operations)
            .register(number_theory::PRIMES,                  number_theory::generate_primes)
            .register(number_theory::MULTIPLES_AND_DIVISORS,  number_theory::generate_multiples_and_divisors)
            .register(arithmetic::POWERS,                     arithmetic::generate_powers)
            .register(arithmetic::PERCENTAGES,                arithmetic::generate_percentages)
            .register(probability::SIMPLE_PROBABILITY,        probability::generate_simple_probability);
        for (info, _) in generic::GENERIC_TOPICS {
            registry.register(info, generic::generate_generic);
        }
        registry
    }

    /// Add or replace the generator for `info.id`.
    pub fn register(&mut self, info: TopicInfo, generator: GeneratorFn) -> &mut Self {
        self.topics.insert(info.id, TopicEntry { info, generator });
        self
    }

    pub fn get(&self, topic_id: u32) -> Result<&TopicEntry> {
        self.topics.get(&topic_id).ok_or(EngineError::UnknownTopic { topic_id })
    }

    pub fn contains(&self, topic_id: u32) -> bool {
        self.topics.contains_key(&topic_id)
    }

    /// Registered IDs in ascending order.
    pub fn topic_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.topics.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_lists_bespoke_and_generic_topics() {
        let registry = Registry::standard();
        let ids: Vec<u32> = registry.topic_ids().collect();
        assert_eq!(&ids[..6], &[1, 3, 5, 8, 10, 14]);
        assert_eq!(registry.len(), 36);
        assert_eq!(registry.get(66).unwrap().info.title, "Matrices");
    }

    #[test]
    fn unmapped_topic_is_an_error() {
        let registry = Registry::standard();
        assert!(!registry.contains(2));
        assert!(matches!(registry.get(2), Err(EngineError::UnknownTopic { topic_id: 2 })));
    }
}
