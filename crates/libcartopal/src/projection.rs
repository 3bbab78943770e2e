use crate::seeds::{Consumer, SeedColor, SeedRegistry};

/// The seeds assigned to `consumer`, ordered by their input position.
pub fn input_colors(registry: &SeedRegistry, consumer: Consumer) -> Vec<SeedColor> {
    let mut assigned: Vec<SeedColor> = registry
        .seeds()
        .into_iter()
        .filter(|seed| seed.input_index(consumer).is_some())
        .collect();
    assigned.sort_by_key(|seed| seed.input_index(consumer));
    assigned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::SeedId;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn orders_by_position_per_consumer() {
        let mut registry = SeedRegistry::with_rng(StdRng::seed_from_u64(1));
        registry.load(&["#000000", "#111111", "#222222"]).unwrap();
        registry.add_to_input_end(Consumer::Point, SeedId(2));
        registry.add_to_input_position(Consumer::Point, SeedId(1), SeedId(0));

        let point: Vec<String> = input_colors(&registry, Consumer::Point)
            .into_iter()
            .map(|seed| seed.color)
            .collect();
        let area: Vec<String> = input_colors(&registry, Consumer::Area)
            .into_iter()
            .map(|seed| seed.color)
            .collect();

        assert_eq!(point, vec!["#111111", "#000000", "#222222"]);
        assert_eq!(area, vec!["#000000"]);
    }

    #[test]
    fn unassigned_registry_projects_to_nothing() {
        let mut registry = SeedRegistry::with_rng(StdRng::seed_from_u64(1));
        registry.remove_from_input(Consumer::Area, SeedId(0));
        assert!(input_colors(&registry, Consumer::Area).is_empty());
    }
}
