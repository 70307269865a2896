//! # Generator Factory
//!
//! Maps a [`GenerationMethod`] to its concrete generator.
//!
//! The method enum is closed, so selection is total; the fatal
//! unknown-method configuration error lives at the string boundary in
//! [`GenerationMethod::from_str`](std::str::FromStr), where untrusted
//! names actually enter the system.

use crate::{CaveGenerator, DungeonGenerator, GenerationMethod, MapGenerator, TownGenerator};

/// Creates the generator for the configured method.
///
/// # Examples
///
/// ```
/// use delve::{create_generator, GenerationMethod};
///
/// let generator = create_generator(GenerationMethod::Town);
/// assert_eq!(generator.kind(), "TownGenerator");
/// ```
pub fn create_generator(method: GenerationMethod) -> Box<dyn MapGenerator> {
    match method {
        GenerationMethod::RoomsAndCorridors => Box::new(DungeonGenerator::new()),
        GenerationMethod::CellularAutomata => Box::new(CaveGenerator::new()),
        GenerationMethod::Town => Box::new(TownGenerator::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils;
    use crate::GenerationConfig;

    #[test]
    fn test_factory_selects_matching_generator() {
        assert_eq!(
            create_generator(GenerationMethod::RoomsAndCorridors).kind(),
            "DungeonGenerator"
        );
        assert_eq!(
            create_generator(GenerationMethod::CellularAutomata).kind(),
            "CaveGenerator"
        );
        assert_eq!(create_generator(GenerationMethod::Town).kind(), "TownGenerator");
    }

    #[test]
    fn test_factory_generator_is_usable() {
        let config = GenerationConfig::for_testing(5);
        let generator = create_generator(config.method);
        let mut rng = utils::create_rng(&config);
        let map = generator.generate(&config, &mut rng);
        assert_eq!(map.grid.width(), config.width);
        assert_eq!(map.grid.height(), config.height);
    }
}
