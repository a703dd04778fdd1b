use thiserror::Error;

use crate::core::archetypes::Archetype;

/// Failures a workflow can hit after its inputs have been loaded and validated.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No target bands defined for archetype '{archetype}'")]
    MissingBands { archetype: Archetype },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_bands_names_the_archetype() {
        let err = EngineError::MissingBands {
            archetype: Archetype::WhiteBase,
        };
        assert_eq!(
            err.to_string(),
            format!("No target bands defined for archetype '{}'", Archetype::WhiteBase)
        );
    }
}
