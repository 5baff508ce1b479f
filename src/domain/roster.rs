//! Roster of IP entities under evaluation.
//!
//! A roster is caller-owned input: the HTTP request body or an operator's
//! in-memory list. The engine validates it, borrows it for one call, and
//! never stores it.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::foundation::EngineError;

/// A named IP entity with its indicator vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub group: String,
    pub indicators: Vec<f64>,
}

impl Entity {
    pub fn new(name: impl Into<String>, group: impl Into<String>, indicators: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            indicators,
        }
    }
}

/// A validated set of entities sharing one indicator dimensionality.
#[derive(Debug, Clone)]
pub struct Roster {
    entities: Vec<Entity>,
    dimensionality: usize,
}

impl Roster {
    /// Validates that every entity carries the same indicator vector length.
    ///
    /// The dimensionality of the roster is taken from the first entity.
    pub fn new(entities: Vec<Entity>) -> Result<Self, EngineError> {
        let first = entities
            .first()
            .ok_or_else(|| EngineError::dimension("roster must contain at least one entity"))?;
        let dim = first.indicators.len();
        if dim == 0 {
            return Err(EngineError::dimension(format!(
                "entity '{}' has an empty indicator vector",
                first.name
            )));
        }
        for entity in &entities {
            if entity.indicators.len() != dim {
                return Err(EngineError::dimension(format!(
                    "entity '{}' has {} indicators, expected {}",
                    entity.name,
                    entity.indicators.len(),
                    dim
                )));
            }
        }
        Ok(Self {
            entities,
            dimensionality: dim,
        })
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Indicator vector length shared by every entity.
    pub fn dimensionality(&self) -> usize {
        self.dimensionality
    }

    pub fn names(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.name.as_str()).collect()
    }

    /// Stacks all indicator vectors into an `n x dim` matrix.
    pub fn indicator_matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::zeros((self.entities.len(), self.dimensionality));
        for (i, entity) in self.entities.iter().enumerate() {
            for (j, &value) in entity.indicators.iter().enumerate() {
                matrix[[i, j]] = value;
            }
        }
        matrix
    }
}

/// Feature names resolved against a roster's dimensionality.
///
/// Names are labeling metadata only; they never enter computation. When the
/// caller supplies no names, or a list of the wrong length, positional
/// placeholders are substituted and the substitution is flagged so the caller
/// can tell labeled output from placeholder output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureNames {
    pub names: Vec<String>,
    pub substituted: bool,
}

impl FeatureNames {
    pub fn resolve(supplied: Option<Vec<String>>, dimensionality: usize) -> Self {
        match supplied {
            Some(names) if names.len() == dimensionality => Self {
                names,
                substituted: false,
            },
            _ => Self {
                names: (1..=dimensionality)
                    .map(|i| format!("indicator {}", i))
                    .collect(),
                substituted: true,
            },
        }
    }
}
