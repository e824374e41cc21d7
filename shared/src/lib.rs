use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// The four blood cell categories the classifier distinguishes, in model
/// output order. The discriminant order is the class index contract with the
/// model artifact; do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
pub enum CellClass {
    Eosinophil,
    Lymphocyte,
    Monocyte,
    Neutrophil,
}

impl CellClass {
    pub const ALL: [CellClass; 4] = [
        CellClass::Eosinophil,
        CellClass::Lymphocyte,
        CellClass::Monocyte,
        CellClass::Neutrophil,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            CellClass::Eosinophil => "Eosinophil",
            CellClass::Lymphocyte => "Lymphocyte",
            CellClass::Monocyte => "Monocyte",
            CellClass::Neutrophil => "Neutrophil",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CellClass::Eosinophil => {
                "A type of white blood cell involved in allergic reactions and parasitic infections."
            }
            CellClass::Lymphocyte => {
                "A type of white blood cell that plays a key role in adaptive immunity."
            }
            CellClass::Monocyte => {
                "Large white blood cells that differentiate into macrophages and dendritic cells."
            }
            CellClass::Neutrophil => {
                "The most abundant type of white blood cell, first responders to infection."
            }
        }
    }
}

/// Coarse display bucket for a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Boundaries are inclusive: exactly 0.8 is High, exactly 0.6 is Medium.
    pub fn from_score(score: f32) -> Self {
        if score >= 0.8 {
            ConfidenceLevel::High
        } else if score >= 0.6 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ConfidenceLevel::High => "green",
            ConfidenceLevel::Medium => "yellow",
            ConfidenceLevel::Low => "red",
        }
    }
}

/// The winning class of one inference pass together with its probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub class: CellClass,
    pub confidence: f32,
}

impl Classification {
    /// Selects the highest-probability class. Ties resolve to the lowest
    /// index (first occurrence), which the strictly-greater comparison
    /// guarantees. Returns `None` for an empty vector or when the winning
    /// index is not a known class.
    pub fn from_probabilities(probabilities: &[f32]) -> Option<Self> {
        let mut best_index = 0;
        let mut best_value = *probabilities.first()?;
        for (index, &value) in probabilities.iter().enumerate().skip(1) {
            if value > best_value {
                best_index = index;
                best_value = value;
            }
        }
        let class = CellClass::from_index(best_index)?;
        Some(Self {
            class,
            confidence: best_value,
        })
    }

    pub fn level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }

    /// Confidence as a percentage rounded to one decimal place.
    pub fn percent(&self) -> f32 {
        (self.confidence * 1000.0).round() / 10.0
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct ClassifyResponse {
    pub predictions: Vec<f32>,
    pub class_labels: Vec<String>,
    pub prediction: String,
    pub confidence: f32,
    pub confidence_level: String,
    pub confidence_color: String,
    pub description: String,
}

impl ClassifyResponse {
    pub fn new(classification: Classification, predictions: Vec<f32>) -> Self {
        let level = classification.level();
        Self {
            predictions,
            class_labels: CellClass::iter()
                .map(|class| class.label().to_string())
                .collect(),
            prediction: classification.class.label().to_string(),
            confidence: classification.percent(),
            confidence_level: level.to_string(),
            confidence_color: level.color().to_string(),
            description: classification.class.description().to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct ClassInfo {
    pub label: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct ModelCard {
    pub available: bool,
    pub input_width: u32,
    pub input_height: u32,
    pub classes: Vec<ClassInfo>,
}
