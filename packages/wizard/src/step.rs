//! Wizard steps and their transition table.

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Step {
    Loading,
    SelectLocality,
    SelectBlock,
    SpatialContext,
    Comparison,
    Security,
    Report,
}

impl Step {
    /// All steps in wizard order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Loading,
            Self::SelectLocality,
            Self::SelectBlock,
            Self::SpatialContext,
            Self::Comparison,
            Self::Security,
            Self::Report,
        ]
    }

    /// Steps reachable from `self` in one transition.
    #[must_use]
    pub const fn targets(self) -> &'static [Self] {
        match self {
            Self::Loading => &[Self::SelectLocality],
            Self::SelectLocality => &[Self::SelectBlock, Self::Loading],
            Self::SelectBlock => &[Self::SpatialContext, Self::SelectLocality, Self::Loading],
            Self::SpatialContext => &[Self::Comparison, Self::SelectBlock, Self::Loading],
            Self::Comparison => &[Self::Security, Self::SpatialContext],
            Self::Security => &[Self::Report, Self::Comparison, Self::Loading],
            Self::Report => &[Self::Security, Self::Loading],
        }
    }

    #[must_use]
    pub fn can_go_to(self, target: Self) -> bool {
        self.targets().contains(&target)
    }

    /// The step after `self` in wizard order, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Loading => Some(Self::SelectLocality),
            Self::SelectLocality => Some(Self::SelectBlock),
            Self::SelectBlock => Some(Self::SpatialContext),
            Self::SpatialContext => Some(Self::Comparison),
            Self::Comparison => Some(Self::Security),
            Self::Security => Some(Self::Report),
            Self::Report => None,
        }
    }

    /// Spanish heading shown for the step.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Loading => "Cargando datos",
            Self::SelectLocality => "Selección de localidad",
            Self::SelectBlock => "Selección de manzana",
            Self::SpatialContext => "Contexto espacial",
            Self::Comparison => "Análisis comparativo",
            Self::Security => "Contexto de seguridad",
            Self::Report => "Informe",
        }
    }
}
