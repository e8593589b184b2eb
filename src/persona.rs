//! The persona catalog: named assistant identities with their personality
//! prompts and synthesis parameters.
//!
//! Three personas ship built in, compiled from `personas/*.md`:
//!
//! - **Jarvis** — formal, British, proactive.
//! - **Friday** — efficient secretary.
//! - **Edith** — casual and supportive.
//!
//! Personas are immutable: the catalog is constructed once at startup and
//! only ever read after that. Selecting a persona never touches conversation
//! histories; it only changes which history subsequent turns use.

use serde::{Deserialize, Serialize};

/// The Jarvis personality prompt.
pub const JARVIS_PROMPT: &str = include_str!("../personas/jarvis.md");

/// The Friday personality prompt.
pub const FRIDAY_PROMPT: &str = include_str!("../personas/friday.md");

/// The Edith personality prompt.
pub const EDITH_PROMPT: &str = include_str!("../personas/edith.md");

/// Identifier for a built-in persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaId {
    /// Just A Rather Very Intelligent System.
    #[default]
    Jarvis,
    /// Female Replacement Intelligent Digital Assistant Youth.
    Friday,
    /// Even Dead, I'm The Hero.
    Edith,
}

impl PersonaId {
    /// All built-in persona ids, in catalog order.
    pub const ALL: [PersonaId; 3] = [PersonaId::Jarvis, PersonaId::Friday, PersonaId::Edith];

    /// Parse a persona id from a user-supplied name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "jarvis" => Some(Self::Jarvis),
            "friday" => Some(Self::Friday),
            "edith" => Some(Self::Edith),
            _ => None,
        }
    }
}

impl std::fmt::Display for PersonaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jarvis => write!(f, "jarvis"),
            Self::Friday => write!(f, "friday"),
            Self::Edith => write!(f, "edith"),
        }
    }
}

/// An immutable persona definition.
#[derive(Debug, Clone, Copy)]
pub struct Persona {
    /// Stable identifier.
    pub id: PersonaId,
    /// Human-facing name.
    pub display_name: &'static str,
    /// Expansion of the acronym, shown by the presentation layer.
    pub subtitle: &'static str,
    /// System prompt establishing the persona's character.
    pub system_prompt: &'static str,
    /// Speech synthesis rate (1.0 = normal).
    pub synthesis_rate: f32,
    /// Speech synthesis pitch (1.0 = normal).
    pub synthesis_pitch: f32,
}

/// The set of personas available to the orchestrator.
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    personas: Vec<Persona>,
}

impl PersonaCatalog {
    /// Catalog of the built-in personas.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            personas: vec![
                Persona {
                    id: PersonaId::Jarvis,
                    display_name: "Jarvis",
                    subtitle: "Just A Rather Very Intelligent System",
                    system_prompt: JARVIS_PROMPT,
                    synthesis_rate: 0.95,
                    synthesis_pitch: 0.8,
                },
                Persona {
                    id: PersonaId::Friday,
                    display_name: "Friday",
                    subtitle: "Female Replacement Intelligent Digital Assistant Youth",
                    system_prompt: FRIDAY_PROMPT,
                    synthesis_rate: 1.0,
                    synthesis_pitch: 1.3,
                },
                Persona {
                    id: PersonaId::Edith,
                    display_name: "Edith",
                    subtitle: "Even Dead, I'm The Hero",
                    system_prompt: EDITH_PROMPT,
                    synthesis_rate: 0.9,
                    synthesis_pitch: 1.1,
                },
            ],
        }
    }

    /// Look up a persona by id.
    ///
    /// Every `PersonaId` has a catalog entry, so this never fails.
    #[must_use]
    pub fn get(&self, id: PersonaId) -> &Persona {
        self.personas
            .iter()
            .find(|p| p.id == id)
            .unwrap_or(&self.personas[0])
    }

    /// All personas, in catalog order.
    #[must_use]
    pub fn all(&self) -> &[Persona] {
        &self.personas
    }
}

impl Default for PersonaCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
