use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

const INFO_JSON: &str = include_str!("../../assets/questions/info.json");
const PROBA_JSON: &str = include_str!("../../assets/questions/proba.json");
const MATHGEN_JSON: &str = include_str!("../../assets/questions/mathgen.json");

/// A single multiple-choice question. Immutable once loaded; `correct_index`
/// always points into `options`, including after option reordering.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub time_limit_secs: u32,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }
}

/// Closed set of question catalogs. Adding a category means adding a JSON
/// asset and a variant here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Info,
    Proba,
    MathGen,
}

pub const ALL_CATEGORIES: [Category; 3] = [Category::Info, Category::Proba, Category::MathGen];

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Info => "info",
            Category::Proba => "proba",
            Category::MathGen => "mathgen",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "info" => Some(Category::Info),
            "proba" => Some(Category::Proba),
            "mathgen" => Some(Category::MathGen),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Info => "Informatique",
            Category::Proba => "Probabilités & Stats",
            Category::MathGen => "Math Général",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Info => "💻",
            Category::Proba => "📊",
            Category::MathGen => "📐",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Category::Info => "Architecture, algorithmes, binaire...",
            Category::Proba => "Lois, espérance, probabilités...",
            Category::MathGen => "Groupes, matrices, analyse...",
        }
    }

    fn raw_json(self) -> &'static str {
        match self {
            Category::Info => INFO_JSON,
            Category::Proba => PROBA_JSON,
            Category::MathGen => MATHGEN_JSON,
        }
    }
}

/// Load and validate the catalog for one category. Returns owned questions so
/// callers can shuffle freely without touching the bank.
pub fn load_catalog(category: Category) -> Result<Vec<Question>> {
    let questions: Vec<Question> = serde_json::from_str(category.raw_json())
        .with_context(|| format!("malformed question catalog for '{}'", category.as_str()))?;
    ensure!(
        !questions.is_empty(),
        "empty question catalog for '{}'",
        category.as_str()
    );
    for q in &questions {
        ensure!(
            q.options.len() >= 2,
            "question {} in '{}' has fewer than 2 options",
            q.id,
            category.as_str()
        );
        ensure!(
            q.correct_index < q.options.len(),
            "question {} in '{}' has out-of-range correct_index",
            q.id,
            category.as_str()
        );
        ensure!(
            q.time_limit_secs > 0,
            "question {} in '{}' has a zero time limit",
            q.id,
            category.as_str()
        );
    }
    Ok(questions)
}
