//! Semantic region categories and their fixed presentation styles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::color::Color;

/// Presentation attributes bound to a region type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStyle {
    /// Stroke and label color
    pub color: Color,
    /// Fill color
    pub fill_color: Color,
    /// Fill and stroke opacity (0.0-1.0)
    pub opacity: f32,
}

impl RegionStyle {
    const fn solid(packed: u32, opacity: f32) -> Self {
        let color = Color::from_u32(packed);
        Self {
            color,
            fill_color: color,
            opacity,
        }
    }
}

/// Kind of answer-sheet content a region marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionType {
    #[default]
    StudentInfo,
    StudentName,
    StudentId,
    QuestionArea,
    AnswerArea,
    MultipleChoice,
    ShortAnswer,
    EssayArea,
    MathArea,
    Signature,
}

impl RegionType {
    /// Get all region types in palette order.
    pub fn all() -> &'static [RegionType] {
        &[
            RegionType::StudentInfo,
            RegionType::StudentName,
            RegionType::StudentId,
            RegionType::QuestionArea,
            RegionType::AnswerArea,
            RegionType::MultipleChoice,
            RegionType::ShortAnswer,
            RegionType::EssayArea,
            RegionType::MathArea,
            RegionType::Signature,
        ]
    }

    /// Identifier used in ids and serialized configuration.
    pub fn key(&self) -> &'static str {
        match self {
            RegionType::StudentInfo => "student_info",
            RegionType::StudentName => "student_name",
            RegionType::StudentId => "student_id",
            RegionType::QuestionArea => "question_area",
            RegionType::AnswerArea => "answer_area",
            RegionType::MultipleChoice => "multiple_choice",
            RegionType::ShortAnswer => "short_answer",
            RegionType::EssayArea => "essay_area",
            RegionType::MathArea => "math_area",
            RegionType::Signature => "signature",
        }
    }

    /// Get the display name for this type.
    pub fn label(&self) -> &'static str {
        match self {
            RegionType::StudentInfo => "Student Info",
            RegionType::StudentName => "Student Name",
            RegionType::StudentId => "Student ID",
            RegionType::QuestionArea => "Question Area",
            RegionType::AnswerArea => "Answer Area",
            RegionType::MultipleChoice => "Multiple Choice",
            RegionType::ShortAnswer => "Short Answer",
            RegionType::EssayArea => "Essay Area",
            RegionType::MathArea => "Math Area",
            RegionType::Signature => "Signature",
        }
    }

    /// Prefix for auto-generated region names.
    pub fn name_prefix(&self) -> &'static str {
        match self {
            RegionType::StudentInfo => "info",
            RegionType::StudentName => "name",
            RegionType::StudentId => "id",
            RegionType::QuestionArea => "q",
            RegionType::AnswerArea => "ans",
            RegionType::MultipleChoice => "mc",
            RegionType::ShortAnswer => "short",
            RegionType::EssayArea => "essay",
            RegionType::MathArea => "math",
            RegionType::Signature => "sign",
        }
    }

    pub fn style(&self) -> RegionStyle {
        match self {
            RegionType::StudentInfo => RegionStyle::solid(0x3B82F6, 0.2),
            RegionType::StudentName => RegionStyle::solid(0x10B981, 0.2),
            RegionType::StudentId => RegionStyle::solid(0x8B5CF6, 0.2),
            RegionType::QuestionArea => RegionStyle::solid(0xF59E0B, 0.15),
            RegionType::AnswerArea => RegionStyle::solid(0xEF4444, 0.2),
            RegionType::MultipleChoice => RegionStyle::solid(0x06B6D4, 0.25),
            RegionType::ShortAnswer => RegionStyle::solid(0x84CC16, 0.2),
            RegionType::EssayArea => RegionStyle::solid(0xF97316, 0.15),
            RegionType::MathArea => RegionStyle::solid(0xEC4899, 0.2),
            RegionType::Signature => RegionStyle::solid(0x6B7280, 0.2),
        }
    }

    /// Only multiple choice regions carry options.
    pub fn has_options(&self) -> bool {
        matches!(self, RegionType::MultipleChoice)
    }
}

impl fmt::Display for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when parsing an unknown region type key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown region type: {0}")]
pub struct UnknownRegionType(pub String);

impl FromStr for RegionType {
    type Err = UnknownRegionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegionType::all()
            .iter()
            .copied()
            .find(|t| t.key() == s)
            .ok_or_else(|| UnknownRegionType(s.to_string()))
    }
}
