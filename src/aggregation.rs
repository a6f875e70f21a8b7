// feedback-report-service/src/aggregation.rs
//
// Pure shaping of the rows the store returns: bucket percentages, chart
// series, the suggestions grouping and the spreadsheet matrix.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::models::{
    Question, QuestionType, RatingRow, RawFeedback, SubjectType, SuggestionGroup, TextAnswerRow,
};

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of responses per rating bucket, 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    #[serde(rename = "Excellent")]
    pub excellent: f64,
    #[serde(rename = "VeryGood")]
    pub very_good: f64,
    #[serde(rename = "Good")]
    pub good: f64,
    #[serde(rename = "Satisfactory")]
    pub satisfactory: f64,
    #[serde(rename = "NotSatisfactory")]
    pub not_satisfactory: f64,
}

impl Distribution {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.excellent,
            self.very_good,
            self.good,
            self.satisfactory,
            self.not_satisfactory,
        ]
    }
}

impl RatingRow {
    pub fn bucket_sum(&self) -> i64 {
        self.excellent + self.very_good + self.good + self.satisfactory + self.not_satisfactory
    }

    pub fn distribution(&self) -> Distribution {
        let pct = |count: i64| {
            if self.total_responses == 0 {
                0.0
            } else {
                round2(count as f64 / self.total_responses as f64 * 100.0)
            }
        };

        Distribution {
            excellent: pct(self.excellent),
            very_good: pct(self.very_good),
            good: pct(self.good),
            satisfactory: pct(self.satisfactory),
            not_satisfactory: pct(self.not_satisfactory),
        }
    }

    /// The six cells printed in one ratings-table row: five percentages and
    /// the average.
    pub fn table_cells(&self) -> [String; 6] {
        let [a, b, c, d, e] = self.distribution().as_array();
        [
            format!("{a:.2}"),
            format!("{b:.2}"),
            format!("{c:.2}"),
            format!("{d:.2}"),
            format!("{e:.2}"),
            format!("{:.2}", self.avg_rating),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartEntry {
    pub question_id: i64,
    pub question_text: String,
    pub avg_rating: f64,
    pub distribution: Distribution,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BarCharts {
    pub theory: Vec<ChartEntry>,
    pub practical: Vec<ChartEntry>,
}

pub fn bar_charts(rows: &[RatingRow]) -> BarCharts {
    let mut charts = BarCharts::default();

    for row in rows {
        let entry = ChartEntry {
            question_id: row.question_id,
            question_text: row.question_text.clone(),
            avg_rating: row.avg_rating,
            distribution: row.distribution(),
        };

        match row.question_type {
            QuestionType::Theory => charts.theory.push(entry),
            QuestionType::Practical => charts.practical.push(entry),
            QuestionType::TextAnswer => {}
        }
    }

    charts
}

fn flatten_line_breaks(text: &str) -> String {
    text.replace(['\n', '\r'], " ").trim().to_string()
}

/// Groups answers under every text-answer question, ascending by question
/// id. Questions nobody answered are kept with an empty answer list; blank
/// answers are dropped.
pub fn group_suggestions(questions: &[Question], answers: &[TextAnswerRow]) -> Vec<SuggestionGroup> {
    let mut by_question: HashMap<i64, Vec<String>> = HashMap::new();
    for row in answers {
        let answer = row.answer_text.as_deref().map(flatten_line_breaks).unwrap_or_default();
        let bucket = by_question.entry(row.question_id).or_default();
        if !answer.is_empty() {
            bucket.push(answer);
        }
    }

    let mut text_questions: Vec<&Question> = questions
        .iter()
        .filter(|q| q.question_type == QuestionType::TextAnswer)
        .collect();
    text_questions.sort_by_key(|q| q.id);

    text_questions
        .into_iter()
        .map(|q| SuggestionGroup {
            question: flatten_line_breaks(&q.text),
            answers: by_question.remove(&q.id).unwrap_or_default(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixQuestion {
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
}

/// Row-per-student matrix the frontend turns into a spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedbackMatrix {
    pub questions: Vec<MatrixQuestion>,
    pub feedback: Vec<Map<String, Value>>,
}

pub fn feedback_matrix(
    subject_type: SubjectType,
    questions: &[Question],
    students: &[String],
    raw: &[RawFeedback],
) -> FeedbackMatrix {
    if students.is_empty() {
        return FeedbackMatrix::default();
    }

    let rating_type = subject_type.question_type();
    let mut ordered: Vec<&Question> = questions
        .iter()
        .filter(|q| q.question_type == rating_type)
        .collect();
    ordered.sort_by_key(|q| q.id);
    let mut text: Vec<&Question> = questions
        .iter()
        .filter(|q| q.question_type == QuestionType::TextAnswer)
        .collect();
    text.sort_by_key(|q| q.id);
    ordered.extend(text);

    let mut rows: Vec<Map<String, Value>> = students
        .iter()
        .map(|username| {
            let mut row = Map::new();
            row.insert("username".into(), Value::String(username.clone()));
            for q in &ordered {
                row.insert(q.text.clone(), Value::String(String::new()));
            }
            row
        })
        .collect();

    let index: HashMap<&str, usize> = students
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    for fb in raw {
        let Some(&i) = index.get(fb.username.as_str()) else {
            continue;
        };
        let cell = if fb.question_type == rating_type {
            fb.rating.map(|r| r.to_string()).unwrap_or_default()
        } else if fb.question_type == QuestionType::TextAnswer {
            fb.text_answer.clone().unwrap_or_default()
        } else {
            continue;
        };
        rows[i].insert(fb.question_text.clone(), Value::String(cell));
    }

    FeedbackMatrix {
        questions: ordered
            .iter()
            .map(|q| MatrixQuestion {
                text: q.text.clone(),
                question_type: q.question_type,
            })
            .collect(),
        feedback: rows,
    }
}
