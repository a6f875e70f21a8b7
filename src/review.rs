// feedback-report-service/src/review.rs
//
// Canned review text for the teacher-analysis view.

use serde::Serialize;

use crate::aggregation::{bar_charts, BarCharts};
use crate::models::RatingRow;

pub const REVIEW_THRESHOLD: f64 = 3.5;

const GENERIC_IMPROVEMENT: &str = "Consider reviewing teaching methods and seeking student feedback to identify specific areas for enhancement.";

const IMPROVEMENTS: &[(&str, &str)] = &[
    ("Quality of notes/materials provided", "Consider enhancing the quality of notes by incorporating more visual aids, updated references, and concise summaries to improve student understanding."),
    ("Clarity in teaching and explanation", "Focus on simplifying complex concepts, using clear examples, and maintaining a steady pace to enhance clarity during lectures."),
    ("Use of real-world examples", "Incorporate more industry-relevant examples and case studies to make the subject matter more relatable and engaging for students."),
    ("Regularity of classes", "Ensure consistent scheduling and timely completion of the syllabus to avoid rushed sessions towards the end of the semester."),
    ("Encouragement of student participation", "Encourage active participation by incorporating interactive activities, group discussions, or Q&A sessions to boost engagement."),
    ("Clarity in doubt resolution", "Dedicate specific time for doubt resolution and provide detailed, patient explanations to address student queries effectively."),
    ("Depth of subject knowledge", "Deepen subject expertise by staying updated with recent advancements and sharing advanced insights with students."),
    ("Punctuality and class duration", "Maintain strict adherence to class schedules and utilize the full duration effectively to cover all topics thoroughly."),
    ("Availability for guidance", "Increase availability for one-on-one guidance or office hours to provide personalized support to students."),
    ("Structure of practical sessions", "Design practical sessions with clear objectives, step-by-step guidance, and adequate time for hands-on practice."),
    ("Demonstration in practicals", "Provide detailed demonstrations and ensure students understand the procedures before conducting practicals."),
    ("Discussion of practical results", "Facilitate thorough discussions of practical outcomes, linking them to theoretical concepts for better understanding."),
    ("Relevance of practicals to industry", "Highlight the industry applications of practicals to make them more relevant and motivating for students."),
    ("Presence during practicals", "Ensure consistent presence and active supervision during practical sessions to assist students effectively."),
    ("Safety instructions in practicals", "Emphasize safety protocols and provide clear instructions on equipment handling to ensure a safe learning environment."),
    ("Fairness in assessment", "Adopt a transparent and consistent marking system, providing constructive feedback to help students improve."),
    ("Journal checking and feedback", "Regularly check journals and provide detailed, timely feedback to guide students in improving their work."),
    ("Use of modern teaching aids", "Incorporate digital tools, projectors, or online resources to make lectures more interactive and engaging."),
    ("Overall teaching effectiveness", "Focus on holistic improvement in teaching methods, student engagement, and knowledge delivery to enhance the overall learning experience."),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub review: String,
    pub improvement: String,
}

/// Question texts look like `3. Regularity of classes?`; the dictionary is
/// keyed by what sits between the first `.` and the next `?`.
pub fn improvement_key(question_text: &str) -> &str {
    let key = match question_text.split_once('.') {
        Some((_, rest)) => rest.split('?').next().unwrap_or(rest).trim(),
        None => "",
    };

    if key.is_empty() {
        question_text
    } else {
        key
    }
}

pub fn question_review(question_text: &str, avg_rating: f64) -> Option<Review> {
    if avg_rating >= REVIEW_THRESHOLD {
        return None;
    }

    let key = improvement_key(question_text);
    let improvement = IMPROVEMENTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, text)| *text)
        .unwrap_or(GENERIC_IMPROVEMENT);

    Some(Review {
        review: format!(
            "The average rating of {avg_rating:.2} for \"{question_text}\" indicates room for improvement."
        ),
        improvement: improvement.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceTier {
    Outstanding,
    Good,
    Moderate,
    NeedsImprovement,
}

impl PerformanceTier {
    pub fn for_average(avg: f64) -> Self {
        if avg >= 4.5 {
            PerformanceTier::Outstanding
        } else if avg >= 3.5 {
            PerformanceTier::Good
        } else if avg >= 2.5 {
            PerformanceTier::Moderate
        } else {
            PerformanceTier::NeedsImprovement
        }
    }

    fn review(&self) -> &'static str {
        match self {
            PerformanceTier::Outstanding => "Outstanding performance! The teacher consistently delivers high-quality instruction across all evaluated aspects.",
            PerformanceTier::Good => "Good performance overall, with strong delivery in most areas of teaching.",
            PerformanceTier::Moderate => "Moderate performance with noticeable strengths but some areas needing improvement.",
            PerformanceTier::NeedsImprovement => "Performance requires significant improvement to meet expectations.",
        }
    }

    fn improvement(&self) -> &'static str {
        match self {
            PerformanceTier::Outstanding => "Continue maintaining this excellent standard, perhaps by exploring innovative teaching methods to further enhance student engagement.",
            PerformanceTier::Good => "Focus on refining areas with lower ratings, such as incorporating more interactive elements or addressing specific student feedback.",
            PerformanceTier::Moderate => "Identify specific weaknesses through student feedback and consider professional development or peer mentoring to improve teaching effectiveness.",
            PerformanceTier::NeedsImprovement => "Seek targeted training, adopt modern teaching aids, and engage with students to understand and address their learning needs.",
        }
    }
}

/// Mean of the per-question averages of rating questions; 0 when there are
/// none.
pub fn overall_average(rows: &[RatingRow]) -> f64 {
    let rated: Vec<f64> = rows
        .iter()
        .filter(|r| r.question_type.is_rating())
        .map(|r| r.avg_rating)
        .collect();

    if rated.is_empty() {
        0.0
    } else {
        rated.iter().sum::<f64>() / rated.len() as f64
    }
}

pub fn overall_review(rows: &[RatingRow]) -> Review {
    let avg = overall_average(rows);
    let tier = PerformanceTier::for_average(avg);

    Review {
        review: format!("Overall Performance: {} (Average Rating: {avg:.2})", tier.review()),
        improvement: tier.improvement().to_string(),
    }
}

pub fn question_reviews(rows: &[RatingRow]) -> Vec<Review> {
    rows.iter()
        .filter(|r| r.question_type.is_rating())
        .filter_map(|r| question_review(&r.question_text, r.avg_rating))
        .collect()
}

/// Payload of the teacher-analysis view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherAnalysis {
    pub bar_charts: BarCharts,
    pub question_reviews: Vec<Review>,
    pub overall_review: Review,
}

pub fn teacher_analysis(rows: &[RatingRow]) -> TeacherAnalysis {
    TeacherAnalysis {
        bar_charts: bar_charts(rows),
        question_reviews: question_reviews(rows),
        overall_review: overall_review(rows),
    }
}
