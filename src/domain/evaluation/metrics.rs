//! Evaluation metrics value object.

use serde::{Deserialize, Serialize};

/// Speech statistics measured over the user's side of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechMetrics {
    pub words_per_minute: f64,
    pub filler_words_per_minute: f64,
    pub participation_percentage: f64,
}

/// Sub-scores on the fixed collaboration rubric.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricScores {
    pub shared_understanding: f64,
    pub problem_solving_action: f64,
    pub team_organization: f64,
}

/// AI-graded outcome of a session.
///
/// Immutable after construction: fields are private and there are no setters.
/// A re-score produces a new value. Numeric ranges are whatever the scorer
/// returned; nothing here clamps or validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationMetrics {
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
    #[serde(default)]
    tips: Vec<String>,
    #[serde(flatten)]
    speech: SpeechMetrics,
    #[serde(default)]
    duration: String,
    #[serde(flatten)]
    rubric: RubricScores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    overall_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl EvaluationMetrics {
    /// Starts building a metrics value.
    pub fn builder() -> EvaluationMetricsBuilder {
        EvaluationMetricsBuilder::default()
    }

    pub fn strengths(&self) -> &[String] {
        &self.strengths
    }

    pub fn improvements(&self) -> &[String] {
        &self.improvements
    }

    pub fn tips(&self) -> &[String] {
        &self.tips
    }

    pub fn speech(&self) -> &SpeechMetrics {
        &self.speech
    }

    /// Human-readable duration, e.g. `"4:32"`.
    pub fn duration(&self) -> &str {
        &self.duration
    }

    pub fn rubric(&self) -> &RubricScores {
        &self.rubric
    }

    pub fn overall_score(&self) -> Option<f64> {
        self.overall_score
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

/// Builder for [`EvaluationMetrics`].
#[derive(Debug, Clone, Default)]
pub struct EvaluationMetricsBuilder {
    strengths: Vec<String>,
    improvements: Vec<String>,
    tips: Vec<String>,
    speech: SpeechMetrics,
    duration: String,
    rubric: RubricScores,
    overall_score: Option<f64>,
    detail: Option<String>,
}

impl EvaluationMetricsBuilder {
    pub fn strength(mut self, s: impl Into<String>) -> Self {
        self.strengths.push(s.into());
        self
    }

    pub fn improvement(mut self, s: impl Into<String>) -> Self {
        self.improvements.push(s.into());
        self
    }

    pub fn tip(mut self, s: impl Into<String>) -> Self {
        self.tips.push(s.into());
        self
    }

    pub fn speech(mut self, speech: SpeechMetrics) -> Self {
        self.speech = speech;
        self
    }

    pub fn duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    pub fn rubric(mut self, rubric: RubricScores) -> Self {
        self.rubric = rubric;
        self
    }

    pub fn overall_score(mut self, score: f64) -> Self {
        self.overall_score = Some(score);
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn build(self) -> EvaluationMetrics {
        EvaluationMetrics {
            strengths: self.strengths,
            improvements: self.improvements,
            tips: self.tips,
            speech: self.speech,
            duration: self.duration,
            rubric: self.rubric,
            overall_score: self.overall_score,
            detail: self.detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> EvaluationMetrics {
        EvaluationMetrics::builder()
            .strength("Clear framing")
            .improvement("Ask more questions")
            .tip("Pause before answering")
            .speech(SpeechMetrics {
                words_per_minute: 132.0,
                filler_words_per_minute: 2.5,
                participation_percentage: 48.0,
            })
            .duration("4:32")
            .rubric(RubricScores {
                shared_understanding: 3.0,
                problem_solving_action: 4.0,
                team_organization: 2.0,
            })
            .overall_score(3.0)
            .build()
    }

    #[test]
    fn builder_populates_all_fields() {
        let m = sample();
        assert_eq!(m.strengths(), ["Clear framing"]);
        assert_eq!(m.improvements().len(), 1);
        assert_eq!(m.tips().len(), 1);
        assert_eq!(m.speech().words_per_minute, 132.0);
        assert_eq!(m.duration(), "4:32");
        assert_eq!(m.rubric().problem_solving_action, 4.0);
        assert_eq!(m.overall_score(), Some(3.0));
        assert_eq!(m.detail(), None);
    }

    #[test]
    fn serializes_flat_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["wordsPerMinute"], 132.0);
        assert_eq!(json["sharedUnderstanding"], 3.0);
        assert!(json.get("detail").is_none());
    }

    #[test]
    fn deserializes_scorer_payload_without_clamping() {
        let payload = json!({
            "strengths": ["a"],
            "wordsPerMinute": 999.0,
            "fillerWordsPerMinute": -1.0,
            "participationPercentage": 150.0,
            "duration": "1:00",
            "sharedUnderstanding": 7.0,
            "problemSolvingAction": 0.0,
            "teamOrganization": 1.0
        });
        let m: EvaluationMetrics = serde_json::from_value(payload).unwrap();
        assert_eq!(m.speech().participation_percentage, 150.0);
        assert_eq!(m.speech().filler_words_per_minute, -1.0);
        assert!(m.improvements().is_empty());
        assert_eq!(m.overall_score(), None);
    }

    #[test]
    fn rescoring_produces_a_distinct_value() {
        let first = sample();
        let second = EvaluationMetrics::builder().duration("4:32").build();
        assert_ne!(first, second);
        assert_eq!(first, sample());
    }
}
