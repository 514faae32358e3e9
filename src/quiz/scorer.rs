use std::fmt;

use super::Question;

/// German school grade derived from a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Grade {
    VeryGood,
    Good,
    Satisfactory,
    Sufficient,
    Poor,
    Insufficient,
}

impl Grade {
    /// Thresholds checked top-down, first match wins.
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= 92 {
            Grade::VeryGood
        } else if percentage >= 81 {
            Grade::Good
        } else if percentage >= 67 {
            Grade::Satisfactory
        } else if percentage >= 50 {
            Grade::Sufficient
        } else if percentage >= 30 {
            Grade::Poor
        } else {
            Grade::Insufficient
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Grade::VeryGood => 1,
            Grade::Good => 2,
            Grade::Satisfactory => 3,
            Grade::Sufficient => 4,
            Grade::Poor => 5,
            Grade::Insufficient => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Grade::VeryGood => "Sehr gut",
            Grade::Good => "Gut",
            Grade::Satisfactory => "Befriedigend",
            Grade::Sufficient => "Ausreichend",
            Grade::Poor => "Mangelhaft",
            Grade::Insufficient => "Ungenügend",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AnswerRecord {
    pub question: Question,
    pub submitted: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuizResult {
    pub total: usize,
    pub correct: usize,
    pub percentage: u32,
    pub grade: Grade,
    pub answers: Vec<AnswerRecord>,
}

impl QuizResult {
    pub fn passed(&self) -> bool {
        self.percentage >= 50
    }

    pub fn mistakes(&self) -> impl Iterator<Item = &AnswerRecord> {
        self.answers.iter().filter(|a| !a.is_correct)
    }
}

/// Rounded share of `correct` in `total`, halves rounded up.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

/// Reduces the recorded answers of a finished quiz into its result.
pub fn score(answers: Vec<AnswerRecord>, total: usize) -> QuizResult {
    let correct = answers.iter().filter(|a| a.is_correct).count();
    let percentage = percentage(correct, total);
    QuizResult {
        total,
        correct,
        percentage,
        grade: Grade::from_percentage(percentage),
        answers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(correct: usize, total: usize) -> Vec<AnswerRecord> {
        (0..total)
            .map(|i| AnswerRecord {
                question: Question::new(i as u32, format!("q{}", i), "a".into(), vec!["a".into()]),
                submitted: if i < correct { "a".into() } else { "b".into() },
                is_correct: i < correct,
            })
            .collect()
    }

    #[test]
    fn eleven_of_twelve_is_very_good() {
        let result = score(records(11, 12), 12);
        assert_eq!(result.correct, 11);
        assert_eq!(result.percentage, 92);
        assert_eq!(result.grade.to_string(), "1 (Sehr gut)");
    }

    #[test]
    fn half_is_sufficient() {
        let result = score(records(6, 12), 12);
        assert_eq!(result.percentage, 50);
        assert_eq!(result.grade.to_string(), "4 (Ausreichend)");
        assert!(result.passed());
    }

    #[test]
    fn nothing_right_is_insufficient() {
        let result = score(records(0, 10), 10);
        assert_eq!(result.percentage, 0);
        assert_eq!(result.grade.to_string(), "6 (Ungenügend)");
        assert!(!result.passed());
        assert_eq!(result.mistakes().count(), 10);
    }

    #[test]
    fn everything_right_is_very_good() {
        let result = score(records(10, 10), 10);
        assert_eq!(result.percentage, 100);
        assert_eq!(result.grade, Grade::VeryGood);
    }

    #[test]
    fn grade_boundaries() {
        let cases = [
            (100, Grade::VeryGood),
            (92, Grade::VeryGood),
            (91, Grade::Good),
            (81, Grade::Good),
            (80, Grade::Satisfactory),
            (67, Grade::Satisfactory),
            (66, Grade::Sufficient),
            (50, Grade::Sufficient),
            (49, Grade::Poor),
            (30, Grade::Poor),
            (29, Grade::Insufficient),
            (0, Grade::Insufficient),
        ];
        for (percentage, grade) in cases {
            assert_eq!(Grade::from_percentage(percentage), grade, "{}%", percentage);
        }
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(2, 3), 67); // 66.67
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(0, 0), 0);
    }
}
