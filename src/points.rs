//! Point values per question.

use crate::model::QuestionType;

/// Calculates the default score of a question.
///
/// | Type                | Points                   |
/// |---------------------|--------------------------|
/// | Single choice       | 1                        |
/// | Multiple choice     | `max(right_count, 1)`    |
/// | Text input          | 2                        |
/// | Matching (all three)| `right_count`            |
/// | Anything else       | 1                        |
pub fn calculate_points(question_type: QuestionType, right_count: u32) -> u32 {
    match question_type {
        QuestionType::SingleChoice => 1,
        QuestionType::MultipleChoice => right_count.max(1),
        QuestionType::TextInput => 2,
        QuestionType::MatchingColumns
        | QuestionType::MatchingPairs
        | QuestionType::MatchingValues => right_count,
        QuestionType::Ranking | QuestionType::Other(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_choice_ignores_right_count() {
        assert_eq!(calculate_points(QuestionType::SingleChoice, 5), 1);
    }

    #[test]
    fn test_multiple_choice_at_least_one() {
        assert_eq!(calculate_points(QuestionType::MultipleChoice, 0), 1);
        assert_eq!(calculate_points(QuestionType::MultipleChoice, 3), 3);
    }

    #[test]
    fn test_text_input() {
        assert_eq!(calculate_points(QuestionType::TextInput, 4), 2);
    }

    #[test]
    fn test_matching_counts_pairs() {
        assert_eq!(calculate_points(QuestionType::MatchingColumns, 2), 2);
        assert_eq!(calculate_points(QuestionType::MatchingPairs, 4), 4);
        assert_eq!(calculate_points(QuestionType::MatchingValues, 0), 0);
    }

    #[test]
    fn test_other_types_default_to_one() {
        assert_eq!(calculate_points(QuestionType::Ranking, 6), 1);
        assert_eq!(calculate_points(QuestionType::Other(99), 6), 1);
    }
}
