use rand::Rng;

use crate::bank::Question;

/// Fisher-Yates over the question order, then an independent Fisher-Yates
/// over each question's options with `correct_index` remapped to the correct
/// option's new position. Pure function of the input and the injected rng;
/// the bank entries are cloned, never mutated.
pub fn shuffle_questions<R: Rng>(questions: &[Question], rng: &mut R) -> Vec<Question> {
    let mut shuffled: Vec<Question> = questions.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }
    for q in &mut shuffled {
        shuffle_options(q, rng);
    }
    shuffled
}

fn shuffle_options<R: Rng>(question: &mut Question, rng: &mut R) {
    let correct = question.options[question.correct_index].clone();
    for i in (1..question.options.len()).rev() {
        let j = rng.gen_range(0..=i);
        question.options.swap(i, j);
    }
    // Option texts are unique within a question, so the first match is the one.
    question.correct_index = question
        .options
        .iter()
        .position(|opt| *opt == correct)
        .unwrap_or(0);
}
