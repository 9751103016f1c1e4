//! Spoken feedback phrases for judged answers.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::evaluator::EvaluationOutcome;

const PRAISE: &[&str] = &[
    "Bravo ! C'est exact !",
    "Parfait ! Tu as trouvé !",
    "Excellent ! C'est la bonne réponse !",
    "Super ! Tu es très fort !",
    "Fantastique ! C'est correct !",
];

const NO_ANSWER: &str = "Je n'ai pas entendu de réponse. Réessaie s'il te plaît.";
const NOT_UNDERSTOOD: &str = "Je n'ai pas compris le nombre. Dis clairement : un, deux, trois...";

/// Phrase to say after an answer was judged. `rng` picks among variants.
pub fn phrase<R: Rng + ?Sized>(outcome: &EvaluationOutcome, rng: &mut R) -> String {
    match *outcome {
        EvaluationOutcome::Correct { value } => {
            let praise = PRAISE.choose(rng).copied().unwrap_or(PRAISE[0]);
            format!("{praise} {value} est bien la bonne réponse !")
        }
        EvaluationOutcome::Incorrect {
            extracted,
            expected,
        } => encouragement(extracted, expected, rng.random_range(0..4)),
        EvaluationOutcome::InvalidInput => NO_ANSWER.to_string(),
        EvaluationOutcome::ParsingError => NOT_UNDERSTOOD.to_string(),
    }
}

fn encouragement(said: u32, expected: u32, variant: usize) -> String {
    match variant {
        0 => format!(
            "Pas tout à fait ! Tu as dit {said}, mais la bonne réponse était {expected}. Continue, tu vas y arriver !"
        ),
        1 => format!(
            "Presque ! Tu as répondu {said}, mais c'était {expected}. Ne t'inquiète pas, c'est en pratiquant qu'on apprend !"
        ),
        2 => format!(
            "Oops ! Tu as dit {said} mais la réponse était {expected}. Tu fais de ton mieux, c'est l'important !"
        ),
        _ => format!(
            "Pas grave ! Tu as répondu {said}, la bonne réponse était {expected}. Continue tes efforts !"
        ),
    }
}

/// Advice for a transcript that did not yield a number.
pub fn improvement_suggestion(transcript: &str) -> &'static str {
    let text = transcript.trim().to_lowercase();
    if text.is_empty() {
        "Parle plus fort et plus clairement."
    } else if text.chars().count() < 3 {
        "Essaie de dire le nombre plus distinctement : 'trois', 'cinq', 'sept'..."
    } else if text.contains("euh") || text.contains("hum") {
        "N'hésite pas ! Dis directement le nombre que tu penses."
    } else {
        "Parle clairement en disant juste le nombre : un, deux, trois..."
    }
}
