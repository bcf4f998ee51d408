//! "Guess the number" kept entirely in the visitor's session.

use std::ops::RangeInclusive;

use axum::{response::Html, Form};
use rand::Rng;
use serde::Deserialize;

use super::pages;
use crate::error::Result;
use crate::session::{AuthSession, GameState};

pub const MAX_ATTEMPTS: u32 = 10;
pub const TARGET_RANGE: RangeInclusive<u32> = 1..=100;

#[derive(Debug, Deserialize)]
pub struct GuessForm {
    #[serde(default)]
    numero: Option<String>,
}

/// Result of one guess, judged after the attempt was counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    OutOfAttempts,
    Higher { remaining: u32 },
    Lower { remaining: u32 },
    Correct { attempts: u32 },
}

impl Verdict {
    pub fn judge(guess: u32, game: GameState) -> Self {
        let remaining = MAX_ATTEMPTS.saturating_sub(game.attempt_count);
        if game.attempt_count > MAX_ATTEMPTS {
            Verdict::OutOfAttempts
        } else if guess < game.target_number {
            Verdict::Higher { remaining }
        } else if guess > game.target_number {
            Verdict::Lower { remaining }
        } else {
            Verdict::Correct {
                attempts: game.attempt_count,
            }
        }
    }

    /// Whether the next guess starts a fresh game.
    pub fn ends_game(self) -> bool {
        matches!(self, Verdict::OutOfAttempts | Verdict::Correct { .. })
    }

    pub fn message(self) -> String {
        match self {
            Verdict::OutOfAttempts => "¡Has superado el número máximo de intentos!".to_string(),
            Verdict::Higher { remaining } => {
                format!("El número es mayor, te quedan {remaining} intentos.")
            }
            Verdict::Lower { remaining } => {
                format!("El número es menor, te quedan {remaining} intentos.")
            }
            Verdict::Correct { attempts } => {
                format!("¡Correcto! Has adivinado el número en {attempts} intentos.")
            }
        }
    }
}

fn random_target() -> u32 {
    rand::thread_rng().gen_range(TARGET_RANGE)
}

pub async fn show() -> Html<String> {
    Html(pages::game(None))
}

pub async fn guess(session: AuthSession, Form(form): Form<GuessForm>) -> Result<Html<String>> {
    let guess = form
        .numero
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|n| TARGET_RANGE.contains(n));
    let Some(guess) = guess else {
        let message = format!(
            "Introduce un número entre {} y {}.",
            TARGET_RANGE.start(),
            TARGET_RANGE.end()
        );
        return Ok(Html(pages::game(Some(&message))));
    };

    if session.game_state().await?.is_none() {
        session.reset_game(random_target()).await?;
    }
    let Some(game) = session.record_attempt().await? else {
        return Ok(Html(pages::game(None)));
    };

    let verdict = Verdict::judge(guess, game);
    if verdict.ends_game() {
        session.reset_game(random_target()).await?;
    }
    Ok(Html(pages::game(Some(&verdict.message()))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(attempt_count: u32, target_number: u32) -> GameState {
        GameState {
            attempt_count,
            target_number,
        }
    }

    #[test]
    fn hints_count_down_remaining_attempts() {
        assert_eq!(Verdict::judge(10, game(1, 50)), Verdict::Higher { remaining: 9 });
        assert_eq!(Verdict::judge(90, game(3, 50)), Verdict::Lower { remaining: 7 });
        assert_eq!(
            Verdict::Higher { remaining: 9 }.message(),
            "El número es mayor, te quedan 9 intentos."
        );
    }

    #[test]
    fn correct_guess_reports_attempts() {
        let verdict = Verdict::judge(50, game(4, 50));
        assert_eq!(verdict, Verdict::Correct { attempts: 4 });
        assert!(verdict.ends_game());
    }

    #[test]
    fn tenth_attempt_still_counts() {
        assert_eq!(Verdict::judge(50, game(10, 50)), Verdict::Correct { attempts: 10 });
        assert_eq!(Verdict::judge(1, game(10, 50)), Verdict::Higher { remaining: 0 });
    }

    #[test]
    fn eleventh_attempt_is_out_of_attempts() {
        let verdict = Verdict::judge(50, game(11, 50));
        assert_eq!(verdict, Verdict::OutOfAttempts);
        assert!(verdict.ends_game());
    }

    #[test]
    fn targets_stay_in_range() {
        for _ in 0..100 {
            assert!(TARGET_RANGE.contains(&random_target()));
        }
    }
}
