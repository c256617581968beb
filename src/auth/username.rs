//! Playful username generation
//!
//! New accounts get a Bollywood-flavored handle instead of exposing their
//! real name. One name is special-cased with a fixed username.

use super::token::random_u32;

const BOLLYWOOD_NAMES: &[&str] = &[
    "shahrukh", "salman", "aamir", "akshay", "hrithik", "ranveer", "ranbir",
    "varun", "tiger", "vicky", "rajkummar", "ayushmann", "kartik", "sidharth",
    "arjun", "shahid", "farhan", "abhishek", "john", "saif", "irrfan",
    "deepika", "priyanka", "katrina", "alia", "kareena", "anushka", "sonam",
    "jacqueline", "kriti", "shraddha", "parineeti", "sonakshi", "madhuri",
    "kajol", "rani", "vidya", "tabu", "konkona", "kangana", "richa",
];

const BADASS_TERMS: &[&str] = &[
    "king", "queen", "warrior", "champion", "legend", "hero", "star",
    "badshah", "sultan", "tiger", "lion", "cobra", "falcon", "phoenix",
    "thunder", "storm", "fire", "diamond", "gold", "platinum",
];

/// Generate a username from a player's display name
pub fn generate_username(name: &str) -> String {
    if name.to_lowercase().contains("simran") {
        return "jeejeegirl".to_string();
    }

    let star = pick(BOLLYWOOD_NAMES);
    let term = pick(BADASS_TERMS);
    let num = random_u32() % 999 + 1;

    match random_u32() % 5 {
        0 => format!("{star}{term}"),
        1 => format!("{term}{star}"),
        2 => format!("{star}{num}"),
        3 => format!("{term}{num}"),
        _ => format!("{star}{term}{num}"),
    }
}

fn pick(words: &'static [&'static str]) -> &'static str {
    words[(random_u32() as usize) % words.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_name_is_fixed() {
        assert_eq!(generate_username("Simran"), "jeejeegirl");
        assert_eq!(generate_username("simran kaur"), "jeejeegirl");
    }

    #[test]
    fn test_generated_names_are_lowercase_alnum() {
        for _ in 0..20 {
            let name = generate_username("Carlos");
            assert!(!name.is_empty());
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }
}
