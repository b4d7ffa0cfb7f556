use alloc::format;
use alloc::string::String;
use rand::Rng;

const COLORS: [&str; 10] = [
    "Blue", "Red", "Green", "Yellow", "Purple", "Orange", "Silver", "Gold", "Aqua", "Indigo",
];
const ANIMALS: [&str; 10] = [
    "Tiger", "Panda", "Falcon", "Otter", "Wolf", "Koala", "Eagle", "Lion", "Bear", "Fox",
];

/// Generates a nickname such as `GoldFalcon42`.
pub fn random_nickname<R: Rng + ?Sized>(rng: &mut R) -> String {
    let color = COLORS[rng.random_range(0..COLORS.len())];
    let animal = ANIMALS[rng.random_range(0..ANIMALS.len())];
    let number: u32 = rng.random_range(0..100);
    format!("{color}{animal}{number}")
}

/// Trims a typed username, generating a nickname when nothing usable is left.
pub fn username_or_nickname<R: Rng + ?Sized>(input: &str, rng: &mut R) -> String {
    match input.trim() {
        "" => random_nickname(rng),
        name => name.into(),
    }
}

/// Pulls the number following `Score: ` out of a service message.
pub fn extract_score(message: &str) -> Option<u64> {
    const MARKER: &str = "Score: ";
    let start = message.find(MARKER)? + MARKER.len();
    let digits = message[start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(&message[start..], |end| &message[start..start + end]);
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn extracts_score_from_service_messages() {
        assert_eq!(extract_score("Correct! Score: 100"), Some(100));
        assert_eq!(extract_score("Game Over! Final Score: 2450"), Some(2450));
        assert_eq!(extract_score("Level 3 - Score: 70 (bonus)"), Some(70));
        assert_eq!(extract_score("Score: "), None);
        assert_eq!(extract_score("Checking answer..."), None);
    }

    #[test]
    fn nickname_is_color_animal_number() {
        let mut rng = SmallRng::seed_from_u64(7);
        let name = random_nickname(&mut rng);

        let color = COLORS.iter().find(|c| name.starts_with(**c)).unwrap();
        let rest = &name[color.len()..];
        let animal = ANIMALS.iter().find(|a| rest.starts_with(**a)).unwrap();
        let number: u32 = rest[animal.len()..].parse().unwrap();
        assert!(number < 100);
    }

    #[test]
    fn blank_username_falls_back_to_nickname() {
        let mut rng = SmallRng::seed_from_u64(1);

        assert_eq!(username_or_nickname("  Ada ", &mut rng), "Ada");
        assert!(!username_or_nickname("   ", &mut rng).is_empty());
    }
}
