/// A selectable troublemaker. The catalog is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Character {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const CHARACTERS: [Character; 4] = [
    Character {
        id: "imam",
        name: "Imam",
        description: "The truant with a surprisingly sharp brain.",
    },
    Character {
        id: "ojan",
        name: "Ojan",
        description: "Expert in firecrackers and water balloons.",
    },
    Character {
        id: "vino",
        name: "Vino",
        description: "Good-looking, and the class bully.",
    },
    Character {
        id: "budi",
        name: "Budi",
        description: "A living legend of school chaos.",
    },
];

impl Character {
    pub fn find(id: &str) -> Option<&'static Character> {
        CHARACTERS.iter().find(|c| c.id == id)
    }

    pub fn all() -> &'static [Character] {
        &CHARACTERS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_known_and_unknown() {
        assert_eq!(Character::find("ojan").map(|c| c.name), Some("Ojan"));
        assert!(Character::find("yono").is_none());
        assert!(Character::find("").is_none());
    }

    #[test]
    fn ids_are_unique() {
        let all = Character::all();
        for (i, a) in all.iter().enumerate() {
            assert!(all[i + 1..].iter().all(|b| b.id != a.id));
        }
    }
}
