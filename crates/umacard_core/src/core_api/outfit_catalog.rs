#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterEntry {
    pub id: String,
    pub name_ja: String,
    pub name_en: String,
    /// `(outfit id, epithet)` in corpus order.
    pub outfits: Vec<(String, String)>,
}

/// Characters and their outfits, kept in `umas.json` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutfitCatalog {
    characters: Vec<CharacterEntry>,
}

/// First four characters of an outfit id name the character.
pub fn character_id(outfit_id: &str) -> &str {
    outfit_id.get(..4).unwrap_or(outfit_id)
}

impl OutfitCatalog {
    pub fn new(characters: Vec<CharacterEntry>) -> Self {
        Self { characters }
    }

    pub fn character(&self, outfit_id: &str) -> Option<&CharacterEntry> {
        let id = character_id(outfit_id);
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn character_name(&self, outfit_id: &str) -> Option<&str> {
        self.character(outfit_id)
            .map(|c| c.name_en.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn epithet(&self, outfit_id: &str) -> Option<&str> {
        self.character(outfit_id)?
            .outfits
            .iter()
            .find(|(id, _)| id == outfit_id)
            .map(|(_, epithet)| epithet.as_str())
    }

    /// Every `(outfit id, epithet)` pair in corpus order.
    pub fn outfits(&self) -> impl Iterator<Item = (&str, &str)> {
        self.characters.iter().flat_map(|c| {
            c.outfits
                .iter()
                .map(|(id, epithet)| (id.as_str(), epithet.as_str()))
        })
    }

    /// Case- and dot-insensitive substring search over "epithet name".
    pub fn search(&self, query: &str) -> Vec<&str> {
        let q = search_key(query);
        let q = q.as_str();
        self.characters
            .iter()
            .flat_map(|c| {
                c.outfits.iter().filter_map(move |(id, epithet)| {
                    let haystack = search_key(&format!("{epithet} {}", c.name_en));
                    haystack.contains(q).then_some(id.as_str())
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

fn search_key(s: &str) -> String {
    s.to_uppercase().replace('.', "")
}
