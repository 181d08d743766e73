//! Built-in starter vocabulary, inserted into empty track stores.

use chrono::{DateTime, Utc};
use vocab_core::model::{CardDraft, Track};

use crate::repository::{CardStore, StorageError};

type Row = (
    &'static str, // prompt
    &'static str, // answer
    &'static str, // pronunciation
    &'static str, // category
    &'static str, // word type
    &'static str, // level
    &'static str, // notes
);

const FRENCH: &[Row] = &[
    ("Hello", "Bonjour", "bɔ̃ʒuʁ", "Greetings", "Interjection", "A1", "Formal greeting, used throughout the day"),
    ("Hi", "Salut", "saly", "Greetings", "Interjection", "A1", "Informal greeting among friends"),
    ("Good evening", "Bonsoir", "bɔ̃swaʁ", "Greetings", "Interjection", "A1", "Evening greeting"),
    ("Good night", "Bonne nuit", "bɔn nɥi", "Greetings", "Phrase", "A1", "Night farewell"),
    ("Goodbye", "Au revoir", "o ʁəvwaʁ", "Greetings", "Phrase", "A1", "Standard farewell"),
    ("Thank you", "Merci", "mɛʁsi", "Politeness", "Interjection", "A1", "Most common way to say thank you"),
    ("Thank you very much", "Merci beaucoup", "mɛʁsi boku", "Politeness", "Phrase", "A1", "Emphasized gratitude"),
    ("You're welcome", "De rien", "də ʁjɛ̃", "Politeness", "Phrase", "A1", "Response to thank you"),
    ("Please", "S'il vous plaît", "sil vu plɛ", "Politeness", "Phrase", "A1", "Formal request"),
    ("One", "Un", "œ̃", "Numbers", "Number", "A1", "Cardinal number"),
    ("Two", "Deux", "dø", "Numbers", "Number", "A1", "Cardinal number"),
    ("Three", "Trois", "tʁwa", "Numbers", "Number", "A1", "Cardinal number"),
    ("Five", "Cinq", "sɛ̃k", "Numbers", "Number", "A1", "Cardinal number"),
    ("Ten", "Dix", "dis", "Numbers", "Number", "A1", "Cardinal number"),
    ("To be", "Être", "ɛtʁ", "Verbs", "Verb", "A1", "Most important verb, irregular"),
    ("To have", "Avoir", "avwaʁ", "Verbs", "Verb", "A1", "Essential verb, irregular"),
    ("To go", "Aller", "ale", "Verbs", "Verb", "A1", "Movement verb, irregular"),
    ("To want", "Vouloir", "vulwaʁ", "Verbs", "Verb", "A2", "Desire verb, irregular"),
    ("Good", "Bon", "bɔ̃", "Adjectives", "Adjective", "A1", "Positive quality, masculine"),
    ("Small/Short", "Petit", "pəti", "Adjectives", "Adjective", "A1", "Size adjective, masculine"),
    ("Old", "Vieux", "vjø", "Adjectives", "Adjective", "A1", "Time adjective, masculine"),
    ("Bread", "Pain", "pɛ̃", "Food", "Noun", "A1", "Basic food item"),
    ("Water", "Eau", "o", "Food", "Noun", "A1", "Basic drink"),
    ("Coffee", "Café", "kafe", "Food", "Noun", "A1", "Popular drink"),
    ("Cheese", "Fromage", "fʁɔmaʒ", "Food", "Noun", "A2", "Dairy product"),
    ("House", "Maison", "mɛzɔ̃", "Places", "Noun", "A1", "Living place"),
    ("Hotel", "Hôtel", "otɛl", "Places", "Noun", "A1", "Accommodation"),
    ("Bank", "Banque", "bɑ̃k", "Places", "Noun", "A2", "Financial institution"),
    ("School", "École", "ekɔl", "Places", "Noun", "A1", "Educational institution"),
];

const ENGLISH: &[(Row, &str)] = &[
    (("Bonjour", "Hello", "həˈloʊ", "Greetings", "Interjection", "A1", "Neutral greeting"), "Hello, how are you?"),
    (("Au revoir", "Goodbye", "ɡʊdˈbaɪ", "Greetings", "Interjection", "A1", "Standard farewell"), "Goodbye, see you tomorrow."),
    (("Merci", "Thank you", "ˈθæŋk ju", "Politeness", "Phrase", "A1", "Expression of gratitude"), "Thank you for your help."),
    (("Pomme", "Apple", "ˈæpəl", "Food", "Noun", "A1", "Countable noun"), "She eats an apple every day."),
    (("Pain", "Bread", "brɛd", "Food", "Noun", "A1", "Uncountable noun"), "We need some bread."),
    (("Courir", "To run", "rʌn", "Verbs", "Verb", "A1", "Irregular: ran, run"), "I run every morning."),
    (("Acheter", "To buy", "baɪ", "Verbs", "Verb", "A1", "Irregular: bought, bought"), "They bought a new car."),
    (("Bibliothèque", "Library", "ˈlaɪbrɛri", "Places", "Noun", "A2", "False friend of 'librairie'"), "The library opens at nine."),
    (("Bientôt", "Soon", "suːn", "Adverbs", "Adverb", "A2", "Refers to the near future"), "See you soon."),
    (("Épuisé", "Exhausted", "ɪɡˈzɔːstɪd", "Adjectives", "Adjective", "B1", "Stronger than 'tired'"), "I was exhausted after the trip."),
];

fn draft(row: &Row) -> CardDraft {
    let (prompt, answer, pronunciation, category, word_type, level, notes) = *row;
    CardDraft::new(prompt, answer)
        .with_pronunciation(pronunciation)
        .with_category(category)
        .with_word_type(word_type)
        .with_level(level)
        .with_notes(notes)
}

/// The starter cards for a track.
#[must_use]
pub fn sample_drafts(track: Track) -> Vec<CardDraft> {
    match track {
        Track::French => FRENCH.iter().map(draft).collect(),
        Track::English => ENGLISH
            .iter()
            .map(|(row, example)| draft(row).with_example(*example))
            .collect(),
    }
}

/// Insert the starter cards if the track's store is empty. Returns how many
/// cards were added (0 when the store already had data).
///
/// # Errors
///
/// Returns `StorageError` if counting or inserting fails, or a starter card
/// fails validation.
pub async fn seed_if_empty(
    store: &dyn CardStore,
    track: Track,
    now: DateTime<Utc>,
) -> Result<usize, StorageError> {
    let existing = store.count(track).await?;
    if existing > 0 {
        log::debug!("track {track} already holds {existing} cards, skipping seed");
        return Ok(0);
    }

    let drafts = sample_drafts(track);
    let total = drafts.len();
    for draft in drafts {
        store.insert_card(track, draft.validate(now)?).await?;
    }
    log::info!("seeded {total} cards into track {track}");
    Ok(total)
}
