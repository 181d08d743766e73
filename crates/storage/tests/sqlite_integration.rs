use std::collections::HashSet;

use storage::repository::{CardFilter, CardStore, PageRequest, Storage};
use storage::seed::{sample_drafts, seed_if_empty};
use vocab_core::model::{CardDraft, CardId, Track};
use vocab_core::time::fixed_now;

async fn memory_storage(name: &str) -> Storage {
    Storage::sqlite(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect sqlite")
}

#[tokio::test]
async fn sqlite_round_trips_cards_per_track() {
    let storage = memory_storage("memdb_round_trip").await;
    let store = storage.cards.as_ref();

    let draft = CardDraft::new("Hello", "Bonjour")
        .with_pronunciation("bɔ̃ʒuʁ")
        .with_category("Greetings")
        .with_word_type("Interjection")
        .with_level("A1")
        .with_notes("Formal greeting");
    let stored = store
        .insert_card(Track::French, draft.validate(fixed_now()).unwrap())
        .await
        .unwrap();

    let fetched = store
        .get_card(Track::French, stored.id())
        .await
        .unwrap()
        .expect("card present");
    assert_eq!(fetched, stored);
    assert_eq!(fetched.level(), Some("A1"));
    assert_eq!(fetched.created_at(), fixed_now());

    assert!(store
        .get_card(Track::English, stored.id())
        .await
        .unwrap()
        .is_none());
    assert!(store
        .get_card(Track::French, CardId::new(9_999))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn sqlite_sample_excludes_and_limits() {
    let storage = memory_storage("memdb_sample").await;
    let store = storage.cards.as_ref();
    let added = seed_if_empty(store, Track::French, fixed_now()).await.unwrap();
    let total = store.count(Track::French).await.unwrap();
    assert_eq!(total, added as u64);

    let first = store
        .sample(Track::French, &HashSet::new(), 5)
        .await
        .unwrap();
    assert_eq!(first.len(), 5);

    let excluding: HashSet<CardId> = first.iter().map(|c| c.id()).collect();
    let rest = store.sample(Track::French, &excluding, 500).await.unwrap();
    assert_eq!(rest.len() as u64, total - 5);
    assert!(rest.iter().all(|c| !excluding.contains(&c.id())));
}

#[tokio::test]
async fn sqlite_summary_and_listing() {
    let storage = memory_storage("memdb_listing").await;
    let store = storage.cards.as_ref();
    seed_if_empty(store, Track::French, fixed_now()).await.unwrap();

    let summary = store.summary(Track::French).await.unwrap();
    assert_eq!(summary.total, sample_drafts(Track::French).len() as u64);
    let sum: u64 = summary.categories.iter().map(|c| c.count).sum();
    assert_eq!(sum, summary.total);
    let mut names: Vec<_> = summary.categories.iter().map(|c| c.name.clone()).collect();
    let sorted = {
        let mut s = names.clone();
        s.sort();
        s
    };
    assert_eq!(names, sorted);
    names.dedup();
    assert_eq!(names.len(), summary.categories.len());

    let filter = CardFilter {
        category: Some("Places".into()),
        level: Some("A1".into()),
    };
    let page = store
        .list_cards(
            Track::French,
            &filter,
            PageRequest {
                page: 1,
                per_page: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.pages, 2);
    assert_eq!(page.cards.len(), 2);
    assert!(page
        .cards
        .iter()
        .all(|c| c.category() == "Places" && c.level() == Some("A1")));
    assert!(page.cards[0].answer() <= page.cards[1].answer());
}

#[tokio::test]
async fn sqlite_empty_track_counts_zero() {
    let storage = memory_storage("memdb_empty").await;
    let store = storage.cards.as_ref();
    assert_eq!(store.count(Track::English).await.unwrap(), 0);
    assert!(store
        .sample(Track::English, &HashSet::new(), 50)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(store.summary(Track::English).await.unwrap().total, 0);
}
