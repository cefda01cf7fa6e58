mod helpers;

use food_notes::controller::AppState;
use food_notes::models::*;
use food_notes::render::render_state;
use helpers::*;
use speculate2::speculate;

fn note(id: &str, name: &str, price: f64) -> Note {
    Note {
        id: NoteId::new(id),
        name: name.to_string(),
        description: format!("{} description", name),
        price,
        image_key: None,
        image_url: None,
        created_at: None,
        updated_at: None,
    }
}

fn loaded(notes: Vec<Note>) -> AppState {
    let mut state = AppState::new();
    let generation = state.begin_fetch();
    assert!(state.apply_fetch(generation, notes));
    state
}

speculate! {
    before {
        let mut state = loaded(vec![
            note("a", "Soup", 4.5),
            note("b", "Tea", 2.25),
            note("c", "Bread", 3.0),
        ]);
    }

    describe "fetch generations" {
        it "applies the latest fetch" {
            let generation = state.begin_fetch();
            assert!(state.apply_fetch(generation, vec![note("d", "Cake", 5.0)]));
            assert_eq!(state.visible().count(), 1);
        }

        it "ignores a fetch that was overtaken" {
            let older = state.begin_fetch();
            let newer = state.begin_fetch();
            assert!(state.apply_fetch(newer, vec![note("d", "Cake", 5.0)]));
            assert!(!state.apply_fetch(older, vec![]));
            assert_eq!(state.visible().count(), 1);
        }
    }

    describe "total_price" {
        it "sums every visible price with two decimals" {
            assert_eq!(state.total_price(), "9.75");
        }

        it "is zero for an empty working set" {
            assert_eq!(AppState::new().total_price(), "0.00");
        }

        it "is zero, not negative zero, once every row is tombstoned" {
            for id in ["a", "b", "c"] {
                state.tombstone(&NoteId::new(id));
            }
            assert_eq!(state.total_price(), "0.00");
        }

        it "skips tombstoned rows" {
            state.tombstone(&NoteId::new("a"));
            assert_eq!(state.total_price(), "5.25");
        }
    }

    describe "tombstones" {
        it "hides a row until it is restored" {
            let id = NoteId::new("b");
            state.tombstone(&id);
            assert!(state.find(&id).is_none());
            assert!(state.is_tombstoned(&id));

            state.restore(&id);
            assert!(state.find(&id).is_some());
        }

        it "forgets a row for good" {
            let id = NoteId::new("b");
            state.tombstone(&id);
            state.forget(&id);
            state.restore(&id);
            assert!(state.find(&id).is_none());
            assert_eq!(state.visible().count(), 2);
        }
    }

    describe "merge" {
        it "replaces a record in place" {
            state.merge(note("b", "Matcha", 3.0));
            let names: Vec<&str> = state.visible().map(|n| n.name.as_str()).collect();
            assert_eq!(names, vec!["Soup", "Matcha", "Bread"]);
        }

        it "appends an unknown record" {
            state.merge(note("z", "Cake", 1.0));
            assert_eq!(state.visible().last().unwrap().name, "Cake");
        }

        it "reuses a display URL resolved for the same key" {
            let mut lunch = note("l", "Lunch", 1.0);
            lunch.image_key = Some("lunch.jpg".to_string());
            lunch.image_url = Some("https://cdn.test/lunch.jpg".to_string());
            state.merge(lunch.clone());

            let returned = Note { image_url: None, name: "Brunch".to_string(), ..lunch };
            assert_eq!(
                state.known_image_url(&returned).as_deref(),
                Some("https://cdn.test/lunch.jpg")
            );
        }
    }

    describe "edit mode" {
        it "allows one row at a time" {
            let a = NoteId::new("a");
            let b = NoteId::new("b");
            assert_eq!(state.begin_edit(&a).unwrap(), None);
            state.set_draft(EditField::Name, "Tomato soup".to_string());

            let abandoned = state.begin_edit(&b).unwrap().expect("draft abandoned");
            assert_eq!(abandoned.name, "Tomato soup");
            assert_eq!(state.editing().unwrap().id, b);
        }

        it "re-entering the same row starts a fresh draft" {
            let a = NoteId::new("a");
            state.begin_edit(&a).unwrap();
            state.set_draft(EditField::Name, "Tomato soup".to_string());

            assert_eq!(state.begin_edit(&a).unwrap(), None);
            assert_eq!(state.editing().unwrap().name, "Soup");
        }

        it "only finishes the row that was saved" {
            state.begin_edit(&NoteId::new("b")).unwrap();
            state.finish_edit(&NoteId::new("a"));
            assert!(state.editing().is_some());
            state.finish_edit(&NoteId::new("b"));
            assert!(state.editing().is_none());
        }

        it "refuses draft changes with no open editor" {
            assert!(!state.set_draft(EditField::Price, "1".to_string()));
        }
    }

    describe "rendering" {
        it "shows the total and resolved image URLs after a fetch" {
            let (controller, api, _storage) = setup();
            api.seed("Lunch", 12.0, Some("lunch.jpg"));
            api.seed("Tea", 2.5, None);

            tokio_test::block_on(controller.fetch_all()).expect("fetch failed");
            let output = render_state(&controller.snapshot());

            assert!(output.starts_with("Total Price: $14.50\n"));
            assert!(output.contains(&FakeStorage::url_for("lunch.jpg")));
            assert!(output.contains("$2.50"));
        }
    }
}
