use chrono::NaiveDate;

use crate::io::store::{KEY_HABITS, Store};
use crate::model::Habit;
use crate::ops::{OpsError, required, resolve};

pub fn add_habit(store: &Store, text: &str, today: NaiveDate) -> Result<Habit, OpsError> {
    let text = required(text, "habit")?;
    Ok(store.append(KEY_HABITS, Habit::new(text, today))?)
}

pub fn find_habit(store: &Store, query: &str) -> Result<Habit, OpsError> {
    let habits = store.all::<Habit>();
    resolve(&habits, query, |h| h.text.as_str(), "habit").cloned()
}

/// Mark a habit done (or not) for `day`.
pub fn set_habit_done(store: &Store, query: &str, day: NaiveDate, done: bool) -> Result<Habit, OpsError> {
    let habit = find_habit(store, query)?;
    update_habit(store, habit.id, |h| h.set_done_on(day, done))
}

/// Flip today's mark for the habit with `id`.
pub fn toggle_habit(store: &Store, id: u64, day: NaiveDate) -> Result<Habit, OpsError> {
    update_habit(store, id, |h| {
        let done = h.is_done_on(day);
        h.set_done_on(day, !done);
    })
}

fn update_habit(store: &Store, id: u64, f: impl FnOnce(&mut Habit)) -> Result<Habit, OpsError> {
    store
        .modify(|habits: &mut Vec<Habit>| {
            habits.iter_mut().find(|h| h.id == id).map(|h| {
                f(h);
                h.clone()
            })
        })?
        .ok_or_else(|| OpsError::NotFound {
            kind: "habit",
            query: id.to_string(),
        })
}

pub fn remove_habit(store: &Store, query: &str) -> Result<Habit, OpsError> {
    let habit = find_habit(store, query)?;
    store.remove(KEY_HABITS, habit.id)?;
    Ok(habit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 14).unwrap()
    }

    #[test]
    fn check_marks_only_that_day() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        let habit = add_habit(&store, "Read 20 pages", today()).unwrap();
        assert_eq!(habit.created, today());

        let checked = set_habit_done(&store, "read", today(), true).unwrap();
        assert!(checked.is_done_on(today()));
        assert!(!checked.is_done_on(today() - Duration::days(1)));

        let stored = find_habit(&store, &habit.id.to_string()).unwrap();
        assert!(stored.is_done_on(today()));
    }

    #[test]
    fn toggle_flips_and_remove_deletes() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        let habit = add_habit(&store, "Walk", today()).unwrap();
        assert!(toggle_habit(&store, habit.id, today()).unwrap().is_done_on(today()));
        assert!(!toggle_habit(&store, habit.id, today()).unwrap().is_done_on(today()));
        assert!(matches!(
            toggle_habit(&store, 42, today()),
            Err(OpsError::NotFound { .. })
        ));

        remove_habit(&store, "walk").unwrap();
        assert!(store.all::<Habit>().is_empty());
    }

    #[test]
    fn empty_habit_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        assert!(matches!(add_habit(&store, " ", today()), Err(OpsError::Empty(_))));
    }
}
