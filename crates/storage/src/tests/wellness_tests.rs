use chrono::{NaiveDate, Utc};
use haven_core::{Goal, GoalStatus, Mood, MoodLog};

use super::test_storage;

fn goal(id: &str, user: &str) -> Goal {
    let now = Utc::now();
    Goal {
        id: id.to_owned(),
        user_id: user.to_owned(),
        title: "Sleep before midnight".to_owned(),
        description: "Wind down without screens".to_owned(),
        status: GoalStatus::Pending,
        target_date: NaiveDate::from_ymd_opt(2026, 9, 1),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn goal_round_trip_and_status_update() {
    let (_dir, storage) = test_storage();
    storage.save_goal(&goal("g1", "u1")).unwrap();

    let goals = storage.get_user_goals("u1").unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].status, GoalStatus::Pending);
    assert_eq!(goals[0].target_date, NaiveDate::from_ymd_opt(2026, 9, 1));

    assert!(storage.update_goal_status("g1", "u1", GoalStatus::InProgress, Utc::now()).unwrap());
    assert_eq!(storage.get_user_goals("u1").unwrap()[0].status, GoalStatus::InProgress);
}

#[test]
fn goal_status_update_is_scoped_to_owner() {
    let (_dir, storage) = test_storage();
    storage.save_goal(&goal("g1", "u1")).unwrap();
    assert!(!storage.update_goal_status("g1", "u2", GoalStatus::Completed, Utc::now()).unwrap());
    assert_eq!(storage.get_user_goals("u1").unwrap()[0].status, GoalStatus::Pending);
}

#[test]
fn mood_logs_list_newest_first() {
    let (_dir, storage) = test_storage();
    let base = Utc::now();
    for (i, mood) in [Mood::Sad, Mood::Neutral, Mood::Happy].iter().enumerate() {
        storage
            .save_mood_log(&MoodLog {
                id: format!("m{i}"),
                user_id: "u1".to_owned(),
                mood: *mood,
                note: String::new(),
                created_at: base + chrono::Duration::minutes(i as i64),
            })
            .unwrap();
    }

    let logs = storage.get_user_mood_logs("u1", 10).unwrap();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0].mood, Mood::Happy);
    assert_eq!(logs[2].mood, Mood::Sad);
}
