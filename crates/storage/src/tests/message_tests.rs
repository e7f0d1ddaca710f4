use chrono::Utc;
use haven_core::{Role, Session};

use super::test_storage;

#[test]
fn messages_get_sequential_seq_numbers() {
    let (_dir, storage) = test_storage();
    storage
        .save_session(&Session::new("s1".into(), "u1".into(), "t".into(), Utc::now()))
        .unwrap();

    let now = Utc::now();
    let m1 = storage.append_message("m1", "s1", Role::User, "hello", now).unwrap();
    let m2 = storage.append_message("m2", "s1", Role::Assistant, "hi there", now).unwrap();
    let m3 = storage.append_message("m3", "s1", Role::User, "rough day", now).unwrap();

    assert_eq!((m1.seq, m2.seq, m3.seq), (1, 2, 3));
}

#[test]
fn history_is_ordered_by_seq_even_with_equal_timestamps() {
    let (_dir, storage) = test_storage();
    storage
        .save_session(&Session::new("s1".into(), "u1".into(), "t".into(), Utc::now()))
        .unwrap();

    // Same created_at for every row; ordering must come from seq alone.
    let now = Utc::now();
    for i in 0..5 {
        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
        storage.append_message(&format!("m{i}"), "s1", role, &format!("turn {i}"), now).unwrap();
    }

    let history = storage.get_session_messages("s1").unwrap();
    let seqs: Vec<i64> = history.iter().map(|m| m.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
    assert_eq!(history[0].content, "turn 0");
    assert_eq!(history[4].content, "turn 4");
}

#[test]
fn sessions_count_messages_independently() {
    let (_dir, storage) = test_storage();
    let now = Utc::now();
    storage.save_session(&Session::new("s1".into(), "u1".into(), "t".into(), now)).unwrap();
    storage.save_session(&Session::new("s2".into(), "u1".into(), "t".into(), now)).unwrap();

    storage.append_message("a", "s1", Role::User, "x", now).unwrap();
    storage.append_message("b", "s2", Role::User, "y", now).unwrap();
    storage.append_message("c", "s2", Role::Assistant, "z", now).unwrap();

    assert_eq!(storage.get_message_count("s1").unwrap(), 1);
    assert_eq!(storage.get_message_count("s2").unwrap(), 2);
    // Each session's seq space starts at 1.
    assert_eq!(storage.get_session_messages("s2").unwrap()[0].seq, 1);
}
