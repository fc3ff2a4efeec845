use chrono::{DateTime, TimeZone, Utc};
use pawcare::models::Periodicity;
use pawcare::recurrence::next_due;
use pawcare::reducer::{apply, create_task, TaskDraft, TaskEdit, TaskEvent};

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn draft(periodicity: Periodicity) -> TaskDraft {
    let mut d = TaskDraft::custom("custom_1", "Spot-on");
    d.periodicity = periodicity;
    d
}

#[test]
fn test_monthly_task_created_on_jan_31_overflows_to_march() {
    let t = create_task(draft(Periodicity::months(1)), "task_1", at(2024, 1, 31));
    assert_eq!(t.last_completed, None);
    assert_eq!(t.next_due_date, Some(at(2024, 3, 2)));
}

#[test]
fn test_complete_then_delete_reverts_to_now() {
    let t = create_task(draft(Periodicity::weeks(2)), "task_1", at(2024, 3, 1));
    let done = apply(
        &t,
        TaskEvent::Complete { entry_id: "hist_1".into(), date: at(2024, 3, 10), note: None },
    );
    assert_eq!(done.last_completed, Some(at(2024, 3, 10)));
    assert_eq!(done.next_due_date, Some(at(2024, 3, 24)));

    let now = at(2024, 4, 2);
    let undone = apply(&done, TaskEvent::DeleteHistoryEntry { entry_id: "hist_1".into(), now });
    assert!(undone.history.is_empty());
    assert_eq!(undone.last_completed, None);
    assert_eq!(undone.next_due_date, Some(at(2024, 4, 16)));
}

#[test]
fn test_latest_date_wins_regardless_of_insertion_order() {
    let dates = [at(2024, 2, 1), at(2024, 5, 1), at(2024, 3, 1), at(2024, 4, 1)];
    let mut t = create_task(draft(Periodicity::days(10)), "task_1", at(2024, 1, 1));
    for (i, d) in dates.iter().enumerate() {
        let entry_id = format!("hist_{}", i);
        t = apply(&t, TaskEvent::Complete { entry_id, date: *d, note: None });
    }
    assert_eq!(t.last_completed, Some(at(2024, 5, 1)));
    assert_eq!(t.next_due_date, Some(at(2024, 5, 11)));
    let ordered: Vec<_> = t.history.iter().map(|h| h.date).collect();
    let mut expected = dates.to_vec();
    expected.sort_by(|a, b| b.cmp(a));
    assert_eq!(ordered, expected);
}

#[test]
fn test_invariants_hold_after_every_event() {
    let mut t = create_task(draft(Periodicity::months(2)), "task_1", at(2024, 1, 15));
    let events = vec![
        TaskEvent::Complete { entry_id: "h1".into(), date: at(2024, 2, 1), note: None },
        TaskEvent::Complete {
            entry_id: "h2".into(),
            date: at(2024, 1, 20),
            note: Some("early".into()),
        },
        TaskEvent::Edit {
            edit: TaskEdit { periodicity: Some(Periodicity::years(1)), ..TaskEdit::default() },
            now: at(2024, 2, 5),
        },
        TaskEvent::DeleteHistoryEntry { entry_id: "h1".into(), now: at(2024, 2, 6) },
        TaskEvent::DeleteHistoryEntry { entry_id: "h2".into(), now: at(2024, 2, 7) },
    ];
    for event in events {
        t = apply(&t, event);
        assert_eq!(t.last_completed, t.history.iter().map(|h| h.date).max());
        if let Some(last) = t.last_completed {
            assert_eq!(t.next_due_date, Some(next_due(last, &t.periodicity)));
        }
    }
    assert_eq!(t.next_due_date, Some(at(2025, 2, 7)));
}

#[test]
fn test_repeated_unknown_delete_is_idempotent() {
    let t = create_task(draft(Periodicity::days(3)), "task_1", at(2024, 1, 1));
    let done = TaskEvent::Complete { entry_id: "h1".into(), date: at(2024, 1, 2), note: None };
    let t = apply(&t, done);
    let delete = |now| TaskEvent::DeleteHistoryEntry { entry_id: "missing".into(), now };
    let once = apply(&t, delete(at(2030, 1, 1)));
    let twice = apply(&once, delete(at(2031, 1, 1)));
    assert_eq!(once, t);
    assert_eq!(twice, t);
}
