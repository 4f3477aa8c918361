mod common;

use engine::{NotificationCategory, NotificationSelection, Role};

use common::{director, engine, user};

#[tokio::test]
async fn notify_writes_one_row_per_distinct_recipient() {
    let engine = engine().await;
    let director = director(&engine).await;
    let teacher = user(&engine, "300", Role::Teacher, "Tamara").await;
    let driver = user(&engine, "400", Role::Driver, "Bolat").await;

    let sent = engine
        .notify(
            &[teacher.user_id, director.user_id, teacher.user_id],
            NotificationCategory::System,
            "Staff Meeting",
            "Friday at 16:00 in the music room.",
        )
        .await
        .unwrap();
    assert_eq!(sent, 2);

    for recipient in [&teacher, &director] {
        let notifications = engine.notifications(recipient).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].recipient_id, recipient.user_id);
        assert_eq!(notifications[0].category, NotificationCategory::System);
        assert_eq!(notifications[0].title, "Staff Meeting");
        assert!(!notifications[0].is_read);
    }
    assert!(engine.notifications(&driver).await.unwrap().is_empty());

    let sent = engine
        .notify(&[], NotificationCategory::System, "Nobody", "Nothing")
        .await
        .unwrap();
    assert_eq!(sent, 0);
}

#[tokio::test]
async fn hidden_notifications_leave_the_dashboard() {
    let engine = engine().await;
    let teacher = user(&engine, "300", Role::Teacher, "Tamara").await;

    engine
        .notify(&[teacher.user_id], NotificationCategory::System, "First", "One")
        .await
        .unwrap();
    engine
        .notify(&[teacher.user_id], NotificationCategory::System, "Second", "Two")
        .await
        .unwrap();

    let notifications = engine.notifications(&teacher).await.unwrap();
    assert_eq!(notifications.len(), 2);
    let first = notifications
        .iter()
        .find(|n| n.title == "First")
        .unwrap()
        .id;

    let selection = NotificationSelection::new(Some(vec![first]), false).unwrap();
    assert_eq!(engine.hide_notifications(&teacher, &selection).await.unwrap(), 1);
    assert_eq!(engine.hide_notifications(&teacher, &selection).await.unwrap(), 0);

    let remaining = engine.notifications(&teacher).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "Second");
}
