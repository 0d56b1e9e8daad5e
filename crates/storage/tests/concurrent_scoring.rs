mod common;

use std::time::Duration;

use rust_decimal::Decimal;
use storage::repository::event_result::ResultRepository;
use storage::services::{ranking, scoring};

use common::{Meet, database};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_recompute_waits_for_earlier_score_and_sees_it() {
    let Some(db) = database().await else { return };
    let meet = Meet::create(&db, "max", 1, 4).await;
    let heavy = meet.entry(&db, "M", 0).await;
    let light = meet.entry(&db, "M", 1).await;

    let mut tx = db.begin().await.unwrap();
    ResultRepository::new(&mut tx)
        .upsert_value(heavy, meet.event_id, "10")
        .await
        .unwrap();
    ranking::recompute_event(&mut tx, meet.competition_id, meet.event_id)
        .await
        .unwrap();

    let writer = tokio::spawn({
        let db = db.clone();
        let event_id = meet.event_id;
        async move { scoring::record_result(&db, light, event_id, "8").await }
    });

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!writer.is_finished(), "second recompute must wait for the event lock");

    tx.commit().await.unwrap();
    let update = writer.await.unwrap().unwrap();

    let heavy_result = meet.result(&db, heavy).await;
    let light_result = meet.result(&db, light).await;

    assert_eq!(heavy_result.event_rank, Some(1));
    assert_eq!(heavy_result.points_earned, Decimal::from(2));
    assert_eq!(light_result.event_rank, Some(2));
    assert_eq!(light_result.points_earned, Decimal::from(1));
    assert_eq!(update.points_earned, Decimal::from(1));

    let rank_sum: i32 = [heavy_result.event_rank, light_result.event_rank]
        .iter()
        .flatten()
        .sum();
    assert_eq!(rank_sum, 3);

    assert_eq!(meet.entry_standing(&db, heavy).await.rank, Some(1));
    assert_eq!(meet.entry_standing(&db, light).await.total_points, Decimal::from(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_scores_leave_consistent_ranks() {
    let Some(db) = database().await else { return };
    let meet = Meet::create(&db, "reps", 1, 4).await;

    let mut entries = Vec::new();
    for i in 0..6 {
        entries.push(meet.entry(&db, "F", i).await);
    }

    let writers: Vec<_> = entries
        .iter()
        .enumerate()
        .map(|(i, &entry_id)| {
            let db = db.clone();
            let event_id = meet.event_id;
            tokio::spawn(async move {
                scoring::record_result(&db, entry_id, event_id, &(10 + i).to_string()).await
            })
        })
        .collect();
    for writer in writers {
        writer.await.unwrap().unwrap();
    }

    let mut points = Decimal::ZERO;
    for (i, &entry_id) in entries.iter().enumerate() {
        let result = meet.result(&db, entry_id).await;
        assert_eq!(result.event_rank, Some(6 - i as i32));
        points += result.points_earned;
    }
    assert_eq!(points, Decimal::from(21));
}
