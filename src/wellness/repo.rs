use anyhow::Context;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use super::repo_types::{WellnessGoals, WellnessLog};
use super::services::{ValidGoals, ValidLog};

const LOG_COLUMNS: &str =
    "id, user_id, mood, sleep_hours, water_glasses, exercise_minutes, logged_at";

pub async fn insert_log<'e, E>(db: E, user_id: Uuid, log: &ValidLog) -> anyhow::Result<WellnessLog>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, WellnessLog>(&format!(
        r#"
        INSERT INTO wellness_logs (user_id, mood, sleep_hours, water_glasses, exercise_minutes, logged_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {LOG_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(log.mood)
    .bind(log.sleep_hours)
    .bind(log.water_glasses)
    .bind(log.exercise_minutes)
    .bind(log.logged_at)
    .fetch_one(db)
    .await
    .context("insert wellness log")?;
    Ok(row)
}

/// Oldest first.
pub async fn list_logs(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<WellnessLog>> {
    let rows = sqlx::query_as::<_, WellnessLog>(&format!(
        "SELECT {LOG_COLUMNS} FROM wellness_logs WHERE user_id = $1 ORDER BY logged_at ASC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list wellness logs")?;
    Ok(rows)
}

/// Deletes every log of the user; goals stay.
pub async fn reset_logs(db: &PgPool, user_id: Uuid) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM wellness_logs WHERE user_id = $1")
        .bind(user_id)
        .execute(db)
        .await
        .context("reset wellness logs")?;
    Ok(res.rows_affected())
}

pub async fn get_goals(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<WellnessGoals>> {
    let row = sqlx::query_as::<_, WellnessGoals>(
        "SELECT sleep_goal, water_goal, exercise_goal, set_at FROM wellness_goals WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get wellness goals")?;
    Ok(row)
}

pub async fn upsert_goals<'e, E>(db: E, user_id: Uuid, goals: &ValidGoals) -> anyhow::Result<WellnessGoals>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, WellnessGoals>(
        r#"
        INSERT INTO wellness_goals (user_id, sleep_goal, water_goal, exercise_goal, set_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id) DO UPDATE
           SET sleep_goal = EXCLUDED.sleep_goal,
               water_goal = EXCLUDED.water_goal,
               exercise_goal = EXCLUDED.exercise_goal,
               set_at = EXCLUDED.set_at
        RETURNING sleep_goal, water_goal, exercise_goal, set_at
        "#,
    )
    .bind(user_id)
    .bind(goals.sleep_goal)
    .bind(goals.water_goal)
    .bind(goals.exercise_goal)
    .bind(goals.set_at)
    .fetch_one(db)
    .await
    .context("upsert wellness goals")?;
    Ok(row)
}

// Needs Postgres: DATABASE_URL=... cargo test -- --include-ignored
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::tests::seed_patient as patient;
    use time::macros::datetime;

    fn log(mood: i16, logged_at: time::OffsetDateTime) -> ValidLog {
        ValidLog {
            mood,
            sleep_hours: 7.5,
            water_glasses: 6,
            exercise_minutes: 20,
            logged_at,
        }
    }

    fn goals(sleep_goal: f64, set_at: time::OffsetDateTime) -> ValidGoals {
        ValidGoals {
            sleep_goal,
            water_goal: 8,
            exercise_goal: 30,
            set_at,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn reset_empties_logs_and_keeps_goals(db: PgPool) {
        let user = patient(&db).await;
        insert_log(&db, user, &log(4, datetime!(2024-03-02 08:00 UTC))).await.unwrap();
        insert_log(&db, user, &log(2, datetime!(2024-03-01 08:00 UTC))).await.unwrap();
        upsert_goals(&db, user, &goals(8.0, datetime!(2024-03-01 09:00 UTC))).await.unwrap();

        let listed = list_logs(&db, user).await.unwrap();
        assert_eq!(listed.iter().map(|l| l.mood).collect::<Vec<_>>(), vec![2, 4]);

        assert_eq!(reset_logs(&db, user).await.unwrap(), 2);
        assert!(list_logs(&db, user).await.unwrap().is_empty());
        let kept = get_goals(&db, user).await.unwrap().unwrap();
        assert_eq!(kept.sleep_goal, 8.0);

        assert_eq!(reset_logs(&db, user).await.unwrap(), 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn second_goals_upsert_overwrites_first(db: PgPool) {
        let user = patient(&db).await;
        assert!(get_goals(&db, user).await.unwrap().is_none());

        upsert_goals(&db, user, &goals(8.0, datetime!(2024-03-01 09:00 UTC))).await.unwrap();
        let second = goals(9.5, datetime!(2024-03-05 09:00 UTC));
        upsert_goals(&db, user, &second).await.unwrap();

        let stored = get_goals(&db, user).await.unwrap().unwrap();
        assert_eq!(stored.sleep_goal, 9.5);
        assert_eq!(stored.set_at, datetime!(2024-03-05 09:00 UTC));
        let rows: i64 = sqlx::query_scalar("SELECT count(*) FROM wellness_goals WHERE user_id = $1")
            .bind(user)
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn import_writes_are_all_or_nothing(db: PgPool) {
        let user = patient(&db).await;

        let mut tx = db.begin().await.unwrap();
        insert_log(&mut *tx, user, &log(3, datetime!(2024-03-01 08:00 UTC))).await.unwrap();
        upsert_goals(&mut *tx, user, &goals(8.0, datetime!(2024-03-01 09:00 UTC))).await.unwrap();
        tx.rollback().await.unwrap();
        assert!(list_logs(&db, user).await.unwrap().is_empty());
        assert!(get_goals(&db, user).await.unwrap().is_none());

        let mut tx = db.begin().await.unwrap();
        insert_log(&mut *tx, user, &log(3, datetime!(2024-03-01 08:00 UTC))).await.unwrap();
        insert_log(&mut *tx, user, &log(5, datetime!(2024-03-02 08:00 UTC))).await.unwrap();
        upsert_goals(&mut *tx, user, &goals(7.0, datetime!(2024-03-02 09:00 UTC))).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(list_logs(&db, user).await.unwrap().len(), 2);
        assert_eq!(get_goals(&db, user).await.unwrap().unwrap().sleep_goal, 7.0);
    }
}
