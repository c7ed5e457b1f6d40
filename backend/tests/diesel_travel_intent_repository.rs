//! `DieselTravelIntentRepository` against embedded PostgreSQL.
//!
//! Interest changes are single conditional `UPDATE` statements, so racing
//! requests from one user must leave exactly one entry behind. The
//! migration's CHECK constraints are exercised with raw SQL the adapters
//! never issue.

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;
#[path = "support/pg_embed.rs"]
mod pg_embed;

use std::sync::Arc;

use chrono::NaiveDate;
use rstest::{fixture, rstest};

use backpacker_connect::domain::ports::{
    InterestMutation, TravelIntentRepository, TravelIntentRepositoryError, UserRepository,
};
use backpacker_connect::domain::{
    Activities, Destination, PageRequest, TravelIntent, TravelIntentDraft, TravelIntentFilter,
    TravelIntentId, TravelIntentPatch, TravelIntentValidationError, TripTypes, UserId,
};
use backpacker_connect::outbound::persistence::{
    DieselTravelIntentRepository, DieselUserRepository,
};

use embedded_postgres::{PgWorld, account, at_minute, pg_world};

#[fixture]
fn world() -> Option<PgWorld> {
    pg_world()
}

struct Stores {
    intents: DieselTravelIntentRepository,
    owner: UserId,
    traveller: UserId,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn intent(owner: &UserId, destination: &str, minute: u32) -> TravelIntent {
    TravelIntent::create(
        TravelIntentId::random(),
        owner.clone(),
        TravelIntentDraft {
            destination: Destination::new(destination).expect("valid destination"),
            start_date: date(2024, 5, 1),
            end_date: Some(date(2024, 5, 14)),
            flexible_dates: false,
            description: None,
            trip_types: TripTypes::default(),
            max_travelers: None,
            budget_range: None,
            activities: Activities::default(),
        },
        at_minute(minute),
    )
    .expect("valid intent")
}

/// Two registered users; intents reference their owner by foreign key.
fn stores(world: &PgWorld) -> Stores {
    let users = DieselUserRepository::new(world.pool());
    let owner = account("ulla", 0);
    let traveller = account("ugo", 1);
    world.block_on(async {
        users.insert(&owner).await.expect("insert owner");
        users.insert(&traveller).await.expect("insert traveller");
    });
    Stores {
        intents: DieselTravelIntentRepository::new(world.pool()),
        owner: owner.user.id,
        traveller: traveller.user.id,
    }
}

#[rstest]
fn racing_interest_from_one_user_is_recorded_once(world: Option<PgWorld>) {
    let Some(world) = world else {
        eprintln!("SKIP-TEST-CLUSTER: racing_interest_from_one_user_is_recorded_once skipped");
        return;
    };
    let Stores {
        intents,
        owner,
        traveller,
    } = stores(&world);
    let intents = Arc::new(intents);
    let hanoi = intent(&owner, "Hanoi", 2);
    let id = hanoi.id();

    let outcomes = world.block_on(async {
        intents.insert(&hanoi).await.expect("insert");
        let mut handles = Vec::new();
        for _ in 0..8 {
            let intents = Arc::clone(&intents);
            let traveller = traveller.clone();
            handles.push(tokio::spawn(async move {
                intents
                    .add_interest(&id, &traveller)
                    .await
                    .expect("add interest")
            }));
        }
        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.expect("task completes"));
        }
        outcomes
    });

    let applied = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Some(InterestMutation::Applied(_))))
        .count();
    assert_eq!(applied, 1);
    let stored = world
        .block_on(intents.find_by_id(&id))
        .expect("find")
        .expect("present");
    assert_eq!(stored.interested_users(), std::slice::from_ref(&traveller));
}

#[rstest]
fn owner_interest_and_absent_removal_are_no_ops(world: Option<PgWorld>) {
    let Some(world) = world else {
        eprintln!("SKIP-TEST-CLUSTER: owner_interest_and_absent_removal_are_no_ops skipped");
        return;
    };
    let Stores {
        intents,
        owner,
        traveller,
    } = stores(&world);
    let hanoi = intent(&owner, "Hanoi", 2);
    let id = hanoi.id();

    world.block_on(async {
        intents.insert(&hanoi).await.expect("insert");

        let own = intents.add_interest(&id, &owner).await.expect("add");
        assert_eq!(own, Some(InterestMutation::Unchanged(hanoi.clone())));

        let absent = intents
            .remove_interest(&id, &traveller)
            .await
            .expect("remove");
        assert_eq!(absent, Some(InterestMutation::Unchanged(hanoi.clone())));

        let joined = intents.add_interest(&id, &traveller).await.expect("add");
        assert!(matches!(joined, Some(InterestMutation::Applied(_))));
        let Some(InterestMutation::Applied(left)) = intents
            .remove_interest(&id, &traveller)
            .await
            .expect("remove")
        else {
            panic!("removal of a member should apply");
        };
        assert!(left.interested_users().is_empty());

        let missing = intents
            .add_interest(&TravelIntentId::random(), &traveller)
            .await
            .expect("add");
        assert!(missing.is_none());
    });
}

#[rstest]
fn owner_updates_are_conditional_and_validated(world: Option<PgWorld>) {
    let Some(world) = world else {
        eprintln!("SKIP-TEST-CLUSTER: owner_updates_are_conditional_and_validated skipped");
        return;
    };
    let Stores {
        intents,
        owner,
        traveller,
    } = stores(&world);
    let hanoi = intent(&owner, "Hanoi", 2);
    let id = hanoi.id();

    world.block_on(async {
        intents.insert(&hanoi).await.expect("insert");

        let rename = TravelIntentPatch {
            destination: Some(Destination::new("Da Nang").expect("valid destination")),
            ..TravelIntentPatch::default()
        };
        let stranger = intents
            .update_owned(&id, &traveller, &rename, at_minute(3))
            .await
            .expect("update");
        assert!(stranger.is_none());

        let broken = TravelIntentPatch {
            start_date: Some(date(2024, 6, 1)),
            ..TravelIntentPatch::default()
        };
        let err = intents
            .update_owned(&id, &owner, &broken, at_minute(3))
            .await
            .expect_err("start after stored end");
        assert_eq!(
            err,
            TravelIntentRepositoryError::invalid_patch(TravelIntentValidationError::EndBeforeStart)
        );

        let renamed = intents
            .update_owned(&id, &owner, &rename, at_minute(4))
            .await
            .expect("update")
            .expect("owned");
        assert_eq!(renamed.destination().as_ref(), "Da Nang");
        assert_eq!(renamed.updated_at(), at_minute(4));
        let stored = intents.find_by_id(&id).await.expect("find");
        assert_eq!(stored, Some(renamed));
    });
}

#[rstest]
fn destination_filter_is_case_insensitive_and_newest_first(world: Option<PgWorld>) {
    let Some(world) = world else {
        eprintln!(
            "SKIP-TEST-CLUSTER: destination_filter_is_case_insensitive_and_newest_first skipped"
        );
        return;
    };
    let Stores { intents, owner, .. } = stores(&world);

    world.block_on(async {
        for (minute, destination) in [(2, "Bali"), (4, "Ubud, bali"), (3, "Hanoi")] {
            intents
                .insert(&intent(&owner, destination, minute))
                .await
                .expect("insert");
        }
        let filter = TravelIntentFilter {
            destination: Some("BALI".to_owned()),
            ..TravelIntentFilter::default()
        };
        let found = intents
            .list(&filter, PageRequest::default())
            .await
            .expect("list");
        let names: Vec<&str> = found.iter().map(|i| i.destination().as_ref()).collect();
        assert_eq!(names, ["Ubud, bali", "Bali"]);
    });
}

#[rstest]
#[case::end_before_start(
    "start_date, end_date",
    "'2024-05-10', '2024-05-01'",
    "travel_intents_dates_check"
)]
#[case::owner_interested(
    "start_date, interested_users",
    "'2024-05-10', ARRAY[u.id]",
    "travel_intents_owner_not_interested_check"
)]
#[case::empty_trip_types(
    "start_date, trip_types",
    "'2024-05-10', ARRAY[]::TEXT[]",
    "travel_intents_trip_types_check"
)]
fn schema_rejects_rows_breaking_intent_invariants(
    world: Option<PgWorld>,
    #[case] columns: &str,
    #[case] values: &str,
    #[case] constraint: &str,
) {
    let Some(world) = world else {
        eprintln!("SKIP-TEST-CLUSTER: schema_rejects_rows_breaking_intent_invariants skipped");
        return;
    };
    stores(&world);

    let err = world
        .execute(&format!(
            "INSERT INTO travel_intents (id, user_id, destination, {columns}) \
             SELECT gen_random_uuid(), u.id, 'Hanoi', {values} FROM users u LIMIT 1"
        ))
        .expect_err("constraint violated");
    assert!(err.contains(constraint), "unexpected error: {err}");
}

#[rstest]
fn column_defaults_match_a_fresh_intent(world: Option<PgWorld>) {
    let Some(world) = world else {
        eprintln!("SKIP-TEST-CLUSTER: column_defaults_match_a_fresh_intent skipped");
        return;
    };
    stores(&world);

    let inserted = world
        .execute(
            "INSERT INTO travel_intents (id, user_id, destination, start_date) \
             SELECT gen_random_uuid(), u.id, 'Hanoi', '2024-05-01' FROM users u LIMIT 1",
        )
        .expect("insert with defaults");
    assert_eq!(inserted, 1);
    let defaults_hold = world
        .query_bool(
            "SELECT NOT flexible_dates AND is_active \
             AND trip_types = ARRAY['adventure']::TEXT[] \
             AND cardinality(interested_users) = 0 AND group_id IS NULL \
             FROM travel_intents",
        )
        .expect("query");
    assert!(defaults_hold);
}
