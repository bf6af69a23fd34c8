//! Behaviour every Entity Store adapter must share, checked against
//! `MemoryStore` and against a mock that plays the losing side of a race.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    DomainError, MockCommentRepository, MockProductRepository, MockUserRepository, MockVoteRepository, Principal,
    Product, Role, Store, Vote, VoteRepository, DEFAULT_LOGO,
};
use mockall::predicate::eq;
use services::VoteLedger;
use storage_adapters::MemoryStore;
use uuid::Uuid;

#[tokio::test]
async fn vote_pair_is_unique_in_memory_store() {
    let store = MemoryStore::new();
    let (product_id, user_id) = (Uuid::new_v4(), Uuid::new_v4());
    let vote = |id| Vote {
        id,
        product_id,
        user_id,
        created_at: Utc::now(),
    };

    VoteRepository::insert(&store, vote(Uuid::new_v4())).await.unwrap();
    let err = VoteRepository::insert(&store, vote(Uuid::new_v4())).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(VoteRepository::count_by_product(&store, product_id).await.unwrap(), 1);
}

fn product(id: Uuid, upvotes: i64) -> Product {
    Product {
        id,
        name: "Raced".into(),
        slug: "raced".into(),
        tagline: "t".into(),
        description: "d".into(),
        website: "https://example.com".into(),
        category: domains::Category::Other,
        owner_id: Uuid::new_v4(),
        logo: DEFAULT_LOGO.into(),
        upvotes_count: upvotes,
        comments_count: 0,
        created_at: Utc::now(),
    }
}

/// A concurrent request inserted the same vote between our existence check
/// and our insert. The ledger must report success with the recounted total
/// and must not bump the counter itself.
#[tokio::test]
async fn losing_an_insert_race_converges_to_upvoted() {
    let product_id = Uuid::new_v4();
    let voter = Principal {
        id: Uuid::new_v4(),
        username: "racer".into(),
        role: Role::Regular,
    };

    let mut products = MockProductRepository::new();
    products
        .expect_find_by_id()
        .with(eq(product_id))
        .returning(move |id| Ok(Some(product(id, 1))));
    products.expect_adjust_upvotes().never();
    products
        .expect_set_upvotes_count()
        .with(eq(product_id), eq(1i64))
        .times(1)
        .returning(|_, _| Ok(()));

    let mut votes = MockVoteRepository::new();
    votes.expect_find().returning(|_, _| Ok(None));
    votes
        .expect_insert()
        .returning(|_| Err(DomainError::Conflict("votes_product_user_key".into())));
    votes.expect_count_by_product().returning(|_| Ok(1));

    let store = Store::new(
        Arc::new(MockUserRepository::new()),
        Arc::new(products),
        Arc::new(MockCommentRepository::new()),
        Arc::new(votes),
    );
    let state = VoteLedger::new(&store).toggle_vote(product_id, &voter).await.unwrap();
    assert!(state.upvoted);
    assert_eq!(state.upvotes_count, 1);
}
