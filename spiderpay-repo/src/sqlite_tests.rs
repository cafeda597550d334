//! SQLite store integration tests.

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use spiderpay_types::{
        Currency, Money, Payment, PaymentId, PaymentStatus, PaymentStore, RepoError, User, UserId,
    };

    use crate::SqliteStore;

    async fn setup_store() -> SqliteStore {
        SqliteStore::new("sqlite::memory:").await.unwrap()
    }

    fn make_user(email: &str) -> User {
        User::new(email.to_string(), "$argon2id$stub-hash".to_string(), None).unwrap()
    }

    fn usd(minor: i64) -> Money {
        Money::new(minor, Currency::new("USD").unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let store = setup_store().await;

        let user = make_user("alice@example.com");
        store.insert_user(&user).await.unwrap();

        let fetched = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, user.id);
        assert_eq!(fetched.email, "alice@example.com");
        assert_eq!(fetched.password_hash, user.password_hash);
        assert!(fetched.is_active);
        assert!(!fetched.is_superuser);
    }

    #[tokio::test]
    async fn test_find_user_not_found() {
        let store = setup_store().await;

        let result = store.find_user(UserId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_find_user_by_email() {
        let store = setup_store().await;

        let user = make_user("bob@example.com");
        store.insert_user(&user).await.unwrap();

        let fetched = store
            .find_user_by_email("bob@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, user.id);

        let missing = store.find_user_by_email("nobody@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = setup_store().await;

        store
            .insert_user(&make_user("dup@example.com"))
            .await
            .unwrap();
        let result = store.insert_user(&make_user("dup@example.com")).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_user_writes_mutable_fields() {
        let store = setup_store().await;

        let mut user = make_user("carol@example.com");
        store.insert_user(&user).await.unwrap();

        user.full_name = Some("Carol".to_string());
        user.is_superuser = true;
        let updated = store.update_user(&user).await.unwrap();

        assert!(updated.updated_at >= user.updated_at);

        let fetched = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.full_name.as_deref(), Some("Carol"));
        assert!(fetched.is_superuser);
    }

    #[tokio::test]
    async fn test_update_missing_user_not_found() {
        let store = setup_store().await;

        let user = make_user("ghost@example.com");
        let result = store.update_user(&user).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_user_cascades_to_payments() {
        let store = setup_store().await;

        let user = make_user("dave@example.com");
        store.insert_user(&user).await.unwrap();

        let payment = Payment::new(user.id, usd(1000), None, "mock".to_string());
        store.insert_payment(&payment).await.unwrap();

        let deleted = store.delete_user(user.id).await.unwrap();
        assert!(deleted);

        assert!(store.find_user(user.id).await.unwrap().is_none());
        assert!(store.find_payment(payment.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_user_returns_false() {
        let store = setup_store().await;

        let deleted = store.delete_user(UserId::new()).await.unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_insert_and_find_payment() {
        let store = setup_store().await;

        let user = make_user("erin@example.com");
        store.insert_user(&user).await.unwrap();

        let mut payment = Payment::new(
            user.id,
            usd(2500),
            Some("subscription".to_string()),
            "mock".to_string(),
        );
        payment.metadata = Some(serde_json::json!({ "plan": "pro" }));
        store.insert_payment(&payment).await.unwrap();

        let fetched = store.find_payment(payment.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, payment.id);
        assert_eq!(fetched.user_id, user.id);
        assert_eq!(fetched.amount.minor(), 2500);
        assert_eq!(fetched.amount.currency().as_str(), "USD");
        assert_eq!(fetched.status, PaymentStatus::Pending);
        assert_eq!(fetched.description.as_deref(), Some("subscription"));
        assert_eq!(fetched.gateway, "mock");
        assert_eq!(fetched.metadata, Some(serde_json::json!({ "plan": "pro" })));
    }

    #[tokio::test]
    async fn test_find_payment_not_found() {
        let store = setup_store().await;

        let result = store.find_payment(PaymentId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_payments_most_recent_first() {
        let store = setup_store().await;

        let user = make_user("frank@example.com");
        store.insert_user(&user).await.unwrap();

        // Explicit timestamps make the expected order unambiguous.
        let base = Utc::now();
        for (i, label) in ["first", "second", "third"].iter().enumerate() {
            let mut payment = Payment::new(
                user.id,
                usd(100),
                Some(label.to_string()),
                "mock".to_string(),
            );
            payment.created_at = base + Duration::seconds(i as i64);
            payment.updated_at = payment.created_at;
            store.insert_payment(&payment).await.unwrap();
        }

        let payments = store.list_payments(0, 100).await.unwrap();
        assert_eq!(payments.len(), 3);
        assert_eq!(payments[0].description.as_deref(), Some("third"));
        assert_eq!(payments[2].description.as_deref(), Some("first"));

        let page = store.list_payments(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].description.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_update_payment_status_and_gateway_fields() {
        let store = setup_store().await;

        let user = make_user("grace@example.com");
        store.insert_user(&user).await.unwrap();

        let mut payment = Payment::new(user.id, usd(999), None, "mock".to_string());
        store.insert_payment(&payment).await.unwrap();

        payment.record_status(
            PaymentStatus::Approved,
            Some("gw_abc".to_string()),
            None,
        );
        store.update_payment(&payment).await.unwrap();

        let fetched = store.find_payment(payment.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, PaymentStatus::Approved);
        assert_eq!(fetched.gateway_payment_id.as_deref(), Some("gw_abc"));
        assert!(fetched.error_message.is_none());
        // Amount and owner are invariant under updates.
        assert_eq!(fetched.amount.minor(), 999);
        assert_eq!(fetched.user_id, user.id);
    }

    #[tokio::test]
    async fn test_update_missing_payment_not_found() {
        let store = setup_store().await;

        let payment = Payment::new(UserId::new(), usd(100), None, "mock".to_string());
        let result = store.update_payment(&payment).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }
}
