use std::collections::HashSet;

use chrono::{Duration, NaiveDate, TimeZone, Utc};

use taxdesk_core::activity::{ActivityFilter, ActivityKind, ActivityMetadata};
use taxdesk_core::auth::Credentials;
use taxdesk_core::clock::ManualClock;
use taxdesk_core::collections::set_collection;
use taxdesk_core::documents::{DocumentKind, UploadedFile};
use taxdesk_core::payments::{Invoice, InvoiceStatus, NewInvoice, PaymentDetails, PaymentMethod};
use taxdesk_core::returns::{NewTaxReturn, ReturnStatus, TaxReturnUpdate, TransitionPolicy};
use taxdesk_core::settings::{NotificationKind, ProfileUpdate};
use taxdesk_core::{KeyValueStore, MemoryStore, Result, Slot, TaxdeskError, Workspace};

/// Memory store that can be told to reject reads or writes of particular slots.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    failing: HashSet<String>,
    locked: HashSet<String>,
}

impl FlakyStore {
    fn fail(&mut self, slot: Slot) {
        self.failing.insert(slot.key().to_string());
    }

    fn lock(&mut self, slot: Slot) {
        self.locked.insert(slot.key().to_string());
    }

    fn heal(&mut self) {
        self.failing.clear();
        self.locked.clear();
    }
}

impl KeyValueStore for FlakyStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        if self.locked.contains(key) {
            return Err(TaxdeskError::Storage(format!("database is locked reading {}", key)));
        }
        self.inner.get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        if self.failing.contains(key) {
            return Err(TaxdeskError::Storage(format!("quota exceeded writing {}", key)));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.inner.remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys()
    }
}

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap())
}

fn logged_in<S: KeyValueStore>(store: S) -> Workspace<S> {
    let mut ws = Workspace::with_clock(store, clock());
    ws.login(&Credentials::new("pat@example.com", "secret"), None)
        .expect("login should succeed");
    ws
}

fn activity_count<S: KeyValueStore>(ws: &mut Workspace<S>) -> usize {
    ws.activity().unwrap().query(&ActivityFilter::new()).len()
}

fn invoice(id: &str, amount: f64) -> Invoice {
    Invoice {
        id: id.to_string(),
        description: "Preparation fee".to_string(),
        amount,
        due_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        status: InvoiceStatus::Unpaid,
        paid_date: None,
        payment_method: None,
    }
}

#[test]
fn test_create_return_starts_pending_and_logs() {
    let mut ws = logged_in(MemoryStore::new());

    let created = ws
        .returns()
        .unwrap()
        .create(NewTaxReturn::new("1040", 2024))
        .expect("create should succeed");

    assert_eq!(created.status, ReturnStatus::Pending);
    assert_eq!(created.document_count, 0);
    assert_eq!(created.created_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());

    let list = ws.returns().unwrap().list();
    assert_eq!(list[0].id, created.id);
    assert_eq!(list.len(), 4);

    let newest = ws.activity().unwrap().recent(1);
    assert_eq!(newest[0].description, "Tax Return Created");
    assert_eq!(newest[0].details, "New 1040 return created");
    assert_eq!(newest[0].kind, ActivityKind::Return);
}

#[test]
fn test_create_return_requires_type() {
    let mut ws = logged_in(MemoryStore::new());
    let before = activity_count(&mut ws);

    let err = ws
        .returns()
        .unwrap()
        .create(NewTaxReturn::new("  ", 2024))
        .unwrap_err();
    assert!(matches!(err, TaxdeskError::InvalidInput(_)));
    assert_eq!(activity_count(&mut ws), before);
}

#[test]
fn test_return_ids_unique_within_one_millisecond() {
    let mut ws = logged_in(MemoryStore::new());
    let a = ws.returns().unwrap().create(NewTaxReturn::new("1040", 2024)).unwrap();
    let b = ws.returns().unwrap().create(NewTaxReturn::new("1040", 2024)).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn test_every_mutation_logs_one_activity() {
    let mut ws = logged_in(MemoryStore::new());
    let mut expected = activity_count(&mut ws);

    let created = ws.returns().unwrap().create(NewTaxReturn::new("1040", 2024)).unwrap();
    expected += 1;
    assert_eq!(activity_count(&mut ws), expected);

    let update = TaxReturnUpdate {
        documents: Some(vec!["W-2.pdf".to_string()]),
        ..Default::default()
    };
    let updated = ws.returns().unwrap().update(&created.id, update).unwrap();
    assert_eq!(updated.document_count, 1);
    expected += 1;
    assert_eq!(activity_count(&mut ws), expected);

    ws.returns()
        .unwrap()
        .change_status(&created.id, ReturnStatus::InReview)
        .unwrap();
    expected += 1;
    assert_eq!(activity_count(&mut ws), expected);

    ws.returns().unwrap().delete(&created.id).unwrap();
    expected += 1;
    assert_eq!(activity_count(&mut ws), expected);

    let uploaded = ws
        .documents()
        .unwrap()
        .upload(vec![
            UploadedFile::new("W-2.pdf", "application/pdf", 2048),
            UploadedFile::new("scan.jpg", "image/jpeg", 4096),
        ])
        .unwrap();
    assert_eq!(uploaded.len(), 2);
    expected += 1;
    assert_eq!(activity_count(&mut ws), expected);

    ws.documents()
        .unwrap()
        .update_comments(&uploaded[0].id, "employer copy")
        .unwrap();
    ws.documents().unwrap().delete(&uploaded[1].id).unwrap();
    expected += 2;
    assert_eq!(activity_count(&mut ws), expected);

    let inv = ws
        .payments()
        .unwrap()
        .create_invoice(NewInvoice {
            description: "Amended return".to_string(),
            amount: 90.0,
            due_date: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
        })
        .unwrap();
    assert_eq!(inv.id, "INV-004");
    ws.payments().unwrap().update_invoice(&inv.id, "Amended 1040").unwrap();
    ws.payments().unwrap().delete_invoice(&inv.id).unwrap();
    expected += 3;
    assert_eq!(activity_count(&mut ws), expected);
}

#[test]
fn test_unknown_id_changes_nothing() {
    let mut ws = logged_in(MemoryStore::new());
    let before = ws.store().get_item("returns").unwrap();
    let activities = activity_count(&mut ws);

    let err = ws.returns().unwrap().delete("nope").unwrap_err();
    assert!(matches!(err, TaxdeskError::NotFound(_)));
    assert_eq!(ws.store().get_item("returns").unwrap(), before);
    assert_eq!(activity_count(&mut ws), activities);
}

#[test]
fn test_delete_last_return_stores_empty_array() {
    let mut ws = logged_in(MemoryStore::new());
    for r in ws.returns().unwrap().list() {
        ws.returns().unwrap().delete(&r.id).unwrap();
    }
    assert_eq!(ws.store().get_item("returns").unwrap().as_deref(), Some("[]"));
    assert!(ws.returns().unwrap().list().is_empty());
}

#[test]
fn test_strict_policy_rejects_shortcut() {
    let mut ws = logged_in(MemoryStore::new()).with_policy(TransitionPolicy::Strict);
    let created = ws.returns().unwrap().create(NewTaxReturn::new("1040", 2024)).unwrap();

    let err = ws
        .returns()
        .unwrap()
        .change_status(&created.id, ReturnStatus::Completed)
        .unwrap_err();
    assert!(matches!(err, TaxdeskError::InvalidTransition(_)));

    ws.returns()
        .unwrap()
        .change_status(&created.id, ReturnStatus::InReview)
        .unwrap();
    let done = ws
        .returns()
        .unwrap()
        .change_status(&created.id, ReturnStatus::Completed)
        .unwrap();
    assert_eq!(done.status, ReturnStatus::Completed);
}

#[test]
fn test_status_change_refreshes_last_updated() {
    let clock = std::rc::Rc::new(clock());
    let mut ws = Workspace::with_clock(MemoryStore::new(), clock.clone());
    ws.login(&Credentials::new("pat@example.com", "pw"), None).unwrap();
    let created = ws.returns().unwrap().create(NewTaxReturn::new("1040", 2024)).unwrap();

    clock.advance(Duration::days(3));
    let moved = ws
        .returns()
        .unwrap()
        .change_status(&created.id, ReturnStatus::Completed)
        .unwrap();
    assert_eq!(moved.created_date, created.created_date);
    assert_eq!(moved.last_updated, NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
}

#[test]
fn test_pay_invoice_issues_receipt() {
    let mut ws = logged_in(MemoryStore::new());
    set_collection(ws.store_mut(), Slot::Invoices, &[invoice("INV-1", 250.0)]).unwrap();
    set_collection::<_, taxdesk_core::payments::Receipt>(ws.store_mut(), Slot::Receipts, &[]).unwrap();

    let payment = ws
        .payments()
        .unwrap()
        .pay_invoice(
            "INV-1",
            PaymentDetails {
                method: PaymentMethod::CreditCard,
            },
        )
        .expect("payment should succeed");

    assert_eq!(payment.invoice.status, InvoiceStatus::Paid);
    assert_eq!(payment.invoice.payment_method, Some(PaymentMethod::CreditCard));
    assert_eq!(payment.invoice.paid_date, Some(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));

    let receipts = ws.payments().unwrap().receipts();
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].invoice_id, "INV-1");
    assert_eq!(receipts[0].amount, 250.0);
    assert!(receipts[0].id.starts_with("REC-"));

    let stored: serde_json::Value =
        serde_json::from_str(&ws.store().get_item("receipts").unwrap().unwrap()).unwrap();
    assert_eq!(stored[0]["paymentMethod"], "credit_card");
    assert_eq!(stored[0]["invoiceId"], "INV-1");

    let newest = ws.activity().unwrap().recent(1);
    assert_eq!(newest[0].kind, ActivityKind::Payment);
    assert_eq!(newest[0].description, "Payment Processed");
    assert_eq!(newest[0].details, "Payment of $250.00 for INV-1");
}

#[test]
fn test_paying_twice_is_rejected() {
    let mut ws = logged_in(MemoryStore::new());
    let method = PaymentDetails {
        method: PaymentMethod::Paypal,
    };
    ws.payments().unwrap().pay_invoice("INV-002", method).unwrap();
    let err = ws.payments().unwrap().pay_invoice("INV-002", method).unwrap_err();
    assert!(matches!(err, TaxdeskError::InvalidTransition(_)));
    assert_eq!(ws.payments().unwrap().receipts().len(), 2);
}

#[test]
fn test_receipt_failure_rolls_back_invoice() {
    let mut ws = logged_in(FlakyStore::default());
    ws.payments().unwrap().invoices();
    ws.payments().unwrap().receipts();
    let activities = activity_count(&mut ws);

    ws.store_mut().fail(Slot::Receipts);
    let err = ws
        .payments()
        .unwrap()
        .pay_invoice(
            "INV-002",
            PaymentDetails {
                method: PaymentMethod::DebitCard,
            },
        )
        .unwrap_err();
    assert!(err.is_retryable());
    ws.store_mut().heal();

    let invoice = ws.payments().unwrap().invoice("INV-002").unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Unpaid);
    assert_eq!(invoice.payment_method, None);
    assert_eq!(ws.payments().unwrap().receipts().len(), 1);
    assert_eq!(activity_count(&mut ws), activities);
}

#[test]
fn test_failed_primary_write_logs_nothing() {
    let mut ws = logged_in(FlakyStore::default());
    ws.returns().unwrap().list();
    let activities = activity_count(&mut ws);

    ws.store_mut().fail(Slot::Returns);
    assert!(ws.returns().unwrap().create(NewTaxReturn::new("1040", 2024)).is_err());
    ws.store_mut().heal();

    assert_eq!(ws.returns().unwrap().list().len(), 3);
    assert_eq!(activity_count(&mut ws), activities);
}

#[test]
fn test_failed_activity_write_keeps_mutation() {
    let mut ws = logged_in(FlakyStore::default());
    let activities = activity_count(&mut ws);

    ws.store_mut().fail(Slot::Activities);
    let created = ws
        .returns()
        .unwrap()
        .create(NewTaxReturn::new("Schedule E", 2024))
        .expect("mutation should survive a failed activity write");
    ws.store_mut().heal();

    assert_eq!(ws.returns().unwrap().get(&created.id).unwrap().return_type, "Schedule E");
    assert_eq!(activity_count(&mut ws), activities);
}

#[test]
fn test_read_error_keeps_stored_returns() {
    let mut ws = logged_in(FlakyStore::default());
    let template = ws.returns().unwrap().list()[0].clone();
    let mine: Vec<_> = (0..5)
        .map(|n| {
            let mut r = template.clone();
            r.id = format!("user-{}", n);
            r
        })
        .collect();
    set_collection(ws.store_mut(), Slot::Returns, &mine).unwrap();
    let activities = activity_count(&mut ws);

    ws.store_mut().lock(Slot::Returns);
    let err = ws
        .returns()
        .unwrap()
        .create(NewTaxReturn::new("1040", 2024))
        .unwrap_err();
    assert!(err.is_retryable());
    ws.store_mut().heal();

    let ids: Vec<String> = ws.returns().unwrap().list().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["user-0", "user-1", "user-2", "user-3", "user-4"]);
    assert_eq!(activity_count(&mut ws), activities);
}

#[test]
fn test_read_error_keeps_activity_history() {
    let mut ws = logged_in(FlakyStore::default());
    ws.returns().unwrap().create(NewTaxReturn::new("1040", 2024)).unwrap();
    ws.returns().unwrap().create(NewTaxReturn::new("1099", 2024)).unwrap();
    let activities = activity_count(&mut ws);
    assert_eq!(activities, 3);

    ws.store_mut().lock(Slot::Activities);
    let created = ws
        .returns()
        .unwrap()
        .create(NewTaxReturn::new("Schedule C", 2024))
        .expect("mutation should survive an unreadable activity log");
    ws.store_mut().heal();

    assert_eq!(ws.returns().unwrap().get(&created.id).unwrap().return_type, "Schedule C");
    assert_eq!(activity_count(&mut ws), activities);
}

#[test]
fn test_read_error_blocks_payment_and_settings() {
    let mut ws = logged_in(FlakyStore::default());
    ws.payments().unwrap().invoices();
    ws.payments().unwrap().receipts();

    ws.store_mut().lock(Slot::Receipts);
    let err = ws
        .payments()
        .unwrap()
        .pay_invoice(
            "INV-002",
            PaymentDetails {
                method: PaymentMethod::BankTransfer,
            },
        )
        .unwrap_err();
    assert!(err.is_retryable());
    ws.store_mut().heal();
    assert_eq!(ws.payments().unwrap().invoice("INV-002").unwrap().status, InvoiceStatus::Unpaid);
    assert_eq!(ws.payments().unwrap().receipts().len(), 1);

    ws.settings()
        .unwrap()
        .save_profile(ProfileUpdate {
            phone: Some("555-0100".to_string()),
            ..ProfileUpdate::default()
        })
        .unwrap();
    ws.store_mut().lock(Slot::UserProfile);
    let err = ws
        .settings()
        .unwrap()
        .save_profile(ProfileUpdate {
            first_name: Some("Pat".to_string()),
            ..ProfileUpdate::default()
        })
        .unwrap_err();
    assert!(err.is_retryable());
    ws.store_mut().heal();
    assert_eq!(ws.settings().unwrap().profile().phone, "555-0100");
}

#[test]
fn test_client_metadata_is_stamped_on_activity() {
    let mut ws = Workspace::with_clock(MemoryStore::new(), clock()).with_client(ActivityMetadata {
        ip: None,
        user_agent: Some("taxdesk-test/1".to_string()),
    });
    ws.login(&Credentials::new("pat@example.com", "secret"), None).unwrap();
    ws.returns().unwrap().create(NewTaxReturn::new("1040", 2024)).unwrap();

    let entries = ws.activity().unwrap().query(&ActivityFilter::new());
    assert_eq!(entries.len(), 2);
    for entry in entries {
        let metadata = entry.metadata.expect("metadata attached");
        assert_eq!(metadata.user_agent.as_deref(), Some("taxdesk-test/1"));
    }
}

#[test]
fn test_activity_is_scoped_to_user_and_filterable() {
    let mut ws = logged_in(MemoryStore::new());
    ws.returns().unwrap().create(NewTaxReturn::new("1040", 2024)).unwrap();
    ws.documents()
        .unwrap()
        .upload(vec![UploadedFile::new("W-2.pdf", "application/pdf", 10)])
        .unwrap();

    let docs = ws
        .activity()
        .unwrap()
        .query(&ActivityFilter::new().kind(ActivityKind::Document));
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].details, "Uploaded W-2.pdf");

    let searched = ws.activity().unwrap().query(&ActivityFilter::new().search("1040"));
    assert_eq!(searched.len(), 1);

    ws.logout().unwrap();
    ws.login(&Credentials::new("sam@example.com", "pw"), None).unwrap();
    let others = ws.activity().unwrap().query(&ActivityFilter::new());
    assert_eq!(others.len(), 1);
    assert_eq!(others[0].description, "User Logged In");
}

#[test]
fn test_document_search_and_stats() {
    let mut ws = logged_in(MemoryStore::new());
    assert!(ws.documents().unwrap().list().is_empty());
    ws.documents()
        .unwrap()
        .upload(vec![
            UploadedFile::new("W-2.pdf", "application/pdf", 1024),
            UploadedFile::new("receipt.png", "image/png", 512),
            UploadedFile::new("notes.docx", "application/msword", 512),
        ])
        .unwrap();

    let stats = ws.documents().unwrap().stats();
    assert_eq!((stats.total, stats.pdf, stats.images, stats.docx), (3, 1, 1, 1));
    assert_eq!(stats.total_size, 2048);

    let images = ws.documents().unwrap().search("", Some(DocumentKind::Image));
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].name, "receipt.png");
    assert_eq!(ws.documents().unwrap().search("W-2", None).len(), 1);
}

#[test]
fn test_settings_profile_and_notifications() {
    let mut ws = logged_in(MemoryStore::new());
    let saved = ws
        .settings()
        .unwrap()
        .save_profile(ProfileUpdate {
            first_name: Some("Pat".to_string()),
            last_name: Some("Lee".to_string()),
            phone: Some("555-0100".to_string()),
        })
        .unwrap();
    assert_eq!(saved.email, "pat@example.com");
    assert!(saved.updated_at.is_some());
    assert_eq!(ws.settings().unwrap().initials(), "PL");
    assert_eq!(ws.settings().unwrap().display_name(), "Pat Lee");

    let newest = ws.activity().unwrap().recent(1);
    assert_eq!(newest[0].kind, ActivityKind::System);
    assert_eq!(newest[0].description, "Profile Updated");

    let prefs = ws
        .settings()
        .unwrap()
        .set_notification(NotificationKind::Marketing, true)
        .unwrap();
    assert!(prefs.marketing_emails);
    assert!(ws.settings().unwrap().notification_settings().marketing_emails);
}

#[test]
fn test_dashboard_summary() {
    let mut ws = logged_in(MemoryStore::new());
    for year in 2019..2022 {
        ws.returns().unwrap().create(NewTaxReturn::new("1040", year)).unwrap();
    }

    let summary = ws.dashboard().unwrap();
    assert_eq!(summary.total_returns, 6);
    assert_eq!(summary.pending_returns, 4);
    assert_eq!(summary.recent_returns.len(), 3);
    assert_eq!(summary.recent_returns[0].year, 2021);
    assert_eq!(summary.unpaid_invoices, 2);
    assert_eq!(summary.recent_activity.len(), 4);
}
