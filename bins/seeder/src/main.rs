//! Database seeder for Feedesk development and testing.
//!
//! Seeds a small set of students and their fee payments. Rows that already
//! exist are left alone, so the seeder can be run repeatedly.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use feedesk_core::payments::PaymentRecord;
use feedesk_db::PaymentRepository;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Demo students: id, name, department, level.
const STUDENTS: &[(&str, &str, &str, &str)] = &[
    ("UG-20210001", "Ama Mensah", "Computer Science", "300"),
    ("UG-20210002", "Kofi Boateng", "Nursing", "300"),
    ("UG-20220015", "Akosua Owusu", "Business Administration", "200"),
    ("UG-20230042", "Yaw Asante", "Civil Engineering", "100"),
    ("UG-20230057", "Efua Addo", "Computer Science", "100"),
];

/// Demo payments: student index, fee type, amount in pesewas, status, age in days.
const PAYMENTS: &[(usize, &str, i64, &str, i64)] = &[
    (0, "Tuition", 450_000, "Paid", 60),
    (0, "Hostel", 120_000, "Paid", 58),
    (0, "Library Fee", 5_000, "Paid", 30),
    (1, "Tuition Fee", 450_000, "Paid", 55),
    (1, "Hostel", 120_000, "Pending", 3),
    (2, "Tuition", 380_000, "paid", 40),
    (2, "SRC Dues", 2_500, "Paid", 40),
    (2, "Tuition", 380_000, "Refunded", 39),
    (3, "Tuition (1st installment)", 200_000, "PAID", 20),
    (3, "Medical", 15_000, "Paid", 19),
    (4, "Tuition", 450_000, "Pending", 1),
    (4, "", 7_500, "Paid", 2),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("FEEDESK__DATABASE__URL"))
        .expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = feedesk_db::connect(&database_url, 2, 1)
        .await
        .expect("Failed to connect to database");
    let payments = PaymentRepository::new(db);

    println!("Seeding payments...");
    let mut inserted = 0;
    for (index, record) in demo_payments().iter().enumerate() {
        let exists = payments
            .find_by_id(&record.payment_id)
            .await
            .expect("Failed to look up payment")
            .is_some();
        if exists {
            continue;
        }
        payments
            .insert(record)
            .await
            .unwrap_or_else(|e| panic!("Failed to insert payment {index}: {e}"));
        inserted += 1;
    }

    let total = payments.count().await.expect("Failed to count payments");
    println!("Seeding complete! {inserted} new payments, {total} in total.");
}

fn demo_payments() -> Vec<PaymentRecord> {
    let now = Utc::now();
    PAYMENTS
        .iter()
        .enumerate()
        .map(|(n, &(student, payment_type, pesewas, status, age_days))| {
            let (student_id, name, department, level) = STUDENTS[student];
            PaymentRecord::new(
                format!("PAY-{:04}", n + 1),
                student_id,
                payment_type,
                Decimal::new(pesewas, 2),
                status,
            )
            .with_entity_name(name)
            .with_department(department)
            .with_level(level)
            .with_created_at(now - Duration::days(age_days))
            .with_transaction_ref(format!("TX-{}", Uuid::new_v4().simple()))
        })
        .collect()
}
