//! Shared fixtures for repository tests.

#![allow(dead_code)]

use common::{MitraId, ServiceInstanceId, TemplateId};
use store::{Database, Params, params};

pub struct Fixture {
    pub db: Database,
    pub mitra: MitraId,
    pub other_mitra: MitraId,
    pub template: TemplateId,
    pub instance: ServiceInstanceId,
    pub other_instance: ServiceInstanceId,
}

pub async fn database() -> Database {
    Database::connect_in_memory().await.unwrap()
}

/// One mode with a facility, two cargo types and two mitras with one
/// service instance each.
pub async fn fixture() -> Fixture {
    let db = database().await;

    for sql in [
        "INSERT INTO transportation_modes (mode_name, description, capacity_kg, base_price, price_per_km)
         VALUES ('Motor Roda Dua', 'Sepeda motor untuk pengiriman cepat', 20, 10000, 2000)",
        "INSERT INTO facilities (name, description) VALUES ('Tracking', 'Pelacakan real-time')",
        "INSERT INTO mode_facilities (mode_id, facility_id) VALUES (1, 1)",
        "INSERT INTO cargo_types (type_name, price_multiplier) VALUES ('Umum', 1.0)",
        "INSERT INTO cargo_types (type_name, price_multiplier) VALUES ('Mudah Pecah', 1.5)",
        "INSERT INTO mitra_profiles (name, address, contact_info)
         VALUES ('PT Logistik Nusantara', 'Tangerang Selatan', '{\"phone\": \"+62811234567\"}')",
        "INSERT INTO mitra_profiles (name) VALUES ('CV Kirim Cepat')",
        "INSERT INTO service_templates (name, description, mode_id)
         VALUES ('Kurir Motor Roda Dua', 'Pengiriman dengan Motor Roda Dua', 1)",
        "INSERT INTO service_instances (mitra_id, template_id, config)
         VALUES (1, 1, '{\"service_area\":[\"Jakarta\"],\"operating_hours\":\"08:00-17:00\",\"vehicle_types\":[]}')",
        "INSERT INTO service_instances (mitra_id, template_id, config)
         VALUES (2, 1, '{\"service_area\":[\"Bandung\"],\"operating_hours\":\"24h\",\"vehicle_types\":[]}')",
    ] {
        db.execute(sql, &Params::new()).await.unwrap();
    }

    Fixture {
        db,
        mitra: MitraId::new(1),
        other_mitra: MitraId::new(2),
        template: TemplateId::new(1),
        instance: ServiceInstanceId::new(1),
        other_instance: ServiceInstanceId::new(2),
    }
}

/// Inserts a pending order for `customer` with its first history row.
pub async fn place_order(db: &Database, instance: ServiceInstanceId, customer: &str) -> i64 {
    let mut tx = db.begin().await.unwrap();
    let (_, order_id) = tx
        .execute(
            r#"
            INSERT INTO orders (service_instance_id, customer_id, pickup_address,
                                delivery_address, cargo_type, cargo_weight, total_price)
            VALUES ($instance, $customer, 'Jl. Sudirman 1', 'Jl. Thamrin 2', 'Umum', 5, 30000)
            "#,
            &params! { "instance" => instance, "customer" => customer },
        )
        .await
        .unwrap();
    tx.execute(
        "INSERT INTO order_status_history (order_id, status, notes) VALUES ($id, 'pending', 'Order placed')",
        &params! { "id" => order_id },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();
    order_id
}
