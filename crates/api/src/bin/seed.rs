//! Seeds reference data and a demo mitra into the configured database.
//!
//! Safe to run repeatedly: rows that already exist are left alone.

use store::{Database, DatabaseOptions, DbTransaction, Params, params};
use tracing_subscriber::EnvFilter;

struct Mode {
    name: &'static str,
    description: &'static str,
    capacity_kg: f64,
    base_price: f64,
    price_per_km: f64,
}

const MODES: [Mode; 3] = [
    Mode {
        name: "Motor Roda Dua",
        description: "Sepeda motor untuk pengiriman cepat",
        capacity_kg: 20.0,
        base_price: 10000.0,
        price_per_km: 2000.0,
    },
    Mode {
        name: "Pickup",
        description: "Mobil pickup untuk barang sedang",
        capacity_kg: 1000.0,
        base_price: 50000.0,
        price_per_km: 5000.0,
    },
    Mode {
        name: "Truk Box",
        description: "Truk box untuk pengiriman besar",
        capacity_kg: 4000.0,
        base_price: 200000.0,
        price_per_km: 10000.0,
    },
];

/// Name, description, handling instructions, price multiplier.
const CARGO_TYPES: [(&str, &str, &str, f64); 3] = [
    ("Umum", "Barang umum tanpa penanganan khusus", "Penanganan standar", 1.0),
    (
        "Mudah Pecah",
        "Barang pecah belah atau sensitif",
        "Tangani dengan sangat hati-hati, hindari tumpukan",
        1.5,
    ),
    ("Berat", "Barang berbobot tinggi", "Gunakan peralatan angkat yang sesuai", 1.3),
];

const FACILITIES: [(&str, &str); 3] = [
    ("AC", "Kendaraan berpendingin udara"),
    ("Tracking", "Pelacakan real-time"),
    ("Asuransi", "Perlindungan asuransi pengiriman"),
];

const MITRA_NAME: &str = "PT Logistik Nusantara";
const MITRA_ADDRESS: &str = "Jl. Raya Serpong No. 123, Tangerang Selatan";
const MITRA_CONTACT: &str = r#"{"phone": "+62811234567", "email": "contact@logistiknusantara.id"}"#;
const SERVICE_CONFIG: &str =
    r#"{"service_area":["Jakarta","Tangerang"],"operating_hours":"08:00-20:00","vehicle_types":["Motor Roda Dua"]}"#;

async fn seed_reference_data(tx: &mut DbTransaction) -> store::Result<()> {
    for mode in &MODES {
        tx.execute(
            r#"
            INSERT OR IGNORE INTO transportation_modes
                (mode_name, description, capacity_kg, base_price, price_per_km)
            VALUES ($name, $description, $capacity, $base_price, $price_per_km)
            "#,
            &params! {
                "name" => mode.name,
                "description" => mode.description,
                "capacity" => mode.capacity_kg,
                "base_price" => mode.base_price,
                "price_per_km" => mode.price_per_km,
            },
        )
        .await?;
    }

    for (name, description, handling, multiplier) in CARGO_TYPES {
        tx.execute(
            r#"
            INSERT OR IGNORE INTO cargo_types
                (type_name, description, handling_instructions, price_multiplier)
            VALUES ($name, $description, $handling, $multiplier)
            "#,
            &params! {
                "name" => name,
                "description" => description,
                "handling" => handling,
                "multiplier" => multiplier,
            },
        )
        .await?;
    }

    for (name, description) in FACILITIES {
        tx.execute(
            "INSERT OR IGNORE INTO facilities (name, description) VALUES ($name, $description)",
            &params! { "name" => name, "description" => description },
        )
        .await?;
    }
    Ok(())
}

/// One template per mode, named after it.
async fn seed_templates(tx: &mut DbTransaction) -> store::Result<()> {
    tx.execute(
        r#"
        INSERT INTO service_templates (name, description, mode_id)
        SELECT 'Layanan ' || tm.mode_name, 'Pengiriman dengan ' || tm.mode_name, tm.mode_id
        FROM transportation_modes tm
        WHERE NOT EXISTS (
            SELECT 1 FROM service_templates st WHERE st.mode_id = tm.mode_id
        )
        "#,
        &Params::new(),
    )
    .await?;
    Ok(())
}

async fn seed_mitra(tx: &mut DbTransaction) -> store::Result<i64> {
    let existing = tx
        .fetch_optional(
            "SELECT id FROM mitra_profiles WHERE name = $name",
            &params! { "name" => MITRA_NAME },
        )
        .await?
        .and_then(|row| row.get_i64("id"));
    if let Some(id) = existing {
        return Ok(id);
    }

    let (_, id) = tx
        .execute(
            r#"
            INSERT INTO mitra_profiles (name, address, contact_info)
            VALUES ($name, $address, $contact)
            "#,
            &params! {
                "name" => MITRA_NAME,
                "address" => MITRA_ADDRESS,
                "contact" => MITRA_CONTACT,
            },
        )
        .await?;
    Ok(id)
}

async fn seed_service_instance(tx: &mut DbTransaction, mitra_id: i64) -> store::Result<()> {
    tx.execute(
        r#"
        INSERT INTO service_instances (mitra_id, template_id, config)
        SELECT $mitra_id, st.id, $config
        FROM service_templates st
        WHERE NOT EXISTS (SELECT 1 FROM service_instances WHERE mitra_id = $mitra_id)
        ORDER BY st.id
        LIMIT 1
        "#,
        &params! { "mitra_id" => mitra_id, "config" => SERVICE_CONFIG },
    )
    .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data.db".to_string());
    let db = Database::connect(&DatabaseOptions::new(path.clone())).await?;
    db.run_migrations().await?;

    let mut tx = db.begin().await?;
    seed_reference_data(&mut tx).await?;
    seed_templates(&mut tx).await?;
    let mitra_id = seed_mitra(&mut tx).await?;
    seed_service_instance(&mut tx, mitra_id).await?;
    tx.commit().await?;

    tracing::info!(%path, mitra_id, "Database seeded");
    Ok(())
}
