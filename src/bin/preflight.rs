use pn_registry::infra::config::Config;
use pn_registry::storage::{DocumentStore, PostgresDocumentStore};
use pn_registry::{Record, RecordInput};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--seed]\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL\n\
         Optional:\n\
           PN_REGISTRY_API_COLLECTION, PN_REGISTRY_API_MAX_CONNECTIONS\n"
    );
    std::process::exit(2);
}

fn sample_record() -> anyhow::Result<Record> {
    let input: RecordInput = serde_json::from_value(serde_json::json!({
        "id": "e0ec1244-4ae4-419c-87aa-a1ae856f5cd6",
        "fullName": "Matúš Bojko",
        "patientId": "1123134223",
        "employer": "FIIT STU",
        "reason": "sickness",
        "issued": "2024-01-31",
        "validFrom": "2024-01-31",
        "validUntil": "2024-01-31",
        "checkUp": "2024-01-31",
        "checkUpDone": false
    }))?;
    Ok(input.into_record()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let seed = args.iter().any(|a| a == "--seed");

    let config = Config::from_env()?;
    let Some(database_url) = config.database_url.as_deref() else {
        usage_and_exit();
    };

    println!("> Preflight:");
    println!("  PN_REGISTRY_API_COLLECTION={}", config.collection);
    println!("  PN_REGISTRY_API_MAX_CONNECTIONS={}", config.max_connections);

    let store =
        PostgresDocumentStore::<Record>::connect(database_url, &config.collection, config.max_connections)
            .await?;
    store.ping().await?;
    println!("  Database reachable, table '{}' ready.", config.collection);

    let existing = store.find_all().await?;
    println!("  Stored PN records: {}", existing.len());

    if seed {
        if existing.is_empty() {
            let record = sample_record()?;
            store.create(&record.id, &record).await?;
            println!("  Seeded sample record {}.", record.id);
        } else {
            println!("  Collection not empty, skipping seed.");
        }
    }

    println!("> Preflight OK.");
    Ok(())
}
