use crate::args::ImportArgs;
use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::import::{self, Entity};
use crate::model::{Charge, Contribution, House};
use crate::{Config, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// What an import did.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub entity: Entity,
    pub records: usize,
    /// The copy of the database taken before it was changed.
    pub backup: PathBuf,
}

/// Imports the CSV file named in `args` into the database.
///
/// The whole file is parsed first, so a bad record leaves the database untouched. The database is
/// then backed up and the records are upserted in one transaction.
///
/// # Errors
///
/// - Returns an `Import` error if the file cannot be read or has an invalid record.
/// - Returns a `Database` error if the backup or the write fails, e.g. a charge for an unknown
///   house.
pub async fn import(config: Config, args: ImportArgs) -> Result<Out<ImportSummary>> {
    let entity = args.entity();
    let file = import::open(args.file()).pub_result(ErrorType::Import)?;

    // Parse before touching the database.
    let parsed = match entity {
        Entity::Houses => import::read_houses(file).map(Parsed::Houses),
        Entity::Contributions => import::read_contributions(file).map(Parsed::Contributions),
        Entity::Charges => import::read_charges(file).map(Parsed::Charges),
    }
    .pub_result(ErrorType::Import)?;

    let backup = config
        .backup()
        .copy_sqlite()
        .await
        .pub_result(ErrorType::Database)?;
    info!("Backed up the database to {}", backup.display());

    let db = config.db();
    let records = match &parsed {
        Parsed::Houses(houses) => db.save_houses(houses).await,
        Parsed::Contributions(contributions) => db.save_contributions(contributions).await,
        Parsed::Charges(charges) => db.save_charges(charges).await,
    }
    .pub_result(ErrorType::Database)?;

    Ok(Out::new(
        format!(
            "Imported {} from {}",
            plural(records, "record", "records"),
            args.file().display()
        ),
        ImportSummary {
            entity,
            records,
            backup,
        },
    ))
}

enum Parsed {
    Houses(Vec<House>),
    Contributions(Vec<Contribution>),
    Charges(Vec<Charge>),
}
