use crate::args::ChargeArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Charge;
use crate::{Config, Result};
use tracing::info;

/// Deletes one charge after backing up the database.
///
/// # Errors
///
/// Returns a `Database` error if the backup fails or if the house has no such charge.
pub async fn unassign(config: Config, args: ChargeArgs) -> Result<Out<Charge>> {
    let backup = config
        .backup()
        .copy_sqlite()
        .await
        .pub_result(ErrorType::Database)?;
    info!("Backed up the database to {}", backup.display());

    let charge = config
        .db()
        .delete_charge(args.house(), args.contribution(), args.due_date())
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(
        format!(
            "Removed the charge of house {} for contribution {} due {}",
            charge.house_id, charge.contribution_id, charge.due_date
        ),
        charge,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{date, TestEnv};

    #[tokio::test]
    async fn test_unassign() {
        let env = TestEnv::seeded().await;
        let args = ChargeArgs::new(5, 2, date("2024-01-31"));

        let out = unassign(env.config(), args.clone()).await.unwrap();
        assert_eq!(
            out.message(),
            "Removed the charge of house 5 for contribution 2 due 2024-01-31"
        );
        assert_eq!(out.structure().unwrap().group_id, None);

        let backups = std::fs::read_dir(env.config().backups()).unwrap().count();
        assert_eq!(backups, 1);

        let err = unassign(env.config(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Database);
    }
}
