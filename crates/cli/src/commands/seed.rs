use storefront_core::config::LoadOptions;
use storefront_db::{CatalogSeedDataset, SeedResult, VerificationResult};

use crate::commands::{connect_and_migrate, prepare, CommandResult, StepFailure};

pub fn run(options: &LoadOptions) -> CommandResult {
    let (config, runtime) = match prepare("seed", options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_and_migrate(&config).await?;

        let outcome = async {
            let seeded = CatalogSeedDataset::load(&pool)
                .await
                .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
            let verification = CatalogSeedDataset::verify(&pool)
                .await
                .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;
            check_verification(&verification)?;
            Ok::<SeedResult, StepFailure>(seeded)
        }
        .await;

        pool.close().await;
        outcome
    });

    match result {
        Ok(seeded) => CommandResult::success(
            "seed",
            format!(
                "catalog seed loaded: {} products, {} orders",
                seeded.products_seeded, seeded.orders_seeded
            ),
        ),
        Err(failure) => ("seed", failure).into(),
    }
}

fn check_verification(verification: &VerificationResult) -> Result<(), StepFailure> {
    if verification.all_present {
        return Ok(());
    }

    let failed_checks = verification
        .checks
        .iter()
        .filter_map(|(check, passed)| (!passed).then_some(*check))
        .collect::<Vec<_>>();
    let message = if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    };
    Err(("seed_verification", message, 6))
}

#[cfg(test)]
mod tests {
    use storefront_db::VerificationResult;

    use super::check_verification;

    #[test]
    fn verification_error_message_targets_failed_checks() {
        let verification = VerificationResult {
            all_present: false,
            checks: vec![("products", true), ("order-counts", false), ("maadi-ranking", false)],
        };

        let (error_class, message, exit_code) =
            check_verification(&verification).expect_err("verification should fail");

        assert_eq!(error_class, "seed_verification");
        assert_eq!(exit_code, 6);
        assert_eq!(message, "Seed verification failed for checks: order-counts, maadi-ranking");
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        let verification = VerificationResult { all_present: false, checks: Vec::new() };

        let (_, message, _) = check_verification(&verification).expect_err("should fail");

        assert_eq!(message, "Some seed data failed to load");
    }

    #[test]
    fn passing_verification_is_accepted() {
        let verification =
            VerificationResult { all_present: true, checks: vec![("products", true)] };

        assert!(check_verification(&verification).is_ok());
    }
}
