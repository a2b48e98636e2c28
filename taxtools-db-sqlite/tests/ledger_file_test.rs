use std::sync::Arc;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use taxtools_core::db::{DbConfig, LedgerRegistry};
use taxtools_core::{
    CalculationLedger, CalculationType, CallerId, EstimatedTaxInput, FilingStatus, StandardDeductionInput,
    TaxTableRegistry, TaxToolsService,
};
use taxtools_db_sqlite::SqliteLedgerFactory;
use tempfile::TempDir;

fn file_config(dir: &TempDir) -> DbConfig {
    DbConfig {
        backend: "sqlite".to_string(),
        connection_string: dir.path().join("ledger.db").display().to_string(),
    }
}

fn registry() -> LedgerRegistry {
    let mut registry = LedgerRegistry::new();
    registry.register(Box::new(SqliteLedgerFactory));
    registry
}

#[tokio::test]
async fn records_survive_reopening_the_database() {
    let dir = TempDir::new().expect("temp dir");
    let caller = CallerId::new("client-42").expect("caller id");

    {
        let ledger = registry()
            .create(&file_config(&dir))
            .await
            .expect("open ledger");
        let service = TaxToolsService::new(Arc::new(TaxTableRegistry::builtin()))
            .with_ledger(Arc::from(ledger));

        service
            .standard_deduction(
                Some(caller.clone()),
                StandardDeductionInput {
                    filing_status: FilingStatus::MarriedFilingJointly,
                    tax_year: 2023,
                    age_65_or_older: true,
                    blind: true,
                },
            )
            .expect("deduction");
        service
            .estimated_tax(
                Some(caller.clone()),
                EstimatedTaxInput {
                    income: dec!(50000),
                    filing_status: FilingStatus::Single,
                    deductions: dec!(0),
                    tax_year: 2023,
                },
            )
            .expect("estimate");
        assert_eq!(service.flush().await, 2);
    }

    let reopened = registry()
        .create(&file_config(&dir))
        .await
        .expect("reopen ledger");
    let records = reopened
        .list_records(Some(&caller))
        .await
        .expect("list records");

    assert_eq!(
        records
            .iter()
            .map(|r| (r.calculation_type, r.result))
            .collect::<Vec<_>>(),
        vec![
            (CalculationType::StandardDeduction, dec!(30700)),
            (CalculationType::EstimatedTax, dec!(6308)),
        ]
    );
    assert_eq!(records[0].inputs["filingStatus"], "marriedFilingJointly");
}

#[tokio::test]
async fn anonymous_requests_leave_the_file_empty() {
    let dir = TempDir::new().expect("temp dir");
    let ledger = registry()
        .create(&file_config(&dir))
        .await
        .expect("open ledger");
    let ledger: Arc<dyn CalculationLedger> = Arc::from(ledger);
    let service = TaxToolsService::new(Arc::new(TaxTableRegistry::builtin()))
        .with_ledger(ledger.clone());

    service
        .estimated_tax(
            None,
            EstimatedTaxInput {
                income: dec!(120000),
                filing_status: FilingStatus::HeadOfHousehold,
                deductions: dec!(21900),
                tax_year: 2024,
            },
        )
        .expect("estimate");
    service.flush().await;

    assert!(ledger.list_records(None).await.expect("list").is_empty());
}
